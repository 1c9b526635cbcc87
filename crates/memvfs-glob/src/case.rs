//! Case policy shared by path keys and pattern matchers.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// How path strings are compared.
///
/// The default is [`CaseSensitivity::Insensitive`]: `A/B.txt` and `a/b.TXT`
/// name the same file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseSensitivity {
    #[default]
    Insensitive,
    Sensitive,
}

impl CaseSensitivity {
    /// Fold a string into its comparison form.
    ///
    /// Borrows when no folding is needed (sensitive policy, or input that is
    /// already lowercase).
    pub fn fold<'a>(self, s: &'a str) -> Cow<'a, str> {
        match self {
            CaseSensitivity::Sensitive => Cow::Borrowed(s),
            CaseSensitivity::Insensitive => {
                if s.chars().any(char::is_uppercase) {
                    Cow::Owned(s.to_lowercase())
                } else {
                    Cow::Borrowed(s)
                }
            }
        }
    }

    /// Compare two strings under this policy.
    pub fn eq(self, a: &str, b: &str) -> bool {
        match self {
            CaseSensitivity::Sensitive => a == b,
            CaseSensitivity::Insensitive => self.fold(a) == self.fold(b),
        }
    }

    /// Compare two characters under this policy.
    pub fn eq_char(self, a: char, b: char) -> bool {
        match self {
            CaseSensitivity::Sensitive => a == b,
            CaseSensitivity::Insensitive => a == b || a.to_lowercase().eq(b.to_lowercase()),
        }
    }

    pub fn is_sensitive(self) -> bool {
        self == CaseSensitivity::Sensitive
    }
}
