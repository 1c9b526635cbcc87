//! Path-aware glob matching with globstar (`**`) support.
//!
//! Paths are `/`-separated strings. `*` never crosses a separator; `**`
//! consumes zero or more whole components:
//!
//! - `**/f*.bin` matches `f.bin`, `x/file.bin`, `a/b/fred.bin`
//! - `another/*.bin` matches `another/file.bin` but not `another/child/file.bin`
//! - [`GlobPath::directory`] for `another/` matches everything below `another`

use thiserror::Error;

use crate::CaseSensitivity;
use crate::glob::{contains_glob, glob_match_with};

/// Errors when parsing glob patterns.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("empty pattern")]
    Empty,
}

/// One `/`-delimited piece of a pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
enum PathSegment {
    /// No metacharacters; compared under the case policy.
    Literal(String),
    /// Wildcards within a single component: `*.rs`, `f?`, `[ab]c`.
    Pattern(String),
    /// `**`: zero or more components.
    Globstar,
}

/// A compiled path pattern.
///
/// ```
/// use memvfs_glob::{CaseSensitivity, GlobPath};
///
/// let glob = GlobPath::new("**/f*.bin", CaseSensitivity::Insensitive).unwrap();
/// assert!(glob.matches("x/file.bin"));
/// assert!(glob.matches("a/b/FRED.BIN"));
/// assert!(!glob.matches("x/wrong.bin"));
/// ```
#[derive(Debug, Clone)]
pub struct GlobPath {
    segments: Vec<PathSegment>,
    case: CaseSensitivity,
}

impl GlobPath {
    /// Parse a pattern. Leading, trailing and doubled separators are
    /// ignored; consecutive globstars collapse into one.
    pub fn new(pattern: &str, case: CaseSensitivity) -> Result<Self, PatternError> {
        if pattern.is_empty() {
            return Err(PatternError::Empty);
        }

        let mut segments = Vec::new();
        for part in pattern.split('/').filter(|p| !p.is_empty()) {
            if part == "**" {
                if segments.last() != Some(&PathSegment::Globstar) {
                    segments.push(PathSegment::Globstar);
                }
            } else if is_literal(part) {
                segments.push(PathSegment::Literal(part.to_string()));
            } else {
                segments.push(PathSegment::Pattern(part.to_string()));
            }
        }

        Ok(Self { segments, case })
    }

    /// Matcher for exactly one path, with no metacharacter interpretation.
    pub fn literal(path: &str, case: CaseSensitivity) -> Self {
        let segments = path
            .split('/')
            .filter(|p| !p.is_empty())
            .map(|p| PathSegment::Literal(p.to_string()))
            .collect();
        Self { segments, case }
    }

    /// Matcher for a directory watch: every path strictly below `prefix`.
    ///
    /// The prefix itself is taken literally, even if it contains
    /// metacharacters. An empty prefix (the root) matches every path.
    pub fn directory(prefix: &str, case: CaseSensitivity) -> Self {
        let mut glob = Self::literal(prefix, case);
        glob.segments.push(PathSegment::Globstar);
        glob.segments.push(PathSegment::Pattern("*".to_string()));
        glob
    }

    /// Check if a `/`-separated path matches.
    pub fn matches(&self, path: &str) -> bool {
        let components: Vec<&str> = path.split('/').filter(|c| !c.is_empty()).collect();
        self.match_from(0, &components)
    }

    fn match_from(&self, seg: usize, components: &[&str]) -> bool {
        let Some(segment) = self.segments.get(seg) else {
            return components.is_empty();
        };

        match segment {
            PathSegment::Globstar => {
                (0..=components.len()).any(|skip| self.match_from(seg + 1, &components[skip..]))
            }
            PathSegment::Literal(lit) => match components.split_first() {
                Some((first, rest)) if self.case.eq(lit, first) => self.match_from(seg + 1, rest),
                _ => false,
            },
            PathSegment::Pattern(pat) => match components.split_first() {
                Some((first, rest)) if glob_match_with(pat, first, self.case) => {
                    self.match_from(seg + 1, rest)
                }
                _ => false,
            },
        }
    }
}

fn is_literal(s: &str) -> bool {
    !contains_glob(s) && !s.contains(['{', '\\'])
}
