//! Single-component glob matching.
//!
//! Supported syntax:
//! - `*` zero or more characters, `?` exactly one character
//! - `[abc]`, `[a-z]`, `[!abc]` / `[^abc]` character classes
//! - `\x` matches `x` literally
//! - `{a,b,c}` brace alternatives, nested braces allowed
//!
//! Matching here is character based and knows nothing about `/`; callers
//! that match whole paths go through [`crate::GlobPath`], which splits on the
//! separator first.

use std::cell::Cell;

use crate::CaseSensitivity;

/// Upper bound on recursive match calls for one pattern/input pair. Patterns
/// such as `*a*a*a*...b` backtrack exponentially; past the bound the match is
/// reported as a miss.
const MAX_MATCH_CALLS: usize = 100_000;

/// Check if a string contains glob metacharacters (`*`, `?`, `[`).
///
/// ```
/// use memvfs_glob::contains_glob;
/// assert!(contains_glob("**/f*.bin"));
/// assert!(contains_glob("logs/[0-9].txt"));
/// assert!(!contains_glob("another/file.bin"));
/// ```
pub fn contains_glob(s: &str) -> bool {
    s.contains('*') || s.contains('?') || s.contains('[')
}

/// Escape every metacharacter in `literal` so it matches only itself.
///
/// ```
/// use memvfs_glob::{escape, glob_match};
/// assert!(glob_match(&escape("data[1].txt"), "data[1].txt"));
/// assert!(!glob_match(&escape("data[1].txt"), "data1.txt"));
/// ```
pub fn escape(literal: &str) -> String {
    let mut escaped = String::with_capacity(literal.len());
    for c in literal.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '{' | '}' | ',' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Case-sensitive match of `input` against `pattern`.
///
/// ```
/// use memvfs_glob::glob_match;
/// assert!(glob_match("f*.bin", "file.bin"));
/// assert!(glob_match("*.{bin,dat}", "x.dat"));
/// assert!(!glob_match("f*.bin", "wrong.bin"));
/// ```
pub fn glob_match(pattern: &str, input: &str) -> bool {
    glob_match_with(pattern, input, CaseSensitivity::Sensitive)
}

/// Match `input` against `pattern` under the given case policy.
pub fn glob_match_with(pattern: &str, input: &str, case: CaseSensitivity) -> bool {
    let input: Vec<char> = input.chars().collect();
    expand_braces(pattern).iter().any(|alternative| {
        let pattern: Vec<char> = alternative.chars().collect();
        Matcher {
            pattern: &pattern,
            input: &input,
            case,
            calls: Cell::new(0),
        }
        .matches(0, 0)
    })
}

/// Expand `{a,b}` groups into every alternative.
///
/// Unbalanced braces are left alone, and so are braces escaped with `\`.
///
/// ```
/// use memvfs_glob::expand_braces;
/// assert_eq!(expand_braces("x{a,b}y"), vec!["xay", "xby"]);
/// assert_eq!(expand_braces("{abc"), vec!["{abc"]);
/// assert_eq!(expand_braces("\\{a,b}"), vec!["\\{a,b}"]);
/// ```
pub fn expand_braces(pattern: &str) -> Vec<String> {
    let chars: Vec<char> = pattern.chars().collect();

    let mut depth = 0usize;
    let mut open = None;
    let mut group = None;
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 1,
            '{' => {
                if depth == 0 {
                    open = Some(i);
                }
                depth += 1;
            }
            '}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    group = open.map(|start| (start, i));
                    break;
                }
            }
            _ => {}
        }
        i += 1;
    }

    let Some((start, end)) = group else {
        return vec![pattern.to_string()];
    };

    let head: String = chars[..start].iter().collect();
    let tail: String = chars[end + 1..].iter().collect();
    let body: String = chars[start + 1..end].iter().collect();

    split_alternatives(&body)
        .into_iter()
        .flat_map(|alt| expand_braces(&format!("{head}{alt}{tail}")))
        .collect()
}

/// Split a brace body on top-level commas.
fn split_alternatives(body: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;

    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                current.push(c);
                current.extend(chars.next());
            }
            '{' => {
                depth += 1;
                current.push(c);
            }
            '}' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            ',' if depth == 0 => parts.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    parts.push(current);
    parts
}

struct Matcher<'a> {
    pattern: &'a [char],
    input: &'a [char],
    case: CaseSensitivity,
    calls: Cell<usize>,
}

impl Matcher<'_> {
    fn matches(&self, pi: usize, ii: usize) -> bool {
        let calls = self.calls.get() + 1;
        self.calls.set(calls);
        if calls > MAX_MATCH_CALLS {
            return false;
        }

        let Some(&p) = self.pattern.get(pi) else {
            return ii == self.input.len();
        };

        match p {
            '*' => {
                let mut next = pi;
                while self.pattern.get(next) == Some(&'*') {
                    next += 1;
                }
                if next == self.pattern.len() {
                    return true;
                }
                (ii..=self.input.len()).any(|start| self.matches(next, start))
            }
            '?' => ii < self.input.len() && self.matches(pi + 1, ii + 1),
            '[' => {
                let Some(&ch) = self.input.get(ii) else {
                    return false;
                };
                match self.char_class(pi, ch) {
                    Some((true, consumed)) => self.matches(pi + consumed, ii + 1),
                    Some((false, _)) => false,
                    // Unclosed class: the bracket is a literal.
                    None => ch == '[' && self.matches(pi + 1, ii + 1),
                }
            }
            '\\' if pi + 1 < self.pattern.len() => match self.input.get(ii) {
                Some(&ch) if self.case.eq_char(self.pattern[pi + 1], ch) => {
                    self.matches(pi + 2, ii + 1)
                }
                _ => false,
            },
            literal => match self.input.get(ii) {
                Some(&ch) if self.case.eq_char(literal, ch) => self.matches(pi + 1, ii + 1),
                _ => false,
            },
        }
    }

    /// Evaluate the class starting at `self.pattern[start] == '['` against
    /// `ch`. Returns `(matched, chars consumed)`, or `None` when the class is
    /// never closed.
    fn char_class(&self, start: usize, ch: char) -> Option<(bool, usize)> {
        let pattern = self.pattern;
        let mut idx = start + 1;
        let negate = matches!(pattern.get(idx), Some('!') | Some('^'));
        if negate {
            idx += 1;
        }

        // A `]` directly after the opening (or negation) is literal.
        let first = idx;
        let mut matched = false;
        loop {
            let &c = pattern.get(idx)?;
            if c == ']' && idx > first {
                idx += 1;
                break;
            }

            let is_range = pattern.get(idx + 1) == Some(&'-')
                && pattern.get(idx + 2).is_some_and(|&end| end != ']');
            if is_range {
                let end = pattern[idx + 2];
                if self.in_range(c, end, ch) {
                    matched = true;
                }
                idx += 3;
            } else {
                if self.case.eq_char(c, ch) {
                    matched = true;
                }
                idx += 1;
            }
        }

        Some((matched != negate, idx - start))
    }

    fn in_range(&self, lo: char, hi: char, ch: char) -> bool {
        if (lo..=hi).contains(&ch) {
            return true;
        }
        if self.case.is_sensitive() {
            return false;
        }
        ch.to_lowercase()
            .chain(ch.to_uppercase())
            .any(|variant| (lo..=hi).contains(&variant))
    }
}
