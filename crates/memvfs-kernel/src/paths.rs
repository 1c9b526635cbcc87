//! Path normalization and map keys.
//!
//! Every caller-supplied path passes through [`normalize`] before it touches
//! shared state: backslashes become `/` and leading separators are dropped.
//! `.` and `..` are not resolved; they are ordinary names here.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use memvfs_types::{CaseSensitivity, VfsError, VfsResult};

/// Canonical slash-separated form of a caller path.
///
/// ```
/// use memvfs_kernel::paths::normalize;
/// assert_eq!(normalize("\\another\\file.bin"), "another/file.bin");
/// assert_eq!(normalize("/a/b/"), "a/b/");
/// ```
pub fn normalize(path: &str) -> Cow<'_, str> {
    if path.contains('\\') {
        Cow::Owned(path.replace('\\', "/").trim_start_matches('/').to_string())
    } else {
        Cow::Borrowed(path.trim_start_matches('/'))
    }
}

/// Final segment of a normalized path; empty for the root or a trailing `/`.
pub fn file_name(normalized: &str) -> &str {
    normalized.rsplit('/').next().unwrap_or(normalized)
}

/// Number of `/`-delimited segments in a normalized directory path.
/// The root (`""`) has none.
pub(crate) fn segment_count(dir: &str) -> usize {
    if dir.is_empty() { 0 } else { dir.split('/').count() }
}

/// True if resolving `.` and `..` in `path` would climb above its root.
///
/// Both `/` and `\` separate segments; empty and `.` segments are skipped.
pub fn navigates_above_root(path: &str) -> bool {
    let mut depth = 0usize;
    for segment in segments(path) {
        if segment == ".." {
            let Some(up) = depth.checked_sub(1) else {
                return true;
            };
            depth = up;
        } else {
            depth += 1;
        }
    }
    false
}

/// Join `path` onto `root`, resolving `.` and `..` lexically.
///
/// Fails with [`VfsError::OutOfRange`] if the path would leave `root`.
pub fn resolve_under(root: &Path, path: &str) -> VfsResult<PathBuf> {
    if navigates_above_root(path) {
        return Err(VfsError::OutOfRange(path.to_string()));
    }
    let mut resolved = root.to_path_buf();
    for segment in segments(path) {
        if segment == ".." {
            resolved.pop();
        } else {
            resolved.push(segment);
        }
    }
    Ok(resolved)
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split(['/', '\\'])
        .filter(|s| !s.is_empty() && *s != ".")
}

/// A normalized path folded under a case policy.
///
/// Two paths that differ only by separator style, or only by case under
/// [`CaseSensitivity::Insensitive`], produce equal keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathKey(String);

impl PathKey {
    /// Key for an already-normalized path.
    pub fn new(normalized: &str, case: CaseSensitivity) -> Self {
        Self(case.fold(normalized).into_owned())
    }

    /// Normalize and fold in one step.
    pub fn from_raw(path: &str, case: CaseSensitivity) -> Self {
        Self::new(&normalize(path), case)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True if this key lies strictly below `dir` (also a key).
    pub fn is_below(&self, dir: &PathKey) -> bool {
        if dir.0.is_empty() {
            return !self.0.is_empty();
        }
        self.0
            .strip_prefix(dir.0.as_str())
            .is_some_and(|rest| rest.len() > 1 && rest.starts_with('/'))
    }
}
