//! Directory listings.

use std::sync::Arc;

use crate::record::FileRecord;

/// The immediate children of a directory.
///
/// A directory that does not exist lists as empty with `exists() == false`.
/// Entry order is unspecified; sort if you need a stable order.
#[derive(Debug, Clone, Default)]
pub struct DirectoryContents {
    exists: bool,
    entries: Vec<Arc<FileRecord>>,
}

impl DirectoryContents {
    /// A listing of an existing directory.
    pub fn new(entries: Vec<Arc<FileRecord>>) -> Self {
        Self {
            exists: true,
            entries,
        }
    }

    pub fn not_found() -> Self {
        Self::default()
    }

    pub fn exists(&self) -> bool {
        self.exists
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Arc<FileRecord>> {
        self.entries.iter()
    }

    /// Entry names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.iter().map(|e| e.name()).collect();
        names.sort_unstable();
        names
    }
}

impl IntoIterator for DirectoryContents {
    type Item = Arc<FileRecord>;
    type IntoIter = std::vec::IntoIter<Arc<FileRecord>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a DirectoryContents {
    type Item = &'a Arc<FileRecord>;
    type IntoIter = std::slice::Iter<'a, Arc<FileRecord>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
