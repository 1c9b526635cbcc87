//! In-memory file provider.
//!
//! Files live in a flat [`EntryStore`]; directories are synthesized from
//! path prefixes and vanish when their last file is deleted. Every
//! mutation fires the path's own token and then every pattern watch that
//! matches it.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use memvfs_types::{
    CaseSensitivity, ChangeToken, DirectoryContents, FileRecord, VfsError, VfsResult,
};
use tokio_util::sync::CancellationToken;

use super::sink::MemoryFileSink;
use super::traits::{
    AsyncWritableFileProvider, FileProvider, SyncWritableFileProvider, WritableFileProvider,
    WriteSink,
};
use crate::config::VfsConfig;
use crate::directory::{directory_record, list_children};
use crate::paths::{file_name, normalize};
use crate::store::{EntryStore, Transition};
use crate::watch::WatchRegistry;

#[derive(Debug)]
struct Inner {
    store: EntryStore,
    watches: WatchRegistry,
}

/// Thread-safe in-memory filesystem.
///
/// Cloning is cheap and clones share state.
///
/// ```
/// use memvfs_kernel::vfs::{FileProvider, MemoryFileProvider, SyncWritableFileProvider};
///
/// let vfs = MemoryFileProvider::new();
/// vfs.write_text("Docs\\Readme.md", "hello", None).unwrap();
/// assert!(vfs.get_file_info("docs/readme.MD").exists());
/// assert!(vfs.get_directory_contents("docs").exists());
/// ```
#[derive(Debug, Clone)]
pub struct MemoryFileProvider {
    inner: Arc<Inner>,
}

impl Default for MemoryFileProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryFileProvider {
    /// Create an empty, case-insensitive filesystem.
    pub fn new() -> Self {
        Self::with_case_sensitivity(CaseSensitivity::default())
    }

    pub fn with_case_sensitivity(case: CaseSensitivity) -> Self {
        Self {
            inner: Arc::new(Inner {
                store: EntryStore::new(case),
                watches: WatchRegistry::new(case),
            }),
        }
    }

    pub fn from_config(config: &VfsConfig) -> Self {
        Self::with_case_sensitivity(config.case_sensitivity)
    }

    pub fn case_sensitivity(&self) -> CaseSensitivity {
        self.inner.store.case_sensitivity()
    }

    /// Current record at `path`. Never fails; see [`FileProvider::get_file_info`].
    pub fn get(&self, path: &str) -> Arc<FileRecord> {
        self.lookup(&normalize(path))
    }

    /// Install `record` at `path`, or delete it with `None`.
    ///
    /// Re-installing the record already present still counts as a change.
    pub fn set(&self, path: &str, record: Option<Arc<FileRecord>>) {
        let normalized = normalize(path);
        let record = record
            .unwrap_or_else(|| Arc::new(FileRecord::not_found(file_name(&normalized))));
        self.change(&normalized, record);
    }

    /// Open a buffered sink for `path`. See [`MemoryFileSink`].
    pub fn create(&self, path: &str) -> MemoryFileSink {
        MemoryFileSink::new(self.clone(), path)
    }

    /// Number of present files.
    pub fn len(&self) -> usize {
        self.inner.store.present_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn put(
        &self,
        path: &str,
        content: impl Into<Arc<[u8]>>,
        modified: Option<DateTime<Utc>>,
    ) -> Arc<FileRecord> {
        let normalized = normalize(path);
        let record = Arc::new(FileRecord::memory(
            file_name(&normalized),
            content,
            modified,
        ));
        self.change(&normalized, record.clone());
        record
    }

    fn change(&self, normalized: &str, record: Arc<FileRecord>) -> Transition {
        let transition = self.inner.store.replace(normalized, record);
        if transition.is_changed() {
            let fired = self.inner.watches.fire_matching(normalized);
            if fired > 0 {
                tracing::debug!(path = normalized, fired, "pattern watches fired");
            }
        }
        transition
    }

    fn lookup(&self, normalized: &str) -> Arc<FileRecord> {
        match self.inner.store.get(normalized) {
            Some(record) if record.exists() => return record,
            _ => {}
        }
        let dir = normalized.trim_end_matches('/');
        match directory_record(&self.inner.store, dir) {
            Some(record) => Arc::new(record),
            None => Arc::new(FileRecord::not_found(file_name(dir))),
        }
    }
}

impl FileProvider for MemoryFileProvider {
    fn get_file_info(&self, path: &str) -> Arc<FileRecord> {
        self.get(path)
    }

    fn get_directory_contents(&self, path: &str) -> DirectoryContents {
        let normalized = normalize(path);
        let children = list_children(&self.inner.store, normalized.trim_end_matches('/'));
        if children.is_empty() {
            DirectoryContents::not_found()
        } else {
            DirectoryContents::new(children)
        }
    }

    fn watch(&self, filter: &str) -> ChangeToken {
        let filter = normalize(filter);
        if WatchRegistry::is_pattern(&filter) {
            self.inner.watches.watch(&filter)
        } else {
            self.inner.store.watch(&filter)
        }
    }

    fn as_sync_writable(&self) -> Option<&dyn SyncWritableFileProvider> {
        Some(self)
    }

    fn as_async_writable(&self) -> Option<&dyn AsyncWritableFileProvider> {
        Some(self)
    }
}

impl WritableFileProvider for MemoryFileProvider {
    fn create(&self, path: &str) -> VfsResult<WriteSink> {
        Ok(Box::new(MemoryFileProvider::create(self, path)))
    }

    fn delete(&self, path: &str) -> VfsResult<()> {
        self.set(path, None);
        Ok(())
    }
}

impl SyncWritableFileProvider for MemoryFileProvider {
    fn write(
        &self,
        path: &str,
        content: &[u8],
        modified: Option<DateTime<Utc>>,
    ) -> VfsResult<Arc<FileRecord>> {
        Ok(self.put(path, content, modified))
    }
}

/// Completes synchronously; the cancellation token is only checked up front.
#[async_trait]
impl AsyncWritableFileProvider for MemoryFileProvider {
    async fn write_async(
        &self,
        path: &str,
        content: &[u8],
        modified: Option<DateTime<Utc>>,
        cancel: &CancellationToken,
    ) -> VfsResult<Arc<FileRecord>> {
        if cancel.is_cancelled() {
            return Err(VfsError::Cancelled);
        }
        Ok(self.put(path, content, modified))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn absent_placeholder_falls_through_to_directory() {
        let vfs = MemoryFileProvider::new();
        let _token = vfs.watch("dir");
        vfs.write_text("dir/inner.txt", "x", None).unwrap();

        let dir = vfs.get("dir");
        assert!(dir.exists());
        assert!(dir.is_directory());
    }

    #[test]
    fn trailing_separator_finds_directory() {
        let vfs = MemoryFileProvider::new();
        vfs.write_text("another/file.bin", "x", None).unwrap();

        let dir = vfs.get("another/");
        assert!(dir.is_directory());
        assert_eq!(dir.name(), "another");
        assert!(vfs.get_directory_contents("/another/").exists());
    }

    #[test]
    fn sink_commits_on_flush_and_drop() {
        let vfs = MemoryFileProvider::new();
        let mut sink = vfs.create("out.txt");
        sink.write_all(b"hello").unwrap();
        assert!(!vfs.get("out.txt").exists());

        sink.flush().unwrap();
        assert_eq!(vfs.get("out.txt").len(), Some(5));

        sink.write_all(b" world").unwrap();
        drop(sink);
        assert_eq!(vfs.get("out.txt").len(), Some(11));
    }

    #[test]
    fn sink_close_returns_record() {
        let vfs = MemoryFileProvider::new();
        let token = vfs.watch("empty.txt");
        let record = vfs.create("empty.txt").close();

        assert!(record.exists());
        assert_eq!(record.len(), Some(0));
        assert!(token.has_changed());
        assert!(Arc::ptr_eq(&record, &vfs.get("empty.txt")));
    }

    #[test]
    fn clones_share_state() {
        let vfs = MemoryFileProvider::new();
        let other = vfs.clone();
        other.write_text("shared.txt", "x", None).unwrap();
        assert_eq!(vfs.len(), 1);
        vfs.delete("shared.txt").unwrap();
        assert!(other.is_empty());
    }

    #[tokio::test]
    async fn cancelled_async_write_changes_nothing() {
        let vfs = MemoryFileProvider::new();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = vfs.write_async("a.txt", b"x", None, &cancel).await;
        assert_eq!(result.unwrap_err(), VfsError::Cancelled);
        assert!(!vfs.get("a.txt").exists());
    }
}
