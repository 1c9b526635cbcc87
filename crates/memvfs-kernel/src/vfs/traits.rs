//! Provider contracts.
//!
//! Every provider satisfies the read contract ([`FileProvider`]). Write
//! support comes as two separate capabilities, sync and async, which a
//! provider may expose independently. Callers that only hold a
//! `&dyn FileProvider` go through [`write_async`], which picks whichever
//! capability is present.

use std::io::Write;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use memvfs_types::{ChangeToken, DirectoryContents, FileRecord, VfsError, VfsResult};
use tokio_util::sync::CancellationToken;

/// Byte sink returned by [`WritableFileProvider::create`].
pub type WriteSink = Box<dyn Write + Send>;

/// Read contract shared by all providers.
///
/// Paths are `/`- or `\`-separated and relative to the provider root.
/// Lookups never fail: a missing path yields [`FileRecord::NotFound`] and a
/// missing directory yields [`DirectoryContents::not_found`].
pub trait FileProvider: Send + Sync {
    /// Record for a file or directory.
    fn get_file_info(&self, path: &str) -> Arc<FileRecord>;

    /// Immediate children of a directory.
    fn get_directory_contents(&self, path: &str) -> DirectoryContents;

    /// One-shot token for the next change matching `filter`.
    ///
    /// A filter containing `*` or ending in `/` is a pattern; anything else
    /// names one exact path. `*` matches within one component and `**`
    /// across components. Filters are normalized like paths, so `\` is a
    /// separator and there is no escape syntax; every other character,
    /// including `?`, `[` and `{`, matches itself.
    fn watch(&self, filter: &str) -> ChangeToken;

    /// The synchronous write capability, if this provider has one.
    fn as_sync_writable(&self) -> Option<&dyn SyncWritableFileProvider> {
        None
    }

    /// The asynchronous write capability, if this provider has one.
    fn as_async_writable(&self) -> Option<&dyn AsyncWritableFileProvider> {
        None
    }

    fn is_writable(&self) -> bool {
        self.as_sync_writable().is_some() || self.as_async_writable().is_some()
    }
}

/// Operations common to both write capabilities.
pub trait WritableFileProvider: FileProvider {
    /// Open a sink that creates or replaces the file at `path`.
    fn create(&self, path: &str) -> VfsResult<WriteSink>;

    /// Remove a file. Removing a file that does not exist is not an error.
    fn delete(&self, path: &str) -> VfsResult<()>;
}

/// Whole-file writes that complete on the calling thread.
pub trait SyncWritableFileProvider: WritableFileProvider {
    /// Create or overwrite a file. `modified` defaults to now.
    fn write(
        &self,
        path: &str,
        content: &[u8],
        modified: Option<DateTime<Utc>>,
    ) -> VfsResult<Arc<FileRecord>>;

    /// Write UTF-8 text.
    fn write_text(
        &self,
        path: &str,
        text: &str,
        modified: Option<DateTime<Utc>>,
    ) -> VfsResult<Arc<FileRecord>> {
        self.write(path, text.as_bytes(), modified)
    }
}

/// Whole-file writes as futures, with cooperative cancellation.
#[async_trait]
pub trait AsyncWritableFileProvider: WritableFileProvider {
    /// Create or overwrite a file. `modified` defaults to now.
    ///
    /// Fails with [`VfsError::Cancelled`] if `cancel` fires first.
    async fn write_async(
        &self,
        path: &str,
        content: &[u8],
        modified: Option<DateTime<Utc>>,
        cancel: &CancellationToken,
    ) -> VfsResult<Arc<FileRecord>>;

    /// Write UTF-8 text.
    async fn write_text_async(
        &self,
        path: &str,
        text: &str,
        modified: Option<DateTime<Utc>>,
        cancel: &CancellationToken,
    ) -> VfsResult<Arc<FileRecord>> {
        self.write_async(path, text.as_bytes(), modified, cancel)
            .await
    }
}

/// Write through whichever capability `provider` exposes, preferring async.
///
/// Fails with [`VfsError::Unsupported`] for read-only providers.
pub async fn write_async(
    provider: &dyn FileProvider,
    path: &str,
    content: &[u8],
    modified: Option<DateTime<Utc>>,
    cancel: &CancellationToken,
) -> VfsResult<Arc<FileRecord>> {
    if let Some(writer) = provider.as_async_writable() {
        return writer.write_async(path, content, modified, cancel).await;
    }
    if let Some(writer) = provider.as_sync_writable() {
        if cancel.is_cancelled() {
            return Err(VfsError::Cancelled);
        }
        return writer.write(path, content, modified);
    }
    Err(VfsError::Unsupported(format!(
        "cannot write {path}: provider has neither sync nor async write support"
    )))
}

/// Text form of [`write_async`].
pub async fn write_text_async(
    provider: &dyn FileProvider,
    path: &str,
    text: &str,
    modified: Option<DateTime<Utc>>,
    cancel: &CancellationToken,
) -> VfsResult<Arc<FileRecord>> {
    write_async(provider, path, text.as_bytes(), modified, cancel).await
}
