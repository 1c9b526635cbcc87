//! Disk-backed writes layered over a read-only provider.

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use memvfs_types::{ChangeToken, DirectoryContents, FileRecord, VfsError, VfsResult};
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;

use super::traits::{
    AsyncWritableFileProvider, FileProvider, SyncWritableFileProvider, WritableFileProvider,
    WriteSink,
};
use crate::paths::resolve_under;

/// Writes files under `root` and reads them back through `base`.
///
/// `base` is expected to see the same tree, typically a
/// [`PhysicalFileProvider`](super::PhysicalFileProvider) on the same root.
/// Write paths are resolved lexically; any path whose `..` segments would
/// climb above `root` fails with [`VfsError::OutOfRange`] before the disk
/// is touched.
pub struct WritablePhysicalFileProvider {
    root: PathBuf,
    base: Arc<dyn FileProvider>,
}

impl std::fmt::Debug for WritablePhysicalFileProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WritablePhysicalFileProvider")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl WritablePhysicalFileProvider {
    /// Wrap `base` with write support rooted at `root`.
    ///
    /// Fails with [`VfsError::InvalidOperation`] if `base` can already
    /// write; use it directly instead.
    pub fn new(root: impl Into<PathBuf>, base: Arc<dyn FileProvider>) -> VfsResult<Self> {
        if base.is_writable() {
            return Err(VfsError::InvalidOperation(
                "the base provider is already writable; use it directly instead of wrapping it"
                    .to_string(),
            ));
        }
        Ok(Self {
            root: root.into(),
            base,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Disk path for `path`, with parent directories created.
    fn target(&self, path: &str) -> VfsResult<PathBuf> {
        let target = resolve_under(&self.root, path)?;
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(target)
    }

    async fn write_file(
        &self,
        path: &str,
        content: &[u8],
        modified: Option<DateTime<Utc>>,
    ) -> VfsResult<Arc<FileRecord>> {
        let target = resolve_under(&self.root, path)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file = tokio::fs::File::create(&target).await?;
        file.write_all(content).await?;
        file.flush().await?;
        if let Some(modified) = modified {
            file.into_std().await.set_modified(SystemTime::from(modified))?;
        }

        tracing::trace!(path, bytes = content.len(), "wrote file");
        Ok(self.base.get_file_info(path))
    }
}

impl FileProvider for WritablePhysicalFileProvider {
    fn get_file_info(&self, path: &str) -> Arc<FileRecord> {
        self.base.get_file_info(path)
    }

    fn get_directory_contents(&self, path: &str) -> DirectoryContents {
        self.base.get_directory_contents(path)
    }

    fn watch(&self, filter: &str) -> ChangeToken {
        self.base.watch(filter)
    }

    fn as_sync_writable(&self) -> Option<&dyn SyncWritableFileProvider> {
        Some(self)
    }

    fn as_async_writable(&self) -> Option<&dyn AsyncWritableFileProvider> {
        Some(self)
    }
}

impl WritableFileProvider for WritablePhysicalFileProvider {
    fn create(&self, path: &str) -> VfsResult<WriteSink> {
        let target = self.target(path)?;
        Ok(Box::new(File::create(target)?))
    }

    fn delete(&self, path: &str) -> VfsResult<()> {
        let target = resolve_under(&self.root, path)?;
        match std::fs::remove_file(&target) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl SyncWritableFileProvider for WritablePhysicalFileProvider {
    fn write(
        &self,
        path: &str,
        content: &[u8],
        modified: Option<DateTime<Utc>>,
    ) -> VfsResult<Arc<FileRecord>> {
        let target = self.target(path)?;
        let mut file = File::create(&target)?;
        file.write_all(content)?;
        if let Some(modified) = modified {
            file.set_modified(SystemTime::from(modified))?;
        }

        tracing::trace!(path, bytes = content.len(), "wrote file");
        Ok(self.base.get_file_info(path))
    }
}

#[async_trait]
impl AsyncWritableFileProvider for WritablePhysicalFileProvider {
    async fn write_async(
        &self,
        path: &str,
        content: &[u8],
        modified: Option<DateTime<Utc>>,
        cancel: &CancellationToken,
    ) -> VfsResult<Arc<FileRecord>> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(VfsError::Cancelled),
            result = self.write_file(path, content, modified) => result,
        }
    }
}
