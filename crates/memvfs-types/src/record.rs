//! File records: the unified metadata type returned by every lookup.
//!
//! A lookup never yields "nothing": a path that does not exist is reported
//! as [`FileRecord::NotFound`], carrying the final path segment as its name.

use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::io::AsyncRead;

use crate::error::{VfsError, VfsResult};

/// Boxed synchronous byte source returned by [`FileRecord::open_read`].
pub type ReadStream = Box<dyn Read + Send>;

/// Boxed asynchronous byte source returned by [`FileRecord::open_read_async`].
pub type AsyncReadStream = Pin<Box<dyn AsyncRead + Send>>;

/// A file, directory, or known-absent path.
///
/// Records are immutable; a write replaces the record wholesale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileRecord {
    /// File content held in memory.
    Memory {
        name: String,
        content: Arc<[u8]>,
        modified: DateTime<Utc>,
    },
    /// A file on disk; content is read from `path` on demand.
    Physical {
        name: String,
        path: PathBuf,
        len: u64,
        modified: DateTime<Utc>,
    },
    /// A directory. In-memory directories are synthesized from their
    /// descendants and `modified` is the newest descendant stamp.
    Directory {
        name: String,
        path: Option<PathBuf>,
        modified: DateTime<Utc>,
    },
    /// Known not to exist.
    NotFound { name: String },
}

impl FileRecord {
    /// In-memory file. `modified` defaults to now.
    pub fn memory(
        name: impl Into<String>,
        content: impl Into<Arc<[u8]>>,
        modified: Option<DateTime<Utc>>,
    ) -> Self {
        FileRecord::Memory {
            name: name.into(),
            content: content.into(),
            modified: modified.unwrap_or_else(Utc::now),
        }
    }

    /// In-memory file holding UTF-8 text.
    pub fn text(name: impl Into<String>, text: &str, modified: Option<DateTime<Utc>>) -> Self {
        Self::memory(name, text.as_bytes(), modified)
    }

    pub fn not_found(name: impl Into<String>) -> Self {
        FileRecord::NotFound { name: name.into() }
    }

    /// Synthesized (pathless) directory.
    pub fn directory(name: impl Into<String>, modified: DateTime<Utc>) -> Self {
        FileRecord::Directory {
            name: name.into(),
            path: None,
            modified,
        }
    }

    /// File or directory name, without any parent path.
    pub fn name(&self) -> &str {
        match self {
            FileRecord::Memory { name, .. }
            | FileRecord::Physical { name, .. }
            | FileRecord::Directory { name, .. }
            | FileRecord::NotFound { name } => name,
        }
    }

    pub fn exists(&self) -> bool {
        !matches!(self, FileRecord::NotFound { .. })
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, FileRecord::Directory { .. })
    }

    /// Content length in bytes. `None` for directories and absent records.
    pub fn len(&self) -> Option<u64> {
        match self {
            FileRecord::Memory { content, .. } => Some(content.len() as u64),
            FileRecord::Physical { len, .. } => Some(*len),
            FileRecord::Directory { .. } | FileRecord::NotFound { .. } => None,
        }
    }

    pub fn last_modified(&self) -> Option<DateTime<Utc>> {
        match self {
            FileRecord::Memory { modified, .. }
            | FileRecord::Physical { modified, .. }
            | FileRecord::Directory { modified, .. } => Some(*modified),
            FileRecord::NotFound { .. } => None,
        }
    }

    /// Backing path on disk, if there is one.
    pub fn physical_path(&self) -> Option<&Path> {
        match self {
            FileRecord::Physical { path, .. } => Some(path),
            FileRecord::Directory { path, .. } => path.as_deref(),
            FileRecord::Memory { .. } | FileRecord::NotFound { .. } => None,
        }
    }

    /// Open the content for reading.
    ///
    /// Fails with [`VfsError::NotFound`] for absent records and
    /// [`VfsError::InvalidOperation`] for directories.
    pub fn open_read(&self) -> VfsResult<ReadStream> {
        match self {
            FileRecord::Memory { content, .. } => Ok(Box::new(io::Cursor::new(content.clone()))),
            FileRecord::Physical { path, .. } => Ok(Box::new(std::fs::File::open(path)?)),
            FileRecord::Directory { name, .. } => Err(VfsError::InvalidOperation(format!(
                "cannot read directory {name} as a stream"
            ))),
            FileRecord::NotFound { name } => Err(VfsError::NotFound(name.clone())),
        }
    }

    /// Async counterpart of [`FileRecord::open_read`].
    pub async fn open_read_async(&self) -> VfsResult<AsyncReadStream> {
        match self {
            FileRecord::Memory { content, .. } => Ok(Box::pin(io::Cursor::new(content.clone()))),
            FileRecord::Physical { path, .. } => {
                Ok(Box::pin(tokio::fs::File::open(path).await?))
            }
            FileRecord::Directory { name, .. } => Err(VfsError::InvalidOperation(format!(
                "cannot read directory {name} as a stream"
            ))),
            FileRecord::NotFound { name } => Err(VfsError::NotFound(name.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn memory_record_metadata() {
        let stamp = Utc.with_ymd_and_hms(2021, 12, 25, 12, 34, 56).unwrap();
        let record = FileRecord::text("test.txt", "hello world", Some(stamp));

        assert_eq!(record.name(), "test.txt");
        assert!(record.exists());
        assert!(!record.is_directory());
        assert_eq!(record.len(), Some(11));
        assert_eq!(record.last_modified(), Some(stamp));
        assert_eq!(record.physical_path(), None);
    }

    #[test]
    fn memory_record_defaults_to_now() {
        let record = FileRecord::memory("f.bin", vec![1u8, 2, 3], None);
        let age = Utc::now() - record.last_modified().unwrap();
        assert!(age.num_seconds().abs() < 5);
    }

    #[test]
    fn reading_memory_content() {
        let record = FileRecord::memory("file.bin", vec![1u8, 2, 3, 4, 5], None);
        let mut buf = Vec::new();
        record.open_read().unwrap().read_to_end(&mut buf).unwrap();
        assert_eq!(buf, [1, 2, 3, 4, 5]);
    }

    #[test]
    fn absent_record_is_not_readable() {
        let record = FileRecord::not_found("test.txt");
        assert!(!record.exists());
        assert_eq!(record.len(), None);
        assert!(matches!(record.open_read(), Err(VfsError::NotFound(n)) if n == "test.txt"));
    }

    #[test]
    fn directory_is_not_readable() {
        let record = FileRecord::directory("another", Utc::now());
        assert!(record.exists());
        assert!(record.is_directory());
        assert_eq!(record.len(), None);
        assert!(matches!(record.open_read(), Err(VfsError::InvalidOperation(_))));
    }

    #[tokio::test]
    async fn reading_memory_content_async() {
        use tokio::io::AsyncReadExt;

        let record = FileRecord::text("a.txt", "async", None);
        let mut buf = String::new();
        record
            .open_read_async()
            .await
            .unwrap()
            .read_to_string(&mut buf)
            .await
            .unwrap();
        assert_eq!(buf, "async");

        let missing = FileRecord::not_found("gone");
        assert!(matches!(
            missing.open_read_async().await,
            Err(VfsError::NotFound(_))
        ));
    }
}
