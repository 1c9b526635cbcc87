//! Buffered write sink for the memory provider.

use std::io::{self, Write};
use std::sync::Arc;

use memvfs_types::FileRecord;

use super::memory::MemoryFileProvider;

/// Accumulates bytes for one path and commits them as a whole file.
///
/// Nothing is visible to readers until the first commit. Each
/// [`flush`](Write::flush) commits the entire buffer so far; dropping the
/// sink commits anything written since the last flush.
#[derive(Debug)]
pub struct MemoryFileSink {
    provider: MemoryFileProvider,
    path: String,
    buffer: Vec<u8>,
    dirty: bool,
}

impl MemoryFileSink {
    pub(crate) fn new(provider: MemoryFileProvider, path: &str) -> Self {
        Self {
            provider,
            path: path.to_string(),
            buffer: Vec::new(),
            // An empty create still produces an empty file.
            dirty: true,
        }
    }

    /// Path this sink writes to, as given to `create`.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Commit and return the resulting record.
    pub fn close(mut self) -> Arc<FileRecord> {
        self.dirty = false;
        self.commit()
    }

    fn commit(&self) -> Arc<FileRecord> {
        self.provider.put(&self.path, self.buffer.as_slice(), None)
    }
}

impl Write for MemoryFileSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        self.dirty = true;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.commit();
        self.dirty = false;
        Ok(())
    }
}

impl Drop for MemoryFileSink {
    fn drop(&mut self) {
        if self.dirty {
            self.commit();
        }
    }
}
