//! Whole-file reads.

use std::io::{self, Read};

use async_trait::async_trait;
use memvfs_types::{FileRecord, VfsResult};
use tokio::io::AsyncReadExt;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Read a record's entire content.
///
/// Errors are those of [`FileRecord::open_read`]: absent records fail with
/// `NotFound`, directories with `InvalidOperation`.
#[async_trait]
pub trait FileRecordExt {
    fn read_as_bytes(&self) -> VfsResult<Vec<u8>>;

    /// UTF-8 content with any leading byte-order mark removed.
    fn read_as_text(&self) -> VfsResult<String>;

    async fn read_as_bytes_async(&self) -> VfsResult<Vec<u8>>;

    async fn read_as_text_async(&self) -> VfsResult<String>;
}

#[async_trait]
impl FileRecordExt for FileRecord {
    fn read_as_bytes(&self) -> VfsResult<Vec<u8>> {
        if let FileRecord::Memory { content, .. } = self {
            return Ok(content.to_vec());
        }
        let mut buf = Vec::new();
        self.open_read()?.read_to_end(&mut buf)?;
        Ok(buf)
    }

    fn read_as_text(&self) -> VfsResult<String> {
        decode(self.read_as_bytes()?)
    }

    async fn read_as_bytes_async(&self) -> VfsResult<Vec<u8>> {
        if let FileRecord::Memory { content, .. } = self {
            return Ok(content.to_vec());
        }
        let mut buf = Vec::new();
        self.open_read_async().await?.read_to_end(&mut buf).await?;
        Ok(buf)
    }

    async fn read_as_text_async(&self) -> VfsResult<String> {
        decode(self.read_as_bytes_async().await?)
    }
}

fn decode(mut bytes: Vec<u8>) -> VfsResult<String> {
    if bytes.starts_with(UTF8_BOM) {
        bytes.drain(..UTF8_BOM.len());
    }
    String::from_utf8(bytes)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e).into())
}
