//! memvfs-kernel: the memvfs engine.
//!
//! This crate provides:
//!
//! - **Paths**: normalization and case-folded keys
//! - **Entry store**: one slot per path, each with a one-shot change trigger
//! - **Directory synthesis**: listings derived from path prefixes
//! - **Watch registry**: glob and directory subscriptions with fan-out
//! - **VFS**: the memory and disk providers behind one read contract
//! - **Read helpers**: whole-file reads as bytes or text
//! - **Config**: `memvfs.toml` loading

pub mod config;
pub mod directory;
pub mod paths;
pub mod read;
pub mod store;
pub mod vfs;
pub mod watch;

pub use config::VfsConfig;
pub use read::FileRecordExt;
pub use vfs::{
    AsyncWritableFileProvider, FileProvider, MemoryFileProvider, MemoryFileSink,
    PhysicalFileProvider, SyncWritableFileProvider, WritableFileProvider,
    WritablePhysicalFileProvider, write_async, write_text_async,
};

pub use memvfs_types::{
    CaseSensitivity, ChangeToken, ChangeTrigger, DirectoryContents, FileRecord, VfsError,
    VfsResult,
};
