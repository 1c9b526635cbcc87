//! memvfs-types: Pure data types for memvfs.
//!
//! This crate holds the data contract shared by every provider:
//!
//! - **FileRecord**: present file, directory, or known-absent path
//! - **DirectoryContents**: a directory listing
//! - **ChangeToken / ChangeTrigger**: one-shot change notification
//! - **VfsError**: the error taxonomy
//!
//! The provider traits themselves live in memvfs-kernel.

mod change;
mod contents;
mod error;
mod record;

pub use change::{ChangeToken, ChangeTrigger};
pub use contents::DirectoryContents;
pub use error::{VfsError, VfsResult};
pub use memvfs_glob::CaseSensitivity;
pub use record::{AsyncReadStream, FileRecord, ReadStream};
