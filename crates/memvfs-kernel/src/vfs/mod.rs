//! File providers.
//!
//! Two families share one read contract ([`FileProvider`]):
//!
//! - **MemoryFileProvider**: in-memory files with synthesized directories
//! - **PhysicalFileProvider**: read-only view of a directory on disk
//! - **WritablePhysicalFileProvider**: disk writes over a read-only provider
//!
//! # Design
//!
//! Write support is a capability, not a base class. A provider exposes
//! [`SyncWritableFileProvider`], [`AsyncWritableFileProvider`], both, or
//! neither, and callers holding only `&dyn FileProvider` reach it through
//! [`write_async`]:
//!
//! ```text
//! write_async(provider)
//! ├── as_async_writable() → write_async(...).await
//! ├── as_sync_writable()  → write(...)
//! └── neither             → VfsError::Unsupported
//! ```

mod local;
mod memory;
mod sink;
mod traits;
mod writable_local;

pub use local::PhysicalFileProvider;
pub use memory::MemoryFileProvider;
pub use sink::MemoryFileSink;
pub use traits::{
    AsyncWritableFileProvider, FileProvider, SyncWritableFileProvider, WritableFileProvider,
    WriteSink, write_async, write_text_async,
};
pub use writable_local::WritablePhysicalFileProvider;
