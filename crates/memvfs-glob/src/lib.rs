//! memvfs-glob: glob matching for watch patterns.
//!
//! Provides:
//! - **glob_match**: character-level glob matching with brace expansion
//! - **GlobPath**: `/`-aware matching with `**` (globstar) support
//! - **CaseSensitivity**: the case policy shared with path keys
//!
//! Nothing here touches a filesystem; patterns are matched against
//! normalized path strings.

mod case;
pub mod glob;
mod glob_path;

pub use case::CaseSensitivity;
pub use glob::{contains_glob, escape, expand_braces, glob_match, glob_match_with};
pub use glob_path::{GlobPath, PatternError};
