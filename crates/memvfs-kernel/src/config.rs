//! Configuration for memvfs providers.
//!
//! Configuration is loaded from `~/.config/memvfs/memvfs.toml`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use memvfs_types::CaseSensitivity;
use serde::{Deserialize, Serialize};

use crate::vfs::{PhysicalFileProvider, WritablePhysicalFileProvider};

/// Provider configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VfsConfig {
    /// Path comparison policy for new providers.
    #[serde(default)]
    pub case_sensitivity: CaseSensitivity,

    /// Directory backing the physical providers, if any.
    #[serde(default)]
    pub physical_root: Option<PathBuf>,
}

impl VfsConfig {
    /// Load configuration from the default path.
    ///
    /// If the config file doesn't exist, returns default configuration.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Get the default config file path.
    pub fn config_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("", "", "memvfs")
            .context("Could not determine config directory")?;

        Ok(dirs.config_dir().join("memvfs.toml"))
    }

    /// Open a writable disk provider over `physical_root`.
    ///
    /// Reads and watches go through a [`PhysicalFileProvider`] on the same
    /// root, using this configuration's case policy.
    pub fn open_physical(&self) -> Result<WritablePhysicalFileProvider> {
        let root = self
            .physical_root
            .as_deref()
            .context("physical_root is not configured")?;

        let base = PhysicalFileProvider::new(root)
            .with_context(|| format!("Failed to open {}", root.display()))?
            .with_case_sensitivity(self.case_sensitivity);
        WritablePhysicalFileProvider::new(root, std::sync::Arc::new(base))
            .with_context(|| format!("Failed to open {} for writing", root.display()))
    }
}
