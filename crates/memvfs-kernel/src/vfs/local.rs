//! Read-only provider over a directory on disk.
//!
//! Change notification uses `notify`: the first `watch` call starts one
//! recursive watcher on the root, and every reported path is fanned out
//! through a [`WatchRegistry`] exactly like memory-provider mutations.

use std::fmt;
use std::fs::Metadata;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use memvfs_types::{CaseSensitivity, ChangeToken, DirectoryContents, FileRecord, VfsResult};
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use super::traits::FileProvider;
use crate::paths::{file_name, normalize, resolve_under};
use crate::watch::WatchRegistry;

enum WatcherState {
    Idle,
    Running(RecommendedWatcher),
    Unavailable,
}

/// Read-only view of a directory tree.
///
/// All paths are relative to `root`. Paths that would leave the root, by
/// `..` or through a symlink, read as absent.
pub struct PhysicalFileProvider {
    root: PathBuf,
    case: CaseSensitivity,
    watches: Arc<WatchRegistry>,
    watcher: Mutex<WatcherState>,
}

impl fmt::Debug for PhysicalFileProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhysicalFileProvider")
            .field("root", &self.root)
            .field("case", &self.case)
            .finish_non_exhaustive()
    }
}

impl PhysicalFileProvider {
    /// Open `root`, which must be an existing directory.
    pub fn new(root: impl AsRef<Path>) -> VfsResult<Self> {
        let root = root.as_ref().canonicalize()?;
        Ok(Self {
            root,
            case: CaseSensitivity::Sensitive,
            watches: Arc::new(WatchRegistry::new(CaseSensitivity::Sensitive)),
            watcher: Mutex::new(WatcherState::Idle),
        })
    }

    /// Set the policy for matching watch filters against changed paths.
    pub fn with_case_sensitivity(mut self, case: CaseSensitivity) -> Self {
        self.case = case;
        self.watches = Arc::new(WatchRegistry::new(case));
        self
    }

    /// Canonical root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve to an existing path under the root, following symlinks.
    fn locate(&self, path: &str) -> Option<PathBuf> {
        let full = resolve_under(&self.root, path).ok()?;
        let canonical = full.canonicalize().ok()?;
        canonical.starts_with(&self.root).then_some(canonical)
    }

    /// Start the recursive watcher if it is not running yet.
    fn ensure_watching(&self) -> bool {
        let mut state = self
            .watcher
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let WatcherState::Idle = *state {
            *state = match self.start_watcher() {
                Ok(watcher) => {
                    tracing::debug!(root = %self.root.display(), "disk watcher started");
                    WatcherState::Running(watcher)
                }
                Err(e) => {
                    tracing::warn!(root = %self.root.display(), error = %e, "Failed to create file watcher");
                    WatcherState::Unavailable
                }
            };
        }
        matches!(*state, WatcherState::Running(_))
    }

    fn start_watcher(&self) -> notify::Result<RecommendedWatcher> {
        let registry = Arc::clone(&self.watches);
        let root = self.root.clone();

        let mut watcher =
            notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
                match res {
                    Ok(event) => {
                        if matches!(event.kind, EventKind::Access(_)) {
                            return;
                        }
                        for path in &event.paths {
                            if let Some(key) = relative_key(&root, path) {
                                registry.fire_matching(&key);
                            }
                        }
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "File watcher error");
                    }
                }
            })?;
        watcher.watch(&self.root, RecursiveMode::Recursive)?;
        Ok(watcher)
    }
}

impl FileProvider for PhysicalFileProvider {
    fn get_file_info(&self, path: &str) -> Arc<FileRecord> {
        let normalized = normalize(path);
        let name = file_name(normalized.trim_end_matches('/'));
        let record = self
            .locate(&normalized)
            .and_then(|full| {
                let meta = std::fs::metadata(&full).ok()?;
                Some(disk_record(name.to_string(), full, &meta))
            })
            .unwrap_or_else(|| FileRecord::not_found(name));
        Arc::new(record)
    }

    fn get_directory_contents(&self, path: &str) -> DirectoryContents {
        let Some(dir) = self.locate(&normalize(path)) else {
            return DirectoryContents::not_found();
        };
        let Ok(read_dir) = std::fs::read_dir(&dir) else {
            return DirectoryContents::not_found();
        };

        let mut entries: Vec<Arc<FileRecord>> = read_dir
            .filter_map(Result::ok)
            .filter_map(|entry| {
                let meta = entry.metadata().ok()?;
                let name = entry.file_name().to_string_lossy().into_owned();
                Some(Arc::new(disk_record(name, entry.path(), &meta)))
            })
            .collect();
        entries.sort_by(|a, b| a.name().cmp(b.name()));
        DirectoryContents::new(entries)
    }

    fn watch(&self, filter: &str) -> ChangeToken {
        if !self.ensure_watching() {
            return ChangeToken::never();
        }
        let filter = normalize(filter);
        if WatchRegistry::is_pattern(&filter) {
            self.watches.watch(&filter)
        } else {
            self.watches.watch_exact(&filter)
        }
    }
}

fn disk_record(name: String, path: PathBuf, meta: &Metadata) -> FileRecord {
    let modified = meta
        .modified()
        .map(DateTime::<Utc>::from)
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    if meta.is_dir() {
        FileRecord::Directory {
            name,
            path: Some(path),
            modified,
        }
    } else {
        FileRecord::Physical {
            name,
            path,
            len: meta.len(),
            modified,
        }
    }
}

/// Root-relative `/`-separated key for a path reported by the watcher.
fn relative_key(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<_> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect();
    (!parts.is_empty()).then(|| parts.join("/"))
}
