//! Pattern watches: glob and directory subscriptions.
//!
//! Each entry fires at most once. Fan-out removes an entry before firing
//! it, so the next `watch` call on the same pattern gets a fresh token.

use dashmap::DashMap;
use memvfs_glob::GlobPath;
use memvfs_types::{CaseSensitivity, ChangeToken, ChangeTrigger};

use crate::paths::PathKey;

#[derive(Debug)]
struct WatchEntry {
    glob: GlobPath,
    trigger: ChangeTrigger,
}

/// Pending pattern subscriptions keyed by their (folded) pattern string.
#[derive(Debug)]
pub struct WatchRegistry {
    case: CaseSensitivity,
    entries: DashMap<PathKey, WatchEntry>,
}

impl WatchRegistry {
    pub fn new(case: CaseSensitivity) -> Self {
        Self {
            case,
            entries: DashMap::new(),
        }
    }

    /// Whether a normalized filter is a pattern rather than an exact path.
    ///
    /// Only `*` is a wildcard in watch filters. `?`, `[` and `{` are
    /// ordinary file name characters.
    pub fn is_pattern(filter: &str) -> bool {
        filter.contains('*') || filter.ends_with('/')
    }

    /// Token for the next mutation matching a pattern filter.
    ///
    /// `dir/` watches every path strictly below `dir`. In other filters `*`
    /// stays within one component and `**` spans any number of them. A
    /// filter that fails to compile yields a token that never fires.
    pub fn watch(&self, filter: &str) -> ChangeToken {
        let key = PathKey::new(filter, self.case);
        if let Some(entry) = self.entries.get(&key) {
            return entry.trigger.token();
        }

        let glob = match self.compile(filter) {
            Ok(glob) => glob,
            Err(e) => {
                tracing::warn!(filter, error = %e, "unusable watch pattern");
                return ChangeToken::never();
            }
        };
        self.entries
            .entry(key)
            .or_insert_with(|| {
                tracing::debug!(filter, "pattern watch registered");
                WatchEntry {
                    glob,
                    trigger: ChangeTrigger::new(),
                }
            })
            .trigger
            .token()
    }

    /// Watch exactly one path, without interpreting metacharacters.
    ///
    /// Shares the one-shot lifecycle of pattern watches. Used by providers
    /// whose exact paths have no slot to hang a trigger on.
    pub fn watch_exact(&self, path: &str) -> ChangeToken {
        let key = PathKey::new(path, self.case);
        self.entries
            .entry(key)
            .or_insert_with(|| WatchEntry {
                glob: GlobPath::literal(path, self.case),
                trigger: ChangeTrigger::new(),
            })
            .trigger
            .token()
    }

    /// Remove and fire every entry matching `path`. Returns how many fired.
    pub fn fire_matching(&self, path: &str) -> usize {
        let matched: Vec<PathKey> = self
            .entries
            .iter()
            .filter(|entry| entry.glob.matches(path))
            .map(|entry| entry.key().clone())
            .collect();

        let mut fired = 0;
        for key in matched {
            // A concurrent fan-out may have taken it already.
            if let Some((pattern, entry)) = self.entries.remove(&key) {
                tracing::trace!(pattern = pattern.as_str(), path, "pattern watch fired");
                entry.trigger.fire();
                fired += 1;
            }
        }
        fired
    }

    /// Number of pending pattern watches.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn compile(&self, filter: &str) -> Result<GlobPath, memvfs_glob::PatternError> {
        match filter.strip_suffix('/') {
            Some(dir) if !dir.contains('*') => {
                Ok(GlobPath::directory(dir.trim_end_matches('/'), self.case))
            }
            Some(dir) => GlobPath::new(
                &format!("{}/**/*", star_pattern(dir.trim_end_matches('/'))),
                self.case,
            ),
            None => GlobPath::new(&star_pattern(filter), self.case),
        }
    }
}

/// Glob source in which only the `*`s of `filter` are wildcards.
fn star_pattern(filter: &str) -> String {
    filter
        .split('*')
        .map(memvfs_glob::escape)
        .collect::<Vec<_>>()
        .join("*")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("**/f*.bin", true)]
    #[case("another/", true)]
    #[case("a?.txt", false)]
    #[case("[ab].txt", false)]
    #[case("{a,b}.txt", false)]
    #[case("another/file.bin", false)]
    #[case("test.txt", false)]
    fn pattern_detection(#[case] filter: &str, #[case] expected: bool) {
        assert_eq!(WatchRegistry::is_pattern(filter), expected);
    }

    #[test]
    fn glob_watch_is_one_shot() {
        let registry = WatchRegistry::new(CaseSensitivity::Insensitive);
        let token = registry.watch("**/f*.bin");
        assert_eq!(registry.fire_matching("x/wrong.bin"), 0);
        assert!(!token.has_changed());

        assert_eq!(registry.fire_matching("x/file.bin"), 1);
        assert!(token.has_changed());
        assert!(registry.is_empty());

        let again = registry.watch("**/f*.bin");
        assert!(!again.has_changed());
        registry.fire_matching("y/FRED.BIN");
        assert!(again.has_changed());
    }

    #[test]
    fn same_pattern_shares_a_token() {
        let registry = WatchRegistry::new(CaseSensitivity::Insensitive);
        let a = registry.watch("Dir/");
        let b = registry.watch("dir/");
        assert_eq!(registry.len(), 1);
        registry.fire_matching("dir/x");
        assert!(a.has_changed() && b.has_changed());
    }

    #[test]
    fn directory_watch_covers_descendants_only() {
        let registry = WatchRegistry::new(CaseSensitivity::Sensitive);
        let token = registry.watch("another/");
        registry.fire_matching("another");
        registry.fire_matching("other/file.bin");
        assert!(!token.has_changed());

        registry.fire_matching("another/child/folder.txt");
        assert!(token.has_changed());
    }

    #[test]
    fn globbed_directory_prefix() {
        let registry = WatchRegistry::new(CaseSensitivity::Sensitive);
        let token = registry.watch("logs-*/");
        registry.fire_matching("logs-2022/app.log");
        assert!(token.has_changed());
    }

    #[test]
    fn exact_watch_ignores_metacharacters() {
        let registry = WatchRegistry::new(CaseSensitivity::Sensitive);
        let token = registry.watch_exact("data/[1].txt");
        registry.fire_matching("data/1.txt");
        assert!(!token.has_changed());
        registry.fire_matching("data/[1].txt");
        assert!(token.has_changed());
    }

    #[test]
    fn other_metacharacters_are_literal_in_patterns() {
        let registry = WatchRegistry::new(CaseSensitivity::Sensitive);
        let token = registry.watch("data[1]/*.{txt}");
        registry.fire_matching("data1/a.txt");
        registry.fire_matching("data[1]/a.txt");
        assert!(!token.has_changed());

        registry.fire_matching("data[1]/a.{txt}");
        assert!(token.has_changed());
    }

    #[test]
    fn overlapping_watches_all_fire() {
        let registry = WatchRegistry::new(CaseSensitivity::Insensitive);
        let dir = registry.watch("another/");
        let bins = registry.watch("**/*.bin");
        let txts = registry.watch("**/*.txt");

        assert_eq!(registry.fire_matching("another/file.bin"), 2);
        assert!(dir.has_changed());
        assert!(bins.has_changed());
        assert!(!txts.has_changed());
    }
}
