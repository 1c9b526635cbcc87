//! The entry store: one slot per normalized path.
//!
//! A slot holds the current record for its path plus the trigger that fires
//! on the next transition. Transitions are atomic per key (the map shard is
//! locked for the read-check-replace), so two racing writers to one path
//! leave exactly one record behind and the predecessor trigger fires once.

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use memvfs_types::{CaseSensitivity, ChangeToken, ChangeTrigger, FileRecord};

use crate::paths::{PathKey, file_name, segment_count};

#[derive(Debug)]
struct Slot {
    /// Path as first written; keeps the caller's casing for listings.
    path: String,
    record: Arc<FileRecord>,
    trigger: ChangeTrigger,
}

impl Slot {
    fn new(path: &str, record: Arc<FileRecord>) -> Self {
        Self {
            path: path.to_string(),
            record,
            trigger: ChangeTrigger::new(),
        }
    }
}

/// Outcome of [`EntryStore::replace`].
#[derive(Debug)]
pub enum Transition {
    /// The slot changed; the token observes the *next* transition.
    Changed(ChangeToken),
    /// Absent replaced by absent. Nothing fired. Carries the slot's current
    /// token when a slot exists.
    Unchanged(Option<ChangeToken>),
}

impl Transition {
    pub fn is_changed(&self) -> bool {
        matches!(self, Transition::Changed(_))
    }
}

/// A present record found below a directory prefix.
#[derive(Debug, Clone)]
pub struct Descendant {
    /// Path below the prefix, in stored casing: `file.bin`, `child/folder.txt`.
    pub relative: String,
    pub record: Arc<FileRecord>,
}

/// Thread-safe map from [`PathKey`] to slot.
#[derive(Debug)]
pub struct EntryStore {
    case: CaseSensitivity,
    slots: DashMap<PathKey, Slot>,
}

impl EntryStore {
    pub fn new(case: CaseSensitivity) -> Self {
        Self {
            case,
            slots: DashMap::new(),
        }
    }

    pub fn case_sensitivity(&self) -> CaseSensitivity {
        self.case
    }

    /// Current record for a normalized path, if a slot exists.
    pub fn get(&self, normalized: &str) -> Option<Arc<FileRecord>> {
        self.slots
            .get(&PathKey::new(normalized, self.case))
            .map(|slot| slot.record.clone())
    }

    /// Install `record` at `normalized` and fire the previous trigger.
    ///
    /// Absent-over-absent (including deleting a path that was never
    /// written) is a no-op: no slot is created and nothing fires. Every
    /// other replacement counts, even re-installing the same record.
    pub fn replace(&self, normalized: &str, record: Arc<FileRecord>) -> Transition {
        let key = PathKey::new(normalized, self.case);

        let (token, previous) = match self.slots.entry(key) {
            Entry::Occupied(mut occupied) => {
                let slot = occupied.get_mut();
                if !slot.record.exists() && !record.exists() {
                    return Transition::Unchanged(Some(slot.trigger.token()));
                }
                slot.record = record;
                let previous = std::mem::take(&mut slot.trigger);
                (slot.trigger.token(), Some(previous))
            }
            Entry::Vacant(vacant) => {
                if !record.exists() {
                    return Transition::Unchanged(None);
                }
                let slot = vacant.insert(Slot::new(normalized, record));
                (slot.trigger.token(), None)
            }
        };

        // Shard lock is released; observers of the old trigger see the new record.
        if let Some(previous) = previous {
            previous.fire();
        }
        tracing::trace!(path = normalized, "slot transition");
        Transition::Changed(token)
    }

    /// Token for the next transition of an exact path.
    ///
    /// A path with no slot gets an absent placeholder so a later write has
    /// something to fire. Creating the placeholder is not a transition.
    pub fn watch(&self, normalized: &str) -> ChangeToken {
        let key = PathKey::new(normalized, self.case);
        self.slots
            .entry(key)
            .or_insert_with(|| {
                tracing::trace!(path = normalized, "absent placeholder for watch");
                Slot::new(
                    normalized,
                    Arc::new(FileRecord::not_found(file_name(normalized))),
                )
            })
            .trigger
            .token()
    }

    /// Snapshot of present records strictly below `dir` (a normalized path
    /// without trailing separator; `""` is the root).
    pub fn descendants(&self, dir: &str) -> Vec<Descendant> {
        let prefix = PathKey::new(dir, self.case);
        let skip = segment_count(dir);

        self.slots
            .iter()
            .filter(|slot| slot.record.exists() && slot.key().is_below(&prefix))
            .filter_map(|slot| {
                let relative = if skip == 0 {
                    slot.path.as_str()
                } else {
                    slot.path.splitn(skip + 1, '/').nth(skip)?
                };
                Some(Descendant {
                    relative: relative.to_string(),
                    record: slot.record.clone(),
                })
            })
            .collect()
    }

    /// Number of slots holding present records.
    pub fn present_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.record.exists()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str) -> Arc<FileRecord> {
        Arc::new(FileRecord::text(name, "test", None))
    }

    fn absent(name: &str) -> Arc<FileRecord> {
        Arc::new(FileRecord::not_found(name))
    }

    #[test]
    fn replace_fires_previous_token() {
        let store = EntryStore::new(CaseSensitivity::Insensitive);
        let Transition::Changed(first) = store.replace("a.txt", file("a.txt")) else {
            panic!("create must be a transition");
        };
        assert!(!first.has_changed());

        assert!(store.replace("A.TXT", file("a.txt")).is_changed());
        assert!(first.has_changed());
    }

    #[test]
    fn deleting_unknown_path_creates_nothing() {
        let store = EntryStore::new(CaseSensitivity::Insensitive);
        assert!(matches!(
            store.replace("ghost", absent("ghost")),
            Transition::Unchanged(None)
        ));
        assert!(store.get("ghost").is_none());
    }

    #[test]
    fn placeholder_then_absent_is_noop() {
        let store = EntryStore::new(CaseSensitivity::Insensitive);
        let token = store.watch("f.bin");
        assert!(matches!(
            store.get("f.bin").as_deref(),
            Some(FileRecord::NotFound { name }) if name == "f.bin"
        ));

        assert!(!store.replace("f.bin", absent("f.bin")).is_changed());
        assert!(!token.has_changed());

        assert!(store.replace("f.bin", file("f.bin")).is_changed());
        assert!(token.has_changed());
    }

    #[test]
    fn same_record_reassignment_is_a_transition() {
        let store = EntryStore::new(CaseSensitivity::Insensitive);
        let record = file("test.txt");
        store.replace("test.txt", record.clone());
        let token = store.watch("test.txt");

        assert!(store.replace("test.txt", record).is_changed());
        assert!(token.has_changed());
    }

    #[test]
    fn first_writer_casing_is_kept() {
        let store = EntryStore::new(CaseSensitivity::Insensitive);
        store.replace("Another/File.bin", file("File.bin"));
        store.replace("ANOTher/fILE.biN", file("fILE.biN"));

        let below = store.descendants("another");
        assert_eq!(below.len(), 1);
        assert_eq!(below[0].relative, "File.bin");
        assert_eq!(below[0].record.name(), "fILE.biN");
    }

    #[test]
    fn descendants_skip_absent_and_outside() {
        let store = EntryStore::new(CaseSensitivity::Sensitive);
        store.replace("dir/a.txt", file("a.txt"));
        store.replace("dir/sub/b.txt", file("b.txt"));
        store.replace("dirx/c.txt", file("c.txt"));
        store.watch("dir/pending.txt");

        let mut relative: Vec<String> = store
            .descendants("dir")
            .into_iter()
            .map(|d| d.relative)
            .collect();
        relative.sort();
        assert_eq!(relative, vec!["a.txt", "sub/b.txt"]);
        assert_eq!(store.descendants("").len(), 3);
        assert_eq!(store.present_count(), 3);
    }
}
