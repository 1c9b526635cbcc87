//! Directory synthesis from flat path keys.
//!
//! Directories are never stored. A directory exists while at least one
//! present file lives below it, and its timestamp is the newest among
//! those files.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use memvfs_types::FileRecord;

use crate::paths::file_name;
use crate::store::{Descendant, EntryStore};

/// Immediate children of `dir` (normalized, no trailing `/`; `""` is root).
///
/// Files directly in `dir` are returned as stored. Each distinct first
/// segment with further components below it becomes one synthesized
/// directory record. Order follows the store scan.
pub fn list_children(store: &EntryStore, dir: &str) -> Vec<Arc<FileRecord>> {
    let case = store.case_sensitivity();
    let mut children: Vec<Child> = Vec::new();
    let mut seen: HashMap<String, usize> = HashMap::new();

    for Descendant { relative, record } in store.descendants(dir) {
        let Some((head, _)) = relative.split_once('/') else {
            children.push(Child::File(record));
            continue;
        };
        let modified = record.last_modified();
        let folded = case.fold(head);
        match seen.get(&*folded) {
            Some(&index) => {
                if let Child::Directory { newest, .. } = &mut children[index] {
                    *newest = (*newest).max(modified);
                }
            }
            None => {
                seen.insert(folded.into_owned(), children.len());
                children.push(Child::Directory {
                    name: head.to_string(),
                    newest: modified,
                });
            }
        }
    }

    children.into_iter().map(Child::into_record).collect()
}

/// Synthesized record for `dir` if anything present lives below it.
pub fn directory_record(store: &EntryStore, dir: &str) -> Option<FileRecord> {
    let below = store.descendants(dir);
    if below.is_empty() {
        return None;
    }
    let newest = below
        .iter()
        .filter_map(|d| d.record.last_modified())
        .max()
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    Some(FileRecord::directory(file_name(dir), newest))
}

enum Child {
    File(Arc<FileRecord>),
    Directory {
        name: String,
        newest: Option<DateTime<Utc>>,
    },
}

impl Child {
    fn into_record(self) -> Arc<FileRecord> {
        match self {
            Child::File(record) => record,
            Child::Directory { name, newest } => Arc::new(FileRecord::directory(
                name,
                newest.unwrap_or(DateTime::<Utc>::MIN_UTC),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use memvfs_types::CaseSensitivity;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2022, 1, day, 0, 0, 0).unwrap()
    }

    fn put(store: &EntryStore, path: &str, day: u32) {
        let record = FileRecord::text(file_name(path), path, Some(at(day)));
        store.replace(path, Arc::new(record));
    }

    fn names(records: &[Arc<FileRecord>]) -> Vec<String> {
        let mut names: Vec<String> = records.iter().map(|r| r.name().to_string()).collect();
        names.sort();
        names
    }

    #[test]
    fn folds_subdirectories_once() {
        let store = EntryStore::new(CaseSensitivity::Insensitive);
        put(&store, "test.txt", 1);
        put(&store, "another/file.bin", 2);
        put(&store, "another/child/folder.txt", 5);
        put(&store, "another/child/other.txt", 3);

        let root = list_children(&store, "");
        assert_eq!(names(&root), vec!["another", "test.txt"]);

        let another = list_children(&store, "another");
        assert_eq!(names(&another), vec!["child", "file.bin"]);
        let child = another.iter().find(|r| r.is_directory()).unwrap();
        assert_eq!(child.last_modified(), Some(at(5)));
    }

    #[test]
    fn subdirectory_dedup_respects_case_policy() {
        let store = EntryStore::new(CaseSensitivity::Insensitive);
        put(&store, "Dir/a.txt", 1);
        put(&store, "dir/b.txt", 2);
        // Both keys live under one folded directory name.
        assert_eq!(list_children(&store, "").len(), 1);

        let strict = EntryStore::new(CaseSensitivity::Sensitive);
        put(&strict, "Dir/a.txt", 1);
        put(&strict, "dir/b.txt", 2);
        assert_eq!(names(&list_children(&strict, "")), vec!["Dir", "dir"]);
    }

    #[test]
    fn directory_record_uses_newest_descendant() {
        let store = EntryStore::new(CaseSensitivity::Sensitive);
        put(&store, "a/b/c.txt", 4);
        put(&store, "a/d.txt", 9);

        let dir = directory_record(&store, "a").unwrap();
        assert!(dir.is_directory());
        assert_eq!(dir.name(), "a");
        assert_eq!(dir.last_modified(), Some(at(9)));

        let nested = directory_record(&store, "a/b").unwrap();
        assert_eq!(nested.name(), "b");
        assert_eq!(nested.last_modified(), Some(at(4)));
    }

    #[test]
    fn empty_directory_does_not_exist() {
        let store = EntryStore::new(CaseSensitivity::Sensitive);
        put(&store, "a/only.txt", 1);
        store.replace("a/only.txt", Arc::new(FileRecord::not_found("only.txt")));

        assert!(directory_record(&store, "a").is_none());
        assert!(list_children(&store, "").is_empty());
    }
}
