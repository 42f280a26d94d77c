//! Incremental, single-file index updates.
//!
//! An update carries the *current* state of exactly one file. Applying it
//! replaces, inserts or removes that one key and nothing else, and applying
//! the same update again is a no-op.

use crate::index::map::SymbolIndex;
use crate::index::types::SourceFile;

/// What happened to the file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileChange {
    /// The file exists with this content record
    Written(SourceFile),
    /// The file no longer exists
    Deleted,
}

/// A change notification for one repo-relative path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpdate {
    pub path: String,
    pub change: FileChange,
}

impl FileUpdate {
    pub fn written(path: impl Into<String>, file: SourceFile) -> Self {
        Self {
            path: path.into(),
            change: FileChange::Written(file),
        }
    }

    pub fn deleted(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            change: FileChange::Deleted,
        }
    }
}

/// Effect an update had on the index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// New path added
    Inserted,
    /// Existing entry replaced with different content
    Replaced,
    /// Entry already matched the update
    Unchanged,
    /// Entry removed
    Removed,
    /// Deletion of a path that was not indexed
    Absent,
}

impl UpdateOutcome {
    /// Whether the rendered document needs to change
    pub fn is_change(&self) -> bool {
        matches!(
            self,
            UpdateOutcome::Inserted | UpdateOutcome::Replaced | UpdateOutcome::Removed
        )
    }
}

impl SymbolIndex {
    /// Apply one file update in place
    pub fn apply(&mut self, update: &FileUpdate) -> UpdateOutcome {
        match &update.change {
            FileChange::Written(file) => match self.get(&update.path) {
                Some(existing) if existing == file => UpdateOutcome::Unchanged,
                Some(_) => {
                    self.insert(update.path.clone(), file.clone());
                    UpdateOutcome::Replaced
                }
                None => {
                    self.insert(update.path.clone(), file.clone());
                    UpdateOutcome::Inserted
                }
            },
            FileChange::Deleted => match self.remove(&update.path) {
                Some(_) => UpdateOutcome::Removed,
                None => UpdateOutcome::Absent,
            },
        }
    }

    /// Functional form: old index + event -> new index
    pub fn applied(mut self, update: &FileUpdate) -> Self {
        self.apply(update);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::builder::build_index;
    use crate::index::types::{ExportedSymbol, SymbolKind};

    fn sample() -> SymbolIndex {
        build_index(vec![
            (
                "store.ts".to_string(),
                SourceFile::new("s1", vec![ExportedSymbol::new("useStore", SymbolKind::Function)]),
            ),
            (
                "utils.ts".to_string(),
                SourceFile::new(
                    "u1",
                    vec![
                        ExportedSymbol::new("add", SymbolKind::Function),
                        ExportedSymbol::new("VERSION", SymbolKind::Const),
                    ],
                ),
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_replace_touches_one_key() {
        let mut index = sample();
        let store_before = index.get("store.ts").cloned();

        let update = FileUpdate::written(
            "utils.ts",
            SourceFile::new("u2", vec![ExportedSymbol::new("VERSION", SymbolKind::Const)]),
        );
        assert_eq!(index.apply(&update), UpdateOutcome::Replaced);

        assert_eq!(index.get("store.ts").cloned(), store_before);
        let names: Vec<_> = index.get("utils.ts").unwrap().symbols.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["VERSION"]);
    }

    #[test]
    fn test_apply_is_idempotent() {
        let update = FileUpdate::written(
            "new.ts",
            SourceFile::new("n1", vec![ExportedSymbol::new("x", SymbolKind::Unknown)]),
        );

        let once = sample().applied(&update);
        let mut twice = once.clone();
        assert_eq!(twice.apply(&update), UpdateOutcome::Unchanged);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_empty_symbols_without_deletion_keeps_entry() {
        let mut index = sample();
        let update = FileUpdate::written("utils.ts", SourceFile::new("u3", Vec::new()));
        index.apply(&update);

        let entry = index.get("utils.ts").unwrap();
        assert!(entry.symbols.is_empty());
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_delete() {
        let mut index = sample();
        assert_eq!(index.apply(&FileUpdate::deleted("utils.ts")), UpdateOutcome::Removed);
        assert_eq!(index.apply(&FileUpdate::deleted("utils.ts")), UpdateOutcome::Absent);
        assert!(!index.contains("utils.ts"));
        assert!(index.contains("store.ts"));
    }

    #[test]
    fn test_outcome_is_change() {
        assert!(UpdateOutcome::Inserted.is_change());
        assert!(UpdateOutcome::Removed.is_change());
        assert!(!UpdateOutcome::Unchanged.is_change());
        assert!(!UpdateOutcome::Absent.is_change());
    }
}
