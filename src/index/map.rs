//! The index aggregate: repo-relative path to [`SourceFile`].
//!
//! Paths are kept in a sorted map, so every iteration (and therefore every
//! rendered document) is in lexicographic path order regardless of the order
//! files were scanned or updated in.

use crate::index::types::{SourceFile, SymbolKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolIndex {
    files: BTreeMap<String, SourceFile>,
}

impl SymbolIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_files(files: BTreeMap<String, SourceFile>) -> Self {
        Self { files }
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn get(&self, path: &str) -> Option<&SourceFile> {
        self.files.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    /// Files in lexicographic path order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SourceFile)> {
        self.files.iter().map(|(p, f)| (p.as_str(), f))
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    /// Total exported symbols across all files, including omitted ones
    pub fn symbol_count(&self) -> usize {
        self.files.values().map(SourceFile::total_symbols).sum()
    }

    /// Number of files whose extraction produced a warning
    pub fn warning_count(&self) -> usize {
        self.files.values().filter(|f| f.warning.is_some()).count()
    }

    pub fn count_by_kind(&self) -> BTreeMap<SymbolKind, usize> {
        let mut counts = BTreeMap::new();
        for file in self.files.values() {
            for symbol in &file.symbols {
                *counts.entry(symbol.kind).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Names exported by more than one file, with the files exporting them.
    ///
    /// Collisions are reported, never resolved: every file keeps its own
    /// entry for the name.
    pub fn collisions(&self) -> BTreeMap<&str, Vec<&str>> {
        let mut owners: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for (path, file) in &self.files {
            for symbol in &file.symbols {
                let paths = owners.entry(symbol.name.as_str()).or_default();
                if paths.last() != Some(&path.as_str()) {
                    paths.push(path.as_str());
                }
            }
        }
        owners.retain(|_, paths| paths.len() > 1);
        owners
    }

    /// Drop every entry (explicit reset back to the empty state)
    pub fn clear(&mut self) {
        self.files.clear();
    }

    pub(crate) fn insert(&mut self, path: String, file: SourceFile) -> Option<SourceFile> {
        self.files.insert(path, file)
    }

    pub(crate) fn remove(&mut self, path: &str) -> Option<SourceFile> {
        self.files.remove(path)
    }
}
