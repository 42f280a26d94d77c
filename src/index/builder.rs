use crate::error::{MapError, MapResult};
use crate::index::map::SymbolIndex;
use crate::index::types::SourceFile;
use std::collections::BTreeMap;

/// Assembles a fresh [`SymbolIndex`] from one full-scan batch
#[derive(Debug, Default)]
pub struct IndexBuilder {
    entries: Vec<(String, SourceFile)>,
}

impl IndexBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    pub fn add(&mut self, path: impl Into<String>, file: SourceFile) -> &mut Self {
        self.entries.push((path.into(), file));
        self
    }

    /// Build the index. A path that appears twice aborts the whole batch.
    pub fn build(self) -> MapResult<SymbolIndex> {
        let mut files = BTreeMap::new();
        for (path, file) in self.entries {
            if files.contains_key(&path) {
                return Err(MapError::DuplicatePath(path));
            }
            files.insert(path, file);
        }
        Ok(SymbolIndex::from_files(files))
    }
}

/// Build an index from (path, file) pairs
pub fn build_index<I>(batch: I) -> MapResult<SymbolIndex>
where
    I: IntoIterator<Item = (String, SourceFile)>,
{
    let mut builder = IndexBuilder::new();
    for (path, file) in batch {
        builder.add(path, file);
    }
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::types::{ExportedSymbol, SymbolKind};

    #[test]
    fn test_build_sorts_paths_and_keeps_symbol_order() {
        let utils = SourceFile::new(
            "1",
            vec![
                ExportedSymbol::new("add", SymbolKind::Function),
                ExportedSymbol::new("VERSION", SymbolKind::Const),
            ],
        );
        let store = SourceFile::new("2", vec![ExportedSymbol::new("useStore", SymbolKind::Function)]);

        let index = build_index(vec![
            ("utils.ts".to_string(), utils.clone()),
            ("store.ts".to_string(), store),
        ])
        .unwrap();

        let paths: Vec<_> = index.paths().collect();
        assert_eq!(paths, vec!["store.ts", "utils.ts"]);
        assert_eq!(index.get("utils.ts"), Some(&utils));
    }

    #[test]
    fn test_duplicate_path_is_fatal() {
        let mut builder = IndexBuilder::new();
        builder
            .add("a.ts", SourceFile::default())
            .add("b.ts", SourceFile::default())
            .add("a.ts", SourceFile::default());

        match builder.build() {
            Err(MapError::DuplicatePath(path)) => assert_eq!(path, "a.ts"),
            other => panic!("expected duplicate path error, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_batch() {
        let index = IndexBuilder::new().build().unwrap();
        assert!(index.is_empty());
    }
}
