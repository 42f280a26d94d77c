//! Markdown rendering of a [`SymbolIndex`].
//!
//! ```text
//! # Codebase Map
//!
//! 2 files, 3 exported symbols.
//!
//! ## store.ts
//! - function useStore()
//!
//! ## utils.ts
//! - function add(a, b)
//! - const VERSION
//! ```
//!
//! The output is a pure function of the index: sections follow the index's
//! path order and symbols keep extraction order, so an unchanged index
//! always renders to identical bytes.

use crate::index::types::SourceFile;
use crate::index::SymbolIndex;
use std::collections::BTreeMap;
use std::fmt::Write;

pub const TITLE: &str = "# Codebase Map";

/// Render the whole document
pub fn render(index: &SymbolIndex) -> String {
    let mut out = header(index.len(), index.symbol_count());
    for (path, file) in index.iter() {
        out.push('\n');
        out.push_str(&render_section(path, file));
    }
    out
}

/// Render one file section: heading plus one line per symbol
pub fn render_section(path: &str, file: &SourceFile) -> String {
    let mut out = format!("## {path}\n");

    if let Some(warning) = &file.warning {
        let _ = writeln!(out, "- (not indexed: {warning})");
        return out;
    }
    if file.symbols.is_empty() && file.omitted == 0 {
        out.push_str("- (no exports)\n");
        return out;
    }

    for symbol in &file.symbols {
        let _ = writeln!(
            out,
            "- {} {}{}",
            symbol.kind,
            symbol.name,
            symbol.signature.as_deref().unwrap_or_default()
        );
    }
    if file.omitted > 0 {
        let _ = writeln!(out, "- ... {} more", file.omitted);
    }
    out
}

fn header(files: usize, symbols: usize) -> String {
    format!(
        "{TITLE}\n\n{}, {}.\n",
        plural(files, "file", "files"),
        plural(symbols, "exported symbol", "exported symbols")
    )
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Section {
    text: String,
    symbols: usize,
}

/// Rendered sections keyed by path.
///
/// After an update to one file only that file's section is re-rendered;
/// [`SectionCache::document`] then reassembles the document from cached
/// text. The result is byte-identical to [`render`] on the same index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionCache {
    sections: BTreeMap<String, Section>,
}

impl SectionCache {
    pub fn from_index(index: &SymbolIndex) -> Self {
        let sections = index
            .iter()
            .map(|(path, file)| (path.to_string(), section(path, file)))
            .collect();
        Self { sections }
    }

    /// Re-render the section of `path` from the index, dropping it if the
    /// path is no longer indexed
    pub fn refresh(&mut self, index: &SymbolIndex, path: &str) {
        match index.get(path) {
            Some(file) => {
                self.sections.insert(path.to_string(), section(path, file));
            }
            None => {
                self.sections.remove(path);
            }
        }
    }

    pub fn section(&self, path: &str) -> Option<&str> {
        self.sections.get(path).map(|s| s.text.as_str())
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn document(&self) -> String {
        let symbols = self.sections.values().map(|s| s.symbols).sum();
        let mut out = header(self.sections.len(), symbols);
        for section in self.sections.values() {
            out.push('\n');
            out.push_str(&section.text);
        }
        out
    }
}

fn section(path: &str, file: &SourceFile) -> Section {
    Section {
        text: render_section(path, file),
        symbols: file.total_symbols(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::types::{ExportedSymbol, SymbolKind};
    use crate::index::{build_index, FileUpdate};

    fn utils_ts(symbols: Vec<ExportedSymbol>) -> SourceFile {
        SourceFile::new("u", symbols)
    }

    fn scenario() -> SymbolIndex {
        build_index(vec![
            (
                "utils.ts".to_string(),
                utils_ts(vec![
                    ExportedSymbol::new("add", SymbolKind::Function)
                        .with_signature(Some("(a, b)".into())),
                    ExportedSymbol::new("VERSION", SymbolKind::Const),
                ]),
            ),
            (
                "store.ts".to_string(),
                SourceFile::new(
                    "s",
                    vec![ExportedSymbol::new("useStore", SymbolKind::Function)
                        .with_signature(Some("()".into()))],
                ),
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_render_scenario() {
        let doc = render(&scenario());
        assert_eq!(
            doc,
            "# Codebase Map\n\
             \n\
             2 files, 3 exported symbols.\n\
             \n\
             ## store.ts\n\
             - function useStore()\n\
             \n\
             ## utils.ts\n\
             - function add(a, b)\n\
             - const VERSION\n"
        );
    }

    #[test]
    fn test_render_empty_index() {
        assert_eq!(
            render(&SymbolIndex::new()),
            "# Codebase Map\n\n0 files, 0 exported symbols.\n"
        );
    }

    #[test]
    fn test_render_placeholders() {
        let mut warned = SourceFile::new("w", Vec::new());
        warned.warning = Some("binary content".into());
        assert_eq!(
            render_section("img.ts", &warned),
            "## img.ts\n- (not indexed: binary content)\n"
        );

        assert_eq!(
            render_section("empty.ts", &SourceFile::new("e", Vec::new())),
            "## empty.ts\n- (no exports)\n"
        );

        let mut capped = SourceFile::new("c", vec![ExportedSymbol::new("a", SymbolKind::Type)]);
        capped.omitted = 4;
        assert_eq!(
            render_section("big.ts", &capped),
            "## big.ts\n- type a\n- ... 4 more\n"
        );
    }

    #[test]
    fn test_singular_counts() {
        let index = build_index(vec![(
            "one.rs".to_string(),
            SourceFile::new("o", vec![ExportedSymbol::new("f", SymbolKind::Function)]),
        )])
        .unwrap();
        assert!(render(&index).contains("1 file, 1 exported symbol.\n"));
    }

    #[test]
    fn test_cache_matches_full_render_after_updates() {
        let mut index = scenario();
        let mut cache = SectionCache::from_index(&index);
        assert_eq!(cache.document(), render(&index));

        let updates = [
            FileUpdate::written(
                "utils.ts",
                utils_ts(vec![ExportedSymbol::new("VERSION", SymbolKind::Const)]),
            ),
            FileUpdate::written("a/new.ts", SourceFile::new("n", Vec::new())),
            FileUpdate::deleted("store.ts"),
        ];
        for update in &updates {
            index.apply(update);
            cache.refresh(&index, &update.path);
            assert_eq!(cache.document(), render(&index));
        }
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_update_leaves_other_sections_untouched() {
        let mut index = scenario();
        let mut cache = SectionCache::from_index(&index);
        let store_before = cache.section("store.ts").map(str::to_string);

        index.apply(&FileUpdate::written(
            "utils.ts",
            utils_ts(vec![ExportedSymbol::new("VERSION", SymbolKind::Const)]),
        ));
        cache.refresh(&index, "utils.ts");

        assert_eq!(cache.section("store.ts").map(str::to_string), store_before);
        assert_eq!(cache.section("utils.ts"), Some("## utils.ts\n- const VERSION\n"));
    }
}
