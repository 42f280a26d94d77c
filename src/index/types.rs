use crate::index::map::SymbolIndex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Version of the persisted state format
pub const STATE_VERSION: u32 = 1;

/// Kind tag of an exported symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    Function,
    Const,
    Class,
    Type,
    Unknown,
}

impl SymbolKind {
    pub const ALL: [SymbolKind; 5] = [
        SymbolKind::Function,
        SymbolKind::Const,
        SymbolKind::Class,
        SymbolKind::Type,
        SymbolKind::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolKind::Function => "function",
            SymbolKind::Const => "const",
            SymbolKind::Class => "class",
            SymbolKind::Type => "type",
            SymbolKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A publicly visible declaration of a source file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedSymbol {
    pub name: String,
    pub kind: SymbolKind,
    /// Declaration text following the name, collapsed to one line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

impl ExportedSymbol {
    pub fn new(name: impl Into<String>, kind: SymbolKind) -> Self {
        Self {
            name: name.into(),
            kind,
            signature: None,
        }
    }

    pub fn with_signature(mut self, signature: Option<String>) -> Self {
        self.signature = signature;
        self
    }
}

/// Index record of one source file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    /// BLAKE3 digest of the content at the time it was indexed
    pub fingerprint: String,
    pub symbols: Vec<ExportedSymbol>,
    /// Symbols dropped by the per-file cap
    #[serde(default, skip_serializing_if = "is_zero")]
    pub omitted: usize,
    /// Extraction warning, if extraction failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

fn is_zero(n: &usize) -> bool {
    *n == 0
}

impl SourceFile {
    pub fn new(fingerprint: impl Into<String>, symbols: Vec<ExportedSymbol>) -> Self {
        Self {
            fingerprint: fingerprint.into(),
            symbols,
            omitted: 0,
            warning: None,
        }
    }

    /// Total number of exported symbols, including omitted ones
    pub fn total_symbols(&self) -> usize {
        self.symbols.len() + self.omitted
    }
}

/// Source language, detected from the file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Language {
    #[default]
    Unknown,
    Rust,
    Python,
    JavaScript,
    TypeScript,
    Go,
}

impl Language {
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "rs" => Language::Rust,
            "py" | "pyi" => Language::Python,
            "js" | "mjs" | "cjs" | "jsx" => Language::JavaScript,
            "ts" | "mts" | "cts" | "tsx" => Language::TypeScript,
            "go" => Language::Go,
            _ => Language::Unknown,
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Self {
        path.as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .map(Language::from_extension)
            .unwrap_or_default()
    }
}

/// Persisted form of an index, stored as `state.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexState {
    pub version: u32,
    pub root_path: PathBuf,
    pub created_at: u64,
    pub updated_at: u64,
    pub files: SymbolIndex,
}

impl IndexState {
    pub fn new(root_path: PathBuf, files: SymbolIndex) -> Self {
        let now = unix_now();
        Self {
            version: STATE_VERSION,
            root_path,
            created_at: now,
            updated_at: now,
            files,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = unix_now();
    }
}

/// Seconds since the Unix epoch
pub fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
