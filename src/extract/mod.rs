//! Exported-symbol extraction.
//!
//! Each supported language has a lightweight syntactic scanner. None of them
//! type-check or resolve anything: they mask comments and strings
//! ([`lexer`]), then match exported declaration forms line by line in source
//! order. Output is fully determined by the input text.
//!
//! Malformed input never produces an error. It produces an
//! [`ExtractionWarning`] and an empty symbol list, so the file still shows up
//! in the index.

mod go;
pub(crate) mod lexer;
mod python;
mod rust;
mod typescript;

use crate::config::MapConfig;
use crate::error::ExtractionWarning;
use crate::index::types::{ExportedSymbol, Language, SourceFile};
use crate::utils::is_binary;

/// Limits applied during extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    pub max_file_size: u64,
    pub max_symbols: usize,
    pub max_signature_len: usize,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self::from(&MapConfig::default())
    }
}

impl From<&MapConfig> for ExtractOptions {
    fn from(config: &MapConfig) -> Self {
        Self {
            max_file_size: config.max_file_size,
            max_symbols: config.max_symbols_per_file,
            max_signature_len: config.max_signature_len,
        }
    }
}

/// Result of scanning one file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    /// Exported symbols in source order, capped at `max_symbols`
    pub symbols: Vec<ExportedSymbol>,
    /// Symbols dropped by the cap
    pub omitted: usize,
    pub warning: Option<ExtractionWarning>,
}

impl Extraction {
    fn failed(warning: ExtractionWarning) -> Self {
        Self {
            warning: Some(warning),
            ..Self::default()
        }
    }

    pub fn names(&self) -> Vec<&str> {
        self.symbols.iter().map(|s| s.name.as_str()).collect()
    }
}

/// Extract the exported symbols of one file.
///
/// `path` is only used to pick the language and for log output.
pub fn extract_symbols(path: &str, content: &[u8], options: &ExtractOptions) -> Extraction {
    let extraction = scan(path, content, options);
    if let Some(warning) = &extraction.warning {
        tracing::warn!(path, %warning, "extraction failed, indexing file without symbols");
    }
    extraction
}

fn scan(path: &str, content: &[u8], options: &ExtractOptions) -> Extraction {
    let size = content.len() as u64;
    if size > options.max_file_size {
        return Extraction::failed(ExtractionWarning::TooLarge {
            size,
            limit: options.max_file_size,
        });
    }
    if is_binary(content) {
        return Extraction::failed(ExtractionWarning::Binary);
    }
    let Ok(text) = std::str::from_utf8(content) else {
        return Extraction::failed(ExtractionWarning::InvalidUtf8);
    };
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let sig = options.max_signature_len;
    let result = match Language::from_path(path) {
        Language::TypeScript | Language::JavaScript => typescript::extract(text, sig),
        Language::Rust => rust::extract(text, sig),
        Language::Python => python::extract(text, sig),
        Language::Go => go::extract(text, sig),
        Language::Unknown => Ok(Vec::new()),
    };

    match result {
        Ok(mut symbols) => {
            let omitted = symbols.len().saturating_sub(options.max_symbols);
            symbols.truncate(options.max_symbols);
            Extraction {
                symbols,
                omitted,
                warning: None,
            }
        }
        Err(warning) => Extraction::failed(warning),
    }
}

impl SourceFile {
    /// Index record for a file with the given fingerprint and extraction
    pub fn from_extraction(fingerprint: impl Into<String>, extraction: Extraction) -> Self {
        Self {
            fingerprint: fingerprint.into(),
            symbols: extraction.symbols,
            omitted: extraction.omitted,
            warning: extraction.warning.map(|w| w.to_string()),
        }
    }
}

/// Identifier characters shared by all supported languages
pub(crate) fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}
