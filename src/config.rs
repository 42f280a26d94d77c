//! Configuration.
//!
//! Values are layered with priority: CLI flags > environment variables >
//! `codemap.toml` at the codebase root > defaults. The CLI layer is applied
//! by the binary; everything else happens in [`MapConfig::load`].
//!
//! ```toml
//! [map]
//! output = "docs/CODEBASE_MAP.md"
//! extensions = ["ts", "tsx", "rs"]
//! exclude = ["**/*.test.ts", "generated/**"]
//! max_symbols_per_file = 100
//!
//! [watch]
//! debounce_ms = 250
//! ```

use crate::error::{MapError, MapResult};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILE_NAME: &str = "codemap.toml";
pub const DEFAULT_OUTPUT: &str = "CODEBASE_MAP.md";
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;

/// Effective configuration for one codebase
#[derive(Debug, Clone, PartialEq)]
pub struct MapConfig {
    /// Output document, relative to the codebase root unless absolute
    pub output: PathBuf,
    /// File extensions eligible for indexing (without the dot)
    pub extensions: Vec<String>,
    /// Directory names never descended into
    pub ignored_dirs: Vec<String>,
    /// Glob patterns (relative to the root) excluded from the index
    pub exclude: Vec<String>,
    /// Files larger than this are kept with a warning and no symbols
    pub max_file_size: u64,
    /// Symbols listed per file; the rest are counted as omitted
    pub max_symbols_per_file: usize,
    /// Signature length cap in characters; 0 disables signatures
    pub max_signature_len: usize,
    /// Include dot-files and dot-directories
    pub include_hidden: bool,
    /// Debounce window of the watcher
    pub debounce_ms: u64,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            output: PathBuf::from(DEFAULT_OUTPUT),
            extensions: ["ts", "tsx", "mts", "cts", "js", "jsx", "mjs", "cjs", "rs", "py", "pyi", "go"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            ignored_dirs: [
                ".git",
                "node_modules",
                "target",
                "dist",
                "build",
                "vendor",
                "__pycache__",
                ".venv",
                "venv",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            exclude: Vec::new(),
            max_file_size: 1024 * 1024,
            max_symbols_per_file: 200,
            max_signature_len: 120,
            include_hidden: false,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
        }
    }
}

/// Configuration file format (TOML)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub map: MapSection,
    #[serde(default)]
    pub watch: WatchSection,
}

/// `[map]` section
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MapSection {
    pub output: Option<PathBuf>,
    pub extensions: Option<Vec<String>>,
    pub ignored_dirs: Option<Vec<String>>,
    pub exclude: Option<Vec<String>>,
    pub max_file_size: Option<u64>,
    pub max_symbols_per_file: Option<usize>,
    pub max_signature_len: Option<usize>,
    pub include_hidden: Option<bool>,
}

/// `[watch]` section
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WatchSection {
    pub debounce_ms: Option<u64>,
}

impl ConfigFile {
    pub fn parse(content: &str) -> MapResult<Self> {
        toml::from_str(content).map_err(|e| MapError::Config(e.to_string()))
    }
}

impl MapConfig {
    /// Load config for a root: defaults, then `codemap.toml`, then environment
    pub fn load(root: &Path) -> MapResult<Self> {
        let mut config = Self::default();

        let config_path = root.join(CONFIG_FILE_NAME);
        if config_path.is_file() {
            let content =
                fs::read_to_string(&config_path).map_err(|e| MapError::io(&config_path, e))?;
            config.apply_file(ConfigFile::parse(&content)?);
            tracing::debug!(path = %config_path.display(), "loaded config file");
        }

        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn apply_file(&mut self, file: ConfigFile) {
        let map = file.map;
        if let Some(v) = map.output {
            self.output = v;
        }
        if let Some(v) = map.extensions {
            self.extensions = normalize_extensions(v);
        }
        if let Some(v) = map.ignored_dirs {
            self.ignored_dirs = v;
        }
        if let Some(v) = map.exclude {
            self.exclude = v;
        }
        if let Some(v) = map.max_file_size {
            self.max_file_size = v;
        }
        if let Some(v) = map.max_symbols_per_file {
            self.max_symbols_per_file = v;
        }
        if let Some(v) = map.max_signature_len {
            self.max_signature_len = v;
        }
        if let Some(v) = map.include_hidden {
            self.include_hidden = v;
        }
        if let Some(v) = file.watch.debounce_ms {
            self.debounce_ms = v;
        }
    }

    /// Apply `CODEMAP_*` overrides read through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> MapResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("CODEMAP_OUTPUT") {
            self.output = PathBuf::from(v);
        }
        if let Some(v) = lookup("CODEMAP_EXTENSIONS") {
            self.set_extensions(&v);
        }
        if let Some(v) = lookup("CODEMAP_MAX_FILE_SIZE") {
            self.max_file_size = parse_env("CODEMAP_MAX_FILE_SIZE", &v)?;
        }
        if let Some(v) = lookup("CODEMAP_MAX_SYMBOLS") {
            self.max_symbols_per_file = parse_env("CODEMAP_MAX_SYMBOLS", &v)?;
        }
        if let Some(v) = lookup("CODEMAP_MAX_SIGNATURE_LEN") {
            self.max_signature_len = parse_env("CODEMAP_MAX_SIGNATURE_LEN", &v)?;
        }
        if let Some(v) = lookup("CODEMAP_INCLUDE_HIDDEN") {
            self.include_hidden = parse_env("CODEMAP_INCLUDE_HIDDEN", &v)?;
        }
        if let Some(v) = lookup("CODEMAP_DEBOUNCE_MS") {
            self.debounce_ms = parse_env("CODEMAP_DEBOUNCE_MS", &v)?;
        }
        Ok(())
    }

    /// Replace the extension filter from a comma separated list
    pub fn set_extensions(&mut self, list: &str) {
        self.extensions = normalize_extensions(list.split(',').map(str::to_string).collect());
    }

    pub fn debounce_duration(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

fn normalize_extensions(list: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = list
        .into_iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();
    out.dedup();
    out
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> MapResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| MapError::Config(format!("{key}={value:?} is not a valid value")))
}
