use crate::config::MapConfig;
use crate::error::{MapError, MapResult};
use std::fs;
use std::path::{Path, PathBuf};

const APP_NAME: &str = "codemap";
const STATE_FILE: &str = "state.json";

/// Get the application data directory
pub fn get_app_data_dir() -> MapResult<PathBuf> {
    let base = if cfg!(target_os = "macos") {
        dirs::home_dir().map(|h| h.join("Library").join("Application Support"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
    } else {
        // Linux/Unix: use XDG_DATA_HOME or ~/.local/share
        dirs::data_dir()
    };

    let base = base.ok_or_else(|| {
        MapError::Config("could not determine the app data directory".to_string())
    })?;
    Ok(base.join(APP_NAME))
}

/// Directory holding one state folder per indexed codebase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateStore {
    base: PathBuf,
}

impl StateStore {
    /// `<app data>/codemap/maps`
    pub fn default_location() -> MapResult<Self> {
        Ok(Self::at(get_app_data_dir()?.join("maps")))
    }

    pub fn at(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    /// State folder for a codebase root
    pub fn state_dir(&self, root: &Path) -> PathBuf {
        self.base.join(folder_name(root))
    }

    pub fn state_file(&self, root: &Path) -> PathBuf {
        self.state_dir(root).join(STATE_FILE)
    }

    pub fn is_indexed(&self, root: &Path) -> bool {
        self.state_file(root).exists()
    }

    /// All codebases with a state file
    pub fn list(&self) -> MapResult<Vec<IndexLocation>> {
        if !self.base.exists() {
            return Ok(Vec::new());
        }

        let mut codebases = Vec::new();
        let entries = fs::read_dir(&self.base).map_err(|e| MapError::io(&self.base, e))?;

        for entry in entries {
            let entry = entry.map_err(|e| MapError::io(&self.base, e))?;
            let state_path = entry.path().join(STATE_FILE);
            if !state_path.is_file() {
                continue;
            }

            // Only the root is needed, so skip parsing the whole index
            let Ok(content) = fs::read_to_string(&state_path) else {
                continue;
            };
            let Ok(meta) = serde_json::from_str::<serde_json::Value>(&content) else {
                continue;
            };
            if let Some(root) = meta.get("root_path").and_then(|v| v.as_str()) {
                codebases.push(IndexLocation {
                    root_path: PathBuf::from(root),
                    state_dir: entry.path(),
                });
            }
        }

        codebases.sort_by(|a, b| a.root_path.cmp(&b.root_path));
        Ok(codebases)
    }

    /// Delete the state of a codebase. Returns whether anything was removed.
    pub fn remove(&self, root: &Path) -> MapResult<bool> {
        let dir = self.state_dir(root);
        if !dir.exists() {
            return Ok(false);
        }
        fs::remove_dir_all(&dir).map_err(|e| MapError::io(&dir, e))?;
        Ok(true)
    }
}

/// Folder name for a root: sanitized directory name + path hash
fn folder_name(root: &Path) -> String {
    let canonical = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
    let path_str = canonical.to_string_lossy();

    let dir_name = canonical
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("root");

    let sanitized: String = dir_name
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '-' || *c == '_')
        .take(16)
        .collect();

    let hash = blake3::hash(path_str.as_bytes());
    format!("{}-{}", sanitized, &hash.to_hex()[..16])
}

/// Resolved locations for one codebase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapPaths {
    pub root: PathBuf,
    /// The rendered document
    pub output: PathBuf,
    /// The persisted index state
    pub state_file: PathBuf,
}

impl MapPaths {
    pub fn new(root: &Path, config: &MapConfig, store: &StateStore) -> Self {
        let output = if config.output.is_absolute() {
            config.output.clone()
        } else {
            root.join(&config.output)
        };

        Self {
            root: root.to_path_buf(),
            output,
            state_file: store.state_file(root),
        }
    }

    /// Output path relative to the root, if it lives inside it
    pub fn output_rel(&self) -> Option<String> {
        self.output
            .strip_prefix(&self.root)
            .ok()
            .map(super::normalize_rel_path)
    }
}

/// Find the root of a codebase starting from a given path.
///
/// Walks up the directory tree looking for:
/// 1. A .git directory (git repo root)
/// 2. A previously indexed root
pub fn find_codebase_root(start_path: &Path, store: &StateStore) -> MapResult<PathBuf> {
    let start = start_path
        .canonicalize()
        .map_err(|e| MapError::io(start_path, e))?;

    let mut current = Some(start.as_path());
    while let Some(dir) = current {
        if dir.join(".git").exists() {
            return Ok(dir.to_path_buf());
        }
        current = dir.parent();
    }

    let mut current = Some(start.as_path());
    while let Some(dir) = current {
        if store.is_indexed(dir) {
            return Ok(dir.to_path_buf());
        }
        current = dir.parent();
    }

    Ok(start)
}

/// Information about an indexed codebase
#[derive(Debug, Clone)]
pub struct IndexLocation {
    pub root_path: PathBuf,
    pub state_dir: PathBuf,
}
