//! # codemap - a compact map of what a codebase exports
//!
//! codemap scans a source tree, extracts the exported symbols of every
//! supported file and renders them as one markdown document
//! (`CODEBASE_MAP.md`). After the first full scan the document is kept
//! current one file at a time, either from explicit `codemap update` calls
//! or from a file watcher.
//!
//! ## Architecture
//!
//! - [`extract`] - Per-language export scanners (TypeScript/JavaScript, Rust,
//!   Python, Go)
//! - [`index`] - The path to symbols index: full scans, incremental updates,
//!   persistence
//! - [`render`] - Deterministic markdown rendering with per-file section cache
//! - [`watch`] - Debounced file watching
//! - [`output`] - Colored terminal listing
//! - [`config`] - `codemap.toml` and `CODEMAP_*` configuration
//! - [`utils`] - Paths, fingerprints, state directory, progress bars
//!
//! ## Quick Start
//!
//! ```no_run
//! use codemap::config::MapConfig;
//! use codemap::index::MapSession;
//! use codemap::utils::StateStore;
//! use std::path::Path;
//!
//! let root = Path::new("/path/to/codebase");
//! let store = StateStore::default_location()?;
//! let (mut session, report) = MapSession::scan(root, MapConfig::load(root)?, &store, true)?;
//! println!("{} files, {} symbols", report.files, report.symbols);
//!
//! // Later: one file changed
//! session.apply_path(&root.join("src/utils.ts"))?;
//! session.persist()?;
//! # Ok::<(), codemap::error::MapError>(())
//! ```

pub mod config;
pub mod error;
pub mod extract;
pub mod index;
pub mod logging;
pub mod output;
pub mod render;
pub mod utils;
pub mod watch;
