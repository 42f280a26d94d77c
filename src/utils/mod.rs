//! Utility functions shared by the scanner, extractors and CLI.
//!
//! ## Modules
//!
//! - [`app_data`] - State directory management and codebase root detection
//! - [`fingerprint`] - Content fingerprints for change detection
//! - [`paths`] - Repo-relative path normalization
//! - [`progress`] - Progress bars (no-op without the `progress` feature)
//! - [`text`] - Binary detection and one-line text shaping
//!
//! ```no_run
//! use codemap::utils::{normalize_rel_path, one_line};
//! use std::path::Path;
//!
//! assert_eq!(normalize_rel_path(Path::new("./src/a.ts")), "src/a.ts");
//! assert_eq!(one_line("(a,\n  b)", 80).as_deref(), Some("(a, b)"));
//! ```

pub mod app_data;
pub mod fingerprint;
pub mod paths;
pub mod progress;
pub mod text;

pub use app_data::*;
pub use fingerprint::*;
pub use paths::*;
pub use text::*;
