//! Error types.
//!
//! [`MapError`] covers failures that abort an operation (a scan, an update,
//! a write). [`ExtractionWarning`] covers per-file problems that never abort
//! anything: the file stays in the index with an empty symbol list.

use std::io;
use std::path::PathBuf;

/// Fatal errors raised by scans, updates and persistence.
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    /// The same path appeared twice in one full-scan batch.
    #[error("duplicate path in scan batch: {0}")]
    DuplicatePath(String),

    /// Reading a source file or writing an output file failed.
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The persisted state file is unreadable or from another format version.
    #[error("invalid state file {}: {message}", .path.display())]
    State { path: PathBuf, message: String },

    /// No state exists yet for the codebase.
    #[error("no index found for {}; run `codemap scan` first", .0.display())]
    NoIndex(PathBuf),

    /// The configuration file or a config override is invalid.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A path given for an update does not live under the codebase root.
    #[error("path is outside the codebase root: {}", .0.display())]
    OutsideRoot(PathBuf),

    /// The file system watcher could not be created or attached.
    #[cfg(feature = "watch")]
    #[error("watcher error: {0}")]
    Watch(#[from] notify::Error),
}

impl MapError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        MapError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type MapResult<T> = Result<T, MapError>;

/// Non-fatal, per-file extraction problem.
///
/// Line numbers are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractionWarning {
    #[error("binary content")]
    Binary,

    #[error("content is not valid UTF-8")]
    InvalidUtf8,

    #[error("file is {size} bytes, limit is {limit}")]
    TooLarge { size: u64, limit: u64 },

    #[error("unexpected `{found}` on line {line}")]
    UnbalancedBracket { line: usize, found: char },

    #[error("`{open}` opened on line {line} is never closed")]
    UnclosedBracket { line: usize, open: char },

    #[error("block comment starting on line {line} is never closed")]
    UnterminatedComment { line: usize },

    #[error("string literal starting on line {line} is never closed")]
    UnterminatedString { line: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warning_messages() {
        let w = ExtractionWarning::UnbalancedBracket { line: 4, found: '}' };
        assert_eq!(w.to_string(), "unexpected `}` on line 4");

        let w = ExtractionWarning::TooLarge { size: 10, limit: 5 };
        assert_eq!(w.to_string(), "file is 10 bytes, limit is 5");
    }

    #[test]
    fn test_io_error_mentions_path() {
        let err = MapError::io(
            "src/a.ts",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        let msg = err.to_string();
        assert!(msg.contains("src/a.ts"));
        assert!(msg.contains("denied"));
    }
}
