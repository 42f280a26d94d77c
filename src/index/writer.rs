//! Persistence of the rendered document and the index state.
//!
//! Every file is written to a temporary sibling and renamed into place, so a
//! failed write leaves the previous version untouched.

use crate::error::{MapError, MapResult};
use crate::index::types::IndexState;
use crate::utils::MapPaths;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Write `contents` to `path` atomically, creating parent directories
pub fn write_atomic<F>(path: &Path, write: F) -> MapResult<()>
where
    F: FnOnce(&mut BufWriter<&mut NamedTempFile>) -> std::io::Result<()>,
{
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|e| MapError::io(dir, e))?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| MapError::io(dir, e))?;
    {
        let mut out = BufWriter::new(&mut tmp);
        write(&mut out).map_err(|e| MapError::io(path, e))?;
        out.flush().map_err(|e| MapError::io(path, e))?;
    }
    tmp.persist(path)
        .map_err(|e| MapError::io(path, e.error))?;
    Ok(())
}

/// Write the markdown document
pub fn write_document(path: &Path, document: &str) -> MapResult<()> {
    write_atomic(path, |out| out.write_all(document.as_bytes()))?;
    tracing::debug!(path = %path.display(), bytes = document.len(), "wrote document");
    Ok(())
}

/// Write the state file as pretty JSON
pub fn save_state(path: &Path, state: &IndexState) -> MapResult<()> {
    write_atomic(path, |out| {
        serde_json::to_writer_pretty(&mut *out, state)?;
        out.write_all(b"\n")
    })?;
    tracing::debug!(path = %path.display(), files = state.files.len(), "saved state");
    Ok(())
}

/// Persist one consistent snapshot: the document first, then the state that
/// produced it
pub fn commit(paths: &MapPaths, state: &IndexState, document: &str) -> MapResult<()> {
    write_document(&paths.output, document)?;
    save_state(&paths.state_file, state)
}
