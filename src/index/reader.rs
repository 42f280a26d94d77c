use crate::error::{MapError, MapResult};
use crate::index::types::{IndexState, STATE_VERSION};
use std::fs::File;
use std::io::{BufReader, ErrorKind};
use std::path::Path;

/// Load the persisted state of the codebase at `root`
pub fn load_state(state_file: &Path, root: &Path) -> MapResult<IndexState> {
    let file = match File::open(state_file) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(MapError::NoIndex(root.to_path_buf()));
        }
        Err(e) => return Err(MapError::io(state_file, e)),
    };

    let state: IndexState =
        serde_json::from_reader(BufReader::new(file)).map_err(|e| MapError::State {
            path: state_file.to_path_buf(),
            message: e.to_string(),
        })?;

    if state.version != STATE_VERSION {
        return Err(MapError::State {
            path: state_file.to_path_buf(),
            message: format!(
                "format version {} is not supported (expected {STATE_VERSION}); run `codemap scan` to rebuild",
                state.version
            ),
        });
    }

    tracing::debug!(path = %state_file.display(), files = state.files.len(), "loaded state");
    Ok(state)
}
