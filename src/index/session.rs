//! A loaded codebase: configuration, index state and rendered sections.
//!
//! [`MapSession`] is the single writer of one codebase's index. Full scans,
//! `codemap update` and the watcher all go through it, so the document and
//! the state file always describe the same index.

use crate::config::MapConfig;
use crate::error::{MapError, MapResult};
use crate::extract::ExtractOptions;
use crate::index::build::{discover_files_in, read_update, scan_index, FileFilter, ScanReport};
use crate::index::map::SymbolIndex;
use crate::index::reader::load_state;
use crate::index::types::IndexState;
use crate::index::update::{FileUpdate, UpdateOutcome};
use crate::index::writer::commit;
use crate::render::SectionCache;
use crate::utils::{relative_to, MapPaths, StateStore};
use std::path::Path;
use std::time::Instant;

pub struct MapSession {
    paths: MapPaths,
    config: MapConfig,
    options: ExtractOptions,
    filter: FileFilter,
    state: IndexState,
    cache: SectionCache,
}

impl MapSession {
    /// Rebuild the index of `root` from scratch and persist it.
    ///
    /// Nothing is written unless the whole scan succeeds.
    pub fn scan(
        root: &Path,
        config: MapConfig,
        store: &StateStore,
        silent: bool,
    ) -> MapResult<(Self, ScanReport)> {
        let root = canonical_root(root)?;
        let paths = MapPaths::new(&root, &config, store);
        let filter = FileFilter::new(&config, paths.output_rel())?;

        let started = Instant::now();
        let index = scan_index(&root, &filter, &config, silent)?;
        let report = ScanReport::new(&index, started.elapsed());

        let mut state = IndexState::new(root.clone(), index);
        // Keep the original creation time across rescans
        if let Ok(previous) = load_state(&paths.state_file, &root) {
            state.created_at = previous.created_at;
        }

        let session = Self::from_state(paths, config, filter, state);
        session.persist()?;
        Ok((session, report))
    }

    /// Load the persisted index of `root`
    pub fn open(root: &Path, config: MapConfig, store: &StateStore) -> MapResult<Self> {
        let root = canonical_root(root)?;
        let paths = MapPaths::new(&root, &config, store);
        let filter = FileFilter::new(&config, paths.output_rel())?;
        let state = load_state(&paths.state_file, &root)?;
        Ok(Self::from_state(paths, config, filter, state))
    }

    fn from_state(paths: MapPaths, config: MapConfig, filter: FileFilter, state: IndexState) -> Self {
        let cache = SectionCache::from_index(&state.files);
        Self {
            options: ExtractOptions::from(&config),
            paths,
            config,
            filter,
            state,
            cache,
        }
    }

    pub fn index(&self) -> &SymbolIndex {
        &self.state.files
    }

    pub fn state(&self) -> &IndexState {
        &self.state
    }

    pub fn paths(&self) -> &MapPaths {
        &self.paths
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    /// Apply one update in memory. Call [`MapSession::persist`] to write it.
    pub fn apply(&mut self, update: &FileUpdate) -> UpdateOutcome {
        let outcome = self.state.files.apply(update);
        if outcome.is_change() {
            self.cache.refresh(&self.state.files, &update.path);
            self.state.touch();
        }
        tracing::debug!(path = %update.path, ?outcome, "applied update");
        outcome
    }

    /// Turn a path (absolute, or relative to the working directory) into
    /// the update describing its current state.
    ///
    /// Returns `None` for files the index does not track. A tracked file
    /// that became ineligible (e.g. newly excluded) is reported as deleted.
    pub fn read_path(&self, path: &Path) -> MapResult<Option<FileUpdate>> {
        let cwd = std::env::current_dir().map_err(|e| MapError::io(".", e))?;
        let rel = relative_to(&self.paths.root, path, &cwd)
            .ok_or_else(|| MapError::OutsideRoot(path.to_path_buf()))?;
        self.read_rel(&rel)
    }

    /// [`MapSession::read_path`] for a path already relative to the root
    pub fn read_rel(&self, rel: &str) -> MapResult<Option<FileUpdate>> {
        if !self.filter.accepts(rel) {
            return Ok(self
                .state
                .files
                .contains(rel)
                .then(|| FileUpdate::deleted(rel)));
        }
        if self.paths.root.join(rel).is_dir() {
            return Ok(None);
        }
        read_update(&self.paths.root, rel, &self.options).map(Some)
    }

    /// Updates for a path that may be a directory.
    ///
    /// A directory yields one update per eligible file below it. Indexed
    /// files under `rel` that are no longer on disk come back as deletions,
    /// which covers removed and renamed directories.
    pub fn read_tree(&self, rel: &str) -> MapResult<Vec<FileUpdate>> {
        let full = self.paths.root.join(rel);
        let mut updates = Vec::new();

        if full.is_dir() {
            for entry in discover_files_in(&self.paths.root, &full, &self.filter) {
                updates.push(read_update(&self.paths.root, &entry.rel_path, &self.options)?);
            }
        } else if let Some(update) = self.read_rel(rel)? {
            updates.push(update);
        }

        let prefix = format!("{}/", rel.trim_end_matches('/'));
        let gone: Vec<FileUpdate> = self
            .state
            .files
            .paths()
            .filter(|path| path.starts_with(&prefix))
            .filter(|path| !updates.iter().any(|u| u.path == *path))
            .map(FileUpdate::deleted)
            .collect();
        updates.extend(gone);
        Ok(updates)
    }

    /// Read and apply one path
    pub fn apply_path(&mut self, path: &Path) -> MapResult<Option<UpdateOutcome>> {
        Ok(self.read_path(path)?.map(|update| self.apply(&update)))
    }

    /// The current document, assembled from cached sections
    pub fn document(&self) -> String {
        self.cache.document()
    }

    /// Write the document and then the state file
    pub fn persist(&self) -> MapResult<()> {
        commit(&self.paths, &self.state, &self.cache.document())
    }
}

fn canonical_root(root: &Path) -> MapResult<std::path::PathBuf> {
    root.canonicalize().map_err(|e| MapError::io(root, e))
}
