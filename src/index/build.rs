//! Full scans: discover eligible files, read and extract them in parallel,
//! then hand the batch to the [`IndexBuilder`](crate::index::IndexBuilder).

use crate::config::MapConfig;
use crate::error::{MapError, MapResult};
use crate::extract::{extract_symbols, ExtractOptions};
use crate::index::builder::build_index;
use crate::index::map::SymbolIndex;
use crate::index::types::SourceFile;
use crate::index::update::FileUpdate;
use crate::utils::progress::{file_bar, spinner};
use crate::utils::{content_fingerprint, normalize_rel_path};
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use rayon::prelude::*;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Decides which repo-relative paths belong in the index
#[derive(Debug, Clone)]
pub struct FileFilter {
    extensions: Vec<String>,
    ignored_dirs: Vec<String>,
    include_hidden: bool,
    exclude: GlobSet,
    /// The rendered document never indexes itself
    output: Option<String>,
}

impl FileFilter {
    pub fn new(config: &MapConfig, output: Option<String>) -> MapResult<Self> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &config.exclude {
            let glob = Glob::new(pattern)
                .map_err(|e| MapError::Config(format!("exclude pattern {pattern:?}: {e}")))?;
            builder.add(glob);
        }
        let exclude = builder
            .build()
            .map_err(|e| MapError::Config(e.to_string()))?;

        Ok(Self {
            extensions: config.extensions.clone(),
            ignored_dirs: config.ignored_dirs.clone(),
            include_hidden: config.include_hidden,
            exclude,
            output,
        })
    }

    /// Whether a repo-relative file path is indexed
    pub fn accepts(&self, rel: &str) -> bool {
        if self.output.as_deref() == Some(rel) || self.exclude.is_match(rel) {
            return false;
        }

        let mut components = rel.split('/').peekable();
        while let Some(part) = components.next() {
            if part.is_empty() || (!self.include_hidden && part.starts_with('.')) {
                return false;
            }
            // Directory components only
            if components.peek().is_some() && self.ignored_dirs.iter().any(|d| d == part) {
                return false;
            }
        }

        Path::new(rel)
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| {
                self.extensions
                    .iter()
                    .any(|allowed| allowed.eq_ignore_ascii_case(ext))
            })
    }
}

/// A file found by [`discover_files`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub path: PathBuf,
    pub rel_path: String,
}

/// Walk `root` (gitignore aware) and return eligible files sorted by path
pub fn discover_files(root: &Path, filter: &FileFilter) -> Vec<FileEntry> {
    discover_files_in(root, root, filter)
}

/// [`discover_files`] limited to the subtree at `start`, with paths still
/// relative to `root`
pub fn discover_files_in(root: &Path, start: &Path, filter: &FileFilter) -> Vec<FileEntry> {
    let ignored_dirs = filter.ignored_dirs.clone();

    let walker = WalkBuilder::new(start)
        .hidden(!filter.include_hidden)
        .git_ignore(true)
        .git_global(true)
        .git_exclude(true)
        .filter_entry(move |entry| {
            let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
            let name = entry.file_name().to_string_lossy();
            // Skip non-code directories without descending into them
            !(is_dir && ignored_dirs.iter().any(|d| d.as_str() == name.as_ref()))
        })
        .build();

    let mut files: Vec<FileEntry> = walker
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                tracing::debug!(%err, "skipping unreadable walk entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_some_and(|t| t.is_file()))
        .filter_map(|entry| {
            let rel = entry.path().strip_prefix(root).ok()?;
            let rel_path = normalize_rel_path(rel);
            filter.accepts(&rel_path).then(|| FileEntry {
                path: entry.path().to_path_buf(),
                rel_path,
            })
        })
        .collect();

    files.sort_by(|a, b| a.rel_path.cmp(&b.rel_path));
    files
}

/// Fingerprint and extract one file's content
pub fn process_file(rel_path: &str, content: &[u8], options: &ExtractOptions) -> SourceFile {
    let fingerprint = content_fingerprint(content);
    let extraction = extract_symbols(rel_path, content, options);
    SourceFile::from_extraction(fingerprint, extraction)
}

/// Current state of one file as an update: written if it can be read,
/// deleted if it no longer exists
pub fn read_update(root: &Path, rel_path: &str, options: &ExtractOptions) -> MapResult<FileUpdate> {
    let full = root.join(rel_path);
    match fs::read(&full) {
        Ok(content) => Ok(FileUpdate::written(
            rel_path,
            process_file(rel_path, &content, options),
        )),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(FileUpdate::deleted(rel_path)),
        Err(e) => Err(MapError::io(full, e)),
    }
}

/// Summary of a full scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanReport {
    pub files: usize,
    pub symbols: usize,
    pub warnings: usize,
    pub collisions: usize,
    pub elapsed: Duration,
}

impl ScanReport {
    pub fn new(index: &SymbolIndex, elapsed: Duration) -> Self {
        Self {
            files: index.len(),
            symbols: index.symbol_count(),
            warnings: index.warning_count(),
            collisions: index.collisions().len(),
            elapsed,
        }
    }
}

/// Build a fresh index of `root`.
///
/// Per-file extraction problems are recorded on the file. Read errors abort
/// the scan; a file deleted between discovery and reading is left out.
pub fn scan_index(root: &Path, filter: &FileFilter, config: &MapConfig, silent: bool) -> MapResult<SymbolIndex> {
    let started = Instant::now();
    let options = ExtractOptions::from(config);

    // Phase 1: discovery
    let discover = spinner("Discovering files...", silent);
    let files = discover_files(root, filter);
    if let Some(spinner) = discover {
        spinner.finish_with_message(format!("Found {} files", files.len()));
    }
    tracing::debug!(root = %root.display(), files = files.len(), "discovered files");

    // Phase 2: read + extract in parallel
    let bar = file_bar(files.len() as u64, silent);
    let processed: Vec<Option<(String, SourceFile)>> = files
        .par_iter()
        .map(|entry| {
            let result = match fs::read(&entry.path) {
                Ok(content) => Ok(Some((
                    entry.rel_path.clone(),
                    process_file(&entry.rel_path, &content, &options),
                ))),
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    tracing::debug!(path = %entry.rel_path, "file vanished during scan");
                    Ok(None)
                }
                Err(e) => Err(MapError::io(&entry.path, e)),
            };
            if let Some(bar) = &bar {
                bar.inc(1);
            }
            result
        })
        .collect::<MapResult<_>>()?;

    let index = build_index(processed.into_iter().flatten())?;

    if let Some(bar) = bar {
        bar.finish_with_message(format!("Extracted {} symbols", index.symbol_count()));
    }
    tracing::info!(
        files = index.len(),
        symbols = index.symbol_count(),
        warnings = index.warning_count(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "scan complete"
    );

    Ok(index)
}
