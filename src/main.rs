use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use codemap::config::MapConfig;
use codemap::index::{stats, MapSession};
use codemap::utils::{find_codebase_root, StateStore};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "codemap")]
#[command(about = "Keep a compact markdown map of a codebase's exported symbols")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Directory holding index state (defaults to the app data directory)
    #[arg(long, global = true, value_name = "DIR")]
    state_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan the whole codebase and write the map
    Scan {
        /// Path inside the codebase (auto-detects git root)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output document, relative to the codebase root
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Comma separated extensions to index (e.g. ts,tsx,rs)
        #[arg(long, value_name = "LIST")]
        ext: Option<String>,

        /// No progress output
        #[arg(short, long)]
        quiet: bool,
    },
    /// Re-index specific files (a missing file is removed from the map)
    Update {
        /// Changed files
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Codebase root (auto-detected from the current directory if omitted)
        #[arg(long)]
        root: Option<PathBuf>,

        /// Only print errors
        #[arg(short, long)]
        quiet: bool,
    },
    /// Watch the codebase and update the map as files change
    Watch {
        #[arg(default_value = ".")]
        path: PathBuf,
    },
    /// Print the indexed symbols to the terminal
    Show {
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Disable colors
        #[arg(long)]
        plain: bool,
    },
    /// Show index statistics
    Stats {
        #[arg(default_value = ".")]
        path: PathBuf,
    },
    /// List all indexed codebases
    List,
    /// Remove the stored index of a codebase
    Clean {
        #[arg(default_value = ".")]
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    codemap::logging::init_logging(cli.verbose)?;

    let store = match &cli.state_dir {
        Some(dir) => StateStore::at(dir),
        None => StateStore::default_location()?,
    };

    match cli.command {
        Commands::Scan {
            path,
            output,
            ext,
            quiet,
        } => {
            let root = find_codebase_root(&path, &store)?;
            let mut config = load_config(&root)?;
            if let Some(output) = output {
                config.output = output;
            }
            if let Some(ext) = ext {
                config.set_extensions(&ext);
            }
            scan(&root, config, &store, quiet)?;
        }
        Commands::Update { files, root, quiet } => {
            let root = match root {
                Some(root) => root,
                None => {
                    let cwd = std::env::current_dir().context("Failed to read current directory")?;
                    find_codebase_root(&cwd, &store)?
                }
            };
            update(&root, &files, &store, quiet)?;
        }
        Commands::Watch { path } => {
            let root = find_codebase_root(&path, &store)?;
            watch(&root, &store)?;
        }
        Commands::Show { path, plain } => {
            let session = open(&path, &store)?;
            codemap::output::print_index(session.index(), !plain)
                .context("Failed to write to stdout")?;
        }
        Commands::Stats { path } => {
            let session = open(&path, &store)?;
            stats::show_stats(&session);
        }
        Commands::List => {
            stats::list_indexes(&store)?;
        }
        Commands::Clean { path } => {
            let root = find_codebase_root(&path, &store)?;
            if store.remove(&root)? {
                println!("Removed index for: {}", root.display());
            } else {
                println!("No index found for: {}", root.display());
            }
        }
    }

    Ok(())
}

fn load_config(root: &Path) -> Result<MapConfig> {
    MapConfig::load(root).with_context(|| format!("Failed to load config for {}", root.display()))
}

fn open(path: &Path, store: &StateStore) -> Result<MapSession> {
    let root = find_codebase_root(path, store)?;
    let config = load_config(&root)?;
    Ok(MapSession::open(&root, config, store)?)
}

fn scan(root: &Path, config: MapConfig, store: &StateStore, quiet: bool) -> Result<MapSession> {
    if !quiet {
        println!("Scanning {}", root.display());
    }
    let (session, report) = MapSession::scan(root, config, store, quiet)
        .with_context(|| format!("Scan of {} failed", root.display()))?;

    if !quiet {
        println!(
            "Mapped {} files, {} exported symbols in {:.2}s",
            report.files,
            report.symbols,
            report.elapsed.as_secs_f64()
        );
        if report.warnings > 0 {
            println!("  {} files could not be parsed (see `codemap show`)", report.warnings);
        }
        if report.collisions > 0 {
            println!("  {} names are exported by more than one file", report.collisions);
        }
        println!("Wrote {}", session.paths().output.display());
    }
    Ok(session)
}

fn update(root: &Path, files: &[PathBuf], store: &StateStore, quiet: bool) -> Result<()> {
    let config = load_config(root)?;
    let mut session = MapSession::open(root, config, store)?;

    let mut changed = 0;
    for file in files {
        let outcome = session
            .apply_path(file)
            .with_context(|| format!("Failed to update {}", file.display()))?;
        if outcome.is_some_and(|o| o.is_change()) {
            changed += 1;
        }
    }

    if changed > 0 {
        session.persist().context("Failed to write the map")?;
    }
    if !quiet {
        println!("Updated {changed} of {} files", files.len());
    }
    Ok(())
}

#[cfg(feature = "watch")]
fn watch(root: &Path, store: &StateStore) -> Result<()> {
    use std::sync::Arc;
    use std::sync::atomic::AtomicBool;

    let config = load_config(root)?;
    // Watching an unindexed codebase starts with a full scan
    let mut session = match MapSession::open(root, config.clone(), store) {
        Ok(session) => session,
        Err(codemap::error::MapError::NoIndex(_)) => scan(root, config, store, false)?,
        Err(e) => return Err(e.into()),
    };

    println!(
        "Watching {} (Ctrl-C to stop)",
        session.paths().root.display()
    );
    // Never set here: Ctrl-C ends the process, and each persisted map is
    // already complete on disk
    codemap::watch::run_watch(&mut session, Arc::new(AtomicBool::new(false)))?;
    Ok(())
}

#[cfg(not(feature = "watch"))]
fn watch(_root: &Path, _store: &StateStore) -> Result<()> {
    anyhow::bail!("codemap was built without the `watch` feature")
}
