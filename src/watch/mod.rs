//! Live updates: watch a codebase and keep its document current.
//!
//! A notify watcher thread produces raw events on a channel. The loop below
//! is the only consumer: it feeds the [`EventDebouncer`], and once a batch
//! settles it reads the affected files, applies the updates to the session
//! in path order and persists the result.

mod debouncer;

pub use debouncer::{ChangeKind, EventDebouncer};

use crate::error::MapResult;
use crate::index::{FileUpdate, MapSession};

/// Read every path of a settled batch, then apply the updates in order.
///
/// A directory path expands to the files below it, and indexed files under
/// a vanished directory are deleted. All reads happen before anything is
/// applied, so a read error leaves the session untouched. Returns the
/// number of updates that changed the index.
pub fn apply_batch(session: &mut MapSession, batch: &[(String, ChangeKind)]) -> MapResult<usize> {
    let mut updates: Vec<FileUpdate> = Vec::with_capacity(batch.len());
    for (path, kind) in batch {
        tracing::debug!(path, ?kind, "change detected");
        updates.extend(session.read_tree(path)?);
    }

    let changed = updates
        .iter()
        .filter(|update| session.apply(update).is_change())
        .count();
    Ok(changed)
}

#[cfg(feature = "watch")]
pub use self::notify_loop::run_watch;

#[cfg(feature = "watch")]
mod notify_loop {
    use super::{apply_batch, ChangeKind, EventDebouncer};
    use crate::error::MapResult;
    use crate::index::MapSession;
    use crate::utils::normalize_rel_path;
    use notify::event::ModifyKind;
    use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::mpsc;
    use std::sync::Arc;
    use std::time::Duration;

    const POLL_INTERVAL: Duration = Duration::from_millis(100);

    /// Watch the session's root until `shutdown` is set or the watcher goes
    /// away. Each settled batch is applied and persisted.
    ///
    /// The flag is polled between events, so a caller on another thread can
    /// stop the loop cleanly. Every persist is an atomic replace, so a
    /// process killed mid-watch leaves the last complete map on disk.
    pub fn run_watch(session: &mut MapSession, shutdown: Arc<AtomicBool>) -> MapResult<()> {
        let root = session.paths().root.clone();
        let mut debouncer = EventDebouncer::new(session.config().debounce_duration());
        let (event_tx, event_rx) = mpsc::channel();

        let mut watcher = RecommendedWatcher::new(
            move |res: Result<Event, notify::Error>| match res {
                Ok(event) => {
                    let _ = event_tx.send(event);
                }
                Err(err) => tracing::warn!(%err, "watch error"),
            },
            notify::Config::default(),
        )?;
        watcher.watch(&root, RecursiveMode::Recursive)?;

        tracing::info!(root = %root.display(), "watching for changes");

        loop {
            if shutdown.load(Ordering::Relaxed) {
                break;
            }

            match event_rx.recv_timeout(POLL_INTERVAL) {
                Ok(event) => {
                    let kind = match event.kind {
                        EventKind::Create(_) => Some(ChangeKind::Created),
                        EventKind::Modify(_) => Some(ChangeKind::Modified),
                        EventKind::Remove(_) => Some(ChangeKind::Deleted),
                        _ => None,
                    };
                    // Directory writes carry no content, but directory
                    // creates, removes and renames move whole subtrees
                    let tree_event = matches!(
                        event.kind,
                        EventKind::Create(_)
                            | EventKind::Remove(_)
                            | EventKind::Modify(ModifyKind::Name(_))
                    );
                    if let Some(kind) = kind {
                        for path in event.paths.iter().filter(|p| tree_event || !p.is_dir()) {
                            let Ok(rel) = path.strip_prefix(&root) else {
                                continue;
                            };
                            let rel = normalize_rel_path(rel);
                            if !rel.is_empty() {
                                debouncer.add_event(rel, kind);
                            }
                        }
                    }
                }
                Err(mpsc::RecvTimeoutError::Timeout) => {}
                Err(mpsc::RecvTimeoutError::Disconnected) => break,
            }

            if debouncer.has_pending() && debouncer.is_ready() {
                let batch = debouncer.flush();
                match apply_batch(session, &batch) {
                    Ok(0) => {}
                    Ok(changed) => {
                        session.persist()?;
                        tracing::info!(changed, files = session.index().len(), "map updated");
                    }
                    // Nothing applied; the next event for these files retries
                    Err(err) => tracing::error!(%err, "skipping change batch"),
                }
            }
        }

        Ok(())
    }
}
