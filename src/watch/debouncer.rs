//! Event debouncer for file system events
//!
//! Accumulates events within a time window and normalizes them to one change
//! per path, so an editor's save dance or a `git checkout` touching the same
//! file several times produces a single update.

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Kind of file change detected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Created,
    Modified,
    Deleted,
}

/// Debouncer that accumulates file changes within a time window
pub struct EventDebouncer {
    window: Duration,
    /// Pending changes by repo-relative path
    pending: HashMap<String, ChangeKind>,
    /// Time of the last event (any file)
    last_event: Option<Instant>,
}

impl EventDebouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: HashMap::new(),
            last_event: None,
        }
    }

    /// Add a file change event to the debouncer
    pub fn add_event(&mut self, path: impl Into<String>, kind: ChangeKind) {
        self.add_event_at(path.into(), kind, Instant::now());
    }

    fn add_event_at(&mut self, path: String, kind: ChangeKind, now: Instant) {
        self.last_event = Some(now);

        let Some(&existing) = self.pending.get(&path) else {
            self.pending.insert(path, kind);
            return;
        };

        let merged = match (existing, kind) {
            // Content written while being created
            (ChangeKind::Created, ChangeKind::Modified) => ChangeKind::Created,
            // Never seen by the index
            (ChangeKind::Created, ChangeKind::Deleted) => {
                self.pending.remove(&path);
                return;
            }
            // Replaced in place
            (ChangeKind::Deleted, ChangeKind::Created | ChangeKind::Modified) => ChangeKind::Modified,
            (_, newer) => newer,
        };
        self.pending.insert(path, merged);
    }

    /// Whether the debounce window has elapsed since the last event
    pub fn is_ready(&self) -> bool {
        self.last_event
            .is_some_and(|last| last.elapsed() >= self.window)
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Time until the pending batch is ready (`None` if nothing is pending)
    pub fn time_until_ready(&self) -> Option<Duration> {
        self.last_event
            .map(|last| self.window.saturating_sub(last.elapsed()))
    }

    /// Drain pending changes, sorted by path
    pub fn flush(&mut self) -> Vec<(String, ChangeKind)> {
        let mut batch: Vec<_> = self.pending.drain().collect();
        batch.sort_by(|a, b| a.0.cmp(&b.0));
        self.last_event = None;
        batch
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    fn quick() -> EventDebouncer {
        EventDebouncer::new(Duration::from_millis(30))
    }

    #[test]
    fn test_single_event() {
        let mut debouncer = quick();
        debouncer.add_event("test.rs", ChangeKind::Modified);

        assert!(debouncer.has_pending());
        assert_eq!(debouncer.pending_count(), 1);

        sleep(Duration::from_millis(40));
        assert!(debouncer.is_ready());

        assert_eq!(
            debouncer.flush(),
            vec![("test.rs".to_string(), ChangeKind::Modified)]
        );
        assert!(!debouncer.has_pending());
        assert!(!debouncer.is_ready());
    }

    #[test]
    fn test_create_then_modify() {
        let mut debouncer = quick();
        debouncer.add_event("a.ts", ChangeKind::Created);
        debouncer.add_event("a.ts", ChangeKind::Modified);
        assert_eq!(debouncer.flush(), vec![("a.ts".to_string(), ChangeKind::Created)]);
    }

    #[test]
    fn test_create_then_delete_cancels() {
        let mut debouncer = quick();
        debouncer.add_event("tmp.ts", ChangeKind::Created);
        debouncer.add_event("tmp.ts", ChangeKind::Deleted);
        assert!(debouncer.flush().is_empty());
    }

    #[test]
    fn test_delete_then_create_is_modify() {
        let mut debouncer = quick();
        debouncer.add_event("a.ts", ChangeKind::Deleted);
        debouncer.add_event("a.ts", ChangeKind::Created);
        assert_eq!(debouncer.flush(), vec![("a.ts".to_string(), ChangeKind::Modified)]);
    }

    #[test]
    fn test_modify_then_delete() {
        let mut debouncer = quick();
        debouncer.add_event("a.ts", ChangeKind::Modified);
        debouncer.add_event("a.ts", ChangeKind::Deleted);
        assert_eq!(debouncer.flush(), vec![("a.ts".to_string(), ChangeKind::Deleted)]);
    }

    #[test]
    fn test_flush_is_sorted() {
        let mut debouncer = quick();
        debouncer.add_event("c.rs", ChangeKind::Deleted);
        debouncer.add_event("a.rs", ChangeKind::Created);
        debouncer.add_event("b.rs", ChangeKind::Modified);

        let paths: Vec<_> = debouncer.flush().into_iter().map(|(p, _)| p).collect();
        assert_eq!(paths, vec!["a.rs", "b.rs", "c.rs"]);
    }

    #[test]
    fn test_not_ready_immediately() {
        let mut debouncer = EventDebouncer::new(Duration::from_secs(10));
        assert_eq!(debouncer.time_until_ready(), None);
        debouncer.add_event("test.rs", ChangeKind::Modified);

        assert!(!debouncer.is_ready());
        assert!(debouncer.time_until_ready().unwrap() > Duration::ZERO);
    }
}
