//! Aggregate task store.
//!
//! Holds the master list of comment tasks from the last reload and the
//! filtered view derived from it. The master list is always replaced
//! wholesale; the view is only ever written with a freshly computed filter
//! result, and every write is broadcast to subscribers.

use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::task::{RawExternalTask, TaskRecord};

/// Shared, immutable snapshot of the filtered view.
pub type TaskView = Arc<Vec<TaskRecord>>;

/// Outcome of a reload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReloadSummary {
    /// Records kept.
    pub accepted: usize,
    /// Non-comment records dropped.
    pub non_comment: usize,
    /// Comment records that failed conversion.
    pub malformed: usize,
}

/// Master task list plus the observable filtered view.
#[derive(Debug)]
pub struct TaskStore {
    all: Vec<TaskRecord>,
    filtered: watch::Sender<TaskView>,
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        let (filtered, _) = watch::channel(Arc::new(Vec::new()));
        Self {
            all: Vec::new(),
            filtered,
        }
    }

    /// Replace the master list from a raw snapshot.
    ///
    /// Only comment-category records are kept. A record that cannot be
    /// converted is skipped on its own; the rest of the reload goes ahead.
    pub fn reload_from<I>(&mut self, raw: I) -> ReloadSummary
    where
        I: IntoIterator<Item = RawExternalTask>,
    {
        let mut summary = ReloadSummary::default();
        let mut tasks = Vec::new();

        for record in raw {
            if !record.is_comment() {
                summary.non_comment += 1;
                continue;
            }
            match TaskRecord::from_raw(&record) {
                Ok(task) => tasks.push(task),
                Err(e) => {
                    summary.malformed += 1;
                    warn!("Skipping task record: {e}");
                }
            }
        }

        summary.accepted = tasks.len();
        self.all = tasks;
        debug!(
            "Reloaded {} tasks ({} non-comment, {} malformed)",
            summary.accepted, summary.non_comment, summary.malformed
        );
        summary
    }

    /// Empty both the master list and the view.
    pub fn clear(&mut self) {
        self.all.clear();
        self.publish(Vec::new());
    }

    /// Master list in source order.
    #[must_use]
    pub fn all_tasks(&self) -> &[TaskRecord] {
        &self.all
    }

    /// Current filtered view.
    #[must_use]
    pub fn filtered_tasks(&self) -> TaskView {
        self.filtered.borrow().clone()
    }

    /// Replace the filtered view and notify subscribers.
    pub fn publish(&mut self, view: Vec<TaskRecord>) {
        self.filtered.send_replace(Arc::new(view));
    }

    /// Receiver that observes every view replacement.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<TaskView> {
        self.filtered.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario() -> Vec<RawExternalTask> {
        vec![
            RawExternalTask::new("Comment", "TODO: fix x", "a.cs", 10),
            RawExternalTask::new("Warning", "unused var", "a.cs", 3),
            RawExternalTask::new("Comment", "HACK: y", "b.cs", 1),
        ]
    }

    #[test]
    fn test_reload_keeps_comments_in_source_order() {
        let mut store = TaskStore::new();
        let summary = store.reload_from(scenario());
        assert_eq!(summary.accepted, 2);
        assert_eq!(summary.non_comment, 1);
        let tokens: Vec<&str> = store.all_tasks().iter().map(TaskRecord::token).collect();
        assert_eq!(tokens, vec!["TODO", "HACK"]);
    }

    #[test]
    fn test_malformed_record_skipped_alone() {
        let mut store = TaskStore::new();
        let summary = store.reload_from(vec![
            RawExternalTask::new("Comment", "TODO: ok", "/a.rs", 1),
            RawExternalTask::new("Comment", "TODO: no path", "", 2),
            RawExternalTask::new("Comment", "TODO: bad line", "/b.rs", 0),
            RawExternalTask::new("Comment", "HACK: ok", "/c.rs", 4),
        ]);
        assert_eq!(summary.accepted, 2);
        assert_eq!(summary.malformed, 2);
        assert_eq!(store.all_tasks().len(), 2);
    }

    #[test]
    fn test_reload_replaces_wholesale() {
        let mut store = TaskStore::new();
        store.reload_from(scenario());
        store.reload_from(vec![RawExternalTask::new("Comment", "UNDONE", "/z.rs", 9)]);
        assert_eq!(store.all_tasks().len(), 1);
        assert_eq!(store.all_tasks()[0].token(), "UNDONE");
    }

    #[test]
    fn test_clear_empties_both_and_notifies() {
        let mut store = TaskStore::new();
        store.reload_from(scenario());
        store.publish(store.all_tasks().to_vec());
        let mut rx = store.subscribe();
        assert_eq!(rx.borrow_and_update().len(), 2);

        store.clear();
        assert!(store.all_tasks().is_empty());
        assert!(store.filtered_tasks().is_empty());
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().is_empty());
    }

    #[test]
    fn test_publish_notifies_even_when_equal() {
        let mut store = TaskStore::new();
        let mut rx = store.subscribe();
        rx.borrow_and_update();
        store.publish(Vec::new());
        assert!(rx.has_changed().unwrap());
    }
}
