//! Task cache - the last complete task list fetched from the server
//!
//! The cache is only ever replaced wholesale. Each list fetch takes a ticket
//! from [`TaskCache::begin_fetch`]; a response is applied only if its ticket
//! is newer than the last one applied, so a slow response that arrives after
//! a newer one is dropped instead of overwriting fresher data.

use crate::domain::{Task, TaskId};

/// Sequence stamp handed out per list fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FetchTicket(u64);

#[derive(Debug, Default)]
pub struct TaskCache {
    tasks: Vec<Task>,
    issued: u64,
    applied: u64,
}

impl TaskCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take a ticket for a fetch that is about to start
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.issued += 1;
        FetchTicket(self.issued)
    }

    /// Replace the snapshot with `tasks` unless a newer fetch already landed.
    ///
    /// Returns whether the snapshot was applied.
    pub fn complete_fetch(&mut self, ticket: FetchTicket, tasks: Vec<Task>) -> bool {
        if ticket.0 <= self.applied {
            return false;
        }
        self.applied = ticket.0;
        self.tasks = tasks;
        true
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Forget everything (sign-out). Outstanding tickets become stale.
    pub fn clear(&mut self) {
        self.tasks.clear();
        self.applied = self.issued;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_replaces_snapshot() {
        let mut cache = TaskCache::new();
        assert!(cache.tasks().is_empty());

        let ticket = cache.begin_fetch();
        assert!(cache.complete_fetch(ticket, vec![Task::new(1, "a"), Task::new(2, "b")]));
        assert_eq!(cache.tasks().len(), 2);

        let ticket = cache.begin_fetch();
        assert!(cache.complete_fetch(ticket, vec![Task::new(3, "c")]));
        assert_eq!(cache.tasks().len(), 1);
        assert_eq!(cache.get(3).map(|t| t.title.as_str()), Some("c"));
        assert!(cache.get(1).is_none());
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let mut cache = TaskCache::new();
        let first = cache.begin_fetch();
        let second = cache.begin_fetch();

        assert!(cache.complete_fetch(second, vec![Task::new(2, "new")]));
        assert!(!cache.complete_fetch(first, vec![Task::new(1, "old")]));
        assert_eq!(cache.tasks()[0].title, "new");
    }

    #[test]
    fn test_in_order_responses_both_apply() {
        let mut cache = TaskCache::new();
        let first = cache.begin_fetch();
        let second = cache.begin_fetch();

        assert!(cache.complete_fetch(first, vec![Task::new(1, "old")]));
        assert!(cache.complete_fetch(second, vec![Task::new(2, "new")]));
        assert_eq!(cache.tasks()[0].title, "new");
    }

    #[test]
    fn test_clear_invalidates_outstanding_fetches() {
        let mut cache = TaskCache::new();
        let ticket = cache.begin_fetch();
        cache.clear();

        assert!(!cache.complete_fetch(ticket, vec![Task::new(1, "late")]));
        assert!(cache.tasks().is_empty());
    }
}
