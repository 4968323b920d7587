//! Deferred action queue.
//!
//! Work that depends on layout (sizing an image request to its container,
//! jumping to a page before the pager has been measured) cannot run at the
//! moment it is requested. Such work is posted to a [`DeferredQueue`] and
//! drained by its owner once the layout pass has completed ("next tick").
//!
//! The queue is generic over the action type. Owners that need mutable access
//! to themselves while applying an action queue plain values; self-contained
//! jobs can be queued as boxed closures.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};

/// A unique identifier for a deferred task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

impl TaskId {
    /// Get the raw u64 value of this task ID.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

/// Global counter for generating unique task IDs.
static NEXT_TASK_ID: AtomicU64 = AtomicU64::new(1);

fn next_task_id() -> TaskId {
    TaskId(NEXT_TASK_ID.fetch_add(1, Ordering::Relaxed))
}

#[derive(Debug)]
struct Pending<A> {
    id: TaskId,
    action: A,
}

/// An ordered queue of deferred actions.
#[derive(Debug)]
pub struct DeferredQueue<A> {
    tasks: VecDeque<Pending<A>>,
}

impl<A> DeferredQueue<A> {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self {
            tasks: VecDeque::new(),
        }
    }

    /// Post an action to run on the next drain.
    ///
    /// Returns the task ID that can be used to cancel it.
    pub fn post(&mut self, action: A) -> TaskId {
        let id = next_task_id();
        self.tasks.push_back(Pending { id, action });
        id
    }

    /// Cancel a pending action.
    ///
    /// Returns `true` if the action was found and removed.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        if let Some(pos) = self.tasks.iter().position(|t| t.id == id) {
            self.tasks.remove(pos);
            true
        } else {
            false
        }
    }

    /// Drop every pending action matching `predicate`.
    ///
    /// Returns the number of actions removed.
    pub fn cancel_where<F>(&mut self, mut predicate: F) -> usize
    where
        F: FnMut(&A) -> bool,
    {
        let before = self.tasks.len();
        self.tasks.retain(|t| !predicate(&t.action));
        before - self.tasks.len()
    }

    /// Drop every pending action.
    pub fn clear(&mut self) {
        self.tasks.clear();
    }

    /// Check if there are any pending actions.
    pub fn has_pending(&self) -> bool {
        !self.tasks.is_empty()
    }

    /// Get the number of pending actions.
    pub fn pending_count(&self) -> usize {
        self.tasks.len()
    }

    /// Remove and return every pending action in posting order.
    ///
    /// Actions posted while the returned batch is being applied land in the
    /// queue again and wait for the following drain.
    pub fn take_all(&mut self) -> Vec<A> {
        self.tasks.drain(..).map(|t| t.action).collect()
    }
}

impl<A: PartialEq> DeferredQueue<A> {
    /// Post an action unless an equal one is already pending.
    ///
    /// Returns the ID of the new or already-pending task.
    pub fn post_unique(&mut self, action: A) -> TaskId {
        if let Some(existing) = self.tasks.iter().find(|t| t.action == action) {
            return existing.id;
        }
        self.post(action)
    }
}

impl<A> Default for DeferredQueue<A> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum Action {
        Refresh,
        GoTo(usize),
    }

    #[test]
    fn test_take_all_preserves_order() {
        let mut queue = DeferredQueue::new();
        queue.post(Action::GoTo(3));
        queue.post(Action::Refresh);
        queue.post(Action::GoTo(1));

        assert_eq!(queue.pending_count(), 3);
        assert_eq!(
            queue.take_all(),
            vec![Action::GoTo(3), Action::Refresh, Action::GoTo(1)]
        );
        assert!(!queue.has_pending());
    }

    #[test]
    fn test_cancel() {
        let mut queue = DeferredQueue::new();
        let first = queue.post(Action::GoTo(0));
        queue.post(Action::GoTo(1));

        assert!(queue.cancel(first));
        assert!(!queue.cancel(first));
        assert_eq!(queue.take_all(), vec![Action::GoTo(1)]);
    }

    #[test]
    fn test_post_unique_deduplicates() {
        let mut queue = DeferredQueue::new();
        let a = queue.post_unique(Action::Refresh);
        let b = queue.post_unique(Action::Refresh);
        queue.post_unique(Action::GoTo(2));

        assert_eq!(a, b);
        assert_eq!(queue.pending_count(), 2);
    }

    #[test]
    fn test_cancel_where() {
        let mut queue = DeferredQueue::new();
        queue.post(Action::GoTo(0));
        queue.post(Action::Refresh);
        queue.post(Action::GoTo(4));

        let removed = queue.cancel_where(|a| matches!(a, Action::GoTo(_)));
        assert_eq!(removed, 2);
        assert_eq!(queue.take_all(), vec![Action::Refresh]);
    }
}
