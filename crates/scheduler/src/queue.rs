//! Priority queue with one slot per page.
//!
//! Tasks are ordered by ascending priority rank, FIFO within the same rank.
//! Each page owns a single queued slot: scheduling a page that is already
//! queued cancels the old task and replaces it (superseding cancellation).
//! A task that has been popped is in flight and can no longer be superseded;
//! a newer request for its page simply queues behind it.

use crate::cancel::CancellationToken;
use crate::task::{RenderHandle, RenderPriority, SchedulerStats, TaskStatus};
use log::debug;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::{Arc, Mutex};

struct QueuedEntry<T> {
    page_number: u32,
    priority: RenderPriority,
    seq: u64,
    payload: T,
    handle: RenderHandle,
}

impl<T> PartialEq for QueuedEntry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.seq == other.seq
    }
}

impl<T> Eq for QueuedEntry<T> {}

impl<T> PartialOrd for QueuedEntry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for QueuedEntry<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; reverse both fields so the lowest rank
        // pops first and ties pop in insertion order.
        match other.priority.rank().cmp(&self.priority.rank()) {
            Ordering::Equal => other.seq.cmp(&self.seq),
            ordering => ordering,
        }
    }
}

#[derive(Default)]
struct StatsInner {
    scheduled: u64,
    completed: u64,
    cancelled: u64,
    failed: u64,
}

struct QueueState<T> {
    heap: BinaryHeap<QueuedEntry<T>>,
    seq: u64,
}

/// Render queue keyed by page number.
///
/// The payload type carries whatever the executor needs to run the task
/// (scale, surface, text target); the queue itself only orders and
/// supersedes.
pub struct RenderQueue<T> {
    state: Mutex<QueueState<T>>,
    stats: Arc<Mutex<StatsInner>>,
}

impl<T> RenderQueue<T> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(QueueState { heap: BinaryHeap::new(), seq: 0 }),
            stats: Arc::new(Mutex::new(StatsInner::default())),
        }
    }

    /// Queue a render for a page, superseding any queued task for the same
    /// page.
    ///
    /// The superseded task's handle settles `Cancelled` and its token is
    /// cancelled. Returns the handle for the new task.
    pub fn schedule(&self, page_number: u32, priority: RenderPriority, payload: T) -> RenderHandle {
        let handle = RenderHandle::new(CancellationToken::new());

        let mut state = self.state.lock().unwrap();
        let superseded = Self::drain_matching(&mut state.heap, |entry| {
            entry.page_number == page_number
        });

        let seq = state.seq;
        state.seq += 1;
        state.heap.push(QueuedEntry {
            page_number,
            priority,
            seq,
            payload,
            handle: handle.clone(),
        });
        drop(state);

        let mut stats = self.stats.lock().unwrap();
        stats.scheduled += 1;
        for old in superseded {
            debug!("superseding queued render for page {}", page_number);
            old.handle.token().cancel();
            old.handle.settle(TaskStatus::Cancelled);
            stats.cancelled += 1;
        }

        handle
    }

    /// Pop the most urgent live task.
    ///
    /// Tasks whose token was cancelled while queued settle `Cancelled` here
    /// and are skipped.
    pub fn pop(&self) -> Option<ScheduledTask<T>> {
        let mut state = self.state.lock().unwrap();

        while let Some(entry) = state.heap.pop() {
            if entry.handle.token().is_cancelled() {
                entry.handle.settle(TaskStatus::Cancelled);
                self.stats.lock().unwrap().cancelled += 1;
                continue;
            }

            return Some(ScheduledTask {
                page_number: entry.page_number,
                priority: entry.priority,
                payload: entry.payload,
                handle: entry.handle,
                stats: self.stats.clone(),
            });
        }

        None
    }

    /// Cancel the queued task for one page, if any.
    pub fn cancel_page(&self, page_number: u32) -> bool {
        self.cancel_where(|page| page == page_number) > 0
    }

    /// Cancel every queued task whose page fails the predicate.
    ///
    /// Used to prune the queue when pages leave the render buffer. Returns
    /// the number of tasks cancelled.
    pub fn retain_pages<F>(&self, keep: F) -> usize
    where
        F: Fn(u32) -> bool,
    {
        self.cancel_where(|page| !keep(page))
    }

    /// Cancel all queued tasks. Used on viewer teardown.
    pub fn clear(&self) -> usize {
        self.cancel_where(|_| true)
    }

    pub fn has_queued(&self, page_number: u32) -> bool {
        let state = self.state.lock().unwrap();
        state.heap.iter().any(|entry| entry.page_number == page_number)
    }

    /// Pages with a queued task, in arbitrary order.
    pub fn queued_pages(&self) -> Vec<u32> {
        let state = self.state.lock().unwrap();
        state.heap.iter().map(|entry| entry.page_number).collect()
    }

    pub fn len(&self) -> usize {
        self.state.lock().unwrap().heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().unwrap().heap.is_empty()
    }

    pub fn stats(&self) -> SchedulerStats {
        let queue_size = self.len();
        let stats = self.stats.lock().unwrap();
        SchedulerStats {
            tasks_scheduled: stats.scheduled,
            tasks_completed: stats.completed,
            tasks_cancelled: stats.cancelled,
            tasks_failed: stats.failed,
            queue_size,
        }
    }

    fn cancel_where<F>(&self, predicate: F) -> usize
    where
        F: Fn(u32) -> bool,
    {
        let mut state = self.state.lock().unwrap();
        let removed = Self::drain_matching(&mut state.heap, |entry| predicate(entry.page_number));
        drop(state);

        let count = removed.len();
        if count > 0 {
            let mut stats = self.stats.lock().unwrap();
            for entry in removed {
                debug!("cancelling queued render for page {}", entry.page_number);
                entry.handle.token().cancel();
                entry.handle.settle(TaskStatus::Cancelled);
                stats.cancelled += 1;
            }
        }

        count
    }

    fn drain_matching<F>(
        heap: &mut BinaryHeap<QueuedEntry<T>>,
        predicate: F,
    ) -> Vec<QueuedEntry<T>>
    where
        F: Fn(&QueuedEntry<T>) -> bool,
    {
        let mut matched = Vec::new();
        let mut remaining = Vec::with_capacity(heap.len());

        while let Some(entry) = heap.pop() {
            if predicate(&entry) {
                matched.push(entry);
            } else {
                remaining.push(entry);
            }
        }

        *heap = remaining.into_iter().collect();
        matched
    }
}

impl<T> Default for RenderQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// A task popped from the queue, ready to execute.
///
/// The executor drives the task to a terminal state through exactly one of
/// `complete`, `fail`, or `cancel`; dropping it without settling leaves the
/// handle `Running`, which the caller-facing status treats as still pending.
pub struct ScheduledTask<T> {
    pub page_number: u32,
    pub priority: RenderPriority,
    pub payload: T,
    handle: RenderHandle,
    stats: Arc<Mutex<StatsInner>>,
}

impl<T> ScheduledTask<T> {
    pub fn handle(&self) -> RenderHandle {
        self.handle.clone()
    }

    pub fn token(&self) -> CancellationToken {
        self.handle.token()
    }

    pub fn is_cancelled(&self) -> bool {
        self.handle.token().is_cancelled()
    }

    /// Mark the task as executing.
    pub fn mark_running(&self) {
        self.handle.mark_running();
    }

    pub fn complete(self) {
        self.handle.settle(TaskStatus::Completed);
        self.stats.lock().unwrap().completed += 1;
    }

    pub fn fail(self, reason: impl Into<String>) {
        self.handle.settle(TaskStatus::Failed(reason.into()));
        self.stats.lock().unwrap().failed += 1;
    }

    pub fn cancel(self) {
        self.handle.token().cancel();
        self.handle.settle(TaskStatus::Cancelled);
        self.stats.lock().unwrap().cancelled += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pop_orders_by_priority_then_fifo() {
        let queue: RenderQueue<()> = RenderQueue::new();

        // Page 5 visible, pages 1-3 and 6-8 in the buffer.
        for page in [1, 2, 3] {
            queue.schedule(page, RenderPriority::Buffer, ());
        }
        queue.schedule(5, RenderPriority::Visible, ());
        for page in [6, 7, 8] {
            queue.schedule(page, RenderPriority::Buffer, ());
        }

        let mut order = Vec::new();
        while let Some(task) = queue.pop() {
            order.push(task.page_number);
            task.complete();
        }

        assert_eq!(order, vec![5, 1, 2, 3, 6, 7, 8]);
    }

    #[test]
    fn test_schedule_supersedes_queued_same_page() {
        let queue: RenderQueue<f32> = RenderQueue::new();

        let first = queue.schedule(7, RenderPriority::Visible, 1.0);
        let second = queue.schedule(7, RenderPriority::Visible, 2.0);

        assert_eq!(first.status(), TaskStatus::Cancelled);
        assert_eq!(second.status(), TaskStatus::Queued);
        assert_eq!(queue.len(), 1);

        let task = queue.pop().unwrap();
        assert_eq!(task.payload, 2.0);
        task.complete();
        assert_eq!(second.status(), TaskStatus::Completed);
    }

    #[test]
    fn test_in_flight_task_is_not_superseded() {
        let queue: RenderQueue<f32> = RenderQueue::new();

        let first = queue.schedule(7, RenderPriority::Visible, 1.0);
        let in_flight = queue.pop().unwrap();

        // A newer request queues behind the in-flight task.
        let second = queue.schedule(7, RenderPriority::Visible, 2.0);
        assert!(!in_flight.is_cancelled());
        assert_eq!(second.status(), TaskStatus::Queued);

        in_flight.complete();
        assert_eq!(first.status(), TaskStatus::Completed);
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_pop_skips_tasks_cancelled_via_handle() {
        let queue: RenderQueue<()> = RenderQueue::new();

        let doomed = queue.schedule(1, RenderPriority::Visible, ());
        queue.schedule(2, RenderPriority::Buffer, ());
        doomed.cancel();

        let task = queue.pop().unwrap();
        assert_eq!(task.page_number, 2);
        assert_eq!(doomed.status(), TaskStatus::Cancelled);
        task.complete();
    }

    #[test]
    fn test_retain_pages_prunes_the_buffer() {
        let queue: RenderQueue<()> = RenderQueue::new();
        let handles: Vec<_> =
            (0..6).map(|page| queue.schedule(page, RenderPriority::Buffer, ())).collect();

        let cancelled = queue.retain_pages(|page| (2..=4).contains(&page));
        assert_eq!(cancelled, 3);

        for (page, handle) in handles.iter().enumerate() {
            let expect_cancelled = !(2..=4).contains(&(page as u32));
            assert_eq!(handle.is_cancelled(), expect_cancelled, "page {}", page);
        }
        assert_eq!(queue.len(), 3);
    }

    #[test]
    fn test_cancel_page_only_touches_that_page() {
        let queue: RenderQueue<()> = RenderQueue::new();
        queue.schedule(1, RenderPriority::Visible, ());
        queue.schedule(2, RenderPriority::Visible, ());

        assert!(queue.cancel_page(1));
        assert!(!queue.cancel_page(9));
        assert_eq!(queue.queued_pages(), vec![2]);
    }

    #[test]
    fn test_clear_cancels_everything() {
        let queue: RenderQueue<()> = RenderQueue::new();
        let a = queue.schedule(1, RenderPriority::Visible, ());
        let b = queue.schedule(2, RenderPriority::Buffer, ());

        assert_eq!(queue.clear(), 2);
        assert!(queue.is_empty());
        assert!(a.is_cancelled());
        assert!(b.is_cancelled());
    }

    #[test]
    fn test_stats_track_outcomes() {
        let queue: RenderQueue<()> = RenderQueue::new();

        queue.schedule(1, RenderPriority::Visible, ());
        queue.schedule(1, RenderPriority::Visible, ()); // supersedes
        queue.schedule(2, RenderPriority::Buffer, ());

        let task = queue.pop().unwrap();
        task.complete();
        let task = queue.pop().unwrap();
        task.fail("renderer exploded");

        let stats = queue.stats();
        assert_eq!(stats.tasks_scheduled, 3);
        assert_eq!(stats.tasks_completed, 1);
        assert_eq!(stats.tasks_cancelled, 1);
        assert_eq!(stats.tasks_failed, 1);
        assert_eq!(stats.queue_size, 0);
    }

    #[test]
    fn test_failed_reason_is_preserved() {
        let queue: RenderQueue<()> = RenderQueue::new();
        let handle = queue.schedule(3, RenderPriority::Visible, ());

        let task = queue.pop().unwrap();
        task.fail("page object missing");

        assert_eq!(handle.status(), TaskStatus::Failed("page object missing".into()));
    }
}
