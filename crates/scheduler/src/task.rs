//! Render task priorities, status, and handles.

use crate::cancel::CancellationToken;
use std::sync::{Arc, Mutex};

/// Priority of a render task. Lower rank is more urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RenderPriority {
    /// Page currently intersecting the viewport.
    Visible,

    /// Scroll-adjacent neighbor kept warm in the render buffer.
    Buffer,

    /// Anything speculative; runs when nothing else is queued.
    Idle,
}

impl RenderPriority {
    pub fn rank(self) -> u8 {
        match self {
            Self::Visible => 0,
            Self::Buffer => 1,
            Self::Idle => 2,
        }
    }
}

/// Lifecycle of a render task as observed through its handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskStatus {
    /// Waiting in the queue.
    Queued,

    /// Popped by the executor and currently rendering.
    Running,

    /// Render and text layer finished.
    Completed,

    /// Superseded by a newer request, removed from the render buffer, or
    /// the renderer reported cancellation. Expected, not an error.
    Cancelled,

    /// Genuine renderer failure; does not stop the queue.
    Failed(String),
}

impl TaskStatus {
    /// Whether the task has reached a terminal state.
    pub fn is_settled(&self) -> bool {
        !matches!(self, Self::Queued | Self::Running)
    }
}

/// Completion handle for a scheduled render.
///
/// The handle is the caller-facing half of a task: it exposes the settle-once
/// status and lets the caller request cancellation. The owning queue or
/// executor performs the actual state transitions.
#[derive(Debug, Clone)]
pub struct RenderHandle {
    state: Arc<Mutex<TaskStatus>>,
    token: CancellationToken,
}

impl RenderHandle {
    pub(crate) fn new(token: CancellationToken) -> Self {
        Self { state: Arc::new(Mutex::new(TaskStatus::Queued)), token }
    }

    pub fn status(&self) -> TaskStatus {
        self.state.lock().unwrap().clone()
    }

    pub fn is_settled(&self) -> bool {
        self.status().is_settled()
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self.status(), TaskStatus::Cancelled)
    }

    /// Request cancellation of the underlying task.
    ///
    /// A queued task settles `Cancelled` the next time the queue sees it; an
    /// in-flight task is cancelled cooperatively through its token.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub(crate) fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub(crate) fn settle(&self, status: TaskStatus) {
        let mut state = self.state.lock().unwrap();
        if !state.is_settled() {
            *state = status;
        }
    }

    pub(crate) fn mark_running(&self) {
        let mut state = self.state.lock().unwrap();
        if *state == TaskStatus::Queued {
            *state = TaskStatus::Running;
        }
    }
}

/// Counters describing queue activity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    /// Tasks accepted by `schedule`.
    pub tasks_scheduled: u64,

    /// Tasks that settled `Completed`.
    pub tasks_completed: u64,

    /// Tasks that settled `Cancelled` (superseded, pruned, or renderer
    /// cancellation).
    pub tasks_cancelled: u64,

    /// Tasks that settled `Failed`.
    pub tasks_failed: u64,

    /// Tasks currently queued.
    pub queue_size: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_ranks_ascend() {
        assert!(RenderPriority::Visible.rank() < RenderPriority::Buffer.rank());
        assert!(RenderPriority::Buffer.rank() < RenderPriority::Idle.rank());
    }

    #[test]
    fn test_handle_settles_once() {
        let handle = RenderHandle::new(CancellationToken::new());
        assert_eq!(handle.status(), TaskStatus::Queued);

        handle.settle(TaskStatus::Cancelled);
        assert!(handle.is_cancelled());

        // Later transitions must not overwrite a settled status.
        handle.settle(TaskStatus::Completed);
        assert!(handle.is_cancelled());
    }

    #[test]
    fn test_mark_running_only_from_queued() {
        let handle = RenderHandle::new(CancellationToken::new());
        handle.mark_running();
        assert_eq!(handle.status(), TaskStatus::Running);

        handle.settle(TaskStatus::Completed);
        handle.mark_running();
        assert_eq!(handle.status(), TaskStatus::Completed);
    }

    #[test]
    fn test_cancel_reaches_the_token() {
        let token = CancellationToken::new();
        let handle = RenderHandle::new(token.clone());

        handle.cancel();
        assert!(token.is_cancelled());
        // Status itself settles when the queue observes the token.
        assert_eq!(handle.status(), TaskStatus::Queued);
    }
}
