//! Page render scheduling.
//!
//! Scheduling mechanism for the page viewer: cooperative cancellation
//! tokens, task handles with a settle-once status, and a priority queue that
//! keeps at most one queued task per page. A newer request for an
//! already-queued page supersedes the old task; in-flight tasks are never
//! preempted. Execution itself lives with the viewer session, which pumps
//! exactly one task at a time.
//!
//! # Example
//!
//! ```
//! use pageflow_scheduler::{RenderPriority, RenderQueue, TaskStatus};
//!
//! let queue: RenderQueue<f32> = RenderQueue::new();
//!
//! let stale = queue.schedule(5, RenderPriority::Visible, 1.0);
//! let fresh = queue.schedule(5, RenderPriority::Visible, 1.5);
//!
//! // The older request for page 5 was superseded.
//! assert_eq!(stale.status(), TaskStatus::Cancelled);
//!
//! let task = queue.pop().unwrap();
//! assert_eq!(task.payload, 1.5);
//! task.complete();
//! assert_eq!(fresh.status(), TaskStatus::Completed);
//! ```

mod cancel;
pub mod frame_budget;
mod queue;
mod task;

pub use cancel::CancellationToken;
pub use frame_budget::{FrameBudget, FRAME_BUDGET_120FPS, FRAME_BUDGET_60FPS};
pub use queue::{RenderQueue, ScheduledTask};
pub use task::{RenderHandle, RenderPriority, SchedulerStats, TaskStatus};
