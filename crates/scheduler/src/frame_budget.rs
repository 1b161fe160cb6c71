//! Frame budget tracking for the pump loop.
//!
//! The viewer session pumps render tasks on the host event-loop thread.
//! Between tasks it checks a frame budget so a burst of queued work cannot
//! starve input handling. The budget bounds time *between* tasks only; a
//! single hung render still stalls the queue (see the session docs).

use std::time::{Duration, Instant};

/// Budget for 60 FPS displays (16.67ms).
pub const FRAME_BUDGET_60FPS: Duration = Duration::from_micros(16_667);

/// Budget for 120 FPS displays (8.33ms).
pub const FRAME_BUDGET_120FPS: Duration = Duration::from_micros(8_333);

/// Time reserved for event processing at the end of a frame.
pub const EVENT_PROCESSING_RESERVE: Duration = Duration::from_millis(5);

/// Tracks time spent in the current frame against a budget.
#[derive(Debug, Clone)]
pub struct FrameBudget {
    frame_start: Instant,
    budget: Duration,
    reserved: Duration,
}

impl FrameBudget {
    pub fn new(budget: Duration) -> Self {
        Self { frame_start: Instant::now(), budget, reserved: EVENT_PROCESSING_RESERVE }
    }

    pub fn for_60fps() -> Self {
        Self::new(FRAME_BUDGET_60FPS)
    }

    pub fn for_120fps() -> Self {
        Self::new(FRAME_BUDGET_120FPS)
    }

    pub fn with_reserved(mut self, reserved: Duration) -> Self {
        self.reserved = reserved;
        self
    }

    /// Restart the budget for a new frame.
    pub fn reset(&mut self) {
        self.frame_start = Instant::now();
    }

    pub fn elapsed(&self) -> Duration {
        self.frame_start.elapsed()
    }

    /// Time left before the frame should yield, zero once exceeded.
    pub fn remaining(&self) -> Duration {
        let available = self.budget.saturating_sub(self.reserved);
        available.saturating_sub(self.elapsed())
    }

    pub fn is_exceeded(&self) -> bool {
        self.remaining() == Duration::ZERO
    }
}
