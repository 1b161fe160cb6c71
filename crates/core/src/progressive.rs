//! Progressive zoom: stretch now, re-render after the gesture settles.
//!
//! Continuous zoom gestures fire many scale changes per second; rendering
//! every intermediate scale would saturate the render queue. Instead each
//! change immediately stretches the cached bitmaps to the new display size
//! (blurry but instant) and arms a debounce timer. Only when no further
//! change arrives inside the window does a crisp re-render run, at the last
//! requested scale.

use std::collections::HashSet;
use std::time::{Duration, Instant};

/// Debounce window after the last zoom change before the crisp re-render.
pub const DEFAULT_ZOOM_DEBOUNCE: Duration = Duration::from_millis(75);

/// Restartable single-deadline timer.
///
/// Driven by explicit `Instant`s rather than wall-clock reads so callers
/// control time in tests and tick loops.
#[derive(Debug, Clone)]
pub struct DebounceTimer {
    window: Duration,
    deadline: Option<Instant>,
}

impl DebounceTimer {
    pub fn new(window: Duration) -> Self {
        Self { window, deadline: None }
    }

    /// Start or restart the window from `now`.
    pub fn arm(&mut self, now: Instant) {
        self.deadline = Some(now + self.window);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Whether the window has elapsed. Fires at most once per arm.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// Tracks the pending scale and the set of stretched pages during a zoom
/// gesture.
#[derive(Debug, Clone)]
pub struct ProgressiveZoomController {
    timer: DebounceTimer,
    pending_scale: Option<f32>,
    stretched: HashSet<u32>,
}

impl ProgressiveZoomController {
    pub fn new(window: Duration) -> Self {
        Self { timer: DebounceTimer::new(window), pending_scale: None, stretched: HashSet::new() }
    }

    /// Record a zoom change and restart the debounce window.
    ///
    /// Rapid successive changes overwrite the pending scale; only the last
    /// one is ever rendered.
    pub fn on_zoom(&mut self, scale: f32, now: Instant) {
        self.pending_scale = Some(scale);
        self.timer.arm(now);
    }

    /// The scale the settled re-render will use, if a gesture is pending.
    pub fn pending_scale(&self) -> Option<f32> {
        self.pending_scale
    }

    pub fn is_pending(&self) -> bool {
        self.timer.is_armed()
    }

    /// Take the settled scale once the debounce window has elapsed.
    pub fn fire(&mut self, now: Instant) -> Option<f32> {
        if self.timer.fire(now) {
            self.pending_scale.take()
        } else {
            None
        }
    }

    /// Record that a page's cached bitmap was stretched to a new display
    /// size and awaits a crisp re-render.
    pub fn mark_stretched(&mut self, page_number: u32) {
        self.stretched.insert(page_number);
    }

    /// The page has been re-rendered crisply at the settled scale.
    pub fn clear_stretched(&mut self, page_number: u32) {
        self.stretched.remove(&page_number);
    }

    pub fn is_stretched(&self, page_number: u32) -> bool {
        self.stretched.contains(&page_number)
    }

    pub fn stretched_pages(&self) -> Vec<u32> {
        self.stretched.iter().copied().collect()
    }

    /// A page left the render buffer.
    ///
    /// If it was mid-stretch, its queued re-render is gone with it and the
    /// remaining stretched pages can no longer be trusted to settle, so the
    /// whole progressive state resets. Returns whether a reset happened.
    pub fn page_left_buffer(&mut self, page_number: u32) -> bool {
        if self.stretched.contains(&page_number) {
            self.reset();
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        self.timer.cancel();
        self.pending_scale = None;
        self.stretched.clear();
    }
}

impl Default for ProgressiveZoomController {
    fn default() -> Self {
        Self::new(DEFAULT_ZOOM_DEBOUNCE)
    }
}
