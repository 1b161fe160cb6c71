//! Viewer session for long scrollable documents.
//!
//! Ties the viewport math, the render scheduler, and the surface cache into
//! one session per open document. The session decides which pages deserve a
//! render (visible first, scroll neighbors next), pumps exactly one render
//! at a time, keeps a bounded number of rendered surfaces alive, and turns
//! continuous zoom gestures into a single crisp re-render via
//! stretch-then-settle.

mod progressive;
mod session;
#[cfg(test)]
mod test_support;

pub use progressive::{DebounceTimer, ProgressiveZoomController, DEFAULT_ZOOM_DEBOUNCE};
pub use session::{
    PumpOutcome, RenderWork, SessionConfig, SurfaceProvider, ViewerSession,
};

pub use pageflow_cache::{CacheStats, SurfaceCache};
pub use pageflow_render::{
    GlyphRun, PageHandle, PageSize, PageViewport, RenderError, RenderResult, SharedSurface,
    SharedTextTarget, Surface, TextNode, TextTarget,
};
pub use pageflow_scheduler::{
    CancellationToken, FrameBudget, RenderHandle, RenderPriority, SchedulerStats, TaskStatus,
};
pub use pageflow_viewport::{
    anchored_scroll_offset, render_scale, IntersectionObservation, PageLayout, ScaleConfig,
    VisibilityConfig, VisibilityTracker, ZoomMode,
};
