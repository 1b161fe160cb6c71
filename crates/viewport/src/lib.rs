//! Viewport geometry for the page viewer.
//!
//! Pure math shared by the scheduler and the viewer session: zoom-mode to
//! render-scale conversion, page layout offsets, and viewport visibility
//! tracking. Nothing in this crate touches the renderer or allocates
//! surfaces.

pub mod layout;
pub mod visibility;
pub mod zoom;

pub use layout::PageLayout;
pub use visibility::{IntersectionObservation, VisibilityConfig, VisibilityTracker};
pub use zoom::{anchored_scroll_offset, render_scale, ScaleConfig, ZoomMode};
