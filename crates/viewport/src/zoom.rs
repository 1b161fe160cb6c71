//! Zoom mode to render scale conversion.
//!
//! The render scale is always derived from the zoom mode plus the current
//! container size; it is never stored on its own.

/// How the user has asked the document to be zoomed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomMode {
    /// Page width fills the container width.
    FitWidth,

    /// Whole page fits inside the container.
    FitPage,

    /// Explicit percentage (100 = nominal size).
    Percent(u16),
}

/// Tunable constants for scale derivation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleConfig {
    /// Multiplier applied to fit-page so rounding never clips the page edge.
    pub fit_page_headroom: f32,

    /// Correction from the document's native unit to logical pixels for
    /// percentage zoom. Empirical; calibrate per target environment.
    pub percent_calibration: f32,
}

impl Default for ScaleConfig {
    fn default() -> Self {
        Self { fit_page_headroom: 1.03, percent_calibration: 2.1 }
    }
}

impl ScaleConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fit_page_headroom(mut self, headroom: f32) -> Self {
        self.fit_page_headroom = headroom;
        self
    }

    pub fn with_percent_calibration(mut self, calibration: f32) -> Self {
        self.percent_calibration = calibration;
        self
    }
}

/// Derive the render scale for a page inside a container.
///
/// Returns 1.0 when any dimension is non-positive rather than producing an
/// infinite or NaN scale.
pub fn render_scale(
    page_width: f32,
    page_height: f32,
    container_width: f32,
    container_height: f32,
    mode: ZoomMode,
    config: &ScaleConfig,
) -> f32 {
    if page_width <= 0.0 || page_height <= 0.0 {
        return 1.0;
    }

    match mode {
        ZoomMode::FitWidth => {
            if container_width <= 0.0 {
                return 1.0;
            }
            container_width / page_width
        }
        ZoomMode::FitPage => {
            if container_width <= 0.0 || container_height <= 0.0 {
                return 1.0;
            }
            let width_scale = container_width / page_width;
            let height_scale = container_height / page_height;
            width_scale.min(height_scale) * config.fit_page_headroom
        }
        ZoomMode::Percent(percent) => (percent as f32 / 100.0) * config.percent_calibration,
    }
}

/// Scroll offset that keeps the document point under the pointer fixed
/// across a zoom change.
///
/// Applied as an instantaneous scroll jump; animating it would flash the
/// unscaled page.
pub fn anchored_scroll_offset(
    old_offset: f32,
    pointer_offset: f32,
    old_scale: f32,
    new_scale: f32,
    scroll_height: f32,
    client_height: f32,
) -> f32 {
    if old_scale <= 0.0 || new_scale <= 0.0 {
        return old_offset;
    }

    let ratio = new_scale / old_scale;
    let target = old_offset * ratio + pointer_offset * (ratio - 1.0);
    let max_offset = (scroll_height - client_height).max(0.0);

    target.clamp(0.0, max_offset)
}
