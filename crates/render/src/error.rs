//! Render error taxonomy.

use thiserror::Error;

/// Errors surfaced by the render pipeline.
///
/// `Cancelled` is an expected outcome of superseding or buffer pruning and
/// is never logged as an error. `RenderFailed` is surfaced per page without
/// stopping the queue. `TextLayerFailed` is non-fatal: the bitmap is still
/// shown, selection is just unavailable for that page.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// The task was superseded or the renderer reported cancellation.
    #[error("render cancelled")]
    Cancelled,

    /// Genuine renderer failure.
    #[error("render failed: {0}")]
    RenderFailed(String),

    /// Text layer synthesis failed; the rendered bitmap is unaffected.
    #[error("text layer failed: {0}")]
    TextLayerFailed(String),
}

impl RenderError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Result type for render operations.
pub type RenderResult<T> = Result<T, RenderError>;
