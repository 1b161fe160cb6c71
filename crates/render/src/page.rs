//! Page handles and viewport math.

use crate::error::RenderResult;
use crate::surface::Surface;
use pageflow_scheduler::CancellationToken;

/// Intrinsic page size in document units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

impl PageSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Mapping from document space to surface pixels at a given scale.
///
/// Document coordinates have their origin at the bottom-left of the page
/// (points); the surface origin is top-left. The transform therefore scales
/// and flips the y axis.
#[derive(Debug, Clone, PartialEq)]
pub struct PageViewport {
    /// Viewport width in logical pixels.
    pub width: f32,

    /// Viewport height in logical pixels.
    pub height: f32,

    /// Scale from document units to logical pixels.
    pub scale: f32,

    /// Affine transform `[a, b, c, d, e, f]` mapping document space to
    /// viewport space: `x' = a·x + c·y + e`, `y' = b·x + d·y + f`.
    pub transform: [f64; 6],
}

impl PageViewport {
    pub fn new(page: PageSize, scale: f32) -> Self {
        let width = page.width * scale;
        let height = page.height * scale;
        let s = scale as f64;

        Self { width, height, scale, transform: [s, 0.0, 0.0, -s, 0.0, height as f64] }
    }
}

/// One run of positioned glyphs from a page's text content.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphRun {
    pub text: String,

    /// Local affine transform in document space; baseline-anchored.
    pub transform: [f64; 6],

    pub font_name: String,

    /// Advance width of the run in document units.
    pub width: f64,
}

impl GlyphRun {
    pub fn new(
        text: impl Into<String>,
        transform: [f64; 6],
        font_name: impl Into<String>,
        width: f64,
    ) -> Self {
        Self { text: text.into(), transform, font_name: font_name.into(), width }
    }
}

/// Handle to a single page, owned by the external rendering engine for the
/// document's lifetime.
pub trait PageHandle: Send + Sync {
    /// Intrinsic page size in document units.
    fn size(&self) -> PageSize;

    /// Viewport for this page at a render scale.
    fn viewport(&self, scale: f32) -> PageViewport {
        PageViewport::new(self.size(), scale)
    }

    /// Rasterize the page into the surface.
    ///
    /// The renderer checks the token cooperatively and returns
    /// `RenderError::Cancelled` when it stops early. The surface has already
    /// been sized by the caller.
    fn render(
        &self,
        surface: &mut dyn Surface,
        viewport: &PageViewport,
        token: &CancellationToken,
    ) -> RenderResult<()>;

    /// The page's positioned glyph runs, in content order.
    fn text_content(&self) -> RenderResult<Vec<GlyphRun>>;
}
