//! Caller-allocated drawing surfaces and text layer targets.

use std::sync::{Arc, Mutex};

/// A 2D drawable bitmap target allocated by the host, never by the core.
///
/// Physical size is the backing pixel buffer; display size is the logical
/// size the surface is presented at. The two differ by the device pixel
/// ratio, and the progressive zoom controller deliberately desynchronizes
/// them to stretch a stale bitmap while a re-render is pending.
pub trait Surface: Send {
    fn physical_size(&self) -> (u32, u32);

    fn display_size(&self) -> (f32, f32);

    /// Resize the backing pixel buffer. Existing content is discarded.
    fn set_physical_size(&mut self, width: u32, height: u32);

    /// Resize the presented size without touching the backing buffer.
    fn set_display_size(&mut self, width: f32, height: f32);

    /// Release the backing pixel storage: clear the pixels, then zero both
    /// sizes. Rendered-bitmap memory dominates footprint for large
    /// documents, so eviction must call this rather than merely dropping a
    /// reference.
    fn release(&mut self);
}

/// Shared handle to a surface; the cache, the queue, and the host UI all
/// hold clones of the same allocation.
pub type SharedSurface = Arc<Mutex<dyn Surface>>;

/// One transparent, absolutely positioned text node in the text layer.
///
/// Coordinates are in viewport (top-left origin) logical pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct TextNode {
    pub text: String,

    pub left: f32,

    /// Top edge; already converted from the baseline-anchored document
    /// transform.
    pub top: f32,

    pub font_size: f32,

    pub font_name: String,

    /// Rotation in degrees, clockwise in viewport space. Zero for
    /// axis-aligned text.
    pub rotation_deg: f32,

    /// Horizontal corrective scale applied so glyph shape is not distorted
    /// when the composed transform scales axes non-uniformly. 1.0 when no
    /// correction is needed.
    pub scale_x: f32,
}

/// Receives the synthesized text layer for one page.
///
/// Implemented by the host; typically backed by a pool of DOM-like text
/// elements. The layer is rebuilt from scratch on every render.
pub trait TextTarget: Send {
    /// Drop all nodes from the previous render.
    fn clear(&mut self);

    fn push(&mut self, node: TextNode);
}

/// Shared handle to a page's text target.
pub type SharedTextTarget = Arc<Mutex<dyn TextTarget>>;
