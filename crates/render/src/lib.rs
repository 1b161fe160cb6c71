//! Interface boundary to the external page renderer.
//!
//! Decoding and rasterization belong to an external engine; this crate
//! defines the traits the viewer talks through (`PageHandle`, `Surface`,
//! `TextTarget`), the viewport math shared with it, the render error
//! taxonomy, and the text layer synthesizer that aligns selectable text with
//! a rendered bitmap.

mod error;
mod page;
mod surface;
pub mod text_layer;

pub use error::{RenderError, RenderResult};
pub use page::{GlyphRun, PageHandle, PageSize, PageViewport};
pub use surface::{SharedSurface, SharedTextTarget, Surface, TextNode, TextTarget};
pub use text_layer::synthesize_text_layer;
