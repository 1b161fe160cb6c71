//! Text layer synthesis.
//!
//! Builds the invisible selection layer for a page: each glyph run from the
//! page's text content becomes a transparent, absolutely positioned text
//! node aligned pixel-for-pixel with the rendered bitmap, so native
//! selection and copy work on top of it. The layer is rebuilt from scratch
//! on every render; per-page node counts are small enough that diffing is
//! not worth it.

use crate::error::{RenderError, RenderResult};
use crate::page::{GlyphRun, PageViewport};
use crate::surface::{TextNode, TextTarget};

/// Deviation from 1.0 past which a horizontal corrective scale is emitted.
const SCALE_X_TOLERANCE: f64 = 1e-3;

/// Rotation below this is treated as axis-aligned.
const ROTATION_TOLERANCE: f64 = 1e-6;

/// Compose two affine transforms: the result applies `inner` first, then
/// `outer`.
pub fn compose(outer: &[f64; 6], inner: &[f64; 6]) -> [f64; 6] {
    [
        outer[0] * inner[0] + outer[2] * inner[1],
        outer[1] * inner[0] + outer[3] * inner[1],
        outer[0] * inner[2] + outer[2] * inner[3],
        outer[1] * inner[2] + outer[3] * inner[3],
        outer[0] * inner[4] + outer[2] * inner[5] + outer[4],
        outer[1] * inner[4] + outer[3] * inner[5] + outer[5],
    ]
}

/// Synthesize the text layer for one page into `target`.
///
/// `viewport` must be the viewport the bitmap was rendered with, otherwise
/// the nodes will not line up. Returns the number of nodes produced.
///
/// Position math: the composed transform is baseline-anchored (document
/// convention) while text boxes are top-anchored, so the font size is
/// subtracted from the computed y. The font size itself is the magnitude of
/// the composed transform's vertical scale component.
pub fn synthesize_text_layer(
    runs: &[GlyphRun],
    viewport: &PageViewport,
    target: &mut dyn TextTarget,
) -> RenderResult<usize> {
    target.clear();

    let mut count = 0;
    for run in runs {
        if run.text.is_empty() {
            continue;
        }

        let t = compose(&viewport.transform, &run.transform);
        if t.iter().any(|component| !component.is_finite()) {
            return Err(RenderError::TextLayerFailed(format!(
                "non-finite composed transform for run {:?}",
                run.text
            )));
        }

        let font_size = (t[2] * t[2] + t[3] * t[3]).sqrt();
        if font_size <= 0.0 {
            return Err(RenderError::TextLayerFailed(format!(
                "degenerate vertical scale for run {:?}",
                run.text
            )));
        }

        let angle = t[1].atan2(t[0]);
        let horizontal = (t[0] * t[0] + t[1] * t[1]).sqrt();
        let scale_x = if (horizontal / font_size - 1.0).abs() > SCALE_X_TOLERANCE {
            (horizontal / font_size) as f32
        } else {
            1.0
        };
        let rotation_deg =
            if angle.abs() > ROTATION_TOLERANCE { angle.to_degrees() as f32 } else { 0.0 };

        target.push(TextNode {
            text: run.text.clone(),
            left: t[4] as f32,
            // Baseline-anchored transform, top-anchored text box.
            top: (t[5] - font_size) as f32,
            font_size: font_size as f32,
            font_name: run.font_name.clone(),
            rotation_deg,
            scale_x,
        });
        count += 1;
    }

    Ok(count)
}
