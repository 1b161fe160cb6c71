//! Shared fakes for session tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use pageflow_render::{
    GlyphRun, PageHandle, PageSize, PageViewport, RenderError, RenderResult, SharedSurface,
    SharedTextTarget, Surface, TextNode, TextTarget,
};
use pageflow_scheduler::CancellationToken;

use crate::session::SurfaceProvider;

/// Log of `(page_number, scale)` pairs in render order.
pub(crate) type RenderLog = Arc<Mutex<Vec<(u32, f32)>>>;

pub(crate) fn render_log() -> RenderLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub(crate) struct FakePage {
    page_number: u32,
    size: PageSize,
    log: RenderLog,
    fail: bool,
    self_cancel: bool,
    runs: Vec<GlyphRun>,
}

impl FakePage {
    pub(crate) fn new(page_number: u32, log: RenderLog) -> Self {
        Self {
            page_number,
            size: PageSize::new(612.0, 792.0),
            log,
            fail: false,
            self_cancel: false,
            runs: Vec::new(),
        }
    }

    pub(crate) fn with_size(mut self, width: f32, height: f32) -> Self {
        self.size = PageSize::new(width, height);
        self
    }

    pub(crate) fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Renderer that reports cancellation regardless of the token.
    pub(crate) fn self_cancelling(mut self) -> Self {
        self.self_cancel = true;
        self
    }

    pub(crate) fn with_runs(mut self, runs: Vec<GlyphRun>) -> Self {
        self.runs = runs;
        self
    }
}

impl PageHandle for FakePage {
    fn size(&self) -> PageSize {
        self.size
    }

    fn render(
        &self,
        _surface: &mut dyn Surface,
        viewport: &PageViewport,
        token: &CancellationToken,
    ) -> RenderResult<()> {
        if self.self_cancel || token.is_cancelled() {
            return Err(RenderError::Cancelled);
        }
        if self.fail {
            return Err(RenderError::RenderFailed("synthetic failure".into()));
        }

        self.log.lock().unwrap().push((self.page_number, viewport.scale));
        Ok(())
    }

    fn text_content(&self) -> RenderResult<Vec<GlyphRun>> {
        Ok(self.runs.clone())
    }
}

pub(crate) struct FakeSurface {
    physical: (u32, u32),
    display: (f32, f32),
}

impl FakeSurface {
    pub(crate) fn shared() -> SharedSurface {
        Arc::new(Mutex::new(FakeSurface { physical: (0, 0), display: (0.0, 0.0) }))
    }
}

impl Surface for FakeSurface {
    fn physical_size(&self) -> (u32, u32) {
        self.physical
    }

    fn display_size(&self) -> (f32, f32) {
        self.display
    }

    fn set_physical_size(&mut self, width: u32, height: u32) {
        self.physical = (width, height);
    }

    fn set_display_size(&mut self, width: f32, height: f32) {
        self.display = (width, height);
    }

    fn release(&mut self) {
        self.physical = (0, 0);
        self.display = (0.0, 0.0);
    }
}

pub(crate) struct FakeTextTarget {
    nodes: Arc<Mutex<Vec<TextNode>>>,
}

impl FakeTextTarget {
    /// Returns the target plus a handle to the nodes it collects.
    pub(crate) fn shared() -> (SharedTextTarget, Arc<Mutex<Vec<TextNode>>>) {
        let nodes = Arc::new(Mutex::new(Vec::new()));
        let target: SharedTextTarget =
            Arc::new(Mutex::new(FakeTextTarget { nodes: Arc::clone(&nodes) }));
        (target, nodes)
    }
}

impl TextTarget for FakeTextTarget {
    fn clear(&mut self) {
        self.nodes.lock().unwrap().clear();
    }

    fn push(&mut self, node: TextNode) {
        self.nodes.lock().unwrap().push(node);
    }
}

/// Hands out one stable surface per page, like a host holding canvas
/// elements.
#[derive(Default)]
pub(crate) struct FakeProvider {
    surfaces: Mutex<HashMap<u32, SharedSurface>>,
}

impl FakeProvider {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn surface(&self, page_number: u32) -> Option<SharedSurface> {
        self.surfaces.lock().unwrap().get(&page_number).map(Arc::clone)
    }
}

impl SurfaceProvider for FakeProvider {
    fn surface_for(&self, page_number: u32) -> SharedSurface {
        let mut surfaces = self.surfaces.lock().unwrap();
        Arc::clone(surfaces.entry(page_number).or_insert_with(FakeSurface::shared))
    }
}
