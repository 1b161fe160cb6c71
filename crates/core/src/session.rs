//! Viewer session: the single-flight render pump.
//!
//! Owns the render queue, the surface cache, the visibility tracker, and
//! the progressive zoom controller, and wires them together. Rendering is
//! strictly single-flight: `pump_one` pops the most urgent task and drives
//! it to completion before the next pop, so at most one page renders at a
//! time no matter how deep the queue gets. Superseding therefore only ever
//! applies to queued tasks; an in-flight render finishes and its result is
//! discarded if a newer scale was requested meanwhile.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Instant;

use log::{debug, warn};
use pageflow_cache::{CacheStats, SurfaceCache, DEFAULT_CACHE_CAPACITY};
use pageflow_render::{
    synthesize_text_layer, PageHandle, SharedSurface, SharedTextTarget,
};
use pageflow_scheduler::{
    FrameBudget, RenderHandle, RenderPriority, RenderQueue, SchedulerStats,
};
use pageflow_viewport::{
    render_scale, IntersectionObservation, PageLayout, ScaleConfig, VisibilityConfig,
    VisibilityTracker, ZoomMode,
};

use crate::progressive::{ProgressiveZoomController, DEFAULT_ZOOM_DEBOUNCE};

/// Session tunables.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Maximum number of rendered pages kept in the surface cache.
    pub cache_capacity: usize,

    /// Ratio of physical surface pixels to logical pixels.
    pub device_pixel_ratio: f32,

    /// Scales within this distance count as the same render.
    pub scale_epsilon: f32,

    /// Debounce window after the last zoom change before the crisp
    /// re-render.
    pub zoom_debounce: std::time::Duration,

    pub scale: ScaleConfig,

    pub visibility: VisibilityConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            device_pixel_ratio: 1.0,
            scale_epsilon: 0.01,
            zoom_debounce: DEFAULT_ZOOM_DEBOUNCE,
            scale: ScaleConfig::default(),
            visibility: VisibilityConfig::default(),
        }
    }
}

impl SessionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    pub fn with_device_pixel_ratio(mut self, ratio: f32) -> Self {
        self.device_pixel_ratio = ratio;
        self
    }

    pub fn with_scale_epsilon(mut self, epsilon: f32) -> Self {
        self.scale_epsilon = epsilon;
        self
    }

    pub fn with_zoom_debounce(mut self, window: std::time::Duration) -> Self {
        self.zoom_debounce = window;
        self
    }

    pub fn with_visibility(mut self, visibility: VisibilityConfig) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_scale_config(mut self, scale: ScaleConfig) -> Self {
        self.scale = scale;
        self
    }
}

/// Allocates surfaces and text targets on behalf of the session.
///
/// Implemented by the host UI, which owns the actual canvas elements. The
/// session never allocates pixel storage itself.
pub trait SurfaceProvider {
    fn surface_for(&self, page_number: u32) -> SharedSurface;

    fn text_target_for(&self, _page_number: u32) -> Option<SharedTextTarget> {
        None
    }
}

/// Payload carried by a queued render task.
pub struct RenderWork {
    /// Scale to render at.
    pub scale: f32,

    /// Surface the bitmap lands in.
    pub surface: SharedSurface,

    /// Optional selection-layer target, rebuilt after the bitmap.
    pub text_target: Option<SharedTextTarget>,
}

/// Result of pumping one task.
#[derive(Debug, Clone, PartialEq)]
pub enum PumpOutcome {
    /// Rendered and cached.
    Completed { page_number: u32 },

    /// Already cached at the requested scale; no render ran.
    CachedAtScale { page_number: u32 },

    /// Cancelled before or during the render.
    Cancelled { page_number: u32 },

    /// Renderer failure; the queue keeps going.
    Failed { page_number: u32, reason: String },
}

/// One open document in the viewer.
pub struct ViewerSession {
    config: SessionConfig,
    pages: HashMap<u32, Arc<dyn PageHandle>>,
    queue: RenderQueue<RenderWork>,
    cache: SurfaceCache,
    visibility: VisibilityTracker,
    zoom: ProgressiveZoomController,
    layout: PageLayout,
    zoom_mode: ZoomMode,
    container: (f32, f32),
    /// Last requested scale per page; renders that complete at an older
    /// scale are discarded instead of cached.
    latest_scale: HashMap<u32, f32>,
    /// Render buffer as of the last sync, for departure detection.
    last_buffer: BTreeSet<u32>,
}

impl ViewerSession {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            cache: SurfaceCache::new(config.cache_capacity),
            visibility: VisibilityTracker::new(config.visibility),
            zoom: ProgressiveZoomController::new(config.zoom_debounce),
            layout: PageLayout::new(Vec::new(), 0.0),
            zoom_mode: ZoomMode::FitWidth,
            container: (0.0, 0.0),
            pages: HashMap::new(),
            queue: RenderQueue::new(),
            latest_scale: HashMap::new(),
            last_buffer: BTreeSet::new(),
            config,
        }
    }

    pub fn insert_page(&mut self, page_number: u32, page: Arc<dyn PageHandle>) {
        self.pages.insert(page_number, page);
    }

    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    pub fn set_layout(&mut self, layout: PageLayout) {
        self.layout = layout;
    }

    pub fn set_container(&mut self, width: f32, height: f32) {
        self.container = (width, height);
    }

    pub fn set_zoom_mode(&mut self, mode: ZoomMode) {
        self.zoom_mode = mode;
    }

    pub fn zoom_mode(&self) -> ZoomMode {
        self.zoom_mode
    }

    /// Render scale for a page under the current zoom mode and container.
    pub fn scale_for_page(&self, page_number: u32) -> f32 {
        match self.pages.get(&page_number) {
            Some(page) => {
                let size = page.size();
                render_scale(
                    size.width,
                    size.height,
                    self.container.0,
                    self.container.1,
                    self.zoom_mode,
                    &self.config.scale,
                )
            }
            None => 1.0,
        }
    }

    pub fn observe_visibility(&mut self, batch: &[IntersectionObservation]) {
        self.visibility.observe(batch);
    }

    /// Scroll-driven fallback for missed intersection events; at most once
    /// per animation frame.
    pub fn reconcile_scroll(&mut self, scroll_offset: f32, viewport_height: f32, frame: u64) -> bool {
        self.visibility.reconcile_scroll(scroll_offset, viewport_height, &self.layout, frame)
    }

    pub fn current_page(&self) -> u32 {
        self.visibility.current_page()
    }

    pub fn visible_pages(&self) -> BTreeSet<u32> {
        self.visibility.visible_set()
    }

    /// Queue a render for one page, superseding any queued task for it.
    pub fn request_render(
        &mut self,
        page_number: u32,
        surface: SharedSurface,
        text_target: Option<SharedTextTarget>,
        scale: f32,
        priority: RenderPriority,
    ) -> RenderHandle {
        self.latest_scale.insert(page_number, scale);
        self.queue.schedule(page_number, priority, RenderWork { scale, surface, text_target })
    }

    /// Reconcile the render queue with the current render buffer.
    ///
    /// Queued work for pages outside the buffer is cancelled; buffered pages
    /// not cached at `scale` are scheduled, visible pages ahead of
    /// neighbors. Cached surfaces are re-rendered in place.
    pub fn sync_render_buffer(&mut self, provider: &dyn SurfaceProvider, scale: f32) {
        let page_count = self.layout.page_count().max(self.pages.len() as u32);
        let buffer = self.visibility.render_buffer(page_count);

        let pruned = self.queue.retain_pages(|page| buffer.contains(&page));
        if pruned > 0 {
            debug!("pruned {} queued renders outside the render buffer", pruned);
        }

        let departed: Vec<u32> =
            self.last_buffer.iter().copied().filter(|page| !buffer.contains(page)).collect();
        for page_number in departed {
            if self.zoom.page_left_buffer(page_number) {
                debug!("stretched page {} left the buffer; zoom gesture reset", page_number);
            }
            self.latest_scale.remove(&page_number);
        }

        for &page_number in &buffer {
            if !self.pages.contains_key(&page_number) {
                continue;
            }
            if self.cache.matches_scale(page_number, scale, self.config.scale_epsilon) {
                continue;
            }

            let priority = if self.visibility.is_visible(page_number) {
                RenderPriority::Visible
            } else {
                RenderPriority::Buffer
            };
            let surface = self
                .cache
                .get(page_number)
                .unwrap_or_else(|| provider.surface_for(page_number));
            let text_target = provider.text_target_for(page_number);
            self.request_render(page_number, surface, text_target, scale, priority);
        }

        self.last_buffer = buffer;
    }

    /// Apply a zoom change progressively.
    ///
    /// Cached pages in the buffer are stretched to the new display size for
    /// instant feedback; uncached ones render at the new scale right away.
    /// The crisp re-render of stretched pages waits for the debounce window
    /// (see [`Self::tick_zoom`]).
    pub fn zoom_to(&mut self, scale: f32, now: Instant, provider: &dyn SurfaceProvider) {
        let buffer: Vec<u32> = self.last_buffer.iter().copied().collect();

        for page_number in buffer {
            let Some(size) = self.pages.get(&page_number).map(|page| page.size()) else {
                continue;
            };

            if let Some(surface) = self.cache.get(page_number) {
                surface
                    .lock()
                    .unwrap()
                    .set_display_size(size.width * scale, size.height * scale);
                self.zoom.mark_stretched(page_number);
            } else {
                let priority = if self.visibility.is_visible(page_number) {
                    RenderPriority::Visible
                } else {
                    RenderPriority::Buffer
                };
                let surface = provider.surface_for(page_number);
                let text_target = provider.text_target_for(page_number);
                self.request_render(page_number, surface, text_target, scale, priority);
            }
        }

        self.zoom.on_zoom(scale, now);
    }

    /// Drive the zoom debounce. Once the window elapses, schedules the
    /// crisp re-render of the buffer at the settled scale. Returns whether
    /// the gesture settled this tick.
    pub fn tick_zoom(&mut self, now: Instant, provider: &dyn SurfaceProvider) -> bool {
        let Some(scale) = self.zoom.fire(now) else {
            return false;
        };

        debug!("zoom settled at {:.3}", scale);
        self.sync_render_buffer(provider, scale);
        true
    }

    pub fn has_pending_zoom(&self) -> bool {
        self.zoom.is_pending()
    }

    /// Pop and execute the most urgent render task.
    ///
    /// Returns `None` when the queue is empty. Exactly one render runs per
    /// call; this is the session's single-flight guarantee.
    pub fn pump_one(&mut self) -> Option<PumpOutcome> {
        let task = self.queue.pop()?;
        let page_number = task.page_number;

        let Some(page) = self.pages.get(&page_number).map(Arc::clone) else {
            warn!("render task for unregistered page {}", page_number);
            task.fail("page not registered");
            return Some(PumpOutcome::Failed {
                page_number,
                reason: "page not registered".into(),
            });
        };

        let scale = task.payload.scale;

        // Re-render at effectively the same scale is a no-op; refresh the
        // LRU position and settle.
        if self.cache.matches_scale(page_number, scale, self.config.scale_epsilon) {
            let _ = self.cache.get(page_number);
            task.complete();
            return Some(PumpOutcome::CachedAtScale { page_number });
        }

        task.mark_running();
        let viewport = page.viewport(scale);
        let dpr = self.config.device_pixel_ratio;
        let surface = Arc::clone(&task.payload.surface);

        {
            let mut locked = surface.lock().unwrap();
            locked.set_physical_size(
                (viewport.width * dpr).round() as u32,
                (viewport.height * dpr).round() as u32,
            );
            locked.set_display_size(viewport.width, viewport.height);
        }

        let token = task.token();
        let result = {
            let mut locked = surface.lock().unwrap();
            page.render(&mut *locked, &viewport, &token)
        };

        match result {
            Err(error) if error.is_cancelled() => {
                debug!("render of page {} cancelled", page_number);
                task.cancel();
                Some(PumpOutcome::Cancelled { page_number })
            }
            Err(error) => {
                warn!("render of page {} failed: {}", page_number, error);
                let reason = error.to_string();
                task.fail(reason.clone());
                Some(PumpOutcome::Failed { page_number, reason })
            }
            Ok(()) => {
                if token.is_cancelled() {
                    debug!("render of page {} cancelled after completion", page_number);
                    task.cancel();
                    return Some(PumpOutcome::Cancelled { page_number });
                }

                if let Some(target) = task.payload.text_target.as_ref() {
                    match page.text_content() {
                        Ok(runs) => {
                            let mut locked = target.lock().unwrap();
                            if let Err(error) =
                                synthesize_text_layer(&runs, &viewport, &mut *locked)
                            {
                                // Non-fatal: the bitmap stands, selection is
                                // just unavailable for this page.
                                warn!("text layer for page {} failed: {}", page_number, error);
                            }
                        }
                        Err(error) => {
                            warn!("text content for page {} failed: {}", page_number, error);
                        }
                    }
                }

                let fresh = self
                    .latest_scale
                    .get(&page_number)
                    .map(|latest| (latest - scale).abs() <= self.config.scale_epsilon)
                    .unwrap_or(true);
                if fresh {
                    self.cache.put(page_number, surface, scale);
                    self.zoom.clear_stretched(page_number);
                } else {
                    debug!(
                        "discarding render of page {} at superseded scale {:.3}",
                        page_number, scale
                    );
                }

                task.complete();
                Some(PumpOutcome::Completed { page_number })
            }
        }
    }

    /// Pump tasks until the queue empties or the frame budget runs out.
    pub fn pump_frame(&mut self, budget: &FrameBudget) -> Vec<PumpOutcome> {
        let mut outcomes = Vec::new();

        while !budget.is_exceeded() {
            match self.pump_one() {
                Some(outcome) => outcomes.push(outcome),
                None => break,
            }
        }

        outcomes
    }

    pub fn cache(&self) -> &SurfaceCache {
        &self.cache
    }

    pub fn queued_pages(&self) -> Vec<u32> {
        self.queue.queued_pages()
    }

    pub fn scheduler_stats(&self) -> SchedulerStats {
        self.queue.stats()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Cancel all queued work and release every cached surface.
    pub fn teardown(&mut self) {
        let cancelled = self.queue.clear();
        if cancelled > 0 {
            debug!("teardown cancelled {} queued renders", cancelled);
        }
        self.cache.clear();
        self.zoom.reset();
        self.latest_scale.clear();
        self.last_buffer.clear();
    }
}
