//! Viewport visibility tracking.
//!
//! Consumes intersection observations for page elements and maintains the
//! set of visible pages plus the single "current" page. Observation events
//! can be missed during programmatic scroll restoration, so a scroll-driven
//! fallback recomputes the state from the page layout, at most once per
//! animation frame.

use crate::layout::{neighbor_pages, PageLayout};
use std::collections::{BTreeSet, HashMap};

/// One intersection observation for a page element.
///
/// `ratio` is the fraction of the page area inside the viewport; zero means
/// the page no longer intersects.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionObservation {
    pub page_number: u32,
    pub ratio: f32,
}

impl IntersectionObservation {
    pub fn new(page_number: u32, ratio: f32) -> Self {
        Self { page_number, ratio }
    }
}

/// Tunables for visibility tracking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibilityConfig {
    /// Minimum intersection ratio for a page to become the current page.
    pub current_page_threshold: f32,

    /// How many scroll-adjacent neighbors on each side belong to the render
    /// buffer.
    pub buffer_radius: u32,
}

impl Default for VisibilityConfig {
    fn default() -> Self {
        Self { current_page_threshold: 0.45, buffer_radius: 2 }
    }
}

impl VisibilityConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_current_page_threshold(mut self, threshold: f32) -> Self {
        self.current_page_threshold = threshold;
        self
    }

    pub fn with_buffer_radius(mut self, radius: u32) -> Self {
        self.buffer_radius = radius;
        self
    }
}

/// Tracks which pages intersect the viewport and which one is current.
#[derive(Debug, Clone)]
pub struct VisibilityTracker {
    config: VisibilityConfig,
    ratios: HashMap<u32, f32>,
    current_page: u32,
    last_reconciled_frame: Option<u64>,
}

impl VisibilityTracker {
    pub fn new(config: VisibilityConfig) -> Self {
        Self { config, ratios: HashMap::new(), current_page: 0, last_reconciled_frame: None }
    }

    /// Apply one batch of intersection observations.
    ///
    /// Pages reported at zero ratio leave the visible set. The current page
    /// becomes the page with the highest ratio at or above the configured
    /// threshold; if no page qualifies the previous current page is kept so
    /// the value never flaps mid-scroll.
    pub fn observe(&mut self, batch: &[IntersectionObservation]) {
        for observation in batch {
            if observation.ratio > 0.0 {
                self.ratios.insert(observation.page_number, observation.ratio);
            } else {
                self.ratios.remove(&observation.page_number);
            }
        }

        self.recompute_current_page();
    }

    /// Scroll-driven fallback for missed observation events.
    ///
    /// Rebuilds the visible set and current page from the page layout and
    /// scroll position. Runs at most once per animation frame; returns
    /// whether it ran.
    pub fn reconcile_scroll(
        &mut self,
        scroll_offset: f32,
        viewport_height: f32,
        layout: &PageLayout,
        frame: u64,
    ) -> bool {
        if self.last_reconciled_frame == Some(frame) {
            return false;
        }
        self.last_reconciled_frame = Some(frame);

        if layout.is_empty() || viewport_height <= 0.0 {
            return true;
        }

        let window_start = scroll_offset.max(0.0);
        let window_end = window_start + viewport_height;
        let (first, last) = layout.pages_in_window(scroll_offset, viewport_height);

        self.ratios.clear();
        for page_number in first..=last {
            let page_start = layout.page_start_offset(page_number);
            let page_height = layout.page_height(page_number);
            let page_end = page_start + page_height;

            let overlap = page_end.min(window_end) - page_start.max(window_start);
            if overlap > 0.0 && page_height > 0.0 {
                self.ratios.insert(page_number, (overlap / page_height).min(1.0));
            }
        }

        self.current_page = layout.page_at_center(scroll_offset, viewport_height);
        true
    }

    /// Pages currently intersecting the viewport.
    pub fn visible_set(&self) -> BTreeSet<u32> {
        self.ratios.keys().copied().collect()
    }

    pub fn is_visible(&self, page_number: u32) -> bool {
        self.ratios.contains_key(&page_number)
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    /// Visible pages plus their scroll-adjacent neighbors, bounded to the
    /// document.
    pub fn render_buffer(&self, page_count: u32) -> BTreeSet<u32> {
        let mut buffer: BTreeSet<u32> = self
            .ratios
            .keys()
            .copied()
            .filter(|page| *page < page_count.max(1))
            .collect();

        if buffer.is_empty() && page_count > 0 {
            buffer.insert(self.current_page.min(page_count - 1));
        }

        let seeds: Vec<u32> = buffer.iter().copied().collect();
        for page in seeds {
            for neighbor in neighbor_pages(page, page_count, self.config.buffer_radius) {
                buffer.insert(neighbor);
            }
        }

        buffer
    }

    fn recompute_current_page(&mut self) {
        let threshold = self.config.current_page_threshold;
        let mut best: Option<(u32, f32)> = None;

        for (&page, &ratio) in &self.ratios {
            if ratio < threshold {
                continue;
            }

            match best {
                Some((best_page, best_ratio)) => {
                    if ratio > best_ratio || (ratio == best_ratio && page < best_page) {
                        best = Some((page, ratio));
                    }
                }
                None => best = Some((page, ratio)),
            }
        }

        if let Some((page, _)) = best {
            self.current_page = page;
        }
    }
}

impl Default for VisibilityTracker {
    fn default() -> Self {
        Self::new(VisibilityConfig::default())
    }
}
