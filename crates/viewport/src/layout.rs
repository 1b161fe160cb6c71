//! Vertical page layout in scroll space.
//!
//! Pages are stacked top to bottom with fixed spacing; all offsets are in
//! logical pixels at the current scale.

/// Heights and spacing of the laid-out pages.
#[derive(Debug, Clone, PartialEq)]
pub struct PageLayout {
    page_heights: Vec<f32>,
    spacing: f32,
}

impl PageLayout {
    pub fn new(page_heights: Vec<f32>, spacing: f32) -> Self {
        Self { page_heights, spacing }
    }

    pub fn page_count(&self) -> u32 {
        self.page_heights.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.page_heights.is_empty()
    }

    /// Total scrollable height including inter-page spacing.
    pub fn total_height(&self) -> f32 {
        if self.page_heights.is_empty() {
            return 0.0;
        }

        let pages: f32 = self.page_heights.iter().sum();
        pages + self.spacing * (self.page_heights.len() - 1) as f32
    }

    /// Page whose extent contains the given scroll offset.
    ///
    /// Offsets past the last page clamp to the last page.
    pub fn page_at_offset(&self, offset: f32) -> u32 {
        let mut cursor = 0.0;

        for (index, page_height) in self.page_heights.iter().enumerate() {
            let page_end = cursor + page_height;
            if offset <= page_end {
                return index as u32;
            }

            cursor = page_end + self.spacing;
        }

        self.page_heights.len().saturating_sub(1) as u32
    }

    /// Height of a single page, zero when out of range.
    pub fn page_height(&self, page_number: u32) -> f32 {
        self.page_heights.get(page_number as usize).copied().unwrap_or(0.0)
    }

    /// Scroll offset of the top edge of a page.
    pub fn page_start_offset(&self, page_number: u32) -> f32 {
        let mut cursor = 0.0;

        for (index, page_height) in self.page_heights.iter().enumerate() {
            if index as u32 == page_number {
                return cursor;
            }
            cursor += page_height + self.spacing;
        }

        cursor
    }

    /// Page closest to the vertical center of the viewport.
    pub fn page_at_center(&self, scroll_offset: f32, viewport_height: f32) -> u32 {
        let center = (scroll_offset + viewport_height / 2.0).max(0.0);
        self.page_at_offset(center)
    }

    /// Inclusive range of pages overlapping the viewport window.
    pub fn pages_in_window(&self, scroll_offset: f32, viewport_height: f32) -> (u32, u32) {
        let start = self.page_at_offset(scroll_offset.max(0.0));
        let end = self.page_at_offset((scroll_offset + viewport_height).max(0.0));
        (start, end)
    }
}

/// Scroll-adjacent neighbor pages around `page_number`, nearest first.
///
/// Indices are bounded to `[0, page_count)`.
pub fn neighbor_pages(page_number: u32, page_count: u32, radius: u32) -> Vec<u32> {
    if page_count == 0 {
        return Vec::new();
    }

    let max = page_count - 1;
    let mut pages = Vec::new();

    for offset in 1..=radius {
        if let Some(lower) = page_number.checked_sub(offset) {
            pages.push(lower.min(max));
        }

        let upper = page_number.saturating_add(offset);
        if upper <= max {
            pages.push(upper);
        }
    }

    pages
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_pages() -> PageLayout {
        PageLayout::new(vec![1000.0, 1000.0, 1000.0], 100.0)
    }

    #[test]
    fn total_height_includes_spacing() {
        assert_eq!(three_pages().total_height(), 3200.0);
        assert_eq!(PageLayout::new(Vec::new(), 100.0).total_height(), 0.0);
    }

    #[test]
    fn offsets_map_to_pages() {
        let layout = three_pages();
        assert_eq!(layout.page_at_offset(0.0), 0);
        assert_eq!(layout.page_at_offset(999.0), 0);
        assert_eq!(layout.page_at_offset(1150.0), 1);
        assert_eq!(layout.page_at_offset(9999.0), 2);
    }

    #[test]
    fn page_start_offsets_accumulate_spacing() {
        let layout = three_pages();
        assert_eq!(layout.page_start_offset(0), 0.0);
        assert_eq!(layout.page_start_offset(1), 1100.0);
        assert_eq!(layout.page_start_offset(2), 2200.0);
    }

    #[test]
    fn center_page_tracks_viewport_middle() {
        let layout = three_pages();
        assert_eq!(layout.page_at_center(1200.0, 1000.0), 1);
        assert_eq!(layout.page_at_center(0.0, 900.0), 0);
    }

    #[test]
    fn window_spans_partially_visible_pages() {
        let layout = three_pages();
        assert_eq!(layout.pages_in_window(1100.0, 900.0), (1, 1));
        assert_eq!(layout.pages_in_window(1500.0, 900.0), (1, 2));
    }

    #[test]
    fn neighbors_are_symmetric_and_bounded() {
        assert_eq!(neighbor_pages(5, 10, 2), vec![4, 6, 3, 7]);
        assert_eq!(neighbor_pages(0, 3, 3), vec![1, 2]);
        assert_eq!(neighbor_pages(0, 0, 2), Vec::<u32>::new());
    }
}
