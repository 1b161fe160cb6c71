//! In-memory surface cache with LRU eviction.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use log::debug;
use pageflow_render::SharedSurface;

/// Default number of rendered pages kept alive at once.
pub const DEFAULT_CACHE_CAPACITY: usize = 10;

/// One cached rendered page.
struct CacheEntry {
    /// Surface holding the rendered bitmap.
    surface: SharedSurface,

    /// Scale the bitmap was rendered at.
    scale: f32,

    /// Monotonic use counter, larger is more recent.
    last_used: u64,
}

/// Statistics about cache usage.
#[derive(Debug, Clone, Copy, Default)]
pub struct CacheStats {
    /// Number of pages currently cached.
    pub entry_count: usize,

    /// Maximum number of pages the cache holds.
    pub capacity: usize,

    /// Number of cache hits.
    pub hits: u64,

    /// Number of cache misses.
    pub misses: u64,

    /// Number of pages evicted to make room.
    pub evictions: u64,
}

impl CacheStats {
    /// Cache hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Internal cache state.
struct CacheState {
    /// Map from page number to cached entry.
    entries: HashMap<u32, CacheEntry>,

    /// LRU queue (most recently used at back, least recently used at front).
    order: VecDeque<u32>,

    /// Monotonic counter feeding `last_used`.
    tick: u64,

    /// Maximum number of entries.
    capacity: usize,

    /// Statistics.
    stats: CacheStats,
}

impl CacheState {
    fn new(capacity: usize) -> Self {
        // A zero-capacity cache would evict every page it is handed.
        let capacity = capacity.max(1);
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            tick: 0,
            capacity,
            stats: CacheStats { capacity, ..Default::default() },
        }
    }

    /// Mark a page as most recently used.
    fn touch(&mut self, page_number: u32) {
        self.order.retain(|&p| p != page_number);
        self.order.push_back(page_number);
        self.tick += 1;
        let tick = self.tick;
        if let Some(entry) = self.entries.get_mut(&page_number) {
            entry.last_used = tick;
        }
    }

    /// Evict least recently used pages until the cache fits its capacity.
    ///
    /// Releasing the surface frees the backing pixels even while the host
    /// still holds a handle to it.
    fn evict_to_fit(&mut self) {
        while self.entries.len() > self.capacity {
            let Some(page_number) = self.order.pop_front() else {
                break;
            };
            if let Some(entry) = self.entries.remove(&page_number) {
                entry.surface.lock().unwrap().release();
                self.stats.evictions += 1;
                debug!("evicted page {} from surface cache", page_number);
            }
        }
        self.stats.entry_count = self.entries.len();
    }
}

/// Bounded LRU cache of fully rendered page surfaces.
///
/// Thread-safe; the scheduler and the host UI share one instance. At most
/// `capacity` pages are kept; inserting beyond that releases the least
/// recently used surface's pixel storage.
pub struct SurfaceCache {
    state: Arc<Mutex<CacheState>>,
}

impl SurfaceCache {
    pub fn new(capacity: usize) -> Self {
        Self { state: Arc::new(Mutex::new(CacheState::new(capacity))) }
    }

    /// Store a rendered page.
    ///
    /// Replacing an existing entry releases the old surface first, unless it
    /// is the same allocation being re-rendered in place.
    pub fn put(&self, page_number: u32, surface: SharedSurface, scale: f32) {
        let mut state = self.state.lock().unwrap();

        if let Some(old) = state.entries.remove(&page_number) {
            if !Arc::ptr_eq(&old.surface, &surface) {
                old.surface.lock().unwrap().release();
            }
            state.order.retain(|&p| p != page_number);
        }

        state.entries.insert(page_number, CacheEntry { surface, scale, last_used: 0 });
        state.touch(page_number);
        state.evict_to_fit();
    }

    /// Retrieve a cached surface, marking the page most recently used.
    pub fn get(&self, page_number: u32) -> Option<SharedSurface> {
        let mut state = self.state.lock().unwrap();

        if state.entries.contains_key(&page_number) {
            state.touch(page_number);
            state.stats.hits += 1;
            state.entries.get(&page_number).map(|entry| Arc::clone(&entry.surface))
        } else {
            state.stats.misses += 1;
            None
        }
    }

    /// Whether a page is cached, without updating LRU tracking.
    pub fn has(&self, page_number: u32) -> bool {
        self.state.lock().unwrap().entries.contains_key(&page_number)
    }

    /// The scale a cached page was rendered at, without updating LRU
    /// tracking.
    pub fn scale_of(&self, page_number: u32) -> Option<f32> {
        self.state.lock().unwrap().entries.get(&page_number).map(|entry| entry.scale)
    }

    /// Whether a page is cached at `scale` within `epsilon`, without
    /// updating LRU tracking.
    pub fn matches_scale(&self, page_number: u32, scale: f32, epsilon: f32) -> bool {
        self.scale_of(page_number)
            .map(|cached| (cached - scale).abs() <= epsilon)
            .unwrap_or(false)
    }

    /// The page's use counter, for inspection in tests and diagnostics.
    pub fn last_used(&self, page_number: u32) -> Option<u64> {
        self.state.lock().unwrap().entries.get(&page_number).map(|entry| entry.last_used)
    }

    /// Remove one page, releasing its surface.
    pub fn remove(&self, page_number: u32) -> bool {
        let mut state = self.state.lock().unwrap();
        if let Some(entry) = state.entries.remove(&page_number) {
            entry.surface.lock().unwrap().release();
            state.order.retain(|&p| p != page_number);
            state.stats.entry_count = state.entries.len();
            true
        } else {
            false
        }
    }

    /// Release every cached surface and empty the cache.
    pub fn clear(&self) {
        let mut state = self.state.lock().unwrap();
        for (_, entry) in state.entries.drain() {
            entry.surface.lock().unwrap().release();
        }
        state.order.clear();
        state.stats.entry_count = 0;
    }

    /// Pages currently cached, least recently used first.
    pub fn pages(&self) -> Vec<u32> {
        self.state.lock().unwrap().order.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.state.lock().unwrap().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().unwrap().entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.state.lock().unwrap().capacity
    }

    /// Current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let state = self.state.lock().unwrap();
        let mut stats = state.stats;
        stats.entry_count = state.entries.len();
        stats
    }
}

impl Default for SurfaceCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}
