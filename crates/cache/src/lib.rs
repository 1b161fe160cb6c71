//! Canvas memory cache with LRU eviction.
//!
//! Bounds the number of fully rendered page surfaces kept alive at once.
//! Rendered-bitmap memory dominates footprint for long documents, so
//! eviction releases the surface's backing pixels instead of just dropping
//! a handle.

mod memory;

pub use memory::{CacheStats, SurfaceCache, DEFAULT_CACHE_CAPACITY};
