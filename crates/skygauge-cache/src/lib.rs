//! skygauge-cache — process-local expiring cache.
//!
//! Values are opaque bytes; callers layer their own encoding on top so the
//! expiry logic never depends on payload shape.

pub mod cache;

pub use cache::{CacheStats, ExpiringCache};
