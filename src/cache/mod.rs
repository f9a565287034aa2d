//! Cache Module
//!
//! Provides the concurrent store, the expiration queue and the cache facade
//! built on top of them.

mod entry;
mod expiring;
mod queue;
mod stats;
mod store;


// Re-export public types
pub use entry::{current_timestamp_ms, deadline_after, ExpirationMarker, Expiry, LiveEntry};
pub use expiring::ExpiringCache;
pub use queue::ExpirationQueue;
pub use stats::{CacheStats, StatsRecorder};
pub use store::{Compute, ConcurrentStore, Lookup};
