//! Expiring Cache - A concurrent in-memory key-value cache
//!
//! Entries may carry a time-to-live. Expired entries are hidden from reads
//! immediately and removed in the background by a per-cache janitor.

pub mod cache;
pub mod config;
pub mod error;
pub mod tasks;

pub use cache::{CacheStats, ExpiringCache};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
pub use tasks::SweepReport;
