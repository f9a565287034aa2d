//! Background Tasks Module
//!
//! Contains background tasks that run periodically for the lifetime of a cache.
//!
//! # Tasks
//! - Janitor: Drains due expiration markers and removes the entries they describe

mod janitor;

pub use janitor::{sweep, Janitor, SweepReport, JANITOR_THREAD_NAME};
