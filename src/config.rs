//! Configuration Module
//!
//! Handles loading and validating cache configuration from environment variables.

use std::env;
use std::time::Duration;

use crate::error::{CacheError, Result};

/// Default interval between janitor sweeps
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Interval between background expiration sweeps
    pub sweep_interval: Duration,
    /// Number of entries the store pre-allocates room for
    pub initial_capacity: usize,
    /// Number of store shards; `None` lets the map pick from the CPU count
    pub shard_amount: Option<usize>,
}

impl CacheConfig {
    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `EXPIRING_CACHE_SWEEP_INTERVAL_MS` - Sweep interval in milliseconds (default: 1000)
    /// - `EXPIRING_CACHE_INITIAL_CAPACITY` - Pre-allocated store capacity (default: 0)
    /// - `EXPIRING_CACHE_SHARD_AMOUNT` - Store shard count (default: unset)
    pub fn from_env() -> Self {
        Self {
            sweep_interval: env::var("EXPIRING_CACHE_SWEEP_INTERVAL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_SWEEP_INTERVAL),
            initial_capacity: env::var("EXPIRING_CACHE_INITIAL_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0),
            shard_amount: env::var("EXPIRING_CACHE_SHARD_AMOUNT")
                .ok()
                .and_then(|v| v.parse().ok()),
        }
    }

    /// Sets the sweep interval.
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    /// Sets the initial store capacity.
    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// Sets the number of store shards.
    pub fn with_shard_amount(mut self, shards: usize) -> Self {
        self.shard_amount = Some(shards);
        self
    }

    // == Validate ==
    /// Checks the configuration before a cache is built from it.
    ///
    /// The sweep interval must be non-zero and a shard amount, when given,
    /// must be a power of two greater than one.
    pub fn validate(&self) -> Result<()> {
        if self.sweep_interval.is_zero() {
            return Err(CacheError::InvalidConfig(
                "sweep interval must be greater than zero".to_string(),
            ));
        }

        if let Some(shards) = self.shard_amount {
            if shards <= 1 || !shards.is_power_of_two() {
                return Err(CacheError::InvalidConfig(format!(
                    "shard amount must be a power of two greater than 1, got {}",
                    shards
                )));
            }
        }

        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            initial_capacity: 0,
            shard_amount: None,
        }
    }
}
