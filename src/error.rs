//! Error types for the expiring cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the expiring cache.
#[derive(Error, Debug)]
pub enum CacheError {
    /// A required key or value was absent
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Configuration values were rejected
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The janitor thread or its timer runtime could not be started
    #[error("Scheduler error: {0}")]
    Scheduler(#[from] std::io::Error),
}

// == Result Type Alias ==
/// Convenience Result type for the expiring cache.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CacheError::InvalidArgument("key must be present".to_string());
        assert_eq!(err.to_string(), "Invalid argument: key must be present");
    }

    #[test]
    fn test_io_error_converts_to_scheduler() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "no threads");
        let err: CacheError = io.into();
        assert!(matches!(err, CacheError::Scheduler(_)));
    }
}
