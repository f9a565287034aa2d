//! Cache Entry Module
//!
//! Defines the live entries held by the store and the expiration markers
//! held by the expiration queue.

use std::cmp::Ordering;
use std::time::Duration;

use chrono::Utc;

// == Expiry ==
/// When an entry stops being valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Expiry {
    /// The entry never expires and is never swept
    Never,
    /// The entry expires at this Unix timestamp in milliseconds
    At(i64),
}

impl Expiry {
    /// Returns true if an entry with this expiry is still valid at `now_ms`.
    ///
    /// An entry is valid up to and including its expiration millisecond.
    pub fn is_live_at(&self, now_ms: i64) -> bool {
        match self {
            Expiry::Never => true,
            Expiry::At(expires_at) => now_ms <= *expires_at,
        }
    }
}

// == Live Entry ==
/// A value installed in the store together with its expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveEntry<V> {
    /// The stored value
    pub value: V,
    /// When the value stops being visible
    pub expires_at: Expiry,
}

impl<V> LiveEntry<V> {
    // == Constructors ==
    /// Creates an entry that never expires.
    pub fn persistent(value: V) -> Self {
        Self {
            value,
            expires_at: Expiry::Never,
        }
    }

    /// Creates an entry that expires at the given Unix millisecond.
    pub fn expiring(value: V, expires_at_ms: i64) -> Self {
        Self {
            value,
            expires_at: Expiry::At(expires_at_ms),
        }
    }

    /// Returns true if the entry is still valid at `now_ms`.
    pub fn is_live_at(&self, now_ms: i64) -> bool {
        self.expires_at.is_live_at(now_ms)
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds, or None if no expiration is set.
    ///
    /// # Returns
    /// - `Some(0)` if the entry has expired
    /// - `Some(remaining_ms)` if the entry has a TTL that hasn't elapsed
    /// - `None` if the entry never expires
    pub fn ttl_remaining_ms(&self) -> Option<u64> {
        match self.expires_at {
            Expiry::Never => None,
            Expiry::At(expires_at) => {
                Some(u64::try_from(expires_at - current_timestamp_ms()).unwrap_or(0))
            }
        }
    }
}

// == Expiration Marker ==
/// Queue-only record that drives the sweep of one key.
///
/// Markers compare and order by deadline alone, so two markers for different
/// keys with the same deadline are equal.
#[derive(Debug, Clone)]
pub struct ExpirationMarker<K> {
    /// The key whose entry may need removing
    pub key: K,
    /// Deadline of the entry that produced this marker (Unix milliseconds)
    pub expires_at: i64,
}

impl<K> ExpirationMarker<K> {
    pub fn new(key: K, expires_at: i64) -> Self {
        Self { key, expires_at }
    }

    /// Milliseconds until the marker becomes ready; zero or negative once due.
    pub fn delay_ms(&self, now_ms: i64) -> i64 {
        self.expires_at.saturating_sub(now_ms)
    }

    /// Returns true once the deadline has been reached.
    pub fn is_ready_at(&self, now_ms: i64) -> bool {
        self.expires_at <= now_ms
    }
}

impl<K> PartialEq for ExpirationMarker<K> {
    fn eq(&self, other: &Self) -> bool {
        self.expires_at == other.expires_at
    }
}

impl<K> Eq for ExpirationMarker<K> {}

impl<K> PartialOrd for ExpirationMarker<K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K> Ord for ExpirationMarker<K> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.expires_at.cmp(&other.expires_at)
    }
}

// == Utility Functions ==
/// Computes the deadline for a TTL starting at `now_ms`.
///
/// Saturates at `i64::MAX` instead of overflowing for very large TTLs.
pub fn deadline_after(now_ms: i64, ttl: Duration) -> i64 {
    let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
    now_ms.saturating_add(ttl_ms)
}

/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> i64 {
    Utc::now().timestamp_millis()
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persistent_entry_never_expires() {
        let entry = LiveEntry::persistent("value");

        assert_eq!(entry.expires_at, Expiry::Never);
        assert!(entry.is_live_at(i64::MAX));
        assert!(entry.ttl_remaining_ms().is_none());
    }

    #[test]
    fn test_expiring_entry_boundary() {
        let entry = LiveEntry::expiring("value", 1_000);

        assert!(entry.is_live_at(999));
        // Still visible during the expiration millisecond itself
        assert!(entry.is_live_at(1_000));
        assert!(!entry.is_live_at(1_001));
    }

    #[test]
    fn test_expired_entry_in_the_past() {
        // Mirrors an entry whose deadline is long gone
        let entry = LiveEntry::expiring(1, 1);
        assert!(!entry.is_live_at(current_timestamp_ms()));
        assert_eq!(entry.ttl_remaining_ms(), Some(0));
    }

    #[test]
    fn test_ttl_remaining_ms() {
        let now = current_timestamp_ms();
        let entry = LiveEntry::expiring("value", now + 10_000);

        let remaining = entry.ttl_remaining_ms().unwrap();
        assert!(remaining <= 10_000);
        assert!(remaining >= 9_000);
    }

    #[test]
    fn test_deadline_after_saturates() {
        assert_eq!(deadline_after(1_000, Duration::from_millis(250)), 1_250);
        assert_eq!(deadline_after(1_000, Duration::MAX), i64::MAX);
    }

    #[test]
    fn test_marker_ordering_by_deadline() {
        let early = ExpirationMarker::new("b", 10);
        let late = ExpirationMarker::new("a", 20);

        assert!(early < late);
        assert_eq!(ExpirationMarker::new("x", 5), ExpirationMarker::new("y", 5));
    }

    #[test]
    fn test_marker_delay() {
        let marker = ExpirationMarker::new(7, 1_000);

        assert_eq!(marker.delay_ms(400), 600);
        assert!(!marker.is_ready_at(999));
        assert!(marker.is_ready_at(1_000));
        assert!(marker.delay_ms(1_500) < 0);
    }
}
