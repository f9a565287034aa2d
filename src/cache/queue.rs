//! Expiration Queue Module
//!
//! Deadline-ordered queue of expiration markers. A marker can only be taken
//! out once its deadline has passed.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use parking_lot::Mutex;

use crate::cache::{current_timestamp_ms, ExpirationMarker};

// == Expiration Queue ==
/// Unbounded, thread-safe delay queue of expiration markers.
///
/// A min-heap by deadline behind a mutex. Pushing never waits for capacity
/// and polling never waits for a deadline.
#[derive(Debug)]
pub struct ExpirationQueue<K> {
    heap: Mutex<BinaryHeap<Reverse<ExpirationMarker<K>>>>,
}

impl<K> Default for ExpirationQueue<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> ExpirationQueue<K> {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self {
            heap: Mutex::new(BinaryHeap::new()),
        }
    }

    // == Push ==
    /// Enqueues a marker.
    pub fn push(&self, marker: ExpirationMarker<K>) {
        self.heap.lock().push(Reverse(marker));
    }

    // == Poll Ready ==
    /// Removes and returns the earliest marker if its deadline has passed.
    pub fn poll_ready(&self) -> Option<ExpirationMarker<K>> {
        self.poll_ready_at(current_timestamp_ms())
    }

    /// Removes and returns the earliest marker if it is due at `now_ms`.
    ///
    /// Markers sharing a deadline come out in no particular order.
    pub fn poll_ready_at(&self, now_ms: i64) -> Option<ExpirationMarker<K>> {
        let mut heap = self.heap.lock();
        let due = heap
            .peek()
            .is_some_and(|Reverse(marker)| marker.is_ready_at(now_ms));
        if due {
            heap.pop().map(|Reverse(marker)| marker)
        } else {
            None
        }
    }

    /// Returns the earliest deadline still queued.
    pub fn next_deadline(&self) -> Option<i64> {
        self.heap.lock().peek().map(|Reverse(marker)| marker.expires_at)
    }

    // == Length ==
    /// Returns the number of queued markers, due or not.
    pub fn len(&self) -> usize {
        self.heap.lock().len()
    }

    /// Returns true if no markers are queued.
    pub fn is_empty(&self) -> bool {
        self.heap.lock().is_empty()
    }
}
