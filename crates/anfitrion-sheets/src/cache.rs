//! Time-based cache as an explicit struct
//!
//! The cache carries its own expiry timestamp instead of hiding refresh
//! logic in a connection singleton; callers wrap it in a lock and decide
//! when to refresh.

use std::time::{Duration, Instant};

/// A single cached value with a TTL
#[derive(Debug)]
pub struct TtlCache<T> {
    ttl: Duration,
    slot: Option<Slot<T>>,
}

#[derive(Debug)]
struct Slot<T> {
    value: T,
    stored_at: Instant,
}

impl<T> TtlCache<T> {
    /// Create an empty cache with the given TTL
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, slot: None }
    }

    /// Get the cached value if it is still fresh
    #[must_use]
    pub fn get(&self) -> Option<&T> {
        let slot = self.slot.as_ref()?;
        if slot.stored_at.elapsed() < self.ttl {
            Some(&slot.value)
        } else {
            None
        }
    }

    /// Store a fresh value
    pub fn put(&mut self, value: T) {
        self.slot = Some(Slot {
            value,
            stored_at: Instant::now(),
        });
    }

    /// Drop the cached value
    pub fn invalidate(&mut self) {
        self.slot = None;
    }
}
