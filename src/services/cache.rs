// src/services/cache.rs

//! Single-slot time-to-live cache.

use chrono::{DateTime, Duration, Utc};

/// Holds the last fetched value with the instant it was stored.
#[derive(Debug, Clone)]
pub struct TtlCache<T> {
    slot: Option<(T, DateTime<Utc>)>,
    ttl: Duration,
}

impl<T> TtlCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self { slot: None, ttl }
    }

    /// Value stored less than one TTL before `now`.
    pub fn fresh(&self, now: DateTime<Utc>) -> Option<&T> {
        self.slot
            .as_ref()
            .filter(|(_, stored_at)| now - *stored_at < self.ttl)
            .map(|(value, _)| value)
    }

    /// Last stored value, however old.
    pub fn stale(&self) -> Option<&T> {
        self.slot.as_ref().map(|(value, _)| value)
    }

    pub fn store(&mut self, value: T, now: DateTime<Utc>) {
        self.slot = Some((value, now));
    }

    pub fn clear(&mut self) {
        self.slot = None;
    }
}
