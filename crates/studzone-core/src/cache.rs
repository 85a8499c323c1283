//! Time-boxed single-slot cache for scraped pages.

use std::sync::Arc;
use std::time::{Duration, Instant};

/// How long a scraped page stays fresh
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(30 * 60);

struct CachedEntry<T> {
    payload: Arc<T>,
    fetched_at: Instant,
}

/// Holds the last parsed payload of one scraper.
///
/// An entry is valid while `now - fetched_at < ttl`. Reads hand out the same
/// `Arc`, so a caller never sees a half-replaced payload.
pub struct TimedCache<T> {
    entry: Option<CachedEntry<T>>,
    ttl: Duration,
}

impl<T> TimedCache<T> {
    /// Creates an empty cache with the 30-minute default TTL.
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_CACHE_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self { entry: None, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The cached payload if it is still fresh.
    pub fn get(&self) -> Option<Arc<T>> {
        self.get_at(Instant::now())
    }

    /// The cached payload if it is fresh at `now`.
    pub fn get_at(&self, now: Instant) -> Option<Arc<T>> {
        self.entry.as_ref().and_then(|entry| {
            if now.saturating_duration_since(entry.fetched_at) < self.ttl {
                Some(Arc::clone(&entry.payload))
            } else {
                None
            }
        })
    }

    /// Replaces the slot with a freshly fetched payload and returns it.
    pub fn insert(&mut self, payload: T) -> Arc<T> {
        self.insert_at(payload, Instant::now())
    }

    pub fn insert_at(&mut self, payload: T, fetched_at: Instant) -> Arc<T> {
        let payload = Arc::new(payload);
        self.entry = Some(CachedEntry {
            payload: Arc::clone(&payload),
            fetched_at,
        });
        payload
    }

    pub fn clear(&mut self) {
        self.entry = None;
    }

    /// True if a payload is stored, fresh or not.
    pub fn is_populated(&self) -> bool {
        self.entry.is_some()
    }
}

impl<T> Default for TimedCache<T> {
    fn default() -> Self {
        Self::new()
    }
}
