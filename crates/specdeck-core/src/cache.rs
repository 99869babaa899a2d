//! Single-slot time-to-live caches for detection and status results.
//!
//! A slot holds at most one value. Concurrent misses may both recompute and
//! both store; the later store wins. That is acceptable here: these caches
//! only save work, they never arbitrate correctness.

use std::sync::Mutex;
use std::time::{Duration, Instant};

/// How long a detection result stays fresh.
pub const DETECTION_TTL: Duration = Duration::from_secs(5 * 60);

/// How long a project status stays fresh.
pub const STATUS_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub value: T,
    pub timestamp: Instant,
}

impl<T> CacheEntry<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            timestamp: Instant::now(),
        }
    }

    /// Valid iff `now - timestamp < ttl`.
    pub fn is_fresh_at(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.timestamp) < ttl
    }
}

#[derive(Debug)]
pub struct TtlCache<T> {
    ttl: Duration,
    slot: Mutex<Option<CacheEntry<T>>>,
}

impl<T: Clone> TtlCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: Mutex::new(None),
        }
    }

    /// The cached value, if one exists and is still fresh.
    pub fn get(&self) -> Option<T> {
        self.get_at(Instant::now())
    }

    pub fn get_at(&self, now: Instant) -> Option<T> {
        let slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        slot.as_ref()
            .filter(|entry| entry.is_fresh_at(now, self.ttl))
            .map(|entry| entry.value.clone())
    }

    /// Replace the slot with a new entry stamped now.
    pub fn put(&self, value: T) {
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        *slot = Some(CacheEntry::new(value));
    }

    pub fn clear(&self) {
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        *slot = None;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_cache_misses() {
        let cache: TtlCache<u32> = TtlCache::new(Duration::from_secs(1));
        assert_eq!(cache.get(), None);
    }

    #[test]
    fn fresh_value_is_returned_until_ttl() {
        let cache = TtlCache::new(Duration::from_secs(10));
        cache.put("a".to_string());
        let now = Instant::now();
        assert_eq!(cache.get_at(now).as_deref(), Some("a"));
        assert_eq!(
            cache.get_at(now + Duration::from_secs(9)).as_deref(),
            Some("a")
        );
        assert_eq!(cache.get_at(now + Duration::from_secs(11)), None);
    }

    #[test]
    fn boundary_is_exclusive() {
        let entry = CacheEntry::new(1);
        let ttl = Duration::from_secs(5);
        assert!(entry.is_fresh_at(entry.timestamp, ttl));
        assert!(!entry.is_fresh_at(entry.timestamp + ttl, ttl));
    }

    #[test]
    fn put_supersedes_and_clear_empties() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.put(1);
        cache.put(2);
        assert_eq!(cache.get(), Some(2));
        cache.clear();
        assert_eq!(cache.get(), None);
    }

    #[test]
    fn ttls_differ_by_kind() {
        assert!(DETECTION_TTL >= Duration::from_secs(60));
        assert!(STATUS_TTL < Duration::from_secs(60));
    }
}
