//! No-op cache: every read is a miss, writes are dropped
//!
//! Used for `--no-cache` one-shot runs and as a baseline in tests.

use crate::cache::{Cache, CacheError, CacheStats};
use crate::key::CacheKey;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

#[derive(Default)]
pub struct NoopCache {
    misses: AtomicU64,
}

impl NoopCache {
    pub fn new() -> Self {
        NoopCache::default()
    }
}

impl Cache for NoopCache {
    fn get(&self, _key: &CacheKey) -> Option<String> {
        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    fn set(&self, _key: &CacheKey, _value: &str, _ttl: Duration) -> Result<(), CacheError> {
        Ok(())
    }

    fn invalidate_pattern(&self, _prefix: &str) -> usize {
        0
    }

    fn cleanup_expired(&self) -> usize {
        0
    }

    fn stats(&self) -> CacheStats {
        CacheStats {
            hits: 0,
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}
