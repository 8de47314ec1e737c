//! The cache contract
//!
//! Backends store string values (JSON, produced by the callers) under
//! sanitized keys with a TTL. Expired entries read as misses. Writes are
//! last-writer-wins per key; entries are content-derived from stable GitHub
//! ids, so transient races are tolerated.

use crate::key::CacheKey;
use std::time::Duration;
use thiserror::Error;

/// Errors raised by cache construction and writes
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("invalid cache key part: {0:?}")]
    InvalidKeyPart(String),

    #[error("cache backend error: {0}")]
    Backend(String),

    #[error("insecure permissions on {path}: {detail}")]
    Permission { path: String, detail: String },
}

/// Hit/miss counters for one cache instance
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    /// Hit rate in `[0.0, 1.0]`; zero when nothing was read yet
    pub fn hit_rate(&self) -> f64 {
        let lookups = self.hits + self.misses;
        if lookups == 0 {
            0.0
        } else {
            self.hits as f64 / lookups as f64
        }
    }
}

/// Key-value cache with TTLs and prefix invalidation
///
/// Implementations must be `Send + Sync`; the analyzer shares one instance
/// across its parallel fetches.
pub trait Cache: Send + Sync {
    /// Read a value; expired or absent entries are a miss
    fn get(&self, key: &CacheKey) -> Option<String>;

    /// Write a value with the given TTL (last-writer-wins)
    fn set(&self, key: &CacheKey, value: &str, ttl: Duration) -> Result<(), CacheError>;

    /// Remove every key starting with `prefix`; returns how many went away
    fn invalidate_pattern(&self, prefix: &str) -> usize;

    /// Bulk-delete expired entries; returns how many went away
    fn cleanup_expired(&self) -> usize;

    /// Hit/miss counters since this instance was opened
    fn stats(&self) -> CacheStats;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_rate() {
        let stats = CacheStats { hits: 3, misses: 1 };
        assert!((stats.hit_rate() - 0.75).abs() < f64::EPSILON);
        assert_eq!(CacheStats::default().hit_rate(), 0.0);
    }
}
