//! Optional Redis cache backend
//!
//! Addressed by URL (`redis://` or `rediss://`). Expiry is handled
//! server-side via `SETEX`, so `cleanup_expired` has nothing to do. Pattern
//! invalidation walks `SCAN MATCH prefix*`.

use crate::cache::{Cache, CacheError, CacheStats};
use crate::key::CacheKey;
use gtg_model::redact;
use log::warn;
use redis::Commands;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

fn backend_err(e: redis::RedisError) -> CacheError {
    CacheError::Backend(redact(&e.to_string()))
}

/// Remote shared cache over Redis
pub struct RedisCache {
    conn: Mutex<redis::Connection>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl RedisCache {
    /// Connect to the given Redis URL
    ///
    /// Warns (with the URL redacted) when credentials ride an unencrypted
    /// `redis://` transport.
    pub fn open(url: &str) -> Result<Self, CacheError> {
        if url.starts_with("redis://") && url.contains('@') {
            warn!(
                "redis URL carries credentials over an unencrypted transport: {}",
                redact(url)
            );
        }

        let client = redis::Client::open(url).map_err(backend_err)?;
        let conn = client.get_connection().map_err(backend_err)?;

        Ok(RedisCache {
            conn: Mutex::new(conn),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        })
    }
}

impl Cache for RedisCache {
    fn get(&self, key: &CacheKey) -> Option<String> {
        let mut conn = self.conn.lock().unwrap();
        let value: Option<String> = conn.get(key.as_str()).ok().flatten();
        match value {
            Some(v) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(v)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    fn set(&self, key: &CacheKey, value: &str, ttl: Duration) -> Result<(), CacheError> {
        // SETEX with a zero TTL is an error; clamp to one second.
        let secs = ttl.as_secs().max(1);
        let mut conn = self.conn.lock().unwrap();
        conn.set_ex::<_, _, ()>(key.as_str(), value, secs)
            .map_err(backend_err)
    }

    fn invalidate_pattern(&self, prefix: &str) -> usize {
        let mut conn = self.conn.lock().unwrap();
        let pattern = format!("{}*", prefix);

        let keys: Vec<String> = match conn.scan_match::<_, String>(&pattern) {
            Ok(iter) => iter.collect(),
            Err(_) => return 0,
        };
        if keys.is_empty() {
            return 0;
        }

        let removed: usize = conn.del(&keys).unwrap_or(0);
        removed
    }

    fn cleanup_expired(&self) -> usize {
        // Redis expires entries server-side.
        0
    }

    fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}
