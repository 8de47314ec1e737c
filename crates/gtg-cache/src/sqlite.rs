//! Embedded SQLite cache backend (the default)
//!
//! One file, WAL mode, all access serialized through a `Mutex<Connection>`.
//! `rusqlite::Connection` is not `Sync`, so the mutex is load-bearing, not
//! just a formality.

use crate::cache::{Cache, CacheError, CacheStats};
use crate::key::CacheKey;
use crate::perms;
use chrono::Utc;
use rusqlite::Connection;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Default on-disk location, relative to the working directory
pub const DEFAULT_CACHE_PATH: &str = ".goodtogo/cache.db";

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS entries (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    expires_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_entries_expires_at
ON entries(expires_at);
"#;

fn backend_err(e: rusqlite::Error) -> CacheError {
    CacheError::Backend(gtg_model::redact(&e.to_string()))
}

/// File-backed cache at `.goodtogo/cache.db` (or a caller-chosen path)
pub struct SqliteCache {
    conn: Mutex<Connection>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl SqliteCache {
    /// Open (or create) the cache file, enforcing `0600`/`0700` permissions
    pub fn open(path: &Path) -> Result<Self, CacheError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                perms::secure_dir(parent)?;
            }
        }
        perms::secure_file(path)?;

        let conn = Connection::open(path).map_err(backend_err)?;
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(backend_err)?;
        conn.pragma_update(None, "synchronous", "NORMAL")
            .map_err(backend_err)?;
        conn.execute_batch(SCHEMA).map_err(backend_err)?;

        Ok(SqliteCache {
            conn: Mutex::new(conn),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        })
    }

    /// Open the cache at the default `.goodtogo/cache.db` location
    pub fn open_default() -> Result<Self, CacheError> {
        Self::open(Path::new(DEFAULT_CACHE_PATH))
    }

    fn now() -> i64 {
        Utc::now().timestamp()
    }
}

/// Escape `%` and `_` so a key prefix is literal inside a LIKE pattern
fn like_escape(prefix: &str) -> String {
    prefix.replace('\\', r"\\").replace('%', r"\%").replace('_', r"\_")
}

impl Cache for SqliteCache {
    fn get(&self, key: &CacheKey) -> Option<String> {
        let conn = self.conn.lock().unwrap();
        let row: Option<(String, i64)> = conn
            .query_row(
                "SELECT value, expires_at FROM entries WHERE key = ?1",
                [key.as_str()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .ok();

        match row {
            Some((value, expires_at)) if expires_at > Self::now() => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(value)
            }
            _ => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    fn set(&self, key: &CacheKey, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let now = Self::now();
        let expires_at = now + ttl.as_secs() as i64;
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR REPLACE INTO entries (key, value, created_at, expires_at)
             VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![key.as_str(), value, now, expires_at],
        )
        .map(|_| ())
        .map_err(backend_err)
    }

    fn invalidate_pattern(&self, prefix: &str) -> usize {
        let pattern = format!("{}%", like_escape(prefix));
        let conn = self.conn.lock().unwrap();
        conn.execute(
            r"DELETE FROM entries WHERE key LIKE ?1 ESCAPE '\'",
            [pattern],
        )
        .unwrap_or(0)
    }

    fn cleanup_expired(&self) -> usize {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "DELETE FROM entries WHERE expires_at <= ?1",
            [Self::now()],
        )
        .unwrap_or(0)
    }

    fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gtg_model::RepoCoordinate;

    fn coord() -> RepoCoordinate {
        RepoCoordinate::new("owner", "repo", 7).unwrap()
    }

    fn open_temp() -> (tempfile::TempDir, SqliteCache) {
        let tmp = tempfile::tempdir().unwrap();
        let cache = SqliteCache::open(&tmp.path().join(".goodtogo/cache.db")).unwrap();
        (tmp, cache)
    }

    #[test]
    fn test_set_get_roundtrip() {
        let (_tmp, cache) = open_temp();
        let key = CacheKey::pr_head(&coord());

        assert_eq!(cache.get(&key), None);
        cache.set(&key, "abc123", Duration::from_secs(60)).unwrap();
        assert_eq!(cache.get(&key).as_deref(), Some("abc123"));

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn test_expired_reads_as_miss() {
        let (_tmp, cache) = open_temp();
        let key = CacheKey::pr_meta(&coord());

        cache.set(&key, "v", Duration::ZERO).unwrap();
        assert_eq!(cache.get(&key), None);
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn test_invalidate_pattern() {
        let (_tmp, cache) = open_temp();
        let c = coord();
        let other = RepoCoordinate::new("owner", "repo", 8).unwrap();

        cache
            .set(&CacheKey::pr_head(&c), "a", Duration::from_secs(60))
            .unwrap();
        cache
            .set(&CacheKey::comment(&c, 1), "b", Duration::from_secs(60))
            .unwrap();
        cache
            .set(&CacheKey::pr_head(&other), "c", Duration::from_secs(60))
            .unwrap();

        let removed = cache.invalidate_pattern(&CacheKey::pr_prefix(&c));
        assert_eq!(removed, 2);
        assert_eq!(cache.get(&CacheKey::pr_head(&c)), None);
        assert_eq!(cache.get(&CacheKey::pr_head(&other)).as_deref(), Some("c"));
    }

    #[test]
    fn test_cleanup_expired() {
        let (_tmp, cache) = open_temp();
        let c = coord();

        cache
            .set(&CacheKey::pr_head(&c), "a", Duration::ZERO)
            .unwrap();
        cache
            .set(&CacheKey::pr_meta(&c), "b", Duration::from_secs(60))
            .unwrap();

        assert_eq!(cache.cleanup_expired(), 1);
        assert_eq!(cache.get(&CacheKey::pr_meta(&c)).as_deref(), Some("b"));
    }

    #[test]
    fn test_values_survive_reopen() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(".goodtogo/cache.db");
        let key = CacheKey::pr_head(&coord());

        {
            let cache = SqliteCache::open(&path).unwrap();
            cache.set(&key, "persisted", Duration::from_secs(60)).unwrap();
        }

        let cache = SqliteCache::open(&path).unwrap();
        assert_eq!(cache.get(&key).as_deref(), Some("persisted"));
    }

    #[cfg(unix)]
    #[test]
    fn test_permission_floor() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(".goodtogo/cache.db");
        let _cache = SqliteCache::open(&path).unwrap();

        let file_mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        let dir_mode = std::fs::metadata(path.parent().unwrap())
            .unwrap()
            .permissions()
            .mode()
            & 0o777;
        assert_eq!(file_mode, 0o600);
        assert_eq!(dir_mode, 0o700);
    }
}
