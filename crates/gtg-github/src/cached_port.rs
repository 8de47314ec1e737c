//! Cached GitHub port (decorator pattern)
//!
//! Wraps any `GitHubPort` and stores responses in the tiered cache under the
//! sanitized key space:
//!
//! - PR metadata under the `meta` key (5 min),
//! - CI check lists under `ci:{sha}` (5 min while pending, 24 h once final),
//! - individual comments under `comment:{id}` (24 h),
//! - resolved-thread markers under `thread:{id}:resolved` (24 h, written
//!   only once a thread is resolved).
//!
//! Values round-trip through JSON exactly as they came from the port, so a
//! cache hit is indistinguishable from a fetch.

use crate::port::{GitHubPort, PortError, PrMeta};
use async_trait::async_trait;
use gtg_cache::{ttl_for_ci, Cache, CacheKey, TTL_FINAL, TTL_VOLATILE};
use gtg_model::{CiCheck, CiStatus, Comment, RepoCoordinate, Review, ReviewThread};
use log::debug;
use std::sync::Arc;

/// Cache behavior mode, set at construction time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CacheMode {
    /// No caching - neither read nor write
    None,

    /// Skip cache reads but write responses; used for force refresh
    WriteOnly,

    /// Full caching (default)
    #[default]
    ReadWrite,
}

impl CacheMode {
    /// Should we attempt to read from cache before calling the port?
    pub fn should_read(&self) -> bool {
        matches!(self, CacheMode::ReadWrite)
    }

    /// Should we write responses to cache?
    pub fn should_write(&self) -> bool {
        matches!(self, CacheMode::WriteOnly | CacheMode::ReadWrite)
    }
}

/// Caching decorator over any `GitHubPort`
pub struct CachedPort<P: GitHubPort> {
    inner: P,
    cache: Arc<dyn Cache>,
    mode: CacheMode,
}

impl<P: GitHubPort> CachedPort<P> {
    pub fn new(inner: P, cache: Arc<dyn Cache>, mode: CacheMode) -> Self {
        Self { inner, cache, mode }
    }

    pub fn cache_mode(&self) -> CacheMode {
        self.mode
    }

    fn try_get<T: serde::de::DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        if !self.mode.should_read() {
            return None;
        }
        let body = self.cache.get(key)?;
        match serde_json::from_str(&body) {
            Ok(value) => {
                debug!("cache HIT for {}", key);
                Some(value)
            }
            Err(e) => {
                debug!("cache entry for {} failed to parse: {}", key, e);
                None
            }
        }
    }

    fn put<T: serde::Serialize>(&self, key: &CacheKey, value: &T, ttl: std::time::Duration) {
        if !self.mode.should_write() {
            return;
        }
        match serde_json::to_string(value) {
            Ok(json) => {
                if let Err(e) = self.cache.set(key, &json, ttl) {
                    debug!("failed to write cache entry {}: {}", key, e);
                }
            }
            Err(e) => debug!("failed to serialize cache entry {}: {}", key, e),
        }
    }
}

#[async_trait]
impl<P: GitHubPort> GitHubPort for CachedPort<P> {
    async fn get_pr(&self, coord: &RepoCoordinate) -> Result<PrMeta, PortError> {
        let key = CacheKey::pr_meta(coord);
        if let Some(meta) = self.try_get::<PrMeta>(&key) {
            return Ok(meta);
        }

        let meta = self.inner.get_pr(coord).await?;
        self.put(&key, &meta, TTL_VOLATILE);
        Ok(meta)
    }

    async fn get_comments(&self, coord: &RepoCoordinate) -> Result<Vec<Comment>, PortError> {
        // The comment listing itself is always fetched (there is no key for
        // "the set of comment ids"); each comment body is cached under its
        // own 24 h key for consumers that address comments individually.
        let comments = self.inner.get_comments(coord).await?;

        for comment in &comments {
            let key = CacheKey::comment(coord, comment.id);
            self.put(&key, comment, TTL_FINAL);
        }

        Ok(comments)
    }

    async fn get_review_threads(
        &self,
        coord: &RepoCoordinate,
    ) -> Result<Vec<ReviewThread>, PortError> {
        let threads = self.inner.get_review_threads(coord).await?;

        // Resolution only sticks once granted; only resolved threads are
        // recorded.
        for thread in threads.iter().filter(|t| t.is_resolved) {
            if let Ok(key) = CacheKey::thread_resolved(coord, &thread.id) {
                self.put(&key, &true, TTL_FINAL);
            }
        }

        Ok(threads)
    }

    async fn get_ci_status(
        &self,
        coord: &RepoCoordinate,
        git_ref: &str,
    ) -> Result<Vec<CiCheck>, PortError> {
        let key = CacheKey::ci(coord, git_ref)
            .map_err(|e| PortError::Schema(e.to_string()))?;
        if let Some(checks) = self.try_get::<Vec<CiCheck>>(&key) {
            return Ok(checks);
        }

        let checks = self.inner.get_ci_status(coord, git_ref).await?;

        // Pending CI gets the short TTL so polling sees progress; a final
        // roll-up is stable for the lifetime of the sha.
        let is_final = CiStatus::from_checks(checks.clone()).is_final();
        self.put(&key, &checks, ttl_for_ci(is_final));

        Ok(checks)
    }

    async fn get_reviews(&self, coord: &RepoCoordinate) -> Result<Vec<Review>, PortError> {
        // Review bodies feed outside-diff extraction; always fresh.
        self.inner.get_reviews(coord).await
    }
}
