//! Cache and state store construction from options

use crate::options::{AnalyzeOptions, CacheBackend};
use gtg_cache::{
    Cache, CacheError, ClassificationStore, MemoryStateStore, NoopCache, RedisCache, SqliteCache,
    SqliteStateStore,
};
use std::path::Path;
use std::sync::Arc;

/// Build the cache selected by the options
pub fn build_cache(options: &AnalyzeOptions) -> Result<Arc<dyn Cache>, CacheError> {
    match options.cache_backend {
        CacheBackend::Embedded => {
            let cache = match options.cache_location.as_deref() {
                Some(path) => SqliteCache::open(Path::new(path))?,
                None => SqliteCache::open_default()?,
            };
            Ok(Arc::new(cache))
        }
        CacheBackend::Remote => {
            let url = options
                .cache_location
                .as_deref()
                .ok_or_else(|| CacheError::Backend("remote cache needs a URL".to_string()))?;
            Ok(Arc::new(RedisCache::open(url)?))
        }
        CacheBackend::None => Ok(Arc::new(NoopCache::new())),
    }
}

/// Build the classification state store
///
/// A no-cache run gets an in-memory store: still correct within the run,
/// nothing persisted.
pub fn build_state_store(
    options: &AnalyzeOptions,
) -> Result<Arc<dyn ClassificationStore>, CacheError> {
    if options.cache_backend == CacheBackend::None {
        return Ok(Arc::new(MemoryStateStore::new()));
    }
    let store = match options.state_location.as_deref() {
        Some(path) => SqliteStateStore::open(Path::new(path))?,
        None => SqliteStateStore::open_default()?,
    };
    Ok(Arc::new(store))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_backend_with_location() {
        let tmp = tempfile::tempdir().unwrap();
        let options = AnalyzeOptions {
            cache_location: Some(tmp.path().join("cache.db").display().to_string()),
            state_location: Some(tmp.path().join("state.db").display().to_string()),
            ..AnalyzeOptions::default()
        };
        assert!(build_cache(&options).is_ok());
        assert!(build_state_store(&options).is_ok());
    }

    #[test]
    fn test_none_backend() {
        let options = AnalyzeOptions {
            cache_backend: CacheBackend::None,
            ..AnalyzeOptions::default()
        };
        let cache = build_cache(&options).unwrap();
        assert_eq!(cache.stats().hits, 0);
        assert!(build_state_store(&options).is_ok());
    }
}
