//! Tiered cache and classification state store
//!
//! The cache holds GitHub responses under a sanitized key space with
//! per-key-class TTLs; the state store pins per-comment classifications to a
//! head commit so reviewer-side edits between runs cannot flip a verdict.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                 Cache trait                  │
//! │  get / set / invalidate_pattern /            │
//! │  cleanup_expired / stats                     │
//! └─────────────────────────────────────────────┘
//!          │               │              │
//!          ▼               ▼              ▼
//!   ┌────────────┐  ┌────────────┐  ┌───────────┐
//!   │ SqliteCache│  │ RedisCache │  │ NoopCache │
//!   │ (default)  │  │ (optional) │  │ (no-op)   │
//!   └────────────┘  └────────────┘  └───────────┘
//! ```
//!
//! Both on-disk stores live under `.goodtogo/` with file mode `0600` and
//! parent directory mode `0700`, verified (and tightened) on every open.

pub mod cache;
pub mod key;
pub mod memory;
pub mod noop;
pub mod perms;
pub mod redis_cache;
pub mod sqlite;
pub mod state;

pub use cache::{Cache, CacheError, CacheStats};
pub use key::{ttl_for_ci, CacheKey, TTL_FINAL, TTL_VOLATILE};
pub use memory::MemoryCache;
pub use noop::NoopCache;
pub use redis_cache::RedisCache;
pub use sqlite::SqliteCache;
pub use state::{ClassificationStore, MemoryStateStore, SqliteStateStore};
