//! PR readiness analysis orchestration
//!
//! Ties the GitHub port, the tiered cache, the classification state store
//! and the parser chain together into one deterministic `analyze` call:
//!
//! 1. validate identifiers,
//! 2. resolve the PR head and invalidate cache/state on a head change,
//! 3. fetch comments, threads, CI and reviews in parallel,
//! 4. correlate threads, synthesize outside-diff comments, classify,
//! 5. roll up CI and threads, derive the verdict by fixed precedence,
//! 6. emit human-readable action items.

pub mod action_items;
pub mod analyzer;
pub mod backend;
pub mod options;
pub mod verdict;

pub use analyzer::Analyzer;
pub use backend::{build_cache, build_state_store};
pub use options::{AnalyzeOptions, CacheBackend};
pub use verdict::derive_status;
