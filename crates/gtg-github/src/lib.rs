//! GitHub port and adapters
//!
//! The analyzer talks to GitHub through the `GitHubPort` trait: five read
//! operations, no mutations. `OctocrabPort` is the direct REST/GraphQL
//! implementation; `CachedPort` decorates any port with the tiered cache.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                GitHubPort trait                  │
//! │  get_pr / get_comments / get_review_threads /    │
//! │  get_ci_status / get_reviews                     │
//! └─────────────────────────────────────────────────┘
//!                        │
//!        ┌───────────────┴───────────────┐
//!        ▼                               ▼
//! ┌─────────────────┐         ┌─────────────────────┐
//! │  OctocrabPort   │         │     CachedPort      │
//! │  (direct API)   │◄────────│     (decorator)     │
//! └─────────────────┘         └─────────────────────┘
//! ```

pub mod cached_port;
pub mod octocrab_port;
pub mod port;

pub use cached_port::{CacheMode, CachedPort};
pub use octocrab_port::OctocrabPort;
pub use port::{GitHubPort, PortError, PrMeta};
