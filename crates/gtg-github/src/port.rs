//! The GitHub port contract
//!
//! Five read operations, each returning model entities. Implementations own
//! retry/backoff; callers own timeouts. Every error message is redacted at
//! construction so no credential can ride an error chain to the user.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gtg_model::{CiCheck, Comment, RepoCoordinate, Review, ReviewThread};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// PR metadata, including the head commit the analysis is keyed on
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrMeta {
    /// PR number
    pub number: u64,

    /// PR title
    pub title: String,

    /// Author's GitHub login
    pub author: String,

    /// Latest commit SHA on the PR branch
    pub head_sha: String,

    /// Timestamp of the head commit
    pub head_timestamp: Option<DateTime<Utc>>,

    /// Base branch name (e.g. "main")
    pub base_branch: String,

    /// Head branch name
    pub head_branch: String,

    /// PR URL
    pub url: String,
}

/// Errors surfaced by a GitHub port implementation
///
/// Messages are redacted before they are stored here.
#[derive(Error, Debug, Clone)]
pub enum PortError {
    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("GitHub returned HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("schema violation in GitHub payload: {0}")]
    Schema(String),

    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

impl PortError {
    /// Fatal errors make the whole analysis an `ERROR`; the rest may
    /// degrade to a pending verdict when the missing data allows it
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            PortError::Auth(_) | PortError::NotFound(_) | PortError::Schema(_)
        )
    }
}

/// Read-only GitHub access as the analyzer needs it
///
/// Implementations must be `Send + Sync`; the analyzer issues the fetches
/// concurrently. Retry with backoff is the implementation's concern;
/// cancellation (timeouts) is the caller's.
#[async_trait]
pub trait GitHubPort: Send + Sync {
    /// PR metadata including head SHA and its commit timestamp
    async fn get_pr(&self, coord: &RepoCoordinate) -> Result<PrMeta, PortError>;

    /// Union of inline review comments, non-empty review bodies (as virtual
    /// comments with synthesized ids) and issue comments, deduplicated by id
    async fn get_comments(&self, coord: &RepoCoordinate) -> Result<Vec<Comment>, PortError>;

    /// All review threads with resolution/outdated flags and comment ids
    async fn get_review_threads(
        &self,
        coord: &RepoCoordinate,
    ) -> Result<Vec<ReviewThread>, PortError>;

    /// Check runs and legacy commit statuses for a ref, merged by name
    async fn get_ci_status(
        &self,
        coord: &RepoCoordinate,
        git_ref: &str,
    ) -> Result<Vec<CiCheck>, PortError>;

    /// Submitted reviews (bodies feed the outside-diff-range extraction)
    async fn get_reviews(&self, coord: &RepoCoordinate) -> Result<Vec<Review>, PortError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(PortError::Auth("bad".into()).is_fatal());
        assert!(PortError::NotFound("gone".into()).is_fatal());
        assert!(PortError::Schema("missing field".into()).is_fatal());
        assert!(!PortError::RateLimited("slow down".into()).is_fatal());
        assert!(!PortError::Network("reset".into()).is_fatal());
        assert!(!PortError::Timeout(Duration::from_secs(10)).is_fatal());
        assert!(!PortError::Http {
            status: 502,
            message: "bad gateway".into()
        }
        .is_fatal());
    }
}
