//! Analysis result types
//!
//! `PrAnalysisResult` is the immutable value handed back to the driver.
//! It is deterministic for a fixed remote state: no wall-clock fields, and
//! list ordering is fixed by `(created_at, id)`.

use crate::ci::CiStatus;
use crate::comment::{Comment, ReviewThread};
use crate::coordinate::RepoCoordinate;
use crate::redact::redact;
use crate::status::{CheckState, CommentClassification, PrStatus, Priority};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Thread resolution roll-up
///
/// Invariants: `total == resolved + unresolved`, `outdated <= total`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThreadSummary {
    pub total: usize,
    pub resolved: usize,
    pub unresolved: usize,
    pub outdated: usize,
}

impl ThreadSummary {
    /// Count resolution state over the fetched threads
    pub fn from_threads(threads: &[ReviewThread]) -> Self {
        let total = threads.len();
        let resolved = threads.iter().filter(|t| t.is_resolved).count();
        let outdated = threads.iter().filter(|t| t.is_outdated).count();
        ThreadSummary {
            total,
            resolved,
            unresolved: total - resolved,
            outdated,
        }
    }
}

/// True if some thread is neither resolved nor outdated
pub fn has_open_threads(threads: &[ReviewThread]) -> bool {
    threads.iter().any(|t| !t.is_resolved && !t.is_outdated)
}

/// The verdict plus all supporting evidence for one analysis pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrAnalysisResult {
    /// Repository owner
    pub owner: String,

    /// Repository name
    pub repo: String,

    /// PR number
    pub pr_number: u64,

    /// Latest commit on the PR branch (the invalidation axis)
    pub head_sha: String,

    /// Timestamp of the head commit
    pub head_timestamp: Option<DateTime<Utc>>,

    /// CI roll-up for the head commit
    pub ci_status: CiStatus,

    /// Review-thread roll-up
    pub thread_summary: ThreadSummary,

    /// Every fetched comment, classified, ordered by `(created_at, id)`
    pub comments: Vec<Comment>,

    /// Filtered view: comments classified `ACTIONABLE`
    pub actionable_comments: Vec<Comment>,

    /// Filtered view: comments classified `AMBIGUOUS`
    pub ambiguous_comments: Vec<Comment>,

    /// Short human-readable follow-ups
    pub action_items: Vec<String>,

    /// Final verdict
    pub status: PrStatus,
}

impl PrAnalysisResult {
    /// Build an `ERROR` result carrying one redacted description
    ///
    /// Used for every failure the analyzer reports as data rather than as a
    /// returned error (auth, not-found, integrity, permission).
    pub fn error(coord: &RepoCoordinate, message: &str) -> Self {
        PrAnalysisResult {
            owner: coord.owner().to_string(),
            repo: coord.repo().to_string(),
            pr_number: coord.number(),
            head_sha: String::new(),
            head_timestamp: None,
            ci_status: CiStatus::from_checks(vec![]),
            thread_summary: ThreadSummary::default(),
            comments: vec![],
            actionable_comments: vec![],
            ambiguous_comments: vec![],
            action_items: vec![redact(message)],
            status: PrStatus::Error,
        }
    }

    /// True when CI is neither failing nor pending
    pub fn ci_green(&self) -> bool {
        self.ci_status.state == CheckState::Success
    }
}

/// Persisted classification of one comment at one head commit
///
/// Once recorded, reviewer-side edits cannot flip the classification until a
/// new head commit invalidates the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationRecord {
    pub owner: String,
    pub repo: String,
    pub pr_number: u64,
    pub comment_id: u64,
    pub commit_sha: String,
    pub classification: CommentClassification,
    pub priority: Priority,
    pub first_seen_at: DateTime<Utc>,
}
