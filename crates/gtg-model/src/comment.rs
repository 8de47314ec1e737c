//! Comment, review and review-thread entities
//!
//! A `Comment` is the unit of classification. The classification fields are
//! derived: they start empty and are filled in exactly once by the parser
//! chain. Thread resolution is authoritative and cascades onto every comment
//! the thread contains.

use crate::status::{CommentClassification, Priority, ReviewerType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single review comment (inline, review body, or issue comment)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    /// Stable GitHub id (or synthesized id for virtual comments)
    pub id: u64,

    /// Author's GitHub login
    pub author: String,

    /// Reviewer identity detected from the author login
    pub reviewer_type: ReviewerType,

    /// Full comment body (markdown)
    pub body: String,

    /// When the comment was created
    pub created_at: DateTime<Utc>,

    /// File the comment is attached to, if inline
    pub file_path: Option<String>,

    /// Line the comment is attached to, if inline
    pub line_number: Option<u64>,

    /// Owning review thread (GraphQL node id), if any
    pub thread_id: Option<String>,

    /// Whether the owning thread is resolved
    pub is_resolved: bool,

    /// Whether the owning thread is outdated (diff moved on)
    pub is_outdated: bool,

    /// Link to the comment on GitHub
    pub url: String,

    /// Id of the comment this one replies to, if any
    pub in_reply_to_id: Option<u64>,

    /// Derived: classification assigned by the parser chain
    pub classification: Option<CommentClassification>,

    /// Derived: priority assigned by the parser chain
    pub priority: Option<Priority>,

    /// Derived: true when the classification needs human follow-up
    pub requires_investigation: bool,
}

impl Comment {
    /// A comment with no reply target starts a thread (or stands alone)
    pub fn is_top_level(&self) -> bool {
        self.in_reply_to_id.is_none()
    }

    /// Copy the resolution flags from the owning thread onto this comment
    pub fn annotate_thread(&mut self, thread: &ReviewThread) {
        self.thread_id = Some(thread.id.clone());
        self.is_resolved = thread.is_resolved;
        self.is_outdated = thread.is_outdated;
    }

    /// Record the parser verdict on this comment
    ///
    /// The ambiguity invariant is clamped here as well: an `Ambiguous`
    /// classification always carries `requires_investigation`.
    pub fn set_verdict(
        &mut self,
        classification: CommentClassification,
        priority: Priority,
        requires_investigation: bool,
    ) {
        self.classification = Some(classification);
        self.priority = Some(priority);
        self.requires_investigation =
            requires_investigation || classification == CommentClassification::Ambiguous;
    }
}

/// A review thread as reported by the GraphQL API
///
/// Resolution status here is the authoritative source for the per-comment
/// `is_resolved`/`is_outdated` flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewThread {
    /// GraphQL node id
    pub id: String,

    /// Database ids of the comments in the thread, in thread order
    pub comment_ids: Vec<u64>,

    /// Whether a participant marked the thread resolved
    pub is_resolved: bool,

    /// Whether the code under discussion has been changed since
    pub is_outdated: bool,
}

/// A submitted PR review (its body is parsed for rollup sections)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    /// Review id
    pub id: u64,

    /// Author's GitHub login
    pub author: String,

    /// Review body (markdown); may be empty
    pub body: String,

    /// When the review was submitted
    pub submitted_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comment(id: u64) -> Comment {
        Comment {
            id,
            author: "octocat".to_string(),
            reviewer_type: ReviewerType::Human,
            body: "looks odd".to_string(),
            created_at: Utc::now(),
            file_path: None,
            line_number: None,
            thread_id: None,
            is_resolved: false,
            is_outdated: false,
            url: "https://github.com/o/r/pull/1#discussion_r1".to_string(),
            in_reply_to_id: None,
            classification: None,
            priority: None,
            requires_investigation: false,
        }
    }

    #[test]
    fn test_annotate_thread_copies_flags() {
        let thread = ReviewThread {
            id: "PRRT_abc".to_string(),
            comment_ids: vec![1],
            is_resolved: true,
            is_outdated: false,
        };
        let mut c = comment(1);
        c.annotate_thread(&thread);
        assert!(c.is_resolved);
        assert!(!c.is_outdated);
        assert_eq!(c.thread_id.as_deref(), Some("PRRT_abc"));
    }

    #[test]
    fn test_set_verdict_clamps_ambiguous() {
        let mut c = comment(1);
        // Even if the caller forgets the flag, Ambiguous forces it on.
        c.set_verdict(CommentClassification::Ambiguous, Priority::Unknown, false);
        assert!(c.requires_investigation);

        let mut c = comment(2);
        c.set_verdict(CommentClassification::Actionable, Priority::Major, false);
        assert!(!c.requires_investigation);
    }

    #[test]
    fn test_top_level() {
        let mut c = comment(1);
        assert!(c.is_top_level());
        c.in_reply_to_id = Some(7);
        assert!(!c.is_top_level());
    }
}
