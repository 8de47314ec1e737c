//! Verdict derivation
//!
//! The final status follows fixed precedence, highest first:
//! `Error > CiFailing > Unresolved > ActionRequired > Ready`.
//! Error never reaches this module; it is produced directly by the
//! analyzer when a precondition or fetch fails.

use gtg_model::{
    has_open_threads, CheckState, CiStatus, Comment, CommentClassification, PrStatus,
    ReviewThread,
};

/// Does any comment push the verdict to `ActionRequired`?
///
/// Actionable comments always do. An ambiguous comment does when it is
/// top-level and the PR author never replied in its thread: silence means
/// nobody triaged it.
fn has_actionable_work(comments: &[Comment], pr_author: &str) -> bool {
    let actionable = comments
        .iter()
        .any(|c| c.classification == Some(CommentClassification::Actionable));
    if actionable {
        return true;
    }

    comments
        .iter()
        .filter(|c| c.classification == Some(CommentClassification::Ambiguous))
        .filter(|c| c.is_top_level())
        .any(|c| !author_replied(comments, c, pr_author))
}

/// True when the PR author replied to the comment (directly or anywhere in
/// the same thread)
fn author_replied(comments: &[Comment], target: &Comment, pr_author: &str) -> bool {
    comments.iter().any(|c| {
        c.author == pr_author
            && c.in_reply_to_id.is_some()
            && (c.in_reply_to_id == Some(target.id)
                || (target.thread_id.is_some() && c.thread_id == target.thread_id))
    })
}

/// Apply the precedence rule to the rolled-up evidence
pub fn derive_status(
    ci: &CiStatus,
    threads: &[ReviewThread],
    comments: &[Comment],
    pr_author: &str,
) -> PrStatus {
    if matches!(ci.state, CheckState::Failure | CheckState::Pending) {
        return PrStatus::CiFailing;
    }
    if has_open_threads(threads) {
        return PrStatus::Unresolved;
    }
    if has_actionable_work(comments, pr_author) {
        return PrStatus::ActionRequired;
    }
    PrStatus::Ready
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use gtg_model::{Priority, ReviewerType};

    fn comment(id: u64, author: &str) -> Comment {
        Comment {
            id,
            author: author.to_string(),
            reviewer_type: ReviewerType::from_login(author),
            body: String::new(),
            created_at: Utc::now(),
            file_path: None,
            line_number: None,
            thread_id: None,
            is_resolved: false,
            is_outdated: false,
            url: String::new(),
            in_reply_to_id: None,
            classification: None,
            priority: None,
            requires_investigation: false,
        }
    }

    fn classified(id: u64, author: &str, class: CommentClassification) -> Comment {
        let mut c = comment(id, author);
        c.set_verdict(class, Priority::Unknown, false);
        c
    }

    fn green_ci() -> CiStatus {
        CiStatus::from_checks(vec![])
    }

    fn thread(resolved: bool, outdated: bool) -> ReviewThread {
        ReviewThread {
            id: "PRRT_x".to_string(),
            comment_ids: vec![],
            is_resolved: resolved,
            is_outdated: outdated,
        }
    }

    #[test]
    fn test_precedence_ci_over_threads() {
        let ci = CiStatus::from_checks(vec![gtg_model::CiCheck {
            name: "test".to_string(),
            status: "in_progress".to_string(),
            conclusion: None,
            url: None,
        }]);
        let status = derive_status(&ci, &[thread(false, false)], &[], "author");
        assert_eq!(status, PrStatus::CiFailing);
    }

    #[test]
    fn test_precedence_threads_over_comments() {
        let comments = vec![classified(1, "x", CommentClassification::Actionable)];
        let status = derive_status(&green_ci(), &[thread(false, false)], &comments, "author");
        assert_eq!(status, PrStatus::Unresolved);
    }

    #[test]
    fn test_outdated_thread_is_not_open() {
        let status = derive_status(&green_ci(), &[thread(false, true)], &[], "author");
        assert_eq!(status, PrStatus::Ready);
    }

    #[test]
    fn test_actionable_comment_requires_action() {
        let comments = vec![classified(1, "x", CommentClassification::Actionable)];
        let status = derive_status(&green_ci(), &[], &comments, "author");
        assert_eq!(status, PrStatus::ActionRequired);
    }

    #[test]
    fn test_unanswered_ambiguous_requires_action() {
        let comments = vec![classified(1, "reviewer", CommentClassification::Ambiguous)];
        let status = derive_status(&green_ci(), &[], &comments, "author");
        assert_eq!(status, PrStatus::ActionRequired);
    }

    #[test]
    fn test_direct_author_reply_clears_ambiguous() {
        let ambiguous = classified(1, "reviewer", CommentClassification::Ambiguous);
        let mut reply = classified(2, "author", CommentClassification::NonActionable);
        reply.in_reply_to_id = Some(1);

        let status = derive_status(&green_ci(), &[], &[ambiguous, reply], "author");
        assert_eq!(status, PrStatus::Ready);
    }

    #[test]
    fn test_same_thread_author_reply_clears_ambiguous() {
        let mut ambiguous = classified(1, "reviewer", CommentClassification::Ambiguous);
        ambiguous.thread_id = Some("PRRT_a".to_string());
        let mut reply = classified(2, "author", CommentClassification::NonActionable);
        reply.thread_id = Some("PRRT_a".to_string());
        reply.in_reply_to_id = Some(99);

        let status = derive_status(&green_ci(), &[], &[ambiguous, reply], "author");
        assert_eq!(status, PrStatus::Ready);
    }

    #[test]
    fn test_reply_from_someone_else_does_not_clear() {
        let ambiguous = classified(1, "reviewer", CommentClassification::Ambiguous);
        let mut reply = classified(2, "bystander", CommentClassification::NonActionable);
        reply.in_reply_to_id = Some(1);

        let status = derive_status(&green_ci(), &[], &[ambiguous, reply], "author");
        assert_eq!(status, PrStatus::ActionRequired);
    }

    #[test]
    fn test_ambiguous_reply_comment_does_not_trigger() {
        // An ambiguous comment that is itself a reply is not top-level.
        let mut ambiguous = classified(1, "reviewer", CommentClassification::Ambiguous);
        ambiguous.in_reply_to_id = Some(50);

        let status = derive_status(&green_ci(), &[], &[ambiguous], "author");
        assert_eq!(status, PrStatus::Ready);
    }

    #[test]
    fn test_all_clear_is_ready() {
        let comments = vec![classified(1, "x", CommentClassification::NonActionable)];
        let status = derive_status(&green_ci(), &[thread(true, false)], &comments, "author");
        assert_eq!(status, PrStatus::Ready);
    }
}
