//! Cursor Bugbot comment classifier
//!
//! Bugbot labels findings with an explicit severity line
//! (`Critical Severity` .. `Low Severity`); run summaries report the
//! reviewed state at the PR level.

use crate::parser::{ReviewParser, Verdict};
use gtg_model::{Priority, ReviewerType};

pub struct CursorParser;

impl ReviewParser for CursorParser {
    fn reviewer_type(&self) -> ReviewerType {
        ReviewerType::Cursor
    }

    fn can_parse(&self, author: &str, body: &str) -> bool {
        author == "cursor[bot]" || author == "cursor-bot" || body.contains("cursor.com")
    }

    fn is_summary(&self, body: &str) -> bool {
        body.contains("Bugbot reviewed") || body.contains("Bugbot run")
    }

    fn classify_body(&self, body: &str) -> Verdict {
        if body.contains("Critical Severity") {
            return Verdict::actionable(Priority::Critical);
        }
        if body.contains("High Severity") {
            return Verdict::actionable(Priority::Major);
        }
        if body.contains("Medium Severity") {
            return Verdict::actionable(Priority::Minor);
        }
        if body.contains("Low Severity") {
            return Verdict::non_actionable_at(Priority::Trivial);
        }
        Verdict::ambiguous()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gtg_model::CommentClassification;

    fn classify(body: &str) -> Verdict {
        CursorParser.classify(body, false, false)
    }

    #[test]
    fn test_can_parse() {
        let p = CursorParser;
        assert!(p.can_parse("cursor[bot]", ""));
        assert!(p.can_parse("cursor-bot", ""));
        assert!(p.can_parse("x", "details at cursor.com/bugbot"));
        assert!(!p.can_parse("octocat", "hello"));
    }

    #[test]
    fn test_severity_table() {
        assert_eq!(
            classify("Critical Severity\n\nUse-after-free"),
            Verdict::actionable(Priority::Critical)
        );
        assert_eq!(
            classify("High Severity\n\nUnchecked unwrap"),
            Verdict::actionable(Priority::Major)
        );
        assert_eq!(
            classify("Medium Severity\n\nMissing timeout"),
            Verdict::actionable(Priority::Minor)
        );

        let v = classify("Low Severity\n\nInconsistent naming");
        assert_eq!(v.classification, CommentClassification::NonActionable);
        assert_eq!(v.priority, Priority::Trivial);
    }

    #[test]
    fn test_run_summary_is_non_actionable() {
        let v = classify("Bugbot reviewed 14 files and found no issues.");
        assert_eq!(v.classification, CommentClassification::NonActionable);
    }

    #[test]
    fn test_otherwise_ambiguous() {
        let v = classify("this loop allocates a lot");
        assert_eq!(v.classification, CommentClassification::Ambiguous);
        assert!(v.requires_investigation);
    }

    #[test]
    fn test_outdated_thread_cascade() {
        let v = CursorParser.classify("Critical Severity", false, true);
        assert_eq!(v.classification, CommentClassification::NonActionable);
    }
}
