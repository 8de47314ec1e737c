//! Terminal fallback classifier
//!
//! Matches every comment no specialized parser claimed. An unclassified
//! comment is never silently dropped: it comes back ambiguous, flagged for
//! human triage.

use crate::parser::{ReviewParser, Verdict};
use gtg_model::ReviewerType;

pub struct GenericParser;

impl ReviewParser for GenericParser {
    fn reviewer_type(&self) -> ReviewerType {
        ReviewerType::Unknown
    }

    fn can_parse(&self, _author: &str, _body: &str) -> bool {
        true
    }

    fn is_summary(&self, _body: &str) -> bool {
        false
    }

    fn classify_body(&self, _body: &str) -> Verdict {
        Verdict::ambiguous()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gtg_model::CommentClassification;

    #[test]
    fn test_claims_everything() {
        assert!(GenericParser.can_parse("anyone", "anything"));
    }

    #[test]
    fn test_live_comment_is_ambiguous_with_investigation() {
        let v = GenericParser.classify("what about errors?", false, false);
        assert_eq!(v.classification, CommentClassification::Ambiguous);
        assert!(v.requires_investigation);
    }

    #[test]
    fn test_resolved_thread_is_non_actionable() {
        let v = GenericParser.classify("what about errors?", true, false);
        assert_eq!(v.classification, CommentClassification::NonActionable);
        assert!(!v.requires_investigation);
    }
}
