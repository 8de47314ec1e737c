//! Vercel (and generic deployment bot) classifier
//!
//! Deployment notifications carry no review content: every comment from
//! this reviewer is non-actionable and must never surface in action items.

use crate::parser::{ReviewParser, Verdict};
use gtg_model::ReviewerType;

pub struct VercelParser;

impl ReviewParser for VercelParser {
    fn reviewer_type(&self) -> ReviewerType {
        ReviewerType::Vercel
    }

    fn can_parse(&self, author: &str, body: &str) -> bool {
        author == "vercel[bot]"
            || body.contains("[vc]:")
            || body.contains("vercel.com")
            || body.contains(".vercel.app")
    }

    fn is_summary(&self, _body: &str) -> bool {
        false
    }

    fn classify_body(&self, _body: &str) -> Verdict {
        Verdict::non_actionable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gtg_model::{CommentClassification, Priority};

    #[test]
    fn test_can_parse() {
        let p = VercelParser;
        assert!(p.can_parse("vercel[bot]", ""));
        assert!(p.can_parse("x", "[vc]: #deployment"));
        assert!(p.can_parse("x", "preview at my-app.vercel.app"));
        assert!(!p.can_parse("octocat", "hello"));
    }

    #[test]
    fn test_everything_is_non_actionable() {
        for body in [
            "[vc]: Deployment Ready",
            "Deployment failed with errors",
            "anything at all",
        ] {
            let v = VercelParser.classify(body, false, false);
            assert_eq!(v.classification, CommentClassification::NonActionable, "{}", body);
            assert_eq!(v.priority, Priority::Unknown);
            assert!(!v.requires_investigation);
        }
    }
}
