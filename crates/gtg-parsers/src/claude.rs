//! Claude Code comment classifier
//!
//! Claude reviews are prose; the enumerated signals are blocking phrases
//! (critical), approval phrases (non-actionable) and hedged suggestion
//! phrases (ambiguous). Task-completion summaries posted at the PR level
//! are never actionable.

use crate::parser::{ReviewParser, Verdict};
use gtg_model::{Priority, ReviewerType};

const BLOCKING_PHRASES: &[&str] = &[
    "❌ blocking",
    "🔴 critical",
    "must fix before merge",
    "request changes",
];

const APPROVAL_PHRASES: &[&str] = &[
    "lgtm",
    "looks good",
    "ready to merge",
    "approve",
    "✅ overall",
];

const SUGGESTION_PHRASES: &[&str] = &["consider", "suggestion", "might"];

fn contains_any(haystack: &str, phrases: &[&str]) -> bool {
    phrases.iter().any(|p| haystack.contains(p))
}

pub struct ClaudeParser;

impl ReviewParser for ClaudeParser {
    fn reviewer_type(&self) -> ReviewerType {
        ReviewerType::Claude
    }

    fn can_parse(&self, author: &str, body: &str) -> bool {
        matches!(
            author,
            "claude[bot]" | "claude-code[bot]" | "anthropic-claude[bot]"
        ) || body.contains("Generated with Claude Code")
            || body.contains("Claude Code")
    }

    fn is_summary(&self, body: &str) -> bool {
        // Task-completion reports: the watermark plus a completion marker.
        body.contains("Generated with Claude Code")
            && (body.contains("All tasks completed") || body.contains("## Summary"))
    }

    fn classify_body(&self, body: &str) -> Verdict {
        let lower = body.to_lowercase();

        if contains_any(&lower, BLOCKING_PHRASES) {
            return Verdict::actionable(Priority::Critical);
        }
        if contains_any(&lower, APPROVAL_PHRASES) {
            return Verdict::non_actionable();
        }
        if contains_any(&lower, SUGGESTION_PHRASES) {
            return Verdict::ambiguous();
        }
        Verdict::ambiguous()
    }
}
