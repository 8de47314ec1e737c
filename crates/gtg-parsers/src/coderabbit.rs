//! CodeRabbit comment classifier
//!
//! CodeRabbit marks findings with a severity line
//! (`_⚠️ Potential issue_ | _🟡 Minor_`), nitpicks with `🧹 Nitpick`, and
//! stamps resolved findings with `✅ Addressed in commits`. Review bodies
//! carry an "Actionable comments posted" rollup plus optional
//! "Outside diff range" sections, which this module also extracts into
//! synthetic comments.

use crate::parser::{ReviewParser, Verdict};
use gtg_model::{Priority, ReviewerType};
use regex::Regex;
use std::sync::OnceLock;

const CODERABBIT_LOGIN: &str = "coderabbitai[bot]";

/// Prefix given to the body of synthetic outside-diff comments, and the
/// marker the classifier keys on.
pub const OUTSIDE_DIFF_MARKER: &str = "Outside diff range";

pub struct CoderabbitParser;

impl ReviewParser for CoderabbitParser {
    fn reviewer_type(&self) -> ReviewerType {
        ReviewerType::Coderabbit
    }

    fn can_parse(&self, author: &str, body: &str) -> bool {
        author == CODERABBIT_LOGIN
            || body.contains("coderabbit.ai")
            || body.contains("<!-- This is an auto-generated comment by CodeRabbit -->")
    }

    fn is_summary(&self, body: &str) -> bool {
        // The PR-level rollup carries the posted-count line but no per-file
        // finding (no severity marker and no outside-diff section).
        body.contains("Actionable comments posted:")
            && !body.contains("⚠️ Potential issue")
            && !body.contains(OUTSIDE_DIFF_MARKER)
    }

    fn classify_body(&self, body: &str) -> Verdict {
        // Edited-in resolution stamps win over the original severity line.
        if body.contains("✅ Addressed in commit") {
            return Verdict::non_actionable();
        }
        if body.contains("<!-- fingerprinting:") {
            return Verdict::non_actionable();
        }

        if body.contains("⚠️ Potential issue") {
            if body.contains("🔴 Critical") {
                return Verdict::actionable(Priority::Critical);
            }
            if body.contains("🟠 Major") {
                return Verdict::actionable(Priority::Major);
            }
            if body.contains("🟡 Minor") {
                return Verdict::actionable(Priority::Minor);
            }
            // A potential issue without a recognized severity dot is not in
            // the enumerated table.
            return Verdict::ambiguous();
        }

        if body.contains("🔵 Trivial") || body.contains("🧹 Nitpick") {
            return Verdict::non_actionable_at(Priority::Trivial);
        }

        if body.contains(OUTSIDE_DIFF_MARKER) {
            return Verdict::actionable(Priority::Minor);
        }

        Verdict::ambiguous()
    }
}

/// One file/line entry extracted from an "Outside diff range" section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutsideDiffItem {
    pub file: String,
    pub line: u64,
    pub text: String,
}

impl OutsideDiffItem {
    /// Deterministic synthetic comment id for this item
    ///
    /// FNV-1a over `review_id:file:line`, pushed into a reserved high range
    /// so it can never collide with a GitHub comment id.
    pub fn synthetic_id(&self, review_id: u64) -> u64 {
        let seed = format!("{}:{}:{}", review_id, self.file, self.line);
        fnv1a64(seed.as_bytes()) | (1 << 62)
    }

    /// Body of the synthetic comment, carrying the marker the classifier
    /// keys on
    pub fn synthetic_body(&self) -> String {
        format!("{}: {}", OUTSIDE_DIFF_MARKER, self.text)
    }
}

fn fnv1a64(bytes: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    let mut hash = OFFSET;
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}

fn bullet_regex() -> &'static Regex {
    static BULLET: OnceLock<Regex> = OnceLock::new();
    // `- `path/to/file.rs` line 42: text` or `* path/to/file.rs:42 - text`
    BULLET.get_or_init(|| {
        Regex::new(r"(?m)^\s*[-*]\s+`?([A-Za-z0-9_./-]+)`?(?:\s+lines?\s+|:)(\d+)`?[:\s-]*(.*)$")
            .unwrap()
    })
}

/// Extract the bulleted file/line entries from a review body's
/// "Outside diff range" sections
///
/// Entries are collected in document order, from the first line containing
/// the section marker to the end of its `<details>` block (or the end of
/// the body).
pub fn extract_outside_diff_items(review_body: &str) -> Vec<OutsideDiffItem> {
    let mut items = Vec::new();
    let mut in_section = false;

    for line in review_body.lines() {
        if line.contains(OUTSIDE_DIFF_MARKER) {
            in_section = true;
            continue;
        }
        if !in_section {
            continue;
        }
        if line.contains("</details>") || line.contains("<summary>") {
            in_section = false;
            continue;
        }
        if let Some(caps) = bullet_regex().captures(line) {
            let file = caps[1].to_string();
            if let Ok(line_number) = caps[2].parse::<u64>() {
                items.push(OutsideDiffItem {
                    file,
                    line: line_number,
                    text: caps[3].trim().to_string(),
                });
            }
        }
    }

    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use gtg_model::CommentClassification;

    fn classify(body: &str) -> Verdict {
        CoderabbitParser.classify(body, false, false)
    }

    #[test]
    fn test_can_parse() {
        let p = CoderabbitParser;
        assert!(p.can_parse("coderabbitai[bot]", "anything"));
        assert!(p.can_parse("someone", "see https://coderabbit.ai/docs"));
        assert!(!p.can_parse("octocat", "plain comment"));
    }

    #[test]
    fn test_severity_table() {
        let v = classify("_⚠️ Potential issue_ | _🔴 Critical_\n\nBuffer overflow");
        assert_eq!(v, Verdict::actionable(Priority::Critical));

        let v = classify("_⚠️ Potential issue_ | _🟠 Major_\n\nRace condition");
        assert_eq!(v, Verdict::actionable(Priority::Major));

        let v = classify("_⚠️ Potential issue_ | _🟡 Minor_\n\nTypo in error message");
        assert_eq!(v, Verdict::actionable(Priority::Minor));
    }

    #[test]
    fn test_nitpicks_and_trivia_are_non_actionable() {
        let v = classify("_🧹 Nitpick_ | naming could be nicer");
        assert_eq!(v.classification, CommentClassification::NonActionable);
        assert_eq!(v.priority, Priority::Trivial);

        let v = classify("_🔵 Trivial_ | whitespace");
        assert_eq!(v.classification, CommentClassification::NonActionable);
    }

    #[test]
    fn test_addressed_stamp_wins_over_severity() {
        let v = classify("_⚠️ Potential issue_ | _🔴 Critical_\n\n✅ Addressed in commits abc123");
        assert_eq!(v.classification, CommentClassification::NonActionable);
    }

    #[test]
    fn test_fingerprinting_comment_is_non_actionable() {
        let v = classify("<!-- fingerprinting: 4f2a -->");
        assert_eq!(v.classification, CommentClassification::NonActionable);
    }

    #[test]
    fn test_unrecognized_body_is_ambiguous() {
        let v = classify("I have thoughts about this function.");
        assert_eq!(v.classification, CommentClassification::Ambiguous);
        assert!(v.requires_investigation);

        // Potential issue without a severity dot is outside the table.
        let v = classify("_⚠️ Potential issue_\n\nsomething");
        assert_eq!(v.classification, CommentClassification::Ambiguous);
    }

    #[test]
    fn test_summary_signature() {
        let p = CoderabbitParser;
        assert!(p.is_summary("**Actionable comments posted: 2**\n\n<!-- walkthrough -->"));
        assert!(!p.is_summary(
            "**Actionable comments posted: 2**\n\n_⚠️ Potential issue_ | _🟡 Minor_"
        ));
        // Via the template method the summary comes back non-actionable.
        let v = p.classify("Actionable comments posted: 0", false, false);
        assert_eq!(v.classification, CommentClassification::NonActionable);
    }

    #[test]
    fn test_resolved_thread_cascade() {
        let v = CoderabbitParser.classify(
            "_⚠️ Potential issue_ | _🔴 Critical_\n\nStill here",
            true,
            false,
        );
        assert_eq!(v.classification, CommentClassification::NonActionable);
    }

    const REVIEW_BODY: &str = r#"**Actionable comments posted: 1**

<details>
<summary>Outside diff range comments (2)</summary>

- `src/lib.rs` line 10: missing error context
- `src/main.rs:42` stale TODO about retries

</details>
"#;

    #[test]
    fn test_extract_outside_diff_items() {
        let items = extract_outside_diff_items(REVIEW_BODY);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].file, "src/lib.rs");
        assert_eq!(items[0].line, 10);
        assert_eq!(items[0].text, "missing error context");
        assert_eq!(items[1].file, "src/main.rs");
        assert_eq!(items[1].line, 42);
    }

    #[test]
    fn test_extract_stops_outside_section() {
        let body = "- `src/a.rs` line 1: before the marker\n\nno sections here";
        assert!(extract_outside_diff_items(body).is_empty());
    }

    #[test]
    fn test_synthetic_ids_are_deterministic_and_high() {
        let items = extract_outside_diff_items(REVIEW_BODY);
        let a = items[0].synthetic_id(555);
        let b = items[0].synthetic_id(555);
        assert_eq!(a, b);
        assert!(a >= 1 << 62);
        // Different review, file or line changes the id.
        assert_ne!(a, items[0].synthetic_id(556));
        assert_ne!(a, items[1].synthetic_id(555));
    }

    #[test]
    fn test_synthetic_body_classifies_actionable_minor() {
        let items = extract_outside_diff_items(REVIEW_BODY);
        let v = classify(&items[0].synthetic_body());
        assert_eq!(v, Verdict::actionable(Priority::Minor));
    }
}
