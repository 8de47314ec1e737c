//! The parser contract and its template-method prelude

use gtg_model::{CommentClassification, Priority, ReviewerType};

/// The outcome of classifying one comment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub classification: CommentClassification,
    pub priority: Priority,
    pub requires_investigation: bool,
}

impl Verdict {
    /// An actionable finding at the given priority
    pub fn actionable(priority: Priority) -> Self {
        Verdict {
            classification: CommentClassification::Actionable,
            priority,
            requires_investigation: false,
        }
    }

    /// Nothing to do; priority unknown
    pub fn non_actionable() -> Self {
        Self::non_actionable_at(Priority::Unknown)
    }

    /// Nothing to do, but the reviewer did assign a priority (nitpicks)
    pub fn non_actionable_at(priority: Priority) -> Self {
        Verdict {
            classification: CommentClassification::NonActionable,
            priority,
            requires_investigation: false,
        }
    }

    /// Could not decide; always requires investigation
    pub fn ambiguous() -> Self {
        Verdict {
            classification: CommentClassification::Ambiguous,
            priority: Priority::Unknown,
            requires_investigation: true,
        }
    }

    /// Clamp the ambiguity invariant: `Ambiguous` implies investigation
    fn normalized(mut self) -> Self {
        if self.classification == CommentClassification::Ambiguous {
            self.requires_investigation = true;
        }
        self
    }
}

/// A classifier for one reviewer's comment dialect
///
/// Implementations provide the discriminator (`can_parse`), the PR-level
/// summary signature (`is_summary`) and the body classifier
/// (`classify_body`). The provided `classify` wraps them in the common
/// prelude:
///
/// 1. a resolved or outdated thread makes any comment non-actionable,
/// 2. a PR-level summary is non-actionable,
/// 3. otherwise the body classifier decides.
///
/// The prelude lives on the trait so no implementation can skip it; the
/// `Ambiguous ⇒ requires_investigation` invariant is enforced at the same
/// boundary rather than left to implementor discipline.
pub trait ReviewParser: Send + Sync {
    /// The reviewer this parser understands
    fn reviewer_type(&self) -> ReviewerType;

    /// Fast discriminator over the author login and in-body signatures
    fn can_parse(&self, author: &str, body: &str) -> bool;

    /// Does this body match the reviewer's PR-level summary signature?
    fn is_summary(&self, body: &str) -> bool;

    /// Parser-specific classification of a live, non-summary body
    fn classify_body(&self, body: &str) -> Verdict;

    /// Classify a comment given its thread flags (do not override)
    fn classify(&self, body: &str, thread_is_resolved: bool, thread_is_outdated: bool) -> Verdict {
        if thread_is_resolved || thread_is_outdated {
            return Verdict::non_actionable();
        }
        if self.is_summary(body) {
            return Verdict::non_actionable();
        }
        self.classify_body(body).normalized()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A deliberately misbehaving parser: returns Ambiguous without the
    /// investigation flag and claims everything.
    struct SloppyParser;

    impl ReviewParser for SloppyParser {
        fn reviewer_type(&self) -> ReviewerType {
            ReviewerType::Unknown
        }

        fn can_parse(&self, _author: &str, _body: &str) -> bool {
            true
        }

        fn is_summary(&self, body: &str) -> bool {
            body == "summary"
        }

        fn classify_body(&self, _body: &str) -> Verdict {
            Verdict {
                classification: CommentClassification::Ambiguous,
                priority: Priority::Unknown,
                requires_investigation: false,
            }
        }
    }

    #[test]
    fn test_resolved_thread_short_circuits() {
        let parser = SloppyParser;
        let verdict = parser.classify("anything", true, false);
        assert_eq!(verdict.classification, CommentClassification::NonActionable);
        let verdict = parser.classify("anything", false, true);
        assert_eq!(verdict.classification, CommentClassification::NonActionable);
    }

    #[test]
    fn test_summary_short_circuits() {
        let parser = SloppyParser;
        let verdict = parser.classify("summary", false, false);
        assert_eq!(verdict.classification, CommentClassification::NonActionable);
    }

    #[test]
    fn test_ambiguity_invariant_enforced_at_boundary() {
        let parser = SloppyParser;
        let verdict = parser.classify("anything", false, false);
        assert_eq!(verdict.classification, CommentClassification::Ambiguous);
        assert!(verdict.requires_investigation);
    }
}
