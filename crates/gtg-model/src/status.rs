//! Enumerations shared across the analyzer
//!
//! These are the closed vocabularies of the system: the final verdict, the
//! three-way comment classification, comment priority, reviewer identity and
//! normalized CI check state. All of them serialize as the uppercase tokens
//! agents consume (`READY`, `ACTION_REQUIRED`, ...).

use serde::{Deserialize, Serialize};

/// Final verdict for a pull request
///
/// Exactly one status is derived per analysis, by fixed precedence:
/// `Error > CiFailing > Unresolved > ActionRequired > Ready`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PrStatus {
    /// Nothing left to do: CI green, threads resolved, no actionable comments
    Ready,
    /// At least one actionable comment (or unanswered ambiguous comment)
    ActionRequired,
    /// At least one review thread is neither resolved nor outdated
    Unresolved,
    /// CI has failing or still-pending checks
    CiFailing,
    /// The analysis itself could not complete
    Error,
}

/// Three-way classification of a single review comment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommentClassification {
    /// The reviewer is asking for a change
    Actionable,
    /// Informational, resolved, outdated or otherwise requiring no action
    NonActionable,
    /// The parser could not decide; surfaced for human triage
    Ambiguous,
}

/// Priority of an actionable comment, highest first
///
/// The `Ord` implementation ranks `Critical` above `Major` above `Minor`
/// above `Trivial` above `Unknown`, so `max()` picks the most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Critical,
    Major,
    Minor,
    Trivial,
    Unknown,
}

impl Priority {
    /// Severity rank; higher means more severe
    fn rank(self) -> u8 {
        match self {
            Priority::Critical => 4,
            Priority::Major => 3,
            Priority::Minor => 2,
            Priority::Trivial => 1,
            Priority::Unknown => 0,
        }
    }
}

impl Ord for Priority {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl PartialOrd for Priority {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Priority::Critical => "CRITICAL",
            Priority::Major => "MAJOR",
            Priority::Minor => "MINOR",
            Priority::Trivial => "TRIVIAL",
            Priority::Unknown => "UNKNOWN",
        };
        write!(f, "{}", s)
    }
}

/// Identity of the reviewer that authored a comment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewerType {
    Coderabbit,
    Greptile,
    Claude,
    Cursor,
    Vercel,
    /// A person, not a bot
    Human,
    /// A bot this analyzer has no dedicated parser for
    Unknown,
}

impl ReviewerType {
    /// Detect the reviewer from a GitHub login
    ///
    /// Recognized bot logins map to their reviewer; any other `[bot]` or
    /// `-bot` login is `Unknown`; everything else is `Human`.
    pub fn from_login(login: &str) -> Self {
        match login {
            "coderabbitai[bot]" => ReviewerType::Coderabbit,
            "greptile[bot]" | "greptile-apps[bot]" => ReviewerType::Greptile,
            "claude[bot]" | "claude-code[bot]" | "anthropic-claude[bot]" => ReviewerType::Claude,
            "cursor[bot]" | "cursor-bot" => ReviewerType::Cursor,
            "vercel[bot]" => ReviewerType::Vercel,
            other if other.ends_with("[bot]") || other.ends_with("-bot") => ReviewerType::Unknown,
            _ => ReviewerType::Human,
        }
    }

    /// Short lowercase name used in action items ("coderabbit", "claude", ...)
    pub fn short_name(&self) -> &'static str {
        match self {
            ReviewerType::Coderabbit => "coderabbit",
            ReviewerType::Greptile => "greptile",
            ReviewerType::Claude => "claude",
            ReviewerType::Cursor => "cursor",
            ReviewerType::Vercel => "vercel",
            ReviewerType::Human => "human",
            ReviewerType::Unknown => "unknown",
        }
    }
}

/// Normalized state of one CI check
///
/// Raw GitHub check runs and legacy commit statuses both collapse into this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckState {
    Success,
    Failure,
    Pending,
    Neutral,
    Skipped,
}
