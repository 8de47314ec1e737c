//! Greptile comment classifier
//!
//! Greptile review bodies lead with an `Actionable comments posted: N`
//! rollup; inline findings carry a bold category marker
//! (`**logic:**`, `**security:**`, ...).

use crate::parser::{ReviewParser, Verdict};
use gtg_model::{Priority, ReviewerType};
use regex::Regex;
use std::sync::OnceLock;

fn posted_count_regex() -> &'static Regex {
    static POSTED: OnceLock<Regex> = OnceLock::new();
    POSTED.get_or_init(|| Regex::new(r"Actionable comments posted:\s*(\d+)").unwrap())
}

fn severity_marker_regex() -> &'static Regex {
    static MARKER: OnceLock<Regex> = OnceLock::new();
    MARKER.get_or_init(|| {
        Regex::new(r"(?m)^\*\*(logic|syntax|security|performance|style):\*\*").unwrap()
    })
}

pub struct GreptileParser;

impl GreptileParser {
    fn posted_count(body: &str) -> Option<u64> {
        posted_count_regex()
            .captures(body)
            .and_then(|caps| caps[1].parse().ok())
    }
}

impl ReviewParser for GreptileParser {
    fn reviewer_type(&self) -> ReviewerType {
        ReviewerType::Greptile
    }

    fn can_parse(&self, author: &str, body: &str) -> bool {
        author == "greptile[bot]"
            || author == "greptile-apps[bot]"
            || body.contains("greptile.com")
    }

    fn is_summary(&self, body: &str) -> bool {
        Self::posted_count(body) == Some(0)
    }

    fn classify_body(&self, body: &str) -> Verdict {
        if let Some(count) = Self::posted_count(body) {
            if count > 0 {
                return Verdict::actionable(Priority::Minor);
            }
        }
        if severity_marker_regex().is_match(body) {
            return Verdict::actionable(Priority::Minor);
        }
        Verdict::ambiguous()
    }
}
