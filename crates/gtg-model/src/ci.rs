//! CI check entities and the CI roll-up
//!
//! A `CiCheck` keeps the raw `status`/`conclusion` strings from GitHub and
//! normalizes them into a single `CheckState`. `CiStatus` is the aggregate:
//! - any failure → `Failure`
//! - else any pending → `Pending`
//! - else → `Success`

use crate::status::CheckState;
use serde::{Deserialize, Serialize};

/// One CI check (check run or legacy commit status), raw as fetched
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CiCheck {
    /// Check name (e.g. "build", "test")
    pub name: String,

    /// Raw status string ("queued", "in_progress", "completed", ...)
    pub status: String,

    /// Raw conclusion string, present once completed
    pub conclusion: Option<String>,

    /// Link to the check details
    pub url: Option<String>,
}

impl CiCheck {
    /// Normalize the raw status/conclusion pair into one `CheckState`
    pub fn normalized_state(&self) -> CheckState {
        match self.conclusion.as_deref() {
            Some("success") => CheckState::Success,
            Some("failure") | Some("timed_out") | Some("cancelled") | Some("action_required") => {
                CheckState::Failure
            }
            Some("neutral") => CheckState::Neutral,
            Some("skipped") => CheckState::Skipped,
            // Legacy statuses report state through `status` directly.
            _ => match self.status.as_str() {
                "success" => CheckState::Success,
                "failure" | "error" => CheckState::Failure,
                _ => CheckState::Pending,
            },
        }
    }
}

/// Aggregated CI status for the PR head commit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CiStatus {
    /// Overall state across all checks
    pub state: CheckState,

    /// Total number of checks
    pub total: usize,

    /// Checks that passed (success, neutral or skipped)
    pub passed: usize,

    /// Checks that failed
    pub failed: usize,

    /// Checks still queued or running
    pub pending: usize,

    /// The individual checks behind the counts
    pub checks: Vec<CiCheck>,
}

impl CiStatus {
    /// Roll up a list of checks into the aggregate
    pub fn from_checks(checks: Vec<CiCheck>) -> Self {
        let mut passed = 0;
        let mut failed = 0;
        let mut pending = 0;

        for check in &checks {
            match check.normalized_state() {
                CheckState::Success | CheckState::Neutral | CheckState::Skipped => passed += 1,
                CheckState::Failure => failed += 1,
                CheckState::Pending => pending += 1,
            }
        }

        let state = if failed > 0 {
            CheckState::Failure
        } else if pending > 0 {
            CheckState::Pending
        } else {
            CheckState::Success
        };

        CiStatus {
            state,
            total: checks.len(),
            passed,
            failed,
            pending,
            checks,
        }
    }

    /// True once no check is queued or running
    pub fn is_final(&self) -> bool {
        self.pending == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(name: &str, status: &str, conclusion: Option<&str>) -> CiCheck {
        CiCheck {
            name: name.to_string(),
            status: status.to_string(),
            conclusion: conclusion.map(str::to_string),
            url: None,
        }
    }

    #[test]
    fn test_normalized_state() {
        assert_eq!(
            check("build", "completed", Some("success")).normalized_state(),
            CheckState::Success
        );
        assert_eq!(
            check("build", "completed", Some("timed_out")).normalized_state(),
            CheckState::Failure
        );
        assert_eq!(
            check("build", "in_progress", None).normalized_state(),
            CheckState::Pending
        );
        assert_eq!(
            check("lint", "completed", Some("skipped")).normalized_state(),
            CheckState::Skipped
        );
        // Legacy status API: state carried in `status`, no conclusion.
        assert_eq!(
            check("ci/legacy", "failure", None).normalized_state(),
            CheckState::Failure
        );
    }

    #[test]
    fn test_rollup_failure_wins() {
        let status = CiStatus::from_checks(vec![
            check("build", "completed", Some("success")),
            check("test", "completed", Some("failure")),
            check("deploy", "queued", None),
        ]);
        assert_eq!(status.state, CheckState::Failure);
        assert_eq!(status.total, 3);
        assert_eq!(status.passed, 1);
        assert_eq!(status.failed, 1);
        assert_eq!(status.pending, 1);
        assert!(!status.is_final());
    }

    #[test]
    fn test_rollup_pending_then_success() {
        let status = CiStatus::from_checks(vec![
            check("build", "completed", Some("success")),
            check("test", "in_progress", None),
        ]);
        assert_eq!(status.state, CheckState::Pending);

        let status = CiStatus::from_checks(vec![
            check("build", "completed", Some("success")),
            check("lint", "completed", Some("neutral")),
        ]);
        assert_eq!(status.state, CheckState::Success);
        assert_eq!(status.passed, 2);
        assert!(status.is_final());
    }

    #[test]
    fn test_rollup_empty() {
        let status = CiStatus::from_checks(vec![]);
        assert_eq!(status.state, CheckState::Success);
        assert_eq!(status.total, 0);
    }
}
