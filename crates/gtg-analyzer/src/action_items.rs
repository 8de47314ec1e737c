//! Human-readable action items
//!
//! One short line per actionable comment, CI follow-ups, open-thread and
//! ambiguous-comment summaries. Order is stable: comment items first (in
//! comment order), then CI, threads, ambiguity.

use gtg_model::{CheckState, CiStatus, Comment, Priority, ThreadSummary};

/// Message used when CI is still in progress
pub const CI_RUNNING_ITEM: &str = "CI checks are still running - wait for completion";

/// One line for an actionable comment
fn comment_item(comment: &Comment) -> String {
    let priority = comment.priority.unwrap_or(Priority::Unknown);
    let reviewer = comment.reviewer_type.short_name();
    match (&comment.file_path, comment.line_number) {
        (Some(file), Some(line)) => {
            format!("Fix {} comment from {} in {}:{}", priority, reviewer, file, line)
        }
        (Some(file), None) => format!("Fix {} comment from {} in {}", priority, reviewer, file),
        _ => format!("Fix {} comment from {}", priority, reviewer),
    }
}

/// Assemble the action item list for a completed analysis
pub fn build_action_items(
    actionable: &[Comment],
    ambiguous_count: usize,
    ci: &CiStatus,
    threads: &ThreadSummary,
    open_threads: bool,
) -> Vec<String> {
    let mut items: Vec<String> = actionable.iter().map(comment_item).collect();

    match ci.state {
        CheckState::Failure => {
            for check in ci.checks.iter().filter(|c| {
                c.normalized_state() == CheckState::Failure
            }) {
                items.push(format!("Fix failing CI check: {}", check.name));
            }
        }
        // A forced-pending roll-up (CI unreachable) has no running checks;
        // the analyzer attaches its own explanation in that case.
        CheckState::Pending if ci.pending > 0 => items.push(CI_RUNNING_ITEM.to_string()),
        _ => {}
    }

    if open_threads {
        items.push(format!(
            "Resolve {} unresolved review thread(s)",
            threads.unresolved
        ));
    }

    if ambiguous_count > 0 {
        items.push(format!(
            "Review {} ambiguous comment(s) requiring investigation",
            ambiguous_count
        ));
    }

    items
}
