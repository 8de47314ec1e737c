//! Text rendering of an analysis result
//!
//! The JSON surface is `serde_json::to_string_pretty` of the result; this
//! module is the human-readable alternative. Everything printed here has
//! already passed through redaction when it was built.

use gtg_model::{PrAnalysisResult, PrStatus, Priority};

fn status_label(status: PrStatus) -> &'static str {
    match status {
        PrStatus::Ready => "READY",
        PrStatus::ActionRequired => "ACTION_REQUIRED",
        PrStatus::Unresolved => "UNRESOLVED",
        PrStatus::CiFailing => "CI_FAILING",
        PrStatus::Error => "ERROR",
    }
}

/// Render the result as human-readable text
pub fn render_text(result: &PrAnalysisResult) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "{}/{}#{}",
        result.owner, result.repo, result.pr_number
    ));
    if !result.head_sha.is_empty() {
        out.push_str(&format!(" @ {}", result.head_sha));
    }
    out.push('\n');
    out.push_str(&format!("Status: {}\n", status_label(result.status)));

    if result.status != PrStatus::Error {
        out.push_str(&format!(
            "CI: {}/{} passed ({} failed, {} pending)\n",
            result.ci_status.passed,
            result.ci_status.total,
            result.ci_status.failed,
            result.ci_status.pending
        ));
        out.push_str(&format!(
            "Threads: {}/{} resolved ({} outdated)\n",
            result.thread_summary.resolved,
            result.thread_summary.total,
            result.thread_summary.outdated
        ));

        if !result.actionable_comments.is_empty() {
            out.push_str(&format!(
                "\nActionable comments ({}):\n",
                result.actionable_comments.len()
            ));
            for comment in &result.actionable_comments {
                let priority = comment.priority.unwrap_or(Priority::Unknown);
                let location = match (&comment.file_path, comment.line_number) {
                    (Some(file), Some(line)) => format!(" {}:{}", file, line),
                    (Some(file), None) => format!(" {}", file),
                    _ => String::new(),
                };
                out.push_str(&format!(
                    "  - [{}] {}{}\n",
                    priority,
                    comment.reviewer_type.short_name(),
                    location
                ));
            }
        }

        if !result.ambiguous_comments.is_empty() {
            out.push_str(&format!(
                "\nAmbiguous comments ({}): need human triage\n",
                result.ambiguous_comments.len()
            ));
        }
    }

    if !result.action_items.is_empty() {
        out.push_str("\nAction items:\n");
        for item in &result.action_items {
            out.push_str(&format!("  - {}\n", item));
        }
    }

    out
}
