//! Verdict to exit-code mapping
//!
//! Two modes. AI-friendly (the default) exits 0 for every decided verdict
//! so agents that treat non-zero as fatal do not read "needs fixes" as a
//! crash; the JSON `status` field carries the answer. Semantic mode encodes
//! the verdict in `$?`.

use gtg_model::PrStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitMode {
    AiFriendly,
    Semantic,
}

/// Exit code for an analysis verdict
pub fn exit_code(mode: ExitMode, status: PrStatus) -> i32 {
    match (mode, status) {
        (_, PrStatus::Error) => 4,
        (ExitMode::AiFriendly, _) => 0,
        (ExitMode::Semantic, PrStatus::Ready) => 0,
        (ExitMode::Semantic, PrStatus::ActionRequired) => 1,
        (ExitMode::Semantic, PrStatus::Unresolved) => 2,
        (ExitMode::Semantic, PrStatus::CiFailing) => 3,
    }
}
