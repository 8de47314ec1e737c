//! Core data model for the goodtogo PR readiness analyzer
//!
//! This crate holds the typed entities shared by every other crate:
//! enumerations, the comment/thread/CI entities, the analysis result,
//! identifier validation and secret redaction.
//!
//! The types here are intentionally free of transport or storage concerns:
//! they are constructed once per analysis pass and read-only thereafter.

pub mod analysis;
pub mod ci;
pub mod comment;
pub mod coordinate;
pub mod redact;
pub mod status;

pub use analysis::{has_open_threads, ClassificationRecord, PrAnalysisResult, ThreadSummary};
pub use ci::{CiCheck, CiStatus};
pub use comment::{Comment, Review, ReviewThread};
pub use coordinate::{validate_owner, validate_pr_number, validate_repo, RepoCoordinate, ValidationError};
pub use redact::{redact, SecretString};
pub use status::{CheckState, CommentClassification, PrStatus, Priority, ReviewerType};
