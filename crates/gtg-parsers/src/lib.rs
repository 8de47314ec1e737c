//! Per-reviewer comment classifiers
//!
//! Every reviewer bot formats its findings differently; each gets a parser
//! that turns a comment body into a `Verdict` using enumerated syntactic
//! patterns only — no inference anywhere.
//!
//! The `ReviewParser` trait provides the shared `classify` prelude
//! (resolved/outdated threads and PR-level summaries are non-actionable
//! before any parser-specific logic runs), and `ParserChain` dispatches a
//! comment to the first parser that claims it, with `GenericParser` as the
//! guaranteed terminator.

pub mod chain;
pub mod claude;
pub mod coderabbit;
pub mod cursor;
pub mod generic;
pub mod greptile;
pub mod parser;
pub mod vercel;

pub use chain::ParserChain;
pub use claude::ClaudeParser;
pub use coderabbit::{extract_outside_diff_items, CoderabbitParser, OutsideDiffItem};
pub use cursor::CursorParser;
pub use generic::GenericParser;
pub use greptile::GreptileParser;
pub use parser::{ReviewParser, Verdict};
pub use vercel::VercelParser;
