//! Fixed-order parser dispatch
//!
//! Specialized parsers are consulted first, `GenericParser` last; the first
//! `can_parse` hit wins. The order is part of the correctness contract
//! (Vercel must claim deployment comments before Generic sees them), so the
//! chain is a fixed list rather than an open registry.

use crate::claude::ClaudeParser;
use crate::coderabbit::CoderabbitParser;
use crate::cursor::CursorParser;
use crate::generic::GenericParser;
use crate::greptile::GreptileParser;
use crate::parser::{ReviewParser, Verdict};
use crate::vercel::VercelParser;
use gtg_model::{Comment, ReviewerType};
use log::debug;

pub struct ParserChain {
    parsers: Vec<Box<dyn ReviewParser>>,
}

impl ParserChain {
    /// Build the chain in its fixed consultation order
    pub fn new() -> Self {
        ParserChain {
            parsers: vec![
                Box::new(CoderabbitParser),
                Box::new(GreptileParser),
                Box::new(ClaudeParser),
                Box::new(CursorParser),
                Box::new(VercelParser),
                Box::new(GenericParser),
            ],
        }
    }

    /// Resolve a comment to exactly one parser
    pub fn resolve(&self, author: &str, body: &str) -> &dyn ReviewParser {
        self.parsers
            .iter()
            .find(|p| p.can_parse(author, body))
            .map(Box::as_ref)
            // GenericParser claims everything, so this is unreachable.
            .expect("parser chain must terminate with a catch-all parser")
    }

    /// Classify a comment in place: verdict fields plus a refined reviewer
    /// type when a specialized parser claimed it by body signature
    pub fn classify(&self, comment: &mut Comment) -> Verdict {
        let parser = self.resolve(&comment.author, &comment.body);
        let verdict = parser.classify(&comment.body, comment.is_resolved, comment.is_outdated);

        if parser.reviewer_type() != ReviewerType::Unknown {
            comment.reviewer_type = parser.reviewer_type();
        }
        comment.set_verdict(
            verdict.classification,
            verdict.priority,
            verdict.requires_investigation,
        );

        debug!(
            "classified comment {} from {} as {:?}/{:?}",
            comment.id, comment.author, verdict.classification, verdict.priority
        );
        verdict
    }
}

impl Default for ParserChain {
    fn default() -> Self {
        Self::new()
    }
}
