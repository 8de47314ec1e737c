//! Repository coordinate validation
//!
//! Owner, repo and PR number are validated before anything touches the
//! network, the cache key space, or the filesystem. A `RepoCoordinate`
//! can only be constructed through validation, so downstream code (cache
//! keys in particular) can rely on the parts being clean.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use thiserror::Error;

const MAX_OWNER_LEN: usize = 100;
const MAX_REPO_LEN: usize = 200;

/// Errors raised by identifier validation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid repository owner: {0:?}")]
    Owner(String),

    #[error("invalid repository name: {0:?}")]
    Repo(String),

    #[error("invalid PR number: {0} (must be 1..=2147483647)")]
    PrNumber(u64),

    #[error("invalid options: {0}")]
    Options(String),
}

fn identifier_regex() -> &'static Regex {
    static IDENTIFIER: OnceLock<Regex> = OnceLock::new();
    IDENTIFIER.get_or_init(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$").unwrap())
}

/// Validate a repository owner (user or organization login)
pub fn validate_owner(owner: &str) -> Result<(), ValidationError> {
    if owner.is_empty()
        || owner.len() > MAX_OWNER_LEN
        || owner.contains("..")
        || !identifier_regex().is_match(owner)
    {
        return Err(ValidationError::Owner(owner.to_string()));
    }
    Ok(())
}

/// Validate a repository name
pub fn validate_repo(repo: &str) -> Result<(), ValidationError> {
    if repo.is_empty()
        || repo.len() > MAX_REPO_LEN
        || repo.contains("..")
        || !identifier_regex().is_match(repo)
    {
        return Err(ValidationError::Repo(repo.to_string()));
    }
    Ok(())
}

/// Validate a PR number (positive, fits a signed 32-bit id)
pub fn validate_pr_number(number: u64) -> Result<(), ValidationError> {
    if number == 0 || number > i32::MAX as u64 {
        return Err(ValidationError::PrNumber(number));
    }
    Ok(())
}

/// A validated `(owner, repo, pr_number)` triple
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoCoordinate {
    owner: String,
    repo: String,
    number: u64,
}

impl RepoCoordinate {
    /// Validate and build a coordinate
    pub fn new(owner: &str, repo: &str, number: u64) -> Result<Self, ValidationError> {
        validate_owner(owner)?;
        validate_repo(repo)?;
        validate_pr_number(number)?;
        Ok(RepoCoordinate {
            owner: owner.to_string(),
            repo: repo.to_string(),
            number,
        })
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn repo(&self) -> &str {
        &self.repo
    }

    pub fn number(&self) -> u64 {
        self.number
    }
}

impl std::fmt::Display for RepoCoordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}#{}", self.owner, self.repo, self.number)
    }
}
