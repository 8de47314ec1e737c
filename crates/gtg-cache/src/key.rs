//! Cache key construction
//!
//! All keys are built through a sanitizing builder; nothing else may mint a
//! key. The key space, with per-class TTLs:
//!
//! ```text
//! pr:{owner}:{repo}:{pr}:head                          5 min
//! pr:{owner}:{repo}:{pr}:meta                          5 min
//! pr:{owner}:{repo}:{pr}:comment:{comment_id}          24 h
//! pr:{owner}:{repo}:{pr}:thread:{thread_id}:resolved   24 h (cached once resolved)
//! pr:{owner}:{repo}:{pr}:ci:{sha}                      5 min pending, 24 h final
//! ```

use crate::cache::CacheError;
use gtg_model::RepoCoordinate;
use regex::Regex;
use std::sync::OnceLock;
use std::time::Duration;

/// TTL for keys whose value changes while the PR is alive (head, meta,
/// pending CI)
pub const TTL_VOLATILE: Duration = Duration::from_secs(5 * 60);

/// TTL for keys whose value is final at a given head (comments, resolved
/// threads, completed CI)
pub const TTL_FINAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Pick the CI key TTL: short while anything is pending, long once final
pub fn ttl_for_ci(is_final: bool) -> Duration {
    if is_final {
        TTL_FINAL
    } else {
        TTL_VOLATILE
    }
}

fn part_regex() -> &'static Regex {
    static PART: OnceLock<Regex> = OnceLock::new();
    PART.get_or_init(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._=-]*$").unwrap())
}

/// Reject a key part that is empty, contains separator or glob characters,
/// or fails the identifier shape
fn sanitize_part(part: &str) -> Result<(), CacheError> {
    if part.is_empty()
        || part.contains(':')
        || part.contains('*')
        || part.contains('?')
        || part.chars().any(char::is_whitespace)
        || !part_regex().is_match(part)
    {
        return Err(CacheError::InvalidKeyPart(part.to_string()));
    }
    Ok(())
}

/// A fully sanitized cache key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Join raw parts into a key, sanitizing every part
    pub fn from_parts(parts: &[&str]) -> Result<Self, CacheError> {
        if parts.is_empty() {
            return Err(CacheError::InvalidKeyPart(String::new()));
        }
        for part in parts {
            sanitize_part(part)?;
        }
        Ok(CacheKey(parts.join(":")))
    }

    /// `pr:{owner}:{repo}:{pr}:head`
    ///
    /// Infallible: the coordinate parts were validated at construction.
    pub fn pr_head(coord: &RepoCoordinate) -> Self {
        CacheKey(format!("{}head", prefix_of(coord)))
    }

    /// `pr:{owner}:{repo}:{pr}:meta`
    pub fn pr_meta(coord: &RepoCoordinate) -> Self {
        CacheKey(format!("{}meta", prefix_of(coord)))
    }

    /// `pr:{owner}:{repo}:{pr}:comment:{comment_id}`
    pub fn comment(coord: &RepoCoordinate, comment_id: u64) -> Self {
        CacheKey(format!("{}comment:{}", prefix_of(coord), comment_id))
    }

    /// `pr:{owner}:{repo}:{pr}:thread:{thread_id}:resolved`
    ///
    /// Thread ids come off the wire, so this one sanitizes.
    pub fn thread_resolved(
        coord: &RepoCoordinate,
        thread_id: &str,
    ) -> Result<Self, CacheError> {
        sanitize_part(thread_id)?;
        Ok(CacheKey(format!(
            "{}thread:{}:resolved",
            prefix_of(coord),
            thread_id
        )))
    }

    /// `pr:{owner}:{repo}:{pr}:ci:{sha}`
    ///
    /// The sha comes off the wire, so this one sanitizes.
    pub fn ci(coord: &RepoCoordinate, sha: &str) -> Result<Self, CacheError> {
        sanitize_part(sha)?;
        Ok(CacheKey(format!("{}ci:{}", prefix_of(coord), sha)))
    }

    /// Prefix covering every key of one PR, for pattern invalidation
    pub fn pr_prefix(coord: &RepoCoordinate) -> String {
        prefix_of(coord)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

fn prefix_of(coord: &RepoCoordinate) -> String {
    format!(
        "pr:{}:{}:{}:",
        coord.owner(),
        coord.repo(),
        coord.number()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord() -> RepoCoordinate {
        RepoCoordinate::new("rust-lang", "cargo", 42).unwrap()
    }

    #[test]
    fn test_key_shapes() {
        let c = coord();
        assert_eq!(CacheKey::pr_head(&c).as_str(), "pr:rust-lang:cargo:42:head");
        assert_eq!(CacheKey::pr_meta(&c).as_str(), "pr:rust-lang:cargo:42:meta");
        assert_eq!(
            CacheKey::comment(&c, 991).as_str(),
            "pr:rust-lang:cargo:42:comment:991"
        );
        assert_eq!(
            CacheKey::thread_resolved(&c, "PRRT_kwDOA1").unwrap().as_str(),
            "pr:rust-lang:cargo:42:thread:PRRT_kwDOA1:resolved"
        );
        assert_eq!(
            CacheKey::ci(&c, "abc123").unwrap().as_str(),
            "pr:rust-lang:cargo:42:ci:abc123"
        );
        assert_eq!(CacheKey::pr_prefix(&c), "pr:rust-lang:cargo:42:");
    }

    #[test]
    fn test_sanitizer_rejections() {
        assert!(CacheKey::from_parts(&[]).is_err());
        assert!(CacheKey::from_parts(&["ok", ""]).is_err());
        assert!(CacheKey::from_parts(&["a:b"]).is_err());
        assert!(CacheKey::from_parts(&["a*"]).is_err());
        assert!(CacheKey::from_parts(&["a?"]).is_err());
        assert!(CacheKey::from_parts(&["a b"]).is_err());
        assert!(CacheKey::from_parts(&["-leading"]).is_err());
        assert!(CacheKey::from_parts(&["pr", "owner", "repo"]).is_ok());

        let c = coord();
        assert!(CacheKey::ci(&c, "sha with space").is_err());
        assert!(CacheKey::thread_resolved(&c, "id:colon").is_err());
    }

    #[test]
    fn test_ttl_classes() {
        assert_eq!(TTL_VOLATILE, Duration::from_secs(300));
        assert_eq!(TTL_FINAL, Duration::from_secs(86400));
        assert_eq!(ttl_for_ci(false), TTL_VOLATILE);
        assert_eq!(ttl_for_ci(true), TTL_FINAL);
    }
}
