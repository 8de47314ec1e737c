//! Command-line definition and PR reference parsing

use clap::Parser;
use gtg_analyzer::{AnalyzeOptions, CacheBackend};
use gtg_model::ValidationError;
use std::time::Duration;

/// Deterministic pull-request readiness analyzer
///
/// Prints a single machine-readable verdict (READY, ACTION_REQUIRED,
/// UNRESOLVED, CI_FAILING, ERROR) with the evidence behind it.
#[derive(Parser, Debug)]
#[command(name = "goodtogo", version, about)]
pub struct Cli {
    /// PR reference: `owner/repo#number` or a GitHub PR URL
    pub reference: String,

    /// Emit the full result as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Map each verdict to its own exit code (1-3) instead of exiting 0
    /// for everything but ERROR
    #[arg(long)]
    pub semantic_exit_codes: bool,

    /// Disable caching entirely (one-shot run)
    #[arg(long)]
    pub no_cache: bool,

    /// Use a shared Redis cache at this URL instead of the embedded store
    #[arg(long, value_name = "URL")]
    pub redis_url: Option<String>,

    /// Embedded cache file location (default: .goodtogo/cache.db)
    #[arg(long, value_name = "PATH")]
    pub cache_path: Option<String>,

    /// Classification state file location (default: .goodtogo/state.db)
    #[arg(long, value_name = "PATH")]
    pub state_path: Option<String>,

    /// Skip cache reads, forcing fresh data (cache is still written)
    #[arg(long)]
    pub force_refresh: bool,

    /// CI check name to exclude from the roll-up (exact match, repeatable)
    #[arg(long = "exclude-check", value_name = "NAME")]
    pub exclude_checks: Vec<String>,

    /// Wall-clock budget for the whole analysis, in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout_secs: Option<u64>,
}

impl Cli {
    /// Translate the flags into the analyzer's closed option set
    pub fn to_options(&self) -> AnalyzeOptions {
        let cache_backend = if self.no_cache {
            CacheBackend::None
        } else if self.redis_url.is_some() {
            CacheBackend::Remote
        } else {
            CacheBackend::Embedded
        };

        AnalyzeOptions {
            cache_backend,
            cache_location: self.redis_url.clone().or_else(|| self.cache_path.clone()),
            state_location: self.state_path.clone(),
            exclude_check_names: self.exclude_checks.clone(),
            force_refresh: self.force_refresh,
            deadline: self.timeout_secs.map(Duration::from_secs),
            ..AnalyzeOptions::default()
        }
    }
}

/// Parse `owner/repo#number` or a GitHub PR URL into its parts
pub fn parse_reference(reference: &str) -> Result<(String, String, u64), ValidationError> {
    let bad = || ValidationError::Options(format!("unrecognized PR reference: {:?}", reference));

    // URL form: https://github.com/{owner}/{repo}/pull/{number}
    if let Some(rest) = reference
        .strip_prefix("https://github.com/")
        .or_else(|| reference.strip_prefix("http://github.com/"))
    {
        let parts: Vec<&str> = rest.trim_end_matches('/').split('/').collect();
        if let [owner, repo, "pull", number] = parts.as_slice() {
            let number: u64 = number.parse().map_err(|_| bad())?;
            return Ok((owner.to_string(), repo.to_string(), number));
        }
        return Err(bad());
    }

    // Short form: owner/repo#number
    let (repo_part, number) = reference.split_once('#').ok_or_else(bad)?;
    let (owner, repo) = repo_part.split_once('/').ok_or_else(bad)?;
    let number: u64 = number.parse().map_err(|_| bad())?;
    Ok((owner.to_string(), repo.to_string(), number))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_short_reference() {
        let (owner, repo, number) = parse_reference("rust-lang/cargo#42").unwrap();
        assert_eq!(owner, "rust-lang");
        assert_eq!(repo, "cargo");
        assert_eq!(number, 42);
    }

    #[test]
    fn test_parse_url_reference() {
        let (owner, repo, number) =
            parse_reference("https://github.com/rust-lang/cargo/pull/42").unwrap();
        assert_eq!(owner, "rust-lang");
        assert_eq!(repo, "cargo");
        assert_eq!(number, 42);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_reference("cargo#42").is_err());
        assert!(parse_reference("rust-lang/cargo").is_err());
        assert!(parse_reference("rust-lang/cargo#abc").is_err());
        assert!(parse_reference("https://github.com/rust-lang/cargo/issues/42").is_err());
    }

    #[test]
    fn test_backend_selection() {
        let cli = Cli::parse_from(["goodtogo", "o/r#1", "--no-cache"]);
        assert_eq!(cli.to_options().cache_backend, CacheBackend::None);

        let cli = Cli::parse_from(["goodtogo", "o/r#1", "--redis-url", "redis://localhost"]);
        let options = cli.to_options();
        assert_eq!(options.cache_backend, CacheBackend::Remote);
        assert_eq!(options.cache_location.as_deref(), Some("redis://localhost"));

        let cli = Cli::parse_from(["goodtogo", "o/r#1"]);
        assert_eq!(cli.to_options().cache_backend, CacheBackend::Embedded);
    }

    #[test]
    fn test_exclude_checks_repeatable() {
        let cli = Cli::parse_from([
            "goodtogo",
            "o/r#1",
            "--exclude-check",
            "flaky",
            "--exclude-check",
            "canary",
        ]);
        assert_eq!(cli.to_options().exclude_check_names, vec!["flaky", "canary"]);
    }
}
