//! GitHub token resolution
//!
//! Sources, in order: `GITHUB_TOKEN` / `GH_TOKEN` environment variables,
//! then the `gh` CLI (`gh auth token`). The token lives in a
//! `SecretString` from the moment it is read.

use anyhow::{Context, Result};
use gtg_model::SecretString;
use log::debug;

pub async fn resolve_token() -> Result<SecretString> {
    if let Ok(token) = std::env::var("GITHUB_TOKEN").or_else(|_| std::env::var("GH_TOKEN")) {
        if !token.is_empty() {
            debug!("using token from environment");
            return Ok(SecretString::new(token));
        }
    }

    debug!("trying gh auth token");
    let output = tokio::process::Command::new("gh")
        .args(["auth", "token"])
        .output()
        .await
        .context("failed to run 'gh auth token'")?;

    if output.status.success() {
        let token = String::from_utf8(output.stdout)
            .context("invalid UTF-8 in gh auth token output")?
            .trim()
            .to_string();
        if !token.is_empty() {
            debug!("using token from gh CLI");
            return Ok(SecretString::new(token));
        }
    }

    anyhow::bail!(
        "no GitHub token found. Set GITHUB_TOKEN or run 'gh auth login'"
    )
}
