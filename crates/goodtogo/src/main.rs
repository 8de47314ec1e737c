//! goodtogo: deterministic pull-request readiness analyzer
//!
//! Thin driver over the analyzer: parse arguments, compose the port, cache
//! and state store, run one analysis, render it, map the verdict to an
//! exit code. All failure paths print through redaction.

use clap::Parser;
use gtg_analyzer::{build_cache, build_state_store, Analyzer};
use gtg_github::{CacheMode, CachedPort, OctocrabPort};
use gtg_model::{redact, PrStatus};
use std::sync::Arc;

mod cli;
mod exit_code;
mod render;
mod token;

use cli::{parse_reference, Cli};
use exit_code::{exit_code, ExitMode};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // One redacting sink for the whole process: every log line is scrubbed
    // before it can reach stderr, wherever it was emitted.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format(|buf, record| {
            use std::io::Write;
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                redact(&record.args().to_string())
            )
        })
        .init();

    let cli = Cli::parse();
    let code = run(cli).await;
    std::process::exit(code);
}

async fn run(cli: Cli) -> i32 {
    let mode = if cli.semantic_exit_codes {
        ExitMode::Semantic
    } else {
        ExitMode::AiFriendly
    };

    let (owner, repo, number) = match parse_reference(&cli.reference) {
        Ok(parts) => parts,
        Err(e) => return fail(&e.to_string()),
    };

    let options = cli.to_options();
    if let Err(e) = options.validate() {
        return fail(&e.to_string());
    }

    let token = match token::resolve_token().await {
        Ok(token) => token,
        Err(e) => return fail(&format!("{:#}", e)),
    };

    let octocrab = match octocrab::Octocrab::builder()
        .personal_token(token.expose().to_string())
        .build()
    {
        Ok(octocrab) => Arc::new(octocrab),
        Err(e) => return fail(&format!("failed to build GitHub client: {}", e)),
    };

    let cache = match build_cache(&options) {
        Ok(cache) => cache,
        Err(e) => return fail(&format!("failed to open cache: {}", e)),
    };
    let state = match build_state_store(&options) {
        Ok(state) => state,
        Err(e) => return fail(&format!("failed to open state store: {}", e)),
    };

    let cache_mode = if cli.no_cache {
        CacheMode::None
    } else if options.force_refresh {
        CacheMode::WriteOnly
    } else {
        CacheMode::ReadWrite
    };
    let port = Arc::new(CachedPort::new(
        OctocrabPort::new(octocrab),
        Arc::clone(&cache),
        cache_mode,
    ));

    let analyzer = match Analyzer::new(port, cache, state, options) {
        Ok(analyzer) => analyzer,
        Err(e) => return fail(&e.to_string()),
    };

    let result = match analyzer.analyze(&owner, &repo, number).await {
        Ok(result) => result,
        Err(e) => return fail(&e.to_string()),
    };

    if cli.json {
        match serde_json::to_string_pretty(&result) {
            Ok(json) => println!("{}", json),
            Err(e) => return fail(&format!("failed to serialize result: {}", e)),
        }
    } else {
        print!("{}", render::render_text(&result));
    }

    let stats = analyzer.cache_stats();
    log::debug!(
        "cache: {} hits, {} misses ({:.0}% hit rate); state store hits: {}",
        stats.hits,
        stats.misses,
        stats.hit_rate() * 100.0,
        analyzer.state_store_hits()
    );

    exit_code(mode, result.status)
}

/// Print a redacted error and return the ERROR exit code
fn fail(message: &str) -> i32 {
    eprintln!("error: {}", redact(message));
    exit_code(ExitMode::Semantic, PrStatus::Error)
}
