//! The PR analyzer
//!
//! One public operation: `analyze(owner, repo, pr_number)`. Failures are
//! reported as data (`status = ERROR`) except identifier preconditions,
//! which fail synchronously before anything touches the network.

use crate::action_items::build_action_items;
use crate::options::AnalyzeOptions;
use crate::verdict::derive_status;
use chrono::Utc;
use gtg_cache::{Cache, CacheKey, ClassificationStore, TTL_VOLATILE};
use gtg_github::{GitHubPort, PortError};
use gtg_model::{
    CheckState, CiCheck, CiStatus, ClassificationRecord, Comment, CommentClassification,
    PrAnalysisResult, Priority, RepoCoordinate, Review, ReviewThread, ReviewerType,
    ThreadSummary, ValidationError,
};
use gtg_parsers::{extract_outside_diff_items, CoderabbitParser, ParserChain, ReviewParser};
use log::{debug, info, warn};
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::Arc;

/// Explanatory item used when the CI endpoints cannot be reached
const CI_UNAVAILABLE_ITEM: &str = "CI status unavailable - treated as pending";

/// Note attached when review bodies could not be fetched
const REVIEWS_STALE_ITEM: &str =
    "Review bodies unavailable - outside-diff findings may be missing";

pub struct Analyzer {
    port: Arc<dyn GitHubPort>,
    cache: Arc<dyn Cache>,
    state: Arc<dyn ClassificationStore>,
    chain: ParserChain,
    options: AnalyzeOptions,
}

impl Analyzer {
    /// Build an analyzer; fails only on invalid options
    pub fn new(
        port: Arc<dyn GitHubPort>,
        cache: Arc<dyn Cache>,
        state: Arc<dyn ClassificationStore>,
        options: AnalyzeOptions,
    ) -> Result<Self, ValidationError> {
        options.validate()?;
        Ok(Analyzer {
            port,
            cache,
            state,
            chain: ParserChain::new(),
            options,
        })
    }

    /// Analyze one pull request
    ///
    /// Returns `Err` only for precondition failures (invalid identifiers,
    /// by construction of `RepoCoordinate`). Every other failure comes back
    /// as a result whose `status` is `ERROR`.
    pub async fn analyze(
        &self,
        owner: &str,
        repo: &str,
        pr_number: u64,
    ) -> Result<PrAnalysisResult, ValidationError> {
        let coord = RepoCoordinate::new(owner, repo, pr_number)?;

        let result = match self.options.deadline {
            Some(deadline) => match tokio::time::timeout(deadline, self.run(&coord)).await {
                Ok(result) => result,
                Err(_) => PrAnalysisResult::error(&coord, "analysis deadline exceeded"),
            },
            None => self.run(&coord).await,
        };

        Ok(result)
    }

    /// Observable cache statistics (hits, misses)
    pub fn cache_stats(&self) -> gtg_cache::CacheStats {
        self.cache.stats()
    }

    /// How many classifications were served from the state store
    pub fn state_store_hits(&self) -> u64 {
        self.state.lookup_hits()
    }

    /// Apply the per-call timeout to one port operation
    async fn call<T>(
        &self,
        fut: impl Future<Output = Result<T, PortError>>,
    ) -> Result<T, PortError> {
        match tokio::time::timeout(self.options.call_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(PortError::Timeout(self.options.call_timeout)),
        }
    }

    async fn run(&self, coord: &RepoCoordinate) -> PrAnalysisResult {
        let expired = self.cache.cleanup_expired();
        if expired > 0 {
            debug!("dropped {} expired cache entries", expired);
        }

        // Resolve the PR head; without it nothing else can be keyed.
        let meta = match self.call(self.port.get_pr(coord)).await {
            Ok(meta) => meta,
            Err(e) => {
                return PrAnalysisResult::error(
                    coord,
                    &format!("failed to fetch PR metadata: {}", e),
                )
            }
        };

        self.invalidate_on_head_change(coord, &meta.head_sha);

        // Independent fetches, all through the cache, joined here.
        let (comments, threads, ci, reviews) = tokio::join!(
            self.call(self.port.get_comments(coord)),
            self.call(self.port.get_review_threads(coord)),
            self.call(self.port.get_ci_status(coord, &meta.head_sha)),
            self.call(self.port.get_reviews(coord)),
        );

        // Comments and threads are decision-relevant: without them no
        // verdict can be trusted.
        let mut comments = match comments {
            Ok(comments) => comments,
            Err(e) => {
                return PrAnalysisResult::error(coord, &format!("failed to fetch comments: {}", e))
            }
        };
        let threads = match threads {
            Ok(threads) => threads,
            Err(e) => {
                return PrAnalysisResult::error(
                    coord,
                    &format!("failed to fetch review threads: {}", e),
                )
            }
        };

        // CI can degrade: "cannot decide yet" is not "cannot talk to
        // GitHub at all".
        let (ci_checks, ci_unavailable) = match ci {
            Ok(checks) => (checks, false),
            Err(e) if e.is_fatal() => {
                return PrAnalysisResult::error(
                    coord,
                    &format!("failed to fetch CI status: {}", e),
                )
            }
            Err(e) => {
                warn!("CI status fetch failed for {}: {}", coord, e);
                (Vec::new(), true)
            }
        };

        // Reviews only feed the outside-diff supplement; degrade with a note.
        let (reviews, reviews_stale) = match reviews {
            Ok(reviews) => (reviews, false),
            Err(e) if e.is_fatal() => {
                return PrAnalysisResult::error(coord, &format!("failed to fetch reviews: {}", e))
            }
            Err(e) => {
                warn!("review fetch failed for {}: {}", coord, e);
                (Vec::new(), true)
            }
        };

        correlate_threads(&mut comments, &threads);
        synthesize_outside_diff(&mut comments, &reviews);
        dedup_by_id(&mut comments);

        for comment in comments.iter_mut() {
            self.classify_comment(coord, &meta.head_sha, comment);
        }
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        let excluded = &self.options.exclude_check_names;
        let kept: Vec<CiCheck> = ci_checks
            .into_iter()
            .filter(|check| !excluded.iter().any(|name| name == &check.name))
            .collect();
        let mut ci_status = CiStatus::from_checks(kept);
        if ci_unavailable {
            ci_status.state = CheckState::Pending;
        }

        let thread_summary = ThreadSummary::from_threads(&threads);
        let open_threads = gtg_model::has_open_threads(&threads);

        let status = derive_status(&ci_status, &threads, &comments, &meta.author);

        let actionable_comments: Vec<Comment> = comments
            .iter()
            .filter(|c| c.classification == Some(CommentClassification::Actionable))
            .cloned()
            .collect();
        let ambiguous_comments: Vec<Comment> = comments
            .iter()
            .filter(|c| c.classification == Some(CommentClassification::Ambiguous))
            .cloned()
            .collect();

        let mut action_items = build_action_items(
            &actionable_comments,
            ambiguous_comments.len(),
            &ci_status,
            &thread_summary,
            open_threads,
        );
        if ci_unavailable {
            action_items.push(CI_UNAVAILABLE_ITEM.to_string());
        }
        if reviews_stale {
            action_items.push(REVIEWS_STALE_ITEM.to_string());
        }

        info!(
            "analysis of {} @ {}: {:?} ({} comments, {} actionable, {} ambiguous)",
            coord,
            meta.head_sha,
            status,
            comments.len(),
            actionable_comments.len(),
            ambiguous_comments.len()
        );

        PrAnalysisResult {
            owner: coord.owner().to_string(),
            repo: coord.repo().to_string(),
            pr_number: coord.number(),
            head_sha: meta.head_sha,
            head_timestamp: meta.head_timestamp,
            ci_status,
            thread_summary,
            comments,
            actionable_comments,
            ambiguous_comments,
            action_items,
            status,
        }
    }

    /// Compare the observed head against the cached one; on a change, drop
    /// every cache entry and state record for the PR, then remember the new
    /// head
    fn invalidate_on_head_change(&self, coord: &RepoCoordinate, head_sha: &str) {
        let head_key = CacheKey::pr_head(coord);

        if let Some(previous) = self.cache.get(&head_key) {
            if previous != head_sha {
                info!(
                    "head of {} moved {} -> {}, invalidating cache and state",
                    coord, previous, head_sha
                );
                let entries = self.cache.invalidate_pattern(&CacheKey::pr_prefix(coord));
                let records = self.state.invalidate_pr(coord);
                debug!(
                    "invalidated {} cache entries and {} state records for {}",
                    entries, records, coord
                );
            }
        }

        if let Err(e) = self.cache.set(&head_key, head_sha, TTL_VOLATILE) {
            debug!("failed to record head for {}: {}", coord, e);
        }
    }

    /// Classify one comment, consulting the state store first
    fn classify_comment(&self, coord: &RepoCoordinate, head_sha: &str, comment: &mut Comment) {
        // Reviewer identity is refined from the body signature either way.
        let parser = self.chain.resolve(&comment.author, &comment.body);
        if parser.reviewer_type() != ReviewerType::Unknown {
            comment.reviewer_type = parser.reviewer_type();
        }

        // Thread resolution is authoritative and can change without a new
        // commit; it overrides any stored verdict and is never recorded.
        if comment.is_resolved || comment.is_outdated {
            comment.set_verdict(CommentClassification::NonActionable, Priority::Unknown, false);
            return;
        }

        if let Some(record) = self.state.lookup(coord, comment.id, head_sha) {
            comment.set_verdict(
                record.classification,
                record.priority,
                record.classification == CommentClassification::Ambiguous,
            );
            return;
        }

        let verdict = parser.classify(&comment.body, comment.is_resolved, comment.is_outdated);
        comment.set_verdict(
            verdict.classification,
            verdict.priority,
            verdict.requires_investigation,
        );

        let record = ClassificationRecord {
            owner: coord.owner().to_string(),
            repo: coord.repo().to_string(),
            pr_number: coord.number(),
            comment_id: comment.id,
            commit_sha: head_sha.to_string(),
            classification: verdict.classification,
            priority: verdict.priority,
            first_seen_at: Utc::now(),
        };
        if let Err(e) = self.state.record(&record) {
            debug!("failed to persist classification for {}: {}", comment.id, e);
        }
    }
}

/// Annotate every comment with its owning thread's resolution flags
fn correlate_threads(comments: &mut [Comment], threads: &[ReviewThread]) {
    let mut by_comment: HashMap<u64, &ReviewThread> = HashMap::new();
    for thread in threads {
        for id in &thread.comment_ids {
            by_comment.insert(*id, thread);
        }
    }
    for comment in comments.iter_mut() {
        if let Some(thread) = by_comment.get(&comment.id) {
            comment.annotate_thread(thread);
        }
    }
}

/// Emit synthetic comments for CodeRabbit "Outside diff range" entries
fn synthesize_outside_diff(comments: &mut Vec<Comment>, reviews: &[Review]) {
    let parser = CoderabbitParser;
    for review in reviews {
        if !parser.can_parse(&review.author, &review.body) {
            continue;
        }
        for item in extract_outside_diff_items(&review.body) {
            comments.push(Comment {
                id: item.synthetic_id(review.id),
                author: review.author.clone(),
                reviewer_type: ReviewerType::Coderabbit,
                body: item.synthetic_body(),
                created_at: review.submitted_at,
                file_path: Some(item.file.clone()),
                line_number: Some(item.line),
                thread_id: None,
                is_resolved: false,
                is_outdated: false,
                url: String::new(),
                in_reply_to_id: None,
                classification: None,
                priority: None,
                requires_investigation: false,
            });
        }
    }
}

/// Keep the first occurrence of every comment id
fn dedup_by_id(comments: &mut Vec<Comment>) {
    let mut seen = HashSet::new();
    comments.retain(|c| seen.insert(c.id));
}
