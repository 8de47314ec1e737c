//! Octocrab-based GitHub port
//!
//! Direct implementation of `GitHubPort` over REST (PR, comments, reviews,
//! CI) and GraphQL (review threads, which REST does not expose). Raw routes
//! with local DTOs are used throughout so the adapter depends only on the
//! fields it reads.

use crate::port::{GitHubPort, PortError, PrMeta};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gtg_model::{redact, CiCheck, Comment, RepoCoordinate, Review, ReviewThread, ReviewerType};
use log::debug;
use octocrab::Octocrab;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

const PER_PAGE: u8 = 100;

/// Review-body virtual comments get ids in a reserved high range so they
/// cannot collide with real comment ids.
const VIRTUAL_ID_BIT: u64 = 1 << 63;

/// Direct GitHub API port using octocrab
#[derive(Clone)]
pub struct OctocrabPort {
    octocrab: Arc<Octocrab>,
}

impl OctocrabPort {
    pub fn new(octocrab: Arc<Octocrab>) -> Self {
        Self { octocrab }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, route: String) -> Result<T, PortError> {
        self.octocrab
            .get(route, None::<&()>)
            .await
            .map_err(map_octocrab_error)
    }

    /// Fetch all pages of a JSON-array endpoint
    async fn get_paged<T: serde::de::DeserializeOwned>(
        &self,
        base_route: &str,
    ) -> Result<Vec<T>, PortError> {
        let mut items: Vec<T> = Vec::new();
        let mut page = 1u32;

        loop {
            let sep = if base_route.contains('?') { '&' } else { '?' };
            let route = format!("{}{}per_page={}&page={}", base_route, sep, PER_PAGE, page);
            let batch: Vec<T> = self.get_json(route).await?;
            let batch_len = batch.len();
            items.extend(batch);

            if batch_len < PER_PAGE as usize {
                break;
            }
            page += 1;
        }

        Ok(items)
    }
}

fn map_octocrab_error(e: octocrab::Error) -> PortError {
    match &e {
        octocrab::Error::GitHub { source, .. } => {
            let message = redact(&source.message);
            match source.status_code.as_u16() {
                401 => PortError::Auth(message),
                403 if message.to_lowercase().contains("rate limit") => {
                    PortError::RateLimited(message)
                }
                403 => PortError::Auth(message),
                404 => PortError::NotFound(message),
                status => PortError::Http { status, message },
            }
        }
        octocrab::Error::Serde { .. } | octocrab::Error::Json { .. } => {
            PortError::Schema(redact(&e.to_string()))
        }
        _ => PortError::Network(redact(&e.to_string())),
    }
}

// Local DTOs: only the fields the analyzer reads.

#[derive(Deserialize)]
struct UserDto {
    login: String,
}

#[derive(Deserialize)]
struct RefDto {
    #[serde(rename = "ref")]
    branch: String,
    sha: Option<String>,
}

#[derive(Deserialize)]
struct PullDto {
    number: u64,
    title: Option<String>,
    user: Option<UserDto>,
    head: RefDto,
    base: RefDto,
    html_url: String,
}

#[derive(Deserialize)]
struct CommitDto {
    commit: CommitDetailDto,
}

#[derive(Deserialize)]
struct CommitDetailDto {
    committer: Option<CommitSignatureDto>,
}

#[derive(Deserialize)]
struct CommitSignatureDto {
    date: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
struct InlineCommentDto {
    id: u64,
    user: Option<UserDto>,
    body: String,
    created_at: DateTime<Utc>,
    path: Option<String>,
    line: Option<u64>,
    original_line: Option<u64>,
    in_reply_to_id: Option<u64>,
    html_url: String,
}

#[derive(Deserialize)]
struct IssueCommentDto {
    id: u64,
    user: Option<UserDto>,
    body: Option<String>,
    created_at: DateTime<Utc>,
    html_url: String,
}

#[derive(Deserialize)]
struct ReviewDto {
    id: u64,
    user: Option<UserDto>,
    body: Option<String>,
    submitted_at: Option<DateTime<Utc>>,
    html_url: Option<String>,
}

#[derive(Deserialize)]
struct CheckRunsDto {
    check_runs: Vec<CheckRunDto>,
}

#[derive(Deserialize)]
struct CheckRunDto {
    name: String,
    status: Option<String>,
    conclusion: Option<String>,
    details_url: Option<String>,
}

#[derive(Deserialize)]
struct CombinedStatusDto {
    statuses: Vec<CommitStatusDto>,
}

#[derive(Deserialize)]
struct CommitStatusDto {
    context: String,
    state: String,
    target_url: Option<String>,
}

fn login_of(user: &Option<UserDto>) -> String {
    user.as_ref()
        .map(|u| u.login.clone())
        .unwrap_or_else(|| "ghost".to_string())
}

fn blank_comment(id: u64, author: String, body: String, created_at: DateTime<Utc>, url: String) -> Comment {
    let reviewer_type = ReviewerType::from_login(&author);
    Comment {
        id,
        author,
        reviewer_type,
        body,
        created_at,
        file_path: None,
        line_number: None,
        thread_id: None,
        is_resolved: false,
        is_outdated: false,
        url,
        in_reply_to_id: None,
        classification: None,
        priority: None,
        requires_investigation: false,
    }
}

fn convert_inline_comment(dto: InlineCommentDto) -> Comment {
    let mut comment = blank_comment(
        dto.id,
        login_of(&dto.user),
        dto.body,
        dto.created_at,
        dto.html_url,
    );
    comment.file_path = dto.path;
    comment.line_number = dto.line.or(dto.original_line);
    comment.in_reply_to_id = dto.in_reply_to_id;
    comment
}

fn convert_issue_comment(dto: IssueCommentDto) -> Comment {
    blank_comment(
        dto.id,
        login_of(&dto.user),
        dto.body.unwrap_or_default(),
        dto.created_at,
        dto.html_url,
    )
}

/// Turn a non-empty review body into a virtual comment with a synthesized id
fn review_to_virtual_comment(dto: &ReviewDto) -> Option<Comment> {
    let body = dto.body.clone().filter(|b| !b.trim().is_empty())?;
    let submitted_at = dto.submitted_at?;
    Some(blank_comment(
        dto.id | VIRTUAL_ID_BIT,
        login_of(&dto.user),
        body,
        submitted_at,
        dto.html_url.clone().unwrap_or_default(),
    ))
}

/// Merge check runs and legacy statuses by name; a check run wins a name
/// collision (the newer API supersedes the old one)
fn merge_ci_checks(check_runs: Vec<CiCheck>, statuses: Vec<CiCheck>) -> Vec<CiCheck> {
    let mut by_name: HashMap<String, CiCheck> = HashMap::new();
    let mut order: Vec<String> = Vec::new();

    for check in check_runs.into_iter().chain(statuses) {
        if !by_name.contains_key(&check.name) {
            order.push(check.name.clone());
            by_name.insert(check.name.clone(), check);
        }
    }

    order
        .into_iter()
        .filter_map(|name| by_name.remove(&name))
        .collect()
}

// GraphQL response shape for review threads.

#[derive(Deserialize)]
struct GraphQlThreads {
    data: Option<GraphQlRepoData>,
}

#[derive(Deserialize)]
struct GraphQlRepoData {
    repository: Option<GraphQlRepository>,
}

#[derive(Deserialize)]
struct GraphQlRepository {
    #[serde(rename = "pullRequest")]
    pull_request: Option<GraphQlPullRequest>,
}

#[derive(Deserialize)]
struct GraphQlPullRequest {
    #[serde(rename = "reviewThreads")]
    review_threads: GraphQlThreadConnection,
}

#[derive(Deserialize)]
struct GraphQlThreadConnection {
    nodes: Vec<GraphQlThread>,
    #[serde(rename = "pageInfo")]
    page_info: GraphQlPageInfo,
}

#[derive(Deserialize)]
struct GraphQlThread {
    id: String,
    #[serde(rename = "isResolved")]
    is_resolved: bool,
    #[serde(rename = "isOutdated")]
    is_outdated: bool,
    comments: GraphQlCommentConnection,
}

#[derive(Deserialize)]
struct GraphQlCommentConnection {
    nodes: Vec<GraphQlCommentNode>,
}

#[derive(Deserialize)]
struct GraphQlCommentNode {
    #[serde(rename = "databaseId")]
    database_id: Option<u64>,
}

#[derive(Deserialize)]
struct GraphQlPageInfo {
    #[serde(rename = "hasNextPage")]
    has_next_page: bool,
    #[serde(rename = "endCursor")]
    end_cursor: Option<String>,
}

const THREADS_QUERY: &str = r"
    query($owner: String!, $name: String!, $number: Int!, $cursor: String) {
      repository(owner: $owner, name: $name) {
        pullRequest(number: $number) {
          reviewThreads(first: 100, after: $cursor) {
            nodes {
              id
              isResolved
              isOutdated
              comments(first: 100) {
                nodes { databaseId }
              }
            }
            pageInfo { hasNextPage endCursor }
          }
        }
      }
    }
";

#[async_trait]
impl GitHubPort for OctocrabPort {
    async fn get_pr(&self, coord: &RepoCoordinate) -> Result<PrMeta, PortError> {
        debug!("fetching PR metadata for {}", coord);

        let route = format!(
            "/repos/{}/{}/pulls/{}",
            coord.owner(),
            coord.repo(),
            coord.number()
        );
        let pull: PullDto = self.get_json(route).await?;

        let head_sha = pull
            .head
            .sha
            .clone()
            .ok_or_else(|| PortError::Schema("pull request head has no sha".to_string()))?;

        // The pulls endpoint does not carry the commit timestamp.
        let commit_route = format!(
            "/repos/{}/{}/commits/{}",
            coord.owner(),
            coord.repo(),
            head_sha
        );
        let commit: CommitDto = self.get_json(commit_route).await?;
        let head_timestamp = commit.commit.committer.and_then(|c| c.date);

        Ok(PrMeta {
            number: pull.number,
            title: pull.title.unwrap_or_default(),
            author: login_of(&pull.user),
            head_sha,
            head_timestamp,
            base_branch: pull.base.branch,
            head_branch: pull.head.branch,
            url: pull.html_url,
        })
    }

    async fn get_comments(&self, coord: &RepoCoordinate) -> Result<Vec<Comment>, PortError> {
        debug!("fetching comments for {}", coord);

        let inline_route = format!(
            "/repos/{}/{}/pulls/{}/comments",
            coord.owner(),
            coord.repo(),
            coord.number()
        );
        let issue_route = format!(
            "/repos/{}/{}/issues/{}/comments",
            coord.owner(),
            coord.repo(),
            coord.number()
        );
        let review_route = format!(
            "/repos/{}/{}/pulls/{}/reviews",
            coord.owner(),
            coord.repo(),
            coord.number()
        );

        let inline: Vec<InlineCommentDto> = self.get_paged(&inline_route).await?;
        let issue: Vec<IssueCommentDto> = self.get_paged(&issue_route).await?;
        let reviews: Vec<ReviewDto> = self.get_paged(&review_route).await?;

        let mut comments: Vec<Comment> = Vec::new();
        comments.extend(inline.into_iter().map(convert_inline_comment));
        comments.extend(issue.into_iter().map(convert_issue_comment));
        comments.extend(reviews.iter().filter_map(review_to_virtual_comment));

        // De-duplicate by id, keeping the first occurrence.
        let mut seen = std::collections::HashSet::new();
        comments.retain(|c| seen.insert(c.id));

        debug!("fetched {} comments for {}", comments.len(), coord);
        Ok(comments)
    }

    async fn get_review_threads(
        &self,
        coord: &RepoCoordinate,
    ) -> Result<Vec<ReviewThread>, PortError> {
        debug!("fetching review threads for {}", coord);

        let mut threads = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let payload = json!({
                "query": THREADS_QUERY,
                "variables": {
                    "owner": coord.owner(),
                    "name": coord.repo(),
                    "number": coord.number() as i64,
                    "cursor": cursor,
                },
            });

            let response: serde_json::Value = self
                .octocrab
                .graphql(&payload)
                .await
                .map_err(map_octocrab_error)?;
            let parsed: GraphQlThreads = serde_json::from_value(response)
                .map_err(|e| PortError::Schema(redact(&e.to_string())))?;

            let connection = parsed
                .data
                .and_then(|d| d.repository)
                .and_then(|r| r.pull_request)
                .ok_or_else(|| {
                    PortError::Schema("repository.pullRequest.reviewThreads missing".to_string())
                })?
                .review_threads;

            for node in connection.nodes {
                threads.push(ReviewThread {
                    id: node.id,
                    comment_ids: node
                        .comments
                        .nodes
                        .into_iter()
                        .filter_map(|c| c.database_id)
                        .collect(),
                    is_resolved: node.is_resolved,
                    is_outdated: node.is_outdated,
                });
            }

            if !connection.page_info.has_next_page {
                break;
            }
            cursor = connection.page_info.end_cursor;
        }

        debug!("fetched {} review threads for {}", threads.len(), coord);
        Ok(threads)
    }

    async fn get_ci_status(
        &self,
        coord: &RepoCoordinate,
        git_ref: &str,
    ) -> Result<Vec<CiCheck>, PortError> {
        debug!("fetching CI status for {} @ {}", coord, git_ref);

        let checks_route = format!(
            "/repos/{}/{}/commits/{}/check-runs",
            coord.owner(),
            coord.repo(),
            git_ref
        );
        let status_route = format!(
            "/repos/{}/{}/commits/{}/status",
            coord.owner(),
            coord.repo(),
            git_ref
        );

        let runs: CheckRunsDto = self.get_json(checks_route).await?;
        let combined: CombinedStatusDto = self.get_json(status_route).await?;

        let check_runs = runs
            .check_runs
            .into_iter()
            .map(|run| CiCheck {
                name: run.name,
                status: run.status.unwrap_or_else(|| "queued".to_string()),
                conclusion: run.conclusion,
                url: run.details_url,
            })
            .collect();

        let statuses = combined
            .statuses
            .into_iter()
            .map(|s| CiCheck {
                name: s.context,
                status: s.state,
                conclusion: None,
                url: s.target_url,
            })
            .collect();

        Ok(merge_ci_checks(check_runs, statuses))
    }

    async fn get_reviews(&self, coord: &RepoCoordinate) -> Result<Vec<Review>, PortError> {
        debug!("fetching reviews for {}", coord);

        let route = format!(
            "/repos/{}/{}/pulls/{}/reviews",
            coord.owner(),
            coord.repo(),
            coord.number()
        );
        let reviews: Vec<ReviewDto> = self.get_paged(&route).await?;

        Ok(reviews
            .into_iter()
            .filter_map(|dto| {
                let submitted_at = dto.submitted_at?;
                Some(Review {
                    id: dto.id,
                    author: login_of(&dto.user),
                    body: dto.body.unwrap_or_default(),
                    submitted_at,
                })
            })
            .collect())
    }
}
