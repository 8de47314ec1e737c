//! Classification state store
//!
//! Persists the classification a comment received at a given head commit.
//! An agent that fixes an issue and re-runs the analyzer expects the comment
//! to stay `NON_ACTIONABLE` until a new head commit lands, even if the
//! reviewer edits the body in between. The store is invalidated in lockstep
//! with the cache when the head SHA changes.
//!
//! The store is optional for correctness (a run without it re-classifies
//! deterministically); `MemoryStateStore` backs tests and no-cache runs.

use crate::cache::CacheError;
use crate::perms;
use chrono::{TimeZone, Utc};
use gtg_model::{ClassificationRecord, CommentClassification, Priority, RepoCoordinate};
use rusqlite::Connection;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Default on-disk location, relative to the working directory
pub const DEFAULT_STATE_PATH: &str = ".goodtogo/state.db";

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS classifications (
    pr_owner TEXT NOT NULL,
    pr_repo TEXT NOT NULL,
    pr_number INTEGER NOT NULL,
    comment_id INTEGER NOT NULL,
    commit_sha TEXT NOT NULL,
    classification TEXT NOT NULL,
    priority TEXT NOT NULL,
    first_seen_at INTEGER NOT NULL,
    UNIQUE(pr_owner, pr_repo, pr_number, comment_id)
);
"#;

fn backend_err(e: rusqlite::Error) -> CacheError {
    CacheError::Backend(gtg_model::redact(&e.to_string()))
}

/// Serialize an enum to its uppercase wire token ("ACTIONABLE", "MINOR", ...)
fn enum_token<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_value(value)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default()
}

fn parse_token<T: serde::de::DeserializeOwned>(token: &str) -> Option<T> {
    serde_json::from_value(serde_json::Value::String(token.to_string())).ok()
}

/// Persistence contract for per-comment classifications
///
/// Writes are first-writer-wins per `(pr, comment_id)`; duplicate writes are
/// idempotent. `lookup` only returns a record whose stored commit SHA matches
/// the one asked for.
pub trait ClassificationStore: Send + Sync {
    /// Fetch the record for `(coord, comment_id)` if it was taken at `sha`
    fn lookup(
        &self,
        coord: &RepoCoordinate,
        comment_id: u64,
        sha: &str,
    ) -> Option<ClassificationRecord>;

    /// Persist a record (no-op if one already exists for the comment)
    fn record(&self, record: &ClassificationRecord) -> Result<(), CacheError>;

    /// Drop every record for the PR; returns how many went away
    fn invalidate_pr(&self, coord: &RepoCoordinate) -> usize;

    /// How many lookups returned a record (observable for tests)
    fn lookup_hits(&self) -> u64;
}

/// SQLite-backed store at `.goodtogo/state.db`
pub struct SqliteStateStore {
    conn: Mutex<Connection>,
    hits: AtomicU64,
}

impl SqliteStateStore {
    /// Open (or create) the state file, enforcing `0600`/`0700` permissions
    pub fn open(path: &Path) -> Result<Self, CacheError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                perms::secure_dir(parent)?;
            }
        }
        perms::secure_file(path)?;

        let conn = Connection::open(path).map_err(backend_err)?;
        conn.execute_batch(SCHEMA).map_err(backend_err)?;

        Ok(SqliteStateStore {
            conn: Mutex::new(conn),
            hits: AtomicU64::new(0),
        })
    }

    /// Open the store at the default `.goodtogo/state.db` location
    pub fn open_default() -> Result<Self, CacheError> {
        Self::open(Path::new(DEFAULT_STATE_PATH))
    }
}

impl ClassificationStore for SqliteStateStore {
    fn lookup(
        &self,
        coord: &RepoCoordinate,
        comment_id: u64,
        sha: &str,
    ) -> Option<ClassificationRecord> {
        let conn = self.conn.lock().unwrap();
        let row = conn
            .query_row(
                "SELECT commit_sha, classification, priority, first_seen_at
                 FROM classifications
                 WHERE pr_owner = ?1 AND pr_repo = ?2 AND pr_number = ?3
                   AND comment_id = ?4 AND commit_sha = ?5",
                rusqlite::params![
                    coord.owner(),
                    coord.repo(),
                    coord.number() as i64,
                    comment_id as i64,
                    sha
                ],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, i64>(3)?,
                    ))
                },
            )
            .ok();

        let (commit_sha, classification, priority, first_seen_at) = row?;
        let record = ClassificationRecord {
            owner: coord.owner().to_string(),
            repo: coord.repo().to_string(),
            pr_number: coord.number(),
            comment_id,
            commit_sha,
            classification: parse_token::<CommentClassification>(&classification)?,
            priority: parse_token::<Priority>(&priority)?,
            first_seen_at: Utc.timestamp_opt(first_seen_at, 0).single()?,
        };
        self.hits.fetch_add(1, Ordering::Relaxed);
        Some(record)
    }

    fn record(&self, record: &ClassificationRecord) -> Result<(), CacheError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR IGNORE INTO classifications
             (pr_owner, pr_repo, pr_number, comment_id, commit_sha,
              classification, priority, first_seen_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            rusqlite::params![
                record.owner,
                record.repo,
                record.pr_number as i64,
                record.comment_id as i64,
                record.commit_sha,
                enum_token(&record.classification),
                enum_token(&record.priority),
                record.first_seen_at.timestamp()
            ],
        )
        .map(|_| ())
        .map_err(backend_err)
    }

    fn invalidate_pr(&self, coord: &RepoCoordinate) -> usize {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "DELETE FROM classifications
             WHERE pr_owner = ?1 AND pr_repo = ?2 AND pr_number = ?3",
            rusqlite::params![coord.owner(), coord.repo(), coord.number() as i64],
        )
        .unwrap_or(0)
    }

    fn lookup_hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }
}

type MemoryKey = (String, String, u64, u64);

/// In-memory store for tests and `--no-cache` runs
#[derive(Default)]
pub struct MemoryStateStore {
    records: Mutex<HashMap<MemoryKey, ClassificationRecord>>,
    hits: AtomicU64,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        MemoryStateStore::default()
    }
}

impl ClassificationStore for MemoryStateStore {
    fn lookup(
        &self,
        coord: &RepoCoordinate,
        comment_id: u64,
        sha: &str,
    ) -> Option<ClassificationRecord> {
        let records = self.records.lock().unwrap();
        let key = (
            coord.owner().to_string(),
            coord.repo().to_string(),
            coord.number(),
            comment_id,
        );
        let record = records.get(&key).filter(|r| r.commit_sha == sha).cloned()?;
        self.hits.fetch_add(1, Ordering::Relaxed);
        Some(record)
    }

    fn record(&self, record: &ClassificationRecord) -> Result<(), CacheError> {
        let mut records = self.records.lock().unwrap();
        let key = (
            record.owner.clone(),
            record.repo.clone(),
            record.pr_number,
            record.comment_id,
        );
        records.entry(key).or_insert_with(|| record.clone());
        Ok(())
    }

    fn invalidate_pr(&self, coord: &RepoCoordinate) -> usize {
        let mut records = self.records.lock().unwrap();
        let before = records.len();
        records.retain(|(owner, repo, number, _), _| {
            owner != coord.owner() || repo != coord.repo() || *number != coord.number()
        });
        before - records.len()
    }

    fn lookup_hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord() -> RepoCoordinate {
        RepoCoordinate::new("owner", "repo", 7).unwrap()
    }

    fn record(comment_id: u64, sha: &str) -> ClassificationRecord {
        ClassificationRecord {
            owner: "owner".to_string(),
            repo: "repo".to_string(),
            pr_number: 7,
            comment_id,
            commit_sha: sha.to_string(),
            classification: CommentClassification::Actionable,
            priority: Priority::Minor,
            first_seen_at: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        }
    }

    fn exercise_store(store: &dyn ClassificationStore) {
        let c = coord();

        // Miss before anything is recorded.
        assert!(store.lookup(&c, 1, "sha-a").is_none());
        assert_eq!(store.lookup_hits(), 0);

        store.record(&record(1, "sha-a")).unwrap();
        let found = store.lookup(&c, 1, "sha-a").unwrap();
        assert_eq!(found.classification, CommentClassification::Actionable);
        assert_eq!(found.priority, Priority::Minor);
        assert_eq!(store.lookup_hits(), 1);

        // A different sha does not match: the record is pinned to its commit.
        assert!(store.lookup(&c, 1, "sha-b").is_none());

        // First writer wins; a second write cannot flip the classification.
        let mut edited = record(1, "sha-a");
        edited.classification = CommentClassification::NonActionable;
        store.record(&edited).unwrap();
        let found = store.lookup(&c, 1, "sha-a").unwrap();
        assert_eq!(found.classification, CommentClassification::Actionable);

        // Head change drops the PR's records.
        store.record(&record(2, "sha-a")).unwrap();
        assert_eq!(store.invalidate_pr(&c), 2);
        assert!(store.lookup(&c, 1, "sha-a").is_none());
    }

    #[test]
    fn test_memory_store() {
        exercise_store(&MemoryStateStore::new());
    }

    #[test]
    fn test_sqlite_store() {
        let tmp = tempfile::tempdir().unwrap();
        let store = SqliteStateStore::open(&tmp.path().join(".goodtogo/state.db")).unwrap();
        exercise_store(&store);
    }

    #[test]
    fn test_sqlite_store_survives_reopen() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(".goodtogo/state.db");

        {
            let store = SqliteStateStore::open(&path).unwrap();
            store.record(&record(9, "sha-z")).unwrap();
        }

        let store = SqliteStateStore::open(&path).unwrap();
        assert!(store.lookup(&coord(), 9, "sha-z").is_some());
    }
}
