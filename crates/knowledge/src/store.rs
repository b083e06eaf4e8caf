//! SQLite-backed query log.
//!
//! Stores each answered query with its verdict and matches, and lets users
//! attach feedback later. The pipeline never reads from here.

use crate::rag::types::QueryResult;
use asana_core::{AppError, AppResult};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A match as persisted with its query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredMatch {
    pub id: String,
    pub title: String,
    pub content: String,
    pub score: f32,
}

/// User feedback attached to a stored query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryFeedback {
    pub helpful: Option<bool>,
    pub feedback_text: String,
    pub updated_at: Option<DateTime<Utc>>,
}

/// One row of the query log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRecord {
    pub id: String,
    pub query: String,
    pub answer: String,
    pub is_unsafe: bool,
    /// Risk category, empty when safe
    pub safety_reason: String,
    /// Advisory text, empty when safe
    pub safety_suggestion: String,
    pub matches: Vec<StoredMatch>,
    pub created_at: DateTime<Utc>,
    pub feedback: QueryFeedback,
}

/// Short form used in statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentQuery {
    pub id: String,
    pub query: String,
    pub is_unsafe: bool,
    pub safety_reason: String,
    pub created_at: DateTime<Utc>,
}

/// Aggregate numbers over the query log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryStats {
    pub total_queries: u64,
    pub unsafe_queries: u64,
    /// Percentage rounded to one decimal, 0.0 when the log is empty
    pub unsafe_percentage: f64,
    /// Newest first
    pub recent: Vec<RecentQuery>,
}

/// Handle to the query log database.
#[derive(Debug)]
pub struct QueryLog {
    conn: Connection,
}

impl QueryLog {
    /// Open (or create) the query log at `db_path`.
    pub fn open(db_path: &Path) -> AppResult<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    AppError::Storage(format!("Failed to create query log directory: {}", e))
                })?;
            }
        }

        let conn = Connection::open(db_path)
            .map_err(|e| AppError::Storage(format!("Failed to open query log: {}", e)))?;

        Self::with_connection(conn)
    }

    /// In-memory log, mostly for tests.
    pub fn open_in_memory() -> AppResult<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| AppError::Storage(format!("Failed to open query log: {}", e)))?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> AppResult<Self> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS queries (
                id TEXT PRIMARY KEY,
                query TEXT NOT NULL,
                answer TEXT NOT NULL,
                is_unsafe INTEGER NOT NULL,
                safety_reason TEXT NOT NULL,
                safety_suggestion TEXT NOT NULL,
                matches TEXT NOT NULL,
                created_at TEXT NOT NULL,
                helpful INTEGER,
                feedback_text TEXT NOT NULL DEFAULT '',
                feedback_at TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_queries_created ON queries(created_at);
            "#,
        )
        .map_err(|e| AppError::Storage(format!("Failed to create tables: {}", e)))?;

        Ok(Self { conn })
    }

    /// Store a finished query and return its id.
    pub fn record(&self, query: &str, result: &QueryResult) -> AppResult<String> {
        let id = uuid::Uuid::new_v4().to_string();
        let matches: Vec<StoredMatch> = result
            .matches
            .iter()
            .map(|m| StoredMatch {
                id: m.passage.id.clone(),
                title: m.passage.title.clone(),
                content: m.passage.content.clone(),
                score: m.score,
            })
            .collect();

        let (reason, suggestion) = if result.verdict.is_unsafe {
            (
                result.verdict.category.as_str().to_string(),
                result.verdict.advisory.clone(),
            )
        } else {
            (String::new(), String::new())
        };

        self.conn
            .execute(
                "INSERT INTO queries (id, query, answer, is_unsafe, safety_reason, safety_suggestion, matches, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    id,
                    query,
                    result.answer_text,
                    result.verdict.is_unsafe,
                    reason,
                    suggestion,
                    serde_json::to_string(&matches)?,
                    timestamp_now(),
                ],
            )
            .map_err(|e| AppError::Storage(format!("Failed to insert query: {}", e)))?;

        tracing::debug!("Recorded query {}", id);
        Ok(id)
    }

    /// Set the feedback on a stored query.
    pub fn attach_feedback(&self, id: &str, helpful: Option<bool>, text: &str) -> AppResult<()> {
        let updated = self
            .conn
            .execute(
                "UPDATE queries SET helpful = ?1, feedback_text = ?2, feedback_at = ?3 WHERE id = ?4",
                params![helpful, text, timestamp_now(), id],
            )
            .map_err(|e| AppError::Storage(format!("Failed to save feedback: {}", e)))?;

        if updated == 0 {
            return Err(AppError::Storage(format!("Query not found: {}", id)));
        }

        tracing::debug!("Feedback saved for query {}", id);
        Ok(())
    }

    /// Fetch a stored query by id.
    pub fn get(&self, id: &str) -> AppResult<Option<QueryRecord>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, query, answer, is_unsafe, safety_reason, safety_suggestion, matches, created_at,
                        helpful, feedback_text, feedback_at
                 FROM queries WHERE id = ?1",
                params![id],
                RawRecord::from_row,
            )
            .optional()
            .map_err(|e| AppError::Storage(format!("Failed to read query: {}", e)))?;

        row.map(RawRecord::into_record).transpose()
    }

    /// Totals plus the `recent_limit` newest queries.
    pub fn stats(&self, recent_limit: usize) -> AppResult<QueryStats> {
        let (total, unsafe_count): (i64, i64) = self
            .conn
            .query_row(
                "SELECT COUNT(*), COALESCE(SUM(is_unsafe), 0) FROM queries",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .map_err(|e| AppError::Storage(format!("Failed to count queries: {}", e)))?;

        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, query, is_unsafe, safety_reason, created_at FROM queries
                 ORDER BY created_at DESC, rowid DESC LIMIT ?1",
            )
            .map_err(|e| AppError::Storage(format!("Failed to prepare query: {}", e)))?;

        let rows = stmt
            .query_map(params![recent_limit as i64], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, bool>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                ))
            })
            .map_err(|e| AppError::Storage(format!("Failed to read recent queries: {}", e)))?;

        let mut recent = Vec::new();
        for row in rows {
            let (id, query, is_unsafe, safety_reason, created_at) =
                row.map_err(|e| AppError::Storage(format!("Failed to read row: {}", e)))?;
            recent.push(RecentQuery {
                id,
                query,
                is_unsafe,
                safety_reason,
                created_at: parse_timestamp(&created_at)?,
            });
        }

        let unsafe_percentage = if total > 0 {
            ((unsafe_count as f64 / total as f64) * 1000.0).round() / 10.0
        } else {
            0.0
        };

        Ok(QueryStats {
            total_queries: total as u64,
            unsafe_queries: unsafe_count as u64,
            unsafe_percentage,
            recent,
        })
    }
}

/// Columns as read from SQLite, before JSON and timestamp decoding.
struct RawRecord {
    id: String,
    query: String,
    answer: String,
    is_unsafe: bool,
    safety_reason: String,
    safety_suggestion: String,
    matches: String,
    created_at: String,
    helpful: Option<bool>,
    feedback_text: String,
    feedback_at: Option<String>,
}

impl RawRecord {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            query: row.get(1)?,
            answer: row.get(2)?,
            is_unsafe: row.get(3)?,
            safety_reason: row.get(4)?,
            safety_suggestion: row.get(5)?,
            matches: row.get(6)?,
            created_at: row.get(7)?,
            helpful: row.get(8)?,
            feedback_text: row.get(9)?,
            feedback_at: row.get(10)?,
        })
    }

    fn into_record(self) -> AppResult<QueryRecord> {
        Ok(QueryRecord {
            id: self.id,
            query: self.query,
            answer: self.answer,
            is_unsafe: self.is_unsafe,
            safety_reason: self.safety_reason,
            safety_suggestion: self.safety_suggestion,
            matches: serde_json::from_str(&self.matches)?,
            created_at: parse_timestamp(&self.created_at)?,
            feedback: QueryFeedback {
                helpful: self.helpful,
                feedback_text: self.feedback_text,
                updated_at: self
                    .feedback_at
                    .as_deref()
                    .map(parse_timestamp)
                    .transpose()?,
            },
        })
    }
}

/// Fixed-width RFC 3339 so stored timestamps sort as text.
fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(value: &str) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AppError::Storage(format!("Invalid timestamp '{}': {}", value, e)))
}
