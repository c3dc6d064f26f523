//! Append-only audit log of completed classifications.
//!
//! One SQLite table, no indexes, no updates or deletes. Writes go through
//! [`LogStore::append`], which never fails from the caller's point of view:
//! a classification that succeeded is returned even if the audit row could
//! not be written.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::{error, instrument};

use crate::telemetry;
use crate::types::{ClassificationLogEntry, Label};
use crate::{HuginnError, Result};

/// Default database location, relative to the working directory.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://classification_logs.db";

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS classification_logs (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        timestamp TEXT,
        text_length INTEGER,
        label TEXT,
        confidence REAL
    )
"#;

/// SQLite-backed classification log.
#[derive(Clone)]
pub struct LogStore {
    pool: SqlitePool,
}

impl LogStore {
    /// Open (creating the file if needed) the database at `url`.
    pub async fn open(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;
        Ok(Self { pool })
    }

    /// Wrap an existing pool.
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// The underlying pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create the log table if it does not exist. Safe to call repeatedly.
    pub async fn initialize(&self) -> Result<()> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        Ok(())
    }

    /// Record a completed classification, swallowing any storage error.
    pub async fn append(&self, text_length: usize, label: Label, confidence: f64) {
        if let Err(e) = self.try_append(text_length, label, confidence).await {
            metrics::counter!(telemetry::LOG_WRITE_FAILURES_TOTAL).increment(1);
            error!(error = %e, "Database logging error");
        }
    }

    /// Record a completed classification and report storage errors.
    #[instrument(skip(self))]
    pub async fn try_append(&self, text_length: usize, label: Label, confidence: f64) -> Result<()> {
        let text_length = i64::try_from(text_length)
            .map_err(|_| HuginnError::DataError(format!("text length {text_length} overflows")))?;
        let timestamp = chrono::Utc::now().to_rfc3339();

        sqlx::query(
            "INSERT INTO classification_logs (timestamp, text_length, label, confidence) \
             VALUES (?, ?, ?, ?)",
        )
        .bind(timestamp)
        .bind(text_length)
        .bind(label.as_str())
        .bind(confidence)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Most recent entries first.
    pub async fn recent(&self, limit: u32) -> Result<Vec<ClassificationLogEntry>> {
        let rows = sqlx::query_as::<_, ClassificationLogEntry>(
            "SELECT id, timestamp, text_length, label, confidence \
             FROM classification_logs ORDER BY id DESC LIMIT ?",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Number of rows written so far.
    pub async fn count(&self) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM classification_logs")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Close the pool. Later writes fail (and are swallowed by [`append`](Self::append)).
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
