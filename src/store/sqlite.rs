//! SQLite-backed score store.
//!
//! One row per player in `scores`. A submission is a single
//! `INSERT .. ON CONFLICT .. DO UPDATE .. WHERE` statement, so SQLite applies
//! the compare and the write atomically. The `revision` column counts writes
//! to a row and tells a fresh insert (revision 1) apart from an update; a
//! skipped update returns no row at all.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteRow};
use tracing::info;

use crate::models::{ScoreRecord, SubmitOutcome};

use super::{ScoreStore, StoreError};

const SCHEMA: [&str; 2] = [
    r"CREATE TABLE IF NOT EXISTS scores (
        player_name TEXT PRIMARY KEY NOT NULL,
        score INTEGER NOT NULL CHECK (score >= 0),
        total_questions INTEGER NOT NULL CHECK (total_questions >= 0),
        recorded_at TEXT NOT NULL,
        revision INTEGER NOT NULL DEFAULT 1
    )",
    r"CREATE INDEX IF NOT EXISTS idx_scores_rank
        ON scores(score DESC, recorded_at DESC)",
];

const UPSERT_IF_BETTER: &str = r"
INSERT INTO scores (player_name, score, total_questions, recorded_at, revision)
VALUES (?1, ?2, ?3, ?4, 1)
ON CONFLICT(player_name) DO UPDATE SET
    score = excluded.score,
    total_questions = excluded.total_questions,
    recorded_at = excluded.recorded_at,
    revision = scores.revision + 1
WHERE excluded.score > scores.score
RETURNING revision
";

const TOP_SCORES: &str = r"
SELECT player_name, score, total_questions, recorded_at
FROM scores
ORDER BY score DESC, recorded_at DESC, player_name ASC
LIMIT ?1
";

const FIND: &str = r"
SELECT player_name, score, total_questions, recorded_at
FROM scores
WHERE player_name = ?1
";

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);
const MAX_CONNECTIONS: u32 = 8;

/// Score store persisted in a SQLite database.
#[derive(Debug, Clone)]
pub struct SqliteScoreStore {
    pool: SqlitePool,
}

impl SqliteScoreStore {
    /// Open (creating if needed) the database at `url` and ensure the schema.
    ///
    /// Accepts `sqlite://path`, `sqlite::memory:` or a bare file path.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let in_memory = url.contains(":memory:") || url.contains("mode=memory");
        let url = if url.starts_with("sqlite:") {
            url.to_string()
        } else {
            format!("sqlite://{url}")
        };

        let options = SqliteConnectOptions::from_str(&url)?
            .create_if_missing(true)
            .busy_timeout(BUSY_TIMEOUT);
        let options = if in_memory {
            options
        } else {
            options.journal_mode(SqliteJournalMode::Wal)
        };

        // Every connection to `:memory:` gets its own database, so keep a
        // single connection open for the life of the pool.
        let pool = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(MAX_CONNECTIONS)
        }
        .connect_with(options)
        .await?;

        let store = Self { pool };
        store.migrate().await?;
        info!(url = %url, "opened sqlite score store");
        Ok(store)
    }

    async fn migrate(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl ScoreStore for SqliteScoreStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn submit_score(&self, candidate: &ScoreRecord) -> Result<SubmitOutcome, StoreError> {
        let revision = sqlx::query_scalar::<_, i64>(UPSERT_IF_BETTER)
            .bind(candidate.player_name.as_str())
            .bind(i64::from(candidate.score))
            .bind(i64::from(candidate.total_questions))
            .bind(encode_timestamp(&candidate.recorded_at))
            .fetch_optional(&self.pool)
            .await?;

        Ok(match revision {
            None => SubmitOutcome::Unchanged,
            Some(1) => SubmitOutcome::Created,
            Some(_) => SubmitOutcome::Updated,
        })
    }

    async fn top_scores(&self, limit: u32) -> Result<Vec<ScoreRecord>, StoreError> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let rows = sqlx::query(TOP_SCORES)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(decode_record).collect()
    }

    async fn find(&self, player_name: &str) -> Result<Option<ScoreRecord>, StoreError> {
        let row = sqlx::query(FIND)
            .bind(player_name)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(decode_record).transpose()
    }

    async fn clear_all(&self) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM scores").execute(&self.pool).await?;
        Ok(())
    }
}

/// Fixed-width RFC 3339 so that text order matches time order.
fn encode_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn decode_record(row: &SqliteRow) -> Result<ScoreRecord, StoreError> {
    let player_name: String = row.try_get("player_name")?;
    let score: i64 = row.try_get("score")?;
    let total_questions: i64 = row.try_get("total_questions")?;
    let recorded_at: String = row.try_get("recorded_at")?;

    let corrupt = |reason: String| StoreError::Corrupt {
        player: player_name.clone(),
        reason,
    };

    let score = u32::try_from(score).map_err(|_| corrupt(format!("score out of range: {score}")))?;
    let total_questions = u32::try_from(total_questions)
        .map_err(|_| corrupt(format!("total_questions out of range: {total_questions}")))?;
    let recorded_at = DateTime::parse_from_rfc3339(&recorded_at)
        .map_err(|e| corrupt(format!("bad recorded_at {recorded_at:?}: {e}")))?
        .with_timezone(&Utc);

    Ok(ScoreRecord {
        player_name,
        score,
        total_questions,
        recorded_at,
    })
}
