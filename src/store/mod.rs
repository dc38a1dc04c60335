//! Leaderboard persistence.
//!
//! A [`ScoreStore`] keeps at most one [`ScoreRecord`] per player, holding the
//! best score that player ever submitted. The conditional write behind
//! [`ScoreStore::submit_score`] must be atomic: two submissions for the same
//! player may race, and the higher one has to win regardless of ordering.

mod memory;
mod sqlite;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{ScoreRecord, SubmitOutcome};

pub use memory::MemoryScoreStore;
pub use sqlite::SqliteScoreStore;

/// Default number of entries returned by a leaderboard read.
pub const DEFAULT_LEADERBOARD_LIMIT: u32 = 10;

/// Database location that selects the in-process store.
pub const MEMORY_STORE: &str = "memory";

/// Errors raised by a score store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing database could not be reached or rejected the operation.
    #[error("score store unavailable: {0}")]
    Unavailable(#[from] sqlx::Error),

    /// A stored row could not be decoded.
    #[error("corrupt score record for {player}: {reason}")]
    Corrupt { player: String, reason: String },

    /// A writer panicked while holding the store lock.
    #[error("score store lock poisoned")]
    Poisoned,
}

/// Durable best-score-per-player storage.
#[async_trait]
pub trait ScoreStore: Send + Sync {
    /// Human-readable backend name, used in logs.
    fn name(&self) -> &str;

    /// Insert `candidate` if the player has no record, replace the record if
    /// `candidate.score` is strictly greater, otherwise leave it untouched.
    async fn submit_score(&self, candidate: &ScoreRecord) -> Result<SubmitOutcome, StoreError>;

    /// Up to `limit` records, best first. Ties go to the most recent record.
    async fn top_scores(&self, limit: u32) -> Result<Vec<ScoreRecord>, StoreError>;

    /// The record for `player_name`, if one exists.
    async fn find(&self, player_name: &str) -> Result<Option<ScoreRecord>, StoreError>;

    /// Delete every record.
    async fn clear_all(&self) -> Result<(), StoreError>;
}

/// Open the store named by `database`: [`MEMORY_STORE`] for the in-process
/// store, anything else is treated as a SQLite URL or path.
pub async fn open_store(database: &str) -> Result<Arc<dyn ScoreStore>, StoreError> {
    if database == MEMORY_STORE {
        Ok(Arc::new(MemoryScoreStore::new()))
    } else {
        Ok(Arc::new(SqliteScoreStore::connect(database).await?))
    }
}
