use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::models::{ScoreRecord, SubmitOutcome, rank_order};

use super::{ScoreStore, StoreError};

/// Process-local store. Records live only as long as the server.
///
/// Every operation takes the lock once and never awaits while holding it, so
/// the compare and the write of a submission cannot interleave with another.
#[derive(Debug, Default)]
pub struct MemoryScoreStore {
    records: RwLock<HashMap<String, ScoreRecord>>,
}

impl MemoryScoreStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ScoreStore for MemoryScoreStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn submit_score(&self, candidate: &ScoreRecord) -> Result<SubmitOutcome, StoreError> {
        let mut records = self.records.write().map_err(|_| StoreError::Poisoned)?;

        match records.entry(candidate.player_name.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(candidate.clone());
                Ok(SubmitOutcome::Created)
            }
            Entry::Occupied(mut slot) => {
                if candidate.score > slot.get().score {
                    slot.insert(candidate.clone());
                    Ok(SubmitOutcome::Updated)
                } else {
                    Ok(SubmitOutcome::Unchanged)
                }
            }
        }
    }

    async fn top_scores(&self, limit: u32) -> Result<Vec<ScoreRecord>, StoreError> {
        let records = self.records.read().map_err(|_| StoreError::Poisoned)?;

        let mut ranked: Vec<ScoreRecord> = records.values().cloned().collect();
        drop(records);

        ranked.sort_by(rank_order);
        ranked.truncate(limit as usize);
        Ok(ranked)
    }

    async fn find(&self, player_name: &str) -> Result<Option<ScoreRecord>, StoreError> {
        let records = self.records.read().map_err(|_| StoreError::Poisoned)?;
        Ok(records.get(player_name).cloned())
    }

    async fn clear_all(&self) -> Result<(), StoreError> {
        self.records
            .write()
            .map_err(|_| StoreError::Poisoned)?
            .clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::store::conformance;

    use super::*;

    #[tokio::test]
    async fn test_first_submission_creates() {
        conformance::first_submission_creates(&MemoryScoreStore::new()).await;
    }

    #[tokio::test]
    async fn test_lower_score_is_ignored() {
        conformance::lower_score_is_ignored(&MemoryScoreStore::new()).await;
    }

    #[tokio::test]
    async fn test_equal_score_is_ignored() {
        conformance::equal_score_is_ignored(&MemoryScoreStore::new()).await;
    }

    #[tokio::test]
    async fn test_higher_score_updates() {
        conformance::higher_score_updates(&MemoryScoreStore::new()).await;
    }

    #[tokio::test]
    async fn test_best_score_wins() {
        conformance::best_score_wins(&MemoryScoreStore::new()).await;
    }

    #[tokio::test]
    async fn test_ranking() {
        conformance::ranking(&MemoryScoreStore::new()).await;
    }

    #[tokio::test]
    async fn test_limit_exceeds_players() {
        conformance::limit_exceeds_players(&MemoryScoreStore::new()).await;
    }

    #[tokio::test]
    async fn test_clear_all() {
        conformance::clear_all(&MemoryScoreStore::new()).await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_submissions() {
        conformance::concurrent_submissions(Arc::new(MemoryScoreStore::new())).await;
    }
}
