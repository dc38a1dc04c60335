//! The quiz core: scores submissions and maintains the leaderboard.
//!
//! Transports hand parsed requests to a [`QuizService`]; it owns the catalog
//! and a [`ScoreStore`] and never does I/O of its own beyond the store.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use crate::data::{Catalog, CatalogError};
use crate::models::{Answer, QuestionResult, QuestionView, ScoreRecord, SubmitOutcome};
use crate::scoring;
use crate::store::{DEFAULT_LEADERBOARD_LIMIT, ScoreStore, StoreError};

/// Longest accepted player name, in characters.
pub const PLAYER_NAME_MAX_LENGTH: usize = 64;

/// Capacity of the change-event channel. Slow observers skip events.
const EVENT_CAPACITY: usize = 256;

/// Errors surfaced by the quiz core.
#[derive(Debug, Error)]
pub enum QuizError {
    #[error("invalid player name: {0}")]
    InvalidPlayerName(&'static str),

    #[error("invalid score: {score} is more than {total_questions} questions")]
    InvalidScore { score: u32, total_questions: u32 },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// What a scored submission returns to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub score: u32,
    pub total_questions: u32,
    pub results: Vec<QuestionResult>,
    pub outcome: SubmitOutcome,
}

/// Leaderboard changes, published for observers such as the host console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScoreEvent {
    Submitted {
        player_name: String,
        score: u32,
        total_questions: u32,
        outcome: SubmitOutcome,
    },
    Cleared,
}

/// Checks a player name before anything is scored or stored.
///
/// Names are stored exactly as given; only blank or oversized names are
/// refused.
pub fn validate_player_name(player_name: &str) -> Result<(), QuizError> {
    if player_name.trim().is_empty() {
        return Err(QuizError::InvalidPlayerName("player name must not be empty"));
    }

    if player_name.chars().count() > PLAYER_NAME_MAX_LENGTH {
        return Err(QuizError::InvalidPlayerName(
            "player name must be at most 64 characters",
        ));
    }

    Ok(())
}

/// Scoring plus best-score bookkeeping over an injected catalog and store.
#[derive(Clone)]
pub struct QuizService {
    catalog: Arc<Catalog>,
    store: Arc<dyn ScoreStore>,
    events: broadcast::Sender<ScoreEvent>,
}

impl QuizService {
    pub fn new(catalog: Catalog, store: Arc<dyn ScoreStore>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            catalog: Arc::new(catalog),
            store,
            events,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn store_name(&self) -> &str {
        self.store.name()
    }

    pub fn total_questions(&self) -> u32 {
        self.catalog.len() as u32
    }

    /// Questions in catalog order, without their answers.
    pub fn questions(&self) -> Vec<QuestionView> {
        self.catalog.views()
    }

    /// Receive leaderboard change events from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<ScoreEvent> {
        self.events.subscribe()
    }

    /// Score `answers` for `player_name` and keep the score if it is the
    /// player's best so far.
    ///
    /// The scoring output is returned whatever the leaderboard did with it.
    pub async fn submit_answers(
        &self,
        player_name: &str,
        answers: &[Answer],
    ) -> Result<Submission, QuizError> {
        if let Err(e) = validate_player_name(player_name) {
            warn!(error = %e, "rejected submission");
            return Err(e);
        }

        let card = scoring::score(answers, &self.catalog);
        let total_questions = self.total_questions();
        let outcome = self
            .submit_score(player_name, card.score, total_questions)
            .await?;

        Ok(Submission {
            score: card.score,
            total_questions,
            results: card.results,
            outcome,
        })
    }

    /// Record `score` for `player_name` unless the player already holds an
    /// equal or better one. A score above `total_questions` is refused.
    pub async fn submit_score(
        &self,
        player_name: &str,
        score: u32,
        total_questions: u32,
    ) -> Result<SubmitOutcome, QuizError> {
        validate_player_name(player_name)?;
        if score > total_questions {
            warn!(player = %player_name, score, total_questions, "rejected score");
            return Err(QuizError::InvalidScore {
                score,
                total_questions,
            });
        }

        let candidate = ScoreRecord::new(player_name, score, total_questions, Utc::now());
        let outcome = self.store.submit_score(&candidate).await.map_err(|e| {
            error!(player = %player_name, error = %e, "failed to save score");
            e
        })?;

        match outcome {
            SubmitOutcome::Created => {
                info!(player = %player_name, score, total_questions, "saved new score")
            }
            SubmitOutcome::Updated => {
                info!(player = %player_name, score, total_questions, "updated best score")
            }
            SubmitOutcome::Unchanged => {
                debug!(player = %player_name, score, "score not higher than existing, not saved")
            }
        }

        // No receivers is fine.
        let _ = self.events.send(ScoreEvent::Submitted {
            player_name: player_name.to_string(),
            score,
            total_questions,
            outcome,
        });

        Ok(outcome)
    }

    /// The top `limit` records (10 when `None`), best first.
    pub async fn leaderboard(&self, limit: Option<u32>) -> Result<Vec<ScoreRecord>, QuizError> {
        let limit = limit.unwrap_or(DEFAULT_LEADERBOARD_LIMIT);
        self.store.top_scores(limit).await.map_err(|e| {
            error!(error = %e, "failed to fetch leaderboard");
            QuizError::from(e)
        })
    }

    /// Remove every record from the leaderboard.
    pub async fn clear_leaderboard(&self) -> Result<(), QuizError> {
        self.store.clear_all().await.map_err(|e| {
            error!(error = %e, "failed to clear leaderboard");
            QuizError::from(e)
        })?;

        info!("leaderboard cleared");
        let _ = self.events.send(ScoreEvent::Cleared);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::TimeZone;

    use crate::models::Question;
    use crate::store::MemoryScoreStore;

    use super::*;

    fn catalog(size: u32) -> Catalog {
        let questions = (1..=size)
            .map(|id| Question {
                id,
                prompt: format!("Question {id}"),
                options: ["X".into(), "Y".into(), "Z".into(), "W".into()],
                correct_answer: "X".to_string(),
                hint: String::new(),
            })
            .collect();
        Catalog::new(questions).unwrap()
    }

    fn service(size: u32) -> QuizService {
        QuizService::new(catalog(size), Arc::new(MemoryScoreStore::new()))
    }

    fn answers(correct: u32, wrong: u32) -> Vec<Answer> {
        (1..=correct)
            .map(|id| Answer::new(id, "X"))
            .chain((correct + 1..=correct + wrong).map(|id| Answer::new(id, "Y")))
            .collect()
    }

    /// Store double that fails every call and counts how often it was hit.
    #[derive(Default)]
    struct UnavailableStore {
        calls: AtomicUsize,
    }

    impl UnavailableStore {
        fn fail(&self) -> StoreError {
            self.calls.fetch_add(1, Ordering::SeqCst);
            StoreError::Unavailable(sqlx::Error::PoolClosed)
        }
    }

    #[async_trait]
    impl ScoreStore for UnavailableStore {
        fn name(&self) -> &str {
            "unavailable"
        }

        async fn submit_score(&self, _: &ScoreRecord) -> Result<SubmitOutcome, StoreError> {
            Err(self.fail())
        }

        async fn top_scores(&self, _: u32) -> Result<Vec<ScoreRecord>, StoreError> {
            Err(self.fail())
        }

        async fn find(&self, _: &str) -> Result<Option<ScoreRecord>, StoreError> {
            Err(self.fail())
        }

        async fn clear_all(&self) -> Result<(), StoreError> {
            Err(self.fail())
        }
    }

    #[test]
    fn test_validate_player_name() {
        assert!(validate_player_name("alice").is_ok());
        assert!(validate_player_name(" Alice ").is_ok());
        assert!(validate_player_name(&"é".repeat(64)).is_ok());
        assert!(validate_player_name("").is_err());
        assert!(validate_player_name("   ").is_err());
        assert!(validate_player_name(&"a".repeat(65)).is_err());
    }

    #[tokio::test]
    async fn test_single_question_scenario() {
        let service = service(1);
        let submission = service
            .submit_answers("alice", &[Answer::new(1, "X")])
            .await
            .unwrap();

        assert_eq!(submission.score, 1);
        assert_eq!(submission.total_questions, 1);
        assert_eq!(submission.results.len(), 1);
        assert!(submission.results[0].is_correct);
        assert_eq!(submission.outcome, SubmitOutcome::Created);

        let board = service.leaderboard(None).await.unwrap();
        assert_eq!(board.len(), 1);
        assert_eq!(board[0].player_name, "alice");
        assert_eq!(board[0].score, 1);
    }

    #[tokio::test]
    async fn test_worse_attempt_keeps_best() {
        let service = service(10);
        service.submit_answers("alice", &answers(3, 2)).await.unwrap();
        let second = service.submit_answers("alice", &answers(2, 5)).await.unwrap();

        assert_eq!(second.score, 2);
        assert_eq!(second.outcome, SubmitOutcome::Unchanged);
        let board = service.leaderboard(None).await.unwrap();
        assert_eq!(board[0].score, 3);
    }

    #[tokio::test]
    async fn test_better_attempt_refreshes_record() {
        let store = Arc::new(MemoryScoreStore::new());
        let earlier = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        store
            .submit_score(&ScoreRecord::new("alice", 2, 10, earlier))
            .await
            .unwrap();
        let service = QuizService::new(catalog(10), store);

        let second = service.submit_answers("alice", &answers(5, 0)).await.unwrap();
        assert_eq!(second.outcome, SubmitOutcome::Updated);

        let board = service.leaderboard(None).await.unwrap();
        assert_eq!(board.len(), 1);
        assert_eq!(board[0].score, 5);
        assert!(board[0].recorded_at > earlier);
    }

    #[tokio::test]
    async fn test_repeated_answers_cannot_exceed_total() {
        let service = service(10);
        let submission = service
            .submit_answers("mallory", &vec![Answer::new(1, "X"); 50])
            .await
            .unwrap();

        assert_eq!(submission.score, 1);
        assert_eq!(submission.total_questions, 10);
        let board = service.leaderboard(None).await.unwrap();
        assert_eq!((board[0].score, board[0].total_questions), (1, 10));
    }

    #[tokio::test]
    async fn test_score_above_total_never_reaches_store() {
        let store = Arc::new(UnavailableStore::default());
        let service = QuizService::new(catalog(10), store.clone());

        let err = service.submit_score("mallory", 50, 10).await.unwrap_err();
        assert!(matches!(
            err,
            QuizError::InvalidScore {
                score: 50,
                total_questions: 10
            }
        ));
        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_total_questions_is_catalog_size() {
        let service = service(10);
        let submission = service
            .submit_answers("bob", &[Answer::new(4, "X"), Answer::new(99, "X")])
            .await
            .unwrap();
        assert_eq!(submission.score, 1);
        assert_eq!(submission.total_questions, 10);
        assert_eq!(service.leaderboard(None).await.unwrap()[0].total_questions, 10);
    }

    #[tokio::test]
    async fn test_same_score_twice_is_unchanged() {
        let service = service(5);
        assert_eq!(
            service.submit_score("carol", 4, 5).await.unwrap(),
            SubmitOutcome::Created
        );
        let first = service.leaderboard(None).await.unwrap();

        assert_eq!(
            service.submit_score("carol", 4, 5).await.unwrap(),
            SubmitOutcome::Unchanged
        );
        assert_eq!(service.leaderboard(None).await.unwrap(), first);
    }

    #[tokio::test]
    async fn test_leaderboard_limit_and_order() {
        let service = service(20);
        for (i, name) in ["a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "k", "l"]
            .iter()
            .enumerate()
        {
            service.submit_score(name, (i as u32 * 5) % 13, 20).await.unwrap();
        }

        let board = service.leaderboard(None).await.unwrap();
        assert_eq!(board.len(), 10);
        assert!(board.windows(2).all(|w| w[0].score >= w[1].score));

        assert_eq!(service.leaderboard(Some(3)).await.unwrap().len(), 3);
        assert_eq!(service.leaderboard(Some(100)).await.unwrap().len(), 12);
    }

    #[tokio::test]
    async fn test_clear_then_read_is_empty() {
        let service = service(3);
        service.submit_score("alice", 3, 3).await.unwrap();
        service.clear_leaderboard().await.unwrap();
        assert!(service.leaderboard(Some(10)).await.unwrap().is_empty());
        service.clear_leaderboard().await.unwrap();
    }

    #[tokio::test]
    async fn test_blank_name_never_reaches_store() {
        let store = Arc::new(UnavailableStore::default());
        let service = QuizService::new(catalog(2), store.clone());

        let err = service.submit_answers("  ", &answers(1, 0)).await.unwrap_err();
        assert!(matches!(err, QuizError::InvalidPlayerName(_)));
        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_store_failures_propagate() {
        let store = Arc::new(UnavailableStore::default());
        let service = QuizService::new(catalog(2), store.clone());

        let err = service.submit_answers("alice", &answers(1, 0)).await.unwrap_err();
        assert!(matches!(err, QuizError::Store(StoreError::Unavailable(_))));
        assert!(service.leaderboard(None).await.is_err());
        assert!(service.clear_leaderboard().await.is_err());
        assert_eq!(store.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_events_are_published() {
        let service = service(2);
        let mut events = service.subscribe();

        service.submit_score("alice", 1, 2).await.unwrap();
        service.clear_leaderboard().await.unwrap();

        assert_eq!(
            events.recv().await.unwrap(),
            ScoreEvent::Submitted {
                player_name: "alice".to_string(),
                score: 1,
                total_questions: 2,
                outcome: SubmitOutcome::Created,
            }
        );
        assert_eq!(events.recv().await.unwrap(), ScoreEvent::Cleared);
    }
}
