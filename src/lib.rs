//! # quiz-board
//!
//! A trivia quiz scorer with a best-score-per-player leaderboard.
//!
//! Answers are scored against a question [`Catalog`]; each player's best
//! score is kept in a [`ScoreStore`] and ranked by score, most recent first
//! on ties. The [`server`] module exposes all of this over WebSocket with an
//! optional host console, and [`QuizClient`] talks to it.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use quiz_board::{Answer, MemoryScoreStore, QuizService, builtin_catalog};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let service = QuizService::new(builtin_catalog()?, Arc::new(MemoryScoreStore::new()));
//!
//! let answers = vec![Answer::new(1, "JavaScript")];
//! let submission = service.submit_answers("alice", &answers).await?;
//! println!("{}/{}", submission.score, submission.total_questions);
//!
//! for record in service.leaderboard(None).await? {
//!     println!("{} {}", record.player_name, record.score);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod data;
pub mod models;
pub mod protocol;
pub mod scoring;
pub mod server;
pub mod service;
pub mod store;
pub mod terminal;

pub use client::{ClientError, QuizClient, SubmitReply};
pub use config::ServerConfig;
pub use data::{Catalog, CatalogError, builtin_catalog, load_catalog_from_json};
pub use models::{Answer, Question, QuestionResult, QuestionView, ScoreRecord, SubmitOutcome};
pub use scoring::{Scorecard, score};
pub use service::{QuizError, QuizService, ScoreEvent, Submission};
pub use store::{
    DEFAULT_LEADERBOARD_LIMIT, MemoryScoreStore, ScoreStore, SqliteScoreStore, StoreError,
    open_store,
};
