//! Protocol messages for client-server communication.
//!
//! All messages are serialized as JSON over WebSocket. Every client request
//! gets exactly one reply, in request order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Answer, QuestionResult, QuestionView, ScoreRecord, SubmitOutcome};
use crate::service::{QuizError, Submission};

/// Messages sent from client to server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Ask for the question catalog.
    GetQuestions,

    /// Submit a full set of answers for scoring.
    #[serde(rename_all = "camelCase")]
    SubmitAnswers {
        player_name: String,
        answers: Vec<Answer>,
    },

    /// Ask for the top of the leaderboard (10 entries by default).
    GetLeaderboard {
        #[serde(default)]
        limit: Option<u32>,
    },

    /// Remove every leaderboard entry.
    ClearLeaderboard,
}

/// Messages sent from server to client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// Connection accepted, ready for requests.
    ConnectionAck,

    /// The question catalog, in order.
    Questions { questions: Vec<QuestionView> },

    /// Scoring output for a submission.
    #[serde(rename_all = "camelCase")]
    SubmitResult {
        score: u32,
        total_questions: u32,
        results: Vec<QuestionResult>,
        outcome: SubmitOutcome,
    },

    /// Ranked leaderboard entries, best first.
    Leaderboard { entries: Vec<LeaderboardEntry> },

    /// The leaderboard was cleared.
    LeaderboardCleared,

    /// The request failed.
    Error { kind: ErrorKind, message: String },

    /// Server is shutting down.
    ServerClosing,
}

/// Why a request failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The request was well formed but its content was refused.
    Validation,
    /// The score store could not complete the operation.
    Unavailable,
    /// The frame could not be parsed as a request.
    BadRequest,
}

/// Entry in the leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub player_name: String,
    pub score: u32,
    pub total_questions: u32,
    pub recorded_at: DateTime<Utc>,
}

impl LeaderboardEntry {
    /// Number ranked records from 1, keeping their order.
    pub fn rank_all(records: Vec<ScoreRecord>) -> Vec<LeaderboardEntry> {
        records
            .into_iter()
            .enumerate()
            .map(|(i, record)| LeaderboardEntry {
                rank: i + 1,
                player_name: record.player_name,
                score: record.score,
                total_questions: record.total_questions,
                recorded_at: record.recorded_at,
            })
            .collect()
    }
}

impl From<Submission> for ServerMessage {
    fn from(submission: Submission) -> Self {
        ServerMessage::SubmitResult {
            score: submission.score,
            total_questions: submission.total_questions,
            results: submission.results,
            outcome: submission.outcome,
        }
    }
}

impl From<&QuizError> for ServerMessage {
    fn from(err: &QuizError) -> Self {
        let kind = match err {
            QuizError::InvalidPlayerName(_) | QuizError::InvalidScore { .. } => {
                ErrorKind::Validation
            }
            QuizError::Store(_) | QuizError::Catalog(_) => ErrorKind::Unavailable,
        };
        ServerMessage::Error {
            kind,
            message: err.to_string(),
        }
    }
}

impl ServerMessage {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ServerMessage::Error {
            kind: ErrorKind::BadRequest,
            message: message.into(),
        }
    }
}

/// Default server port.
pub const DEFAULT_PORT: u16 = 8712;

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_message_serialization() {
        let msg = ClientMessage::SubmitAnswers {
            player_name: "Alice".to_string(),
            answers: vec![Answer::new(1, "X")],
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"type\":\"SubmitAnswers\""));
        assert!(json.contains("\"playerName\":\"Alice\""));
        assert!(json.contains("\"questionId\":1"));

        let msg = ServerMessage::LeaderboardCleared;
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(json, r#"{"type":"LeaderboardCleared"}"#);
    }

    #[test]
    fn test_leaderboard_limit_is_optional() {
        let msg: ClientMessage = serde_json::from_str(r#"{"type":"GetLeaderboard"}"#).unwrap();
        assert_eq!(msg, ClientMessage::GetLeaderboard { limit: None });

        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"GetLeaderboard","limit":3}"#).unwrap();
        assert_eq!(msg, ClientMessage::GetLeaderboard { limit: Some(3) });
    }

    #[test]
    fn test_rank_all_numbers_from_one() {
        let at = Utc.timestamp_opt(0, 0).unwrap();
        let entries = LeaderboardEntry::rank_all(vec![
            ScoreRecord::new("alice", 9, 10, at),
            ScoreRecord::new("bob", 4, 10, at),
        ]);
        assert_eq!(entries[0].rank, 1);
        assert_eq!(entries[1].rank, 2);
        assert_eq!(entries[1].player_name, "bob");
    }

    #[test]
    fn test_error_kinds() {
        let msg = ServerMessage::from(&QuizError::InvalidPlayerName("player name must not be empty"));
        assert!(matches!(
            msg,
            ServerMessage::Error {
                kind: ErrorKind::Validation,
                ..
            }
        ));

        let json = serde_json::to_string(&ServerMessage::bad_request("nope")).unwrap();
        assert!(json.contains("\"kind\":\"bad_request\""));
    }

    #[test]
    fn test_oversized_score_is_validation_error() {
        let err = QuizError::InvalidScore {
            score: 50,
            total_questions: 10,
        };
        assert_eq!(
            ServerMessage::from(&err),
            ServerMessage::Error {
                kind: ErrorKind::Validation,
                message: "invalid score: 50 is more than 10 questions".to_string(),
            }
        );
    }
}
