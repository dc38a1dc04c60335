use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One answer as submitted by a player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub question_id: u32,
    #[serde(default)]
    pub selected_option: Option<String>,
}

impl Answer {
    pub fn new(question_id: u32, selected_option: impl Into<String>) -> Self {
        Self {
            question_id,
            selected_option: Some(selected_option.into()),
        }
    }
}

/// Outcome of one answer against the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResult {
    pub question_text: String,
    pub selected_option: Option<String>,
    pub correct_answer: String,
    pub is_correct: bool,
}

/// The best score a player has recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRecord {
    pub player_name: String,
    pub score: u32,
    pub total_questions: u32,
    pub recorded_at: DateTime<Utc>,
}

impl ScoreRecord {
    pub fn new(
        player_name: impl Into<String>,
        score: u32,
        total_questions: u32,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            player_name: player_name.into(),
            score,
            total_questions,
            recorded_at,
        }
    }
}

/// What a score submission did to the leaderboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitOutcome {
    /// First score for this player.
    Created,
    /// Beat the player's previous best.
    Updated,
    /// Equal to or worse than the stored best; nothing written.
    Unchanged,
}

impl SubmitOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmitOutcome::Created => "created",
            SubmitOutcome::Updated => "updated",
            SubmitOutcome::Unchanged => "unchanged",
        }
    }
}

/// Orders records for the leaderboard: score descending, most recent first on
/// ties, then player name so the order is total.
pub fn rank_order(a: &ScoreRecord, b: &ScoreRecord) -> std::cmp::Ordering {
    b.score
        .cmp(&a.score)
        .then_with(|| b.recorded_at.cmp(&a.recorded_at))
        .then_with(|| a.player_name.cmp(&b.player_name))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn test_rank_order() {
        let mut records = vec![
            ScoreRecord::new("carol", 3, 10, at(100)),
            ScoreRecord::new("alice", 7, 10, at(50)),
            ScoreRecord::new("bob", 3, 10, at(200)),
            ScoreRecord::new("dave", 3, 10, at(200)),
        ];
        records.sort_by(rank_order);

        let names: Vec<_> = records.iter().map(|r| r.player_name.as_str()).collect();
        assert_eq!(names, ["alice", "bob", "dave", "carol"]);
    }

    #[test]
    fn test_answer_without_selection() {
        let answer: Answer = serde_json::from_str(r#"{"questionId": 3}"#).unwrap();
        assert_eq!(answer.question_id, 3);
        assert_eq!(answer.selected_option, None);
    }

    #[test]
    fn test_record_wire_shape() {
        let record = ScoreRecord::new("alice", 4, 10, at(0));
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["playerName"], "alice");
        assert_eq!(json["totalQuestions"], 10);
        assert!(
            json["recordedAt"]
                .as_str()
                .unwrap()
                .starts_with("1970-01-01T00:00:00")
        );
    }
}
