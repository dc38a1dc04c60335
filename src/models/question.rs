use serde::{Deserialize, Serialize};

/// Number of options every question carries.
pub const NUM_OPTIONS: usize = 4;

/// A quiz question as loaded from the catalog file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: u32,
    #[serde(alias = "question")]
    pub prompt: String,
    pub options: [String; NUM_OPTIONS],
    pub correct_answer: String,
    #[serde(default)]
    pub hint: String,
}

impl Question {
    /// The view of this question that is safe to hand to players.
    pub fn view(&self) -> QuestionView {
        QuestionView {
            id: self.id,
            prompt: self.prompt.clone(),
            options: self.options.clone(),
            hint: self.hint.clone(),
        }
    }
}

/// A question without its answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionView {
    pub id: u32,
    pub prompt: String,
    pub options: [String; NUM_OPTIONS],
    pub hint: String,
}
