mod question;
mod score;

pub use question::{NUM_OPTIONS, Question, QuestionView};
pub use score::{Answer, QuestionResult, ScoreRecord, SubmitOutcome, rank_order};
