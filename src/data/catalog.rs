//! The fixed question catalog a server runs with.

use std::collections::HashMap;

use thiserror::Error;

use crate::models::{Question, QuestionView};

/// Errors raised while loading or validating a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("catalog must contain at least one question")]
    Empty,

    #[error("duplicate question id {0}")]
    DuplicateId(u32),

    #[error("question {id}: correct answer {answer:?} is not one of its options")]
    AnswerNotInOptions { id: u32, answer: String },
}

/// An ordered, read-only set of questions indexed by id.
#[derive(Debug, Clone)]
pub struct Catalog {
    questions: Vec<Question>,
    by_id: HashMap<u32, usize>,
}

impl Catalog {
    /// Build a catalog, rejecting empty sets, duplicate ids and answers that
    /// are not among their question's options.
    pub fn new(questions: Vec<Question>) -> Result<Self, CatalogError> {
        if questions.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut by_id = HashMap::with_capacity(questions.len());
        for (index, question) in questions.iter().enumerate() {
            if by_id.insert(question.id, index).is_some() {
                return Err(CatalogError::DuplicateId(question.id));
            }
            if !question.options.contains(&question.correct_answer) {
                return Err(CatalogError::AnswerNotInOptions {
                    id: question.id,
                    answer: question.correct_answer.clone(),
                });
            }
        }

        Ok(Self { questions, by_id })
    }

    pub fn get(&self, id: u32) -> Option<&Question> {
        self.by_id.get(&id).map(|&index| &self.questions[index])
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Questions in catalog order, without answers.
    pub fn views(&self) -> Vec<QuestionView> {
        self.questions.iter().map(Question::view).collect()
    }
}
