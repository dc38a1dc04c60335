//! Scoring of submitted answers against the catalog.

use std::collections::HashSet;

use crate::data::Catalog;
use crate::models::{Answer, QuestionResult};

/// Score and per-answer breakdown for one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scorecard {
    pub score: u32,
    pub results: Vec<QuestionResult>,
}

/// Score `answers` against `catalog`.
///
/// Answers whose question id is not in the catalog are skipped: they produce
/// no result and do not count. Results keep the order of `answers`.
///
/// Repeated answers to one question each get a result row, but a question
/// adds at most one point, so the score never exceeds the catalog size.
pub fn score(answers: &[Answer], catalog: &Catalog) -> Scorecard {
    let mut credited = HashSet::new();
    let mut score = 0;

    let results: Vec<QuestionResult> = answers
        .iter()
        .filter_map(|answer| {
            let question = catalog.get(answer.question_id)?;
            let is_correct =
                answer.selected_option.as_deref() == Some(question.correct_answer.as_str());
            if is_correct && credited.insert(question.id) {
                score += 1;
            }
            Some(QuestionResult {
                question_text: question.prompt.clone(),
                selected_option: answer.selected_option.clone(),
                correct_answer: question.correct_answer.clone(),
                is_correct,
            })
        })
        .collect();

    Scorecard { score, results }
}
