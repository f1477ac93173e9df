//! Per-step answer validation

use super::types::StepErrors;
use canvass_core::{Answers, Question};

/// Validates the answers submitted for one page
pub trait StepValidator: Send + Sync {
    /// Errors per question label; empty when the answers are accepted
    fn validate(&self, questions: &[Question], answers: &Answers) -> StepErrors;
}

/// Rejects pages where a required question is unanswered or blank
#[derive(Debug, Clone, Copy, Default)]
pub struct RequiredFieldsValidator;

impl StepValidator for RequiredFieldsValidator {
    fn validate(&self, questions: &[Question], answers: &Answers) -> StepErrors {
        questions
            .iter()
            .filter(|q| q.required)
            .filter(|q| answers.get(&q.label).map_or(true, |answer| answer.is_blank()))
            .map(|q| (q.label.clone(), vec!["This field is required.".to_string()]))
            .collect()
    }
}

/// Answers the questions cannot take: values outside a choice list, and
/// blank answers to questions that branch on them.
///
/// Runs on the raw submission before it is paged, so an invalid value is
/// reported on the page instead of failing the request.
pub fn invalid_choices(questions: &[Question], answers: &Answers) -> StepErrors {
    questions
        .iter()
        .filter_map(|q| answers.get(&q.label).map(|answer| (q, answer)))
        .filter(|(q, answer)| !q.accepts(answer))
        .map(|(q, answer)| {
            let message = if answer.is_blank() {
                "This field is required.".to_string()
            } else {
                format!(
                    "Select a valid choice. {} is not one of the available choices.",
                    answer
                )
            };
            (q.label.clone(), vec![message])
        })
        .collect()
}
