//! A page of questions produced by the paginator

use crate::pagination::paginator::SkipLogicPaginator;
use canvass_core::{AnswerValue, BranchKind, Question};
use serde::{Deserialize, Serialize};

/// Where to send the visitor once a survey is finished
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Redirect {
    /// The completion ("thank you") endpoint of `survey`
    Complete { survey: String },
    /// The entry point of another survey
    Survey { survey: String },
}

impl Redirect {
    /// Slug of the survey the redirect points at
    pub fn survey(&self) -> &str {
        match self {
            Redirect::Complete { survey } | Redirect::Survey { survey } => survey,
        }
    }
}

/// Contiguous run of questions with a 1-based page number
#[derive(Debug, Clone, Copy)]
pub struct Page<'p> {
    questions: &'p [Question],
    number: usize,
    paginator: &'p SkipLogicPaginator<'p>,
}

impl<'p> Page<'p> {
    pub(crate) fn new(
        questions: &'p [Question],
        number: usize,
        paginator: &'p SkipLogicPaginator<'p>,
    ) -> Self {
        Self {
            questions,
            number,
            paginator,
        }
    }

    pub fn questions(&self) -> &'p [Question] {
        self.questions
    }

    pub fn number(&self) -> usize {
        self.number
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// A later page exists and the last answer does not end the survey
    pub fn has_next(&self) -> bool {
        self.possibly_has_next() && !self.is_end()
    }

    /// A later page exists, whatever the answers
    pub fn possibly_has_next(&self) -> bool {
        self.number < self.paginator.num_pages()
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn last_question(&self) -> Option<&'p Question> {
        self.questions.last()
    }

    /// Answer given to the last question, including backfilled checkboxes
    pub fn last_response(&self) -> Option<&'p AnswerValue> {
        let question = self.last_question()?;
        self.paginator.answer(&question.label)
    }

    /// Returns true if the last answer selects an action of one of `kinds`.
    /// An unanswered last question selects nothing.
    pub fn is_next_action(&self, kinds: &[BranchKind]) -> bool {
        match (self.last_question(), self.last_response()) {
            (Some(question), Some(response)) => question.is_next_action(response, kinds),
            _ => false,
        }
    }

    /// The last answer ends the survey or leaves it for another one
    pub fn is_end(&self) -> bool {
        self.is_next_action(&[BranchKind::End, BranchKind::Survey])
    }

    /// Redirect once this page completes the survey `slug`
    pub fn success(&self, slug: &str) -> Redirect {
        let linked = self
            .last_question()
            .zip(self.last_response())
            .and_then(|(question, response)| question.branch_action(response))
            .and_then(|action| action.target_survey());

        match linked {
            Some(survey) => Redirect::Survey {
                survey: survey.to_string(),
            },
            None => Redirect::Complete {
                survey: slug.to_string(),
            },
        }
    }

    pub fn next_page_number(&self) -> usize {
        self.paginator.next_page()
    }

    pub fn previous_page_number(&self) -> usize {
        self.paginator.previous_page()
    }
}
