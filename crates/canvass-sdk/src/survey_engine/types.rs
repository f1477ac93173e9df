//! Request/Response types for SurveyEngine

use canvass_core::{Answers, Question};
use canvass_runtime::Redirect;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Validation messages per question label
pub type StepErrors = BTreeMap<String, Vec<String>>;

/// HTTP-style method of a step request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StepMethod {
    /// Show a page, starting the survey over
    #[default]
    Get,
    /// Submit the answers of the page just shown
    Post,
}

/// One request against a survey
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepRequest {
    /// Survey slug
    pub survey: String,

    /// Raw `p` parameter
    #[serde(default)]
    pub page: Option<String>,

    #[serde(default)]
    pub method: StepMethod,

    /// Submitted form data (POST only)
    #[serde(default)]
    pub data: Answers,

    /// Answers accepted on earlier steps, as kept in the session
    #[serde(default)]
    pub session: Answers,
}

impl StepRequest {
    /// Create a GET request for the first page
    pub fn get(survey: impl Into<String>) -> Self {
        Self {
            survey: survey.into(),
            page: None,
            method: StepMethod::Get,
            data: Answers::new(),
            session: Answers::new(),
        }
    }

    /// Create a POST request submitting `data`
    pub fn post(survey: impl Into<String>, data: Answers) -> Self {
        Self {
            method: StepMethod::Post,
            data,
            ..Self::get(survey)
        }
    }

    /// Set the `p` parameter
    pub fn with_page(mut self, page: impl Into<String>) -> Self {
        self.page = Some(page.into());
        self
    }

    /// Set the session answers
    pub fn with_session(mut self, session: Answers) -> Self {
        self.session = session;
        self
    }
}

/// A page to render
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderedStep {
    pub number: usize,
    pub questions: Vec<Question>,

    /// Another page follows given the answers so far
    pub has_next: bool,

    /// Another page exists at all ("Next" rather than "Submit")
    pub is_intermediate: bool,

    /// Validation errors when the page is shown again
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub errors: StepErrors,
}

impl RenderedStep {
    pub fn labels(&self) -> Vec<&str> {
        self.questions.iter().map(|q| q.label.as_str()).collect()
    }
}

/// What the step resolved to
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StepOutcome {
    /// Show a page
    Render(RenderedStep),
    /// The survey is complete
    Finish {
        redirect: Redirect,
        /// Every answer accepted across the steps
        submission: Answers,
    },
}

/// Response to a step request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResponse {
    pub outcome: StepOutcome,

    /// Session answers to keep for the next request
    pub session: Answers,
}

impl StepResponse {
    /// The page to render, if any
    pub fn rendered(&self) -> Option<&RenderedStep> {
        match &self.outcome {
            StepOutcome::Render(step) => Some(step),
            StepOutcome::Finish { .. } => None,
        }
    }

    /// Where to go once the survey is complete
    pub fn redirect(&self) -> Option<&Redirect> {
        match &self.outcome {
            StepOutcome::Finish { redirect, .. } => Some(redirect),
            StepOutcome::Render(_) => None,
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.outcome, StepOutcome::Finish { .. })
    }
}
