//! Common test utilities for SDK integration tests

#![allow(dead_code)]

use canvass_sdk::{
    Answers, RenderedStep, StepRequest, StepResponse, SurveyEngine, SurveyEngineBuilder,
};

/// Test helper to create a SurveyEngine from inline YAML definitions
pub struct TestEngine {
    contents: Vec<String>,
}

impl TestEngine {
    /// Create a new test engine with no definitions
    pub fn new() -> Self {
        Self {
            contents: Vec::new(),
        }
    }

    /// Load a survey from YAML string
    pub fn with_survey(mut self, survey_yaml: &str) -> Self {
        self.contents.push(survey_yaml.trim().to_string());
        self
    }

    /// Load a segment from YAML string
    pub fn with_segment(mut self, segment_yaml: &str) -> Self {
        self.contents.push(segment_yaml.trim().to_string());
        self
    }

    /// Build the engine from the combined YAML
    pub fn build(&self) -> SurveyEngine {
        init_tracing();
        SurveyEngineBuilder::new()
            .add_content("test", self.contents.join("\n\n---\n\n"))
            .enable_tracing(true)
            .build()
            .expect("test definitions should load")
    }
}

/// Install a subscriber once so engine logs show up with `--nocapture`
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Walks a visitor through a survey, carrying the session between steps
pub struct Visit<'e> {
    engine: &'e SurveyEngine,
    survey: String,
    pub session: Answers,
}

impl<'e> Visit<'e> {
    /// Start a visit with a GET of the first page
    pub fn start(engine: &'e SurveyEngine, survey: &str) -> (Self, StepResponse) {
        let response = engine
            .step(StepRequest::get(survey))
            .expect("first page should render");
        let visit = Self {
            engine,
            survey: survey.to_string(),
            session: response.session.clone(),
        };
        (visit, response)
    }

    /// Submit `data` with `?p=page`
    pub fn post(&mut self, page: &str, data: Answers) -> StepResponse {
        let request = StepRequest::post(self.survey.clone(), data)
            .with_page(page)
            .with_session(self.session.clone());
        let response = self.engine.step(request).expect("step should succeed");
        self.session = response.session.clone();
        response
    }
}

/// Labels of the page a response renders
pub fn rendered_labels(response: &StepResponse) -> Vec<String> {
    response
        .rendered()
        .map(RenderedStep::labels)
        .unwrap_or_default()
        .into_iter()
        .map(str::to_string)
        .collect()
}
