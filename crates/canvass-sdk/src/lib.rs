//! Canvass Survey SDK
//!
//! High-level API for serving multi-step surveys with skip logic and for
//! matching visitors against segments.

pub mod builder;
pub mod config;
pub mod error;
pub mod survey_engine;

// Re-export main types
pub use builder::SurveyEngineBuilder;
pub use config::EngineConfig;
pub use error::{Result, SdkError};
pub use survey_engine::{
    invalid_choices, RenderedStep, RequiredFieldsValidator, StepErrors, StepMethod, StepOutcome,
    StepRequest, StepResponse, StepValidator, SurveyEngine,
};

// Re-export commonly used types from dependencies
pub use canvass_core::{AnswerValue, Answers, Question, Segment, SurveyDefinition};
pub use canvass_runtime::{Redirect, SessionVisitor, SurveyResults, VisitorContext};
