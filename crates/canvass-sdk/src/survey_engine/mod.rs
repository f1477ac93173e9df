//! SurveyEngine - Main API for serving surveys
//!
//! The module is organized into:
//! - `types`: Request/Response types (StepRequest, StepResponse, StepOutcome)
//! - `validator`: Per-step answer validation
//! - `engine`: Core SurveyEngine implementation

mod engine;
mod types;
mod validator;

pub use engine::SurveyEngine;
pub use types::{RenderedStep, StepErrors, StepMethod, StepOutcome, StepRequest, StepResponse};
pub use validator::{invalid_choices, RequiredFieldsValidator, StepValidator};
