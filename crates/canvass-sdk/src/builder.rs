//! Builder pattern for SurveyEngine

use crate::config::EngineConfig;
use crate::error::Result;
use crate::survey_engine::{StepValidator, SurveyEngine};
use std::path::PathBuf;

/// Builder for SurveyEngine
///
/// # Example
///
/// ```rust,ignore
/// use canvass_sdk::SurveyEngineBuilder;
///
/// // From definition files
/// let engine = SurveyEngineBuilder::new()
///     .add_survey_file("surveys/diet.yaml")
///     .add_segment_file("segments/editors.yaml")
///     .build()?;
///
/// // Manual configuration (for testing)
/// let engine = SurveyEngineBuilder::new()
///     .add_content("diet", yaml_content)
///     .build()?;
/// ```
pub struct SurveyEngineBuilder {
    config: EngineConfig,
    validator: Option<Box<dyn StepValidator>>,
}

impl SurveyEngineBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            config: EngineConfig::new(),
            validator: None,
        }
    }

    /// Start from an existing configuration
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Add a survey file
    pub fn add_survey_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.survey_files.push(path.into());
        self
    }

    /// Add multiple survey files
    pub fn add_survey_files(mut self, paths: Vec<PathBuf>) -> Self {
        self.config.survey_files.extend(paths);
        self
    }

    /// Add a segment file
    pub fn add_segment_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.segment_files.push(path.into());
        self
    }

    /// Add definition content directly (alternative to file path)
    ///
    /// # Arguments
    /// * `id` - Name used in error messages
    /// * `content` - YAML holding `survey:` and/or `segment:` documents
    pub fn add_content(mut self, id: impl Into<String>, content: impl Into<String>) -> Self {
        self.config.contents.push((id.into(), content.into()));
        self
    }

    /// Enable definition validation
    pub fn validate_definitions(mut self, enable: bool) -> Self {
        self.config.validate_definitions = enable;
        self
    }

    /// Enable tracing
    pub fn enable_tracing(mut self, enable: bool) -> Self {
        self.config.enable_tracing = enable;
        self
    }

    /// Validate submitted pages with a custom validator
    pub fn with_step_validator(mut self, validator: impl StepValidator + 'static) -> Self {
        self.validator = Some(Box::new(validator));
        self
    }

    /// Build the survey engine
    pub fn build(self) -> Result<SurveyEngine> {
        match self.validator {
            Some(validator) => SurveyEngine::new_with_validator(self.config, validator),
            None => SurveyEngine::new(self.config),
        }
    }
}

impl Default for SurveyEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SdkError;

    const SURVEY: &str = r#"
survey:
  slug: diet
  title: Diet
  questions:
    - title: Favourite food
      type: singleline
      required: true
"#;

    #[test]
    fn test_builder_from_content() {
        let engine = SurveyEngineBuilder::new()
            .add_content("diet", SURVEY)
            .build()
            .unwrap();

        assert_eq!(engine.survey_slugs(), vec!["diet"]);
        assert!(engine.config().validate_definitions);
    }

    #[test]
    fn test_builder_duplicate_survey() {
        let result = SurveyEngineBuilder::new()
            .add_content("first", SURVEY)
            .add_content("second", SURVEY)
            .build();

        assert!(matches!(result, Err(SdkError::ConfigError(_))));
    }

    #[test]
    fn test_builder_missing_file() {
        let result = SurveyEngineBuilder::new()
            .add_survey_file("does/not/exist.yaml")
            .build();

        assert!(matches!(result, Err(SdkError::IoError(_))));
    }
}
