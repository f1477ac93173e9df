//! Configuration types for SurveyEngine

use crate::error::{Result, SdkError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Survey definition file path(s)
    pub survey_files: Vec<PathBuf>,

    /// Segment definition file path(s)
    pub segment_files: Vec<PathBuf>,

    /// Definition contents (id, content) - alternative to file paths
    #[serde(skip)]
    pub contents: Vec<(String, String)>,

    /// Reject definitions that fail skip logic or segment validation
    pub validate_definitions: bool,

    /// Log every step served
    pub enable_tracing: bool,
}

impl EngineConfig {
    /// Create a new engine configuration
    pub fn new() -> Self {
        Self {
            survey_files: Vec::new(),
            segment_files: Vec::new(),
            contents: Vec::new(),
            validate_definitions: true,
            enable_tracing: false,
        }
    }

    /// Load a configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        serde_yaml::from_str(&content).map_err(|e| {
            SdkError::ConfigError(format!("{}: {}", path.as_ref().display(), e))
        })
    }

    /// Add a survey file
    pub fn with_survey_file(mut self, path: PathBuf) -> Self {
        self.survey_files.push(path);
        self
    }

    /// Add a segment file
    pub fn with_segment_file(mut self, path: PathBuf) -> Self {
        self.segment_files.push(path);
        self
    }

    /// Add definition content
    pub fn with_content(mut self, id: impl Into<String>, content: impl Into<String>) -> Self {
        self.contents.push((id.into(), content.into()));
        self
    }

    /// Enable definition validation
    pub fn validate_definitions(mut self, enable: bool) -> Self {
        self.validate_definitions = enable;
        self
    }

    /// Enable tracing
    pub fn enable_tracing(mut self, enable: bool) -> Self {
        self.enable_tracing = enable;
        self
    }

    /// True when no definition source is configured
    pub fn is_empty(&self) -> bool {
        self.survey_files.is_empty() && self.segment_files.is_empty() && self.contents.is_empty()
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert!(config.validate_definitions);
        assert!(!config.enable_tracing);
        assert!(config.is_empty());
    }

    #[test]
    fn test_builder_methods() {
        let config = EngineConfig::new()
            .with_survey_file(PathBuf::from("surveys.yaml"))
            .with_content("inline", "survey: {slug: s}")
            .enable_tracing(true);

        assert_eq!(config.survey_files.len(), 1);
        assert_eq!(config.contents[0].0, "inline");
        assert!(config.enable_tracing);
        assert!(!config.is_empty());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "survey_files:\n  - surveys/diet.yaml\nvalidate_definitions: false"
        )
        .unwrap();

        let config = EngineConfig::from_file(file.path()).unwrap();
        assert_eq!(config.survey_files, vec![PathBuf::from("surveys/diet.yaml")]);
        assert!(!config.validate_definitions);
        assert!(config.segment_files.is_empty());
    }

    #[test]
    fn test_from_file_rejects_bad_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "survey_files: 12").unwrap();

        assert!(matches!(
            EngineConfig::from_file(file.path()),
            Err(SdkError::ConfigError(_))
        ));
    }
}
