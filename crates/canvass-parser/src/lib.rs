//! Canvass Parser - YAML to definition parser for the Canvass survey engine
//!
//! This crate converts YAML documents into the survey and segment
//! definitions of `canvass-core`.

pub mod error;
pub mod segment_parser;
pub mod survey_parser;
pub mod yaml_parser;

// Re-export main parser types
pub use error::{ParseError, Result};
pub use segment_parser::SegmentParser;
pub use survey_parser::SurveyParser;
pub use yaml_parser::YamlParser;

use canvass_core::{Segment, SurveyDefinition};

/// Everything defined in one YAML source
#[derive(Debug, Default, Clone)]
pub struct Definitions {
    pub surveys: Vec<SurveyDefinition>,
    pub segments: Vec<Segment>,
}

/// Parse a YAML source that may hold several `survey:` and `segment:`
/// documents separated by `---`
pub fn parse_definitions(yaml_str: &str) -> Result<Definitions> {
    let mut definitions = Definitions::default();

    for document in YamlParser::parse_multi_document(yaml_str)? {
        if document.get("survey").is_some() {
            definitions.surveys.push(SurveyParser::parse_from_yaml(&document)?);
        } else if document.get("segment").is_some() {
            definitions.segments.push(SegmentParser::parse_from_yaml(&document)?);
        } else if !document.is_null() {
            return Err(ParseError::ParseError(format!(
                "Document must define a survey or a segment, found keys: {}",
                YamlParser::get_keys(&document).join(", ")
            )));
        }
    }

    log::debug!(
        "Parsed {} survey(s) and {} segment(s)",
        definitions.surveys.len(),
        definitions.segments.len()
    );
    Ok(definitions)
}
