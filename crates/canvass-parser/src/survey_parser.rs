//! Survey parser
//!
//! Parses YAML survey definitions into [`SurveyDefinition`] values.
//!
//! ```yaml
//! survey:
//!   slug: health-check
//!   title: Health check
//!   questions:
//!     - title: Do you smoke
//!       type: radio
//!       required: true
//!       branching:
//!         - choice: "yes"
//!           action: next
//!         - choice: "no"
//!           action: question
//!           question: 3        # sort_order + 1 of the target
//!     - title: How many a day
//!       type: number
//!       page_break: true
//! ```

use crate::error::{ParseError, Result};
use crate::yaml_parser::YamlParser;
use canvass_core::ast::{BranchAction, BranchRule, Question, SurveyDefinition};
use canvass_core::FieldType;
use serde_yaml::Value as YamlValue;

const SURVEY_FIELDS: &[&str] = &["slug", "title", "segment", "thank_you_text", "questions"];

const QUESTION_FIELDS: &[&str] = &[
    "title",
    "label",
    "type",
    "required",
    "page_break",
    "sort_order",
    "choices",
    "branching",
    "segment",
];

const BRANCH_FIELDS: &[&str] = &["choice", "action", "question", "survey"];

/// Survey parser
pub struct SurveyParser;

impl SurveyParser {
    /// Parse a survey from YAML string
    pub fn parse(yaml_str: &str) -> Result<SurveyDefinition> {
        let yaml = YamlParser::parse(yaml_str)?;
        Self::parse_from_yaml(&yaml)
    }

    /// Parse a survey from YAML value
    pub fn parse_from_yaml(yaml: &YamlValue) -> Result<SurveyDefinition> {
        let survey_obj = YamlParser::get_section(yaml, "survey")?;
        Self::warn_unknown_fields(survey_obj, SURVEY_FIELDS, "survey");

        let slug = YamlParser::get_string(survey_obj, "slug")?;
        let title = YamlParser::get_optional_string(survey_obj, "title").unwrap_or_else(|| slug.clone());

        let mut survey = SurveyDefinition::new(slug, title);
        survey.segment = YamlParser::get_optional_string(survey_obj, "segment");
        survey.thank_you_text = YamlParser::get_optional_string(survey_obj, "thank_you_text");

        survey.questions = YamlParser::get_sequence(survey_obj, "questions")?
            .iter()
            .enumerate()
            .map(|(position, question)| Self::parse_question(question, position))
            .collect::<Result<Vec<_>>>()?;

        survey.sort_questions();

        log::debug!(
            "Parsed survey '{}' with {} question(s)",
            survey.slug,
            survey.questions.len()
        );
        Ok(survey)
    }

    /// Parse one question; `position` is the default sort order
    fn parse_question(obj: &YamlValue, position: usize) -> Result<Question> {
        Self::warn_unknown_fields(obj, QUESTION_FIELDS, "question");

        let title = YamlParser::get_string(obj, "title")?;
        let type_name = YamlParser::get_string(obj, "type")?;
        let field_type: FieldType = type_name
            .parse()
            .map_err(|e: canvass_core::CoreError| ParseError::invalid("type", e.to_string()))?;

        let sort_order = match YamlParser::get_optional_u32(obj, "sort_order")? {
            Some(n) => n,
            None => u32::try_from(position)
                .map_err(|_| ParseError::invalid("sort_order", "too many questions"))?,
        };

        let mut question = Question::new(title, field_type, sort_order)
            .with_required(YamlParser::get_bool_or(obj, "required", false)?)
            .with_page_break(YamlParser::get_bool_or(obj, "page_break", false)?)
            .with_choices(YamlParser::get_string_list(obj, "choices")?);

        if let Some(label) = YamlParser::get_optional_string(obj, "label") {
            question = question.with_label(label);
        }
        if let Some(segment) = YamlParser::get_optional_string(obj, "segment") {
            question = question.with_segment(segment);
        }

        let branching = YamlParser::get_sequence(obj, "branching")?;
        if !branching.is_empty() {
            let rules = branching
                .iter()
                .map(Self::parse_branch_rule)
                .collect::<Result<Vec<_>>>()?;
            question = question.with_branching(rules);
        }

        Ok(question)
    }

    /// Parse one `{choice, action, question?, survey?}` entry
    fn parse_branch_rule(obj: &YamlValue) -> Result<BranchRule> {
        Self::warn_unknown_fields(obj, BRANCH_FIELDS, "branching");

        let choice = YamlParser::get_string(obj, "choice")?;
        let action_name =
            YamlParser::get_optional_string(obj, "action").unwrap_or_else(|| "next".to_string());

        let action = match action_name.as_str() {
            "next" => BranchAction::Continue,
            "end" => BranchAction::End,
            "question" => match YamlParser::get_optional_u32(obj, "question")? {
                Some(question) if question > 0 => BranchAction::JumpToQuestion { question },
                Some(_) => {
                    return Err(ParseError::invalid(
                        "question",
                        "question targets are 1-based and must be positive",
                    ))
                }
                None => {
                    return Err(ParseError::invalid(
                        "question",
                        "A Question must be selected to progress to.",
                    ))
                }
            },
            "survey" => match YamlParser::get_optional_string(obj, "survey") {
                Some(survey) if !survey.trim().is_empty() => BranchAction::JumpToSurvey { survey },
                _ => {
                    return Err(ParseError::invalid(
                        "survey",
                        "A Survey must be selected to progress to.",
                    ))
                }
            },
            other => {
                return Err(ParseError::invalid(
                    "action",
                    format!("unknown action '{}', expected next, end, question or survey", other),
                ))
            }
        };

        Ok(BranchRule::new(choice, action))
    }

    fn warn_unknown_fields(obj: &YamlValue, known: &[&str], context: &str) {
        for warning in YamlParser::validate_fields(obj, known, context) {
            log::warn!("{}", warning);
        }
    }
}
