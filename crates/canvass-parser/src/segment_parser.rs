//! Segment parser
//!
//! ```yaml
//! segment:
//!   name: engaged-members
//!   match_any: false
//!   rules:
//!     - type: logged_in
//!       is_logged_in: true
//!     - type: group_membership
//!       group: editors
//!     - type: combination
//!       body:
//!         - { type: Rule, value: UserIsLoggedInRule_0 }
//!         - { type: Operator, value: and }
//!         - { type: Rule, value: GroupMembershipRule_0 }
//! ```

use crate::error::{ParseError, Result};
use crate::yaml_parser::YamlParser;
use canvass_core::ast::{Rule, Segment};
use serde_yaml::Value as YamlValue;

const SEGMENT_FIELDS: &[&str] = &["name", "match_any", "rules"];

/// Segment parser
pub struct SegmentParser;

impl SegmentParser {
    /// Parse a segment from YAML string
    pub fn parse(yaml_str: &str) -> Result<Segment> {
        let yaml = YamlParser::parse(yaml_str)?;
        Self::parse_from_yaml(&yaml)
    }

    /// Parse a segment from YAML value
    pub fn parse_from_yaml(yaml: &YamlValue) -> Result<Segment> {
        let segment_obj = YamlParser::get_section(yaml, "segment")?;
        for warning in YamlParser::validate_fields(segment_obj, SEGMENT_FIELDS, "segment") {
            log::warn!("{}", warning);
        }

        let name = YamlParser::get_string(segment_obj, "name")?;
        let match_any = YamlParser::get_bool_or(segment_obj, "match_any", false)?;

        let rules = YamlParser::get_sequence(segment_obj, "rules")?
            .iter()
            .enumerate()
            .map(|(index, rule)| Self::parse_rule(rule, index))
            .collect::<Result<Vec<_>>>()?;

        let combinations = rules
            .iter()
            .filter(|rule| matches!(rule, Rule::Combination(_)))
            .count();
        if combinations > 1 {
            return Err(ParseError::invalid(
                "rules",
                format!("segment '{}' may hold at most one combination rule", name),
            ));
        }

        log::debug!("Parsed segment '{}' with {} rule(s)", name, rules.len());
        Ok(Segment {
            name,
            match_any,
            rules,
        })
    }

    fn parse_rule(obj: &YamlValue, index: usize) -> Result<Rule> {
        if YamlParser::get_optional_string(obj, "type").is_none() {
            return Err(ParseError::MissingField {
                field: format!("rules[{}].type", index),
            });
        }

        serde_yaml::from_value(obj.clone())
            .map_err(|e| ParseError::invalid(format!("rules[{}]", index), e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use canvass_core::ast::{CombinationBlock, CountOperator, LogicOperator, MatchOperator};

    #[test]
    fn test_parse_segment_with_all_rule_types() {
        let yaml = r#"
segment:
  name: everything
  match_any: true
  rules:
    - type: logged_in
      is_logged_in: true
    - type: group_membership
      group: editors
    - type: article_tag
      tag: health
      operator: gt
      count: 2
      date_from: "2024-01-01T00:00:00"
    - type: survey_submission
      survey: diet
      field_name: favourite-food
      expected_response: Pizza
      operator: eq
    - type: combination
      body:
        - type: Rule
          value: UserIsLoggedInRule_0
        - type: Operator
          value: or
        - type: NestedLogic
          value:
            rule_1: GroupMembershipRule_0
            operator: and
            rule_2: ArticleTagRule_0
"#;

        let segment = SegmentParser::parse(yaml).unwrap();
        assert_eq!(segment.name, "everything");
        assert!(segment.match_any);
        assert_eq!(segment.rules.len(), 5);

        match &segment.rules[2] {
            Rule::ArticleTag(rule) => {
                assert_eq!(rule.operator, CountOperator::Gt);
                assert!(rule.date_from.is_some());
                assert!(rule.date_to.is_none());
            }
            other => panic!("Expected ArticleTag, got {:?}", other),
        }
        match &segment.rules[3] {
            Rule::SurveySubmission(rule) => assert_eq!(rule.operator, MatchOperator::Equals),
            other => panic!("Expected SurveySubmission, got {:?}", other),
        }

        let body = &segment.combination().unwrap().body;
        assert_eq!(body.len(), 3);
        assert_eq!(body[1], CombinationBlock::Operator(LogicOperator::Or));
    }

    #[test]
    fn test_rule_without_type() {
        let yaml = r#"
segment:
  name: broken
  rules:
    - is_logged_in: true
"#;
        let err = SegmentParser::parse(yaml).unwrap_err();
        assert!(err.to_string().contains("rules[0].type"));
    }

    #[test]
    fn test_unknown_rule_type() {
        let yaml = r#"
segment:
  name: broken
  rules:
    - type: time_of_day
"#;
        assert!(SegmentParser::parse(yaml).is_err());
    }

    #[test]
    fn test_two_combinations_rejected() {
        let yaml = r#"
segment:
  name: broken
  rules:
    - type: combination
      body: []
    - type: combination
      body: []
"#;
        assert!(SegmentParser::parse(yaml).is_err());
    }
}
