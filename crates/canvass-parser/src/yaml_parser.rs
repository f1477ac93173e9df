//! YAML Parser
//!
//! Field extraction helpers shared by the survey and segment parsers.

use crate::error::{ParseError, Result};
use serde::Deserialize;
use serde_yaml::Value as YamlValue;

/// YAML parser utilities
pub struct YamlParser;

impl YamlParser {
    /// Parse YAML string into a YAML value
    pub fn parse(yaml_str: &str) -> Result<YamlValue> {
        serde_yaml::from_str(yaml_str).map_err(|e| ParseError::ParseError(e.to_string()))
    }

    /// Parse a YAML string holding one or more `---` separated documents
    pub fn parse_multi_document(yaml_str: &str) -> Result<Vec<YamlValue>> {
        let mut documents = Vec::new();

        for document in serde_yaml::Deserializer::from_str(yaml_str) {
            let value = YamlValue::deserialize(document)
                .map_err(|e| ParseError::ParseError(e.to_string()))?;
            documents.push(value);
        }

        Ok(documents)
    }

    /// Get a required mapping stored under `field`
    pub fn get_section<'a>(obj: &'a YamlValue, field: &str) -> Result<&'a YamlValue> {
        obj.get(field)
            .filter(|v| v.is_mapping())
            .ok_or_else(|| ParseError::MissingField {
                field: field.to_string(),
            })
    }

    /// Get a required string field from YAML object
    pub fn get_string(obj: &YamlValue, field: &str) -> Result<String> {
        obj.get(field)
            .and_then(Self::scalar_to_string)
            .ok_or_else(|| ParseError::MissingField {
                field: field.to_string(),
            })
    }

    /// Get an optional string field from YAML object
    pub fn get_optional_string(obj: &YamlValue, field: &str) -> Option<String> {
        obj.get(field).and_then(Self::scalar_to_string)
    }

    /// Get an optional boolean, falling back to `default` when absent
    pub fn get_bool_or(obj: &YamlValue, field: &str, default: bool) -> Result<bool> {
        match obj.get(field) {
            None | Some(YamlValue::Null) => Ok(default),
            Some(value) => value.as_bool().ok_or_else(|| ParseError::InvalidValue {
                field: field.to_string(),
                message: "expected a boolean".to_string(),
            }),
        }
    }

    /// Get an optional non-negative integer field
    pub fn get_optional_u32(obj: &YamlValue, field: &str) -> Result<Option<u32>> {
        match obj.get(field) {
            None | Some(YamlValue::Null) => Ok(None),
            Some(value) => value
                .as_u64()
                .and_then(|n| u32::try_from(n).ok())
                .map(Some)
                .ok_or_else(|| ParseError::InvalidValue {
                    field: field.to_string(),
                    message: "expected a non-negative integer".to_string(),
                }),
        }
    }

    /// Get an optional sequence field (empty when absent)
    pub fn get_sequence<'a>(obj: &'a YamlValue, field: &str) -> Result<&'a [YamlValue]> {
        match obj.get(field) {
            None | Some(YamlValue::Null) => Ok(&[]),
            Some(value) => value
                .as_sequence()
                .map(|seq| seq.as_slice())
                .ok_or_else(|| ParseError::InvalidValue {
                    field: field.to_string(),
                    message: "expected a list".to_string(),
                }),
        }
    }

    /// Get a list of strings, given either as a YAML sequence or as one
    /// comma separated string
    pub fn get_string_list(obj: &YamlValue, field: &str) -> Result<Vec<String>> {
        match obj.get(field) {
            None | Some(YamlValue::Null) => Ok(Vec::new()),
            Some(YamlValue::String(joined)) => Ok(joined
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()),
            Some(YamlValue::Sequence(items)) => items
                .iter()
                .map(|item| {
                    Self::scalar_to_string(item).ok_or_else(|| ParseError::InvalidValue {
                        field: field.to_string(),
                        message: "list entries must be scalars".to_string(),
                    })
                })
                .collect(),
            Some(_) => Err(ParseError::InvalidValue {
                field: field.to_string(),
                message: "expected a list or a comma separated string".to_string(),
            }),
        }
    }

    /// Strings, numbers and booleans as text
    fn scalar_to_string(value: &YamlValue) -> Option<String> {
        match value {
            YamlValue::String(s) => Some(s.clone()),
            YamlValue::Number(n) => Some(n.to_string()),
            YamlValue::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Get all keys from a YAML mapping
    pub fn get_keys(obj: &YamlValue) -> Vec<String> {
        if let Some(mapping) = obj.as_mapping() {
            mapping
                .keys()
                .filter_map(|k| k.as_str())
                .map(|s| s.to_string())
                .collect()
        } else {
            Vec::new()
        }
    }

    /// Check the keys of a YAML object against a list of known fields.
    /// Returns one warning per unknown field, with a suggestion when a
    /// close match exists.
    pub fn validate_fields(obj: &YamlValue, known_fields: &[&str], context: &str) -> Vec<String> {
        Self::get_keys(obj)
            .into_iter()
            .filter(|key| !known_fields.contains(&key.as_str()))
            .map(|key| {
                let suggestion = FIELD_CORRECTIONS
                    .iter()
                    .find(|(typo, _)| *typo == key)
                    .map(|(_, correct)| correct.to_string())
                    .or_else(|| Self::find_similar_field(&key, known_fields));

                match suggestion {
                    Some(s) => format!("Unknown field '{}' in {}. Did you mean '{}'?", key, context, s),
                    None => format!("Unknown field '{}' in {}.", key, context),
                }
            })
            .collect()
    }

    /// Like [`YamlParser::validate_fields`] but fails on the first unknown field
    pub fn validate_fields_strict(obj: &YamlValue, known_fields: &[&str], context: &str) -> Result<()> {
        let errors = Self::validate_fields(obj, known_fields, context);

        if !errors.is_empty() {
            for error in &errors {
                log::error!("Field validation error: {}", error);
            }
            return Err(ParseError::UnknownField(errors.join("; ")));
        }

        Ok(())
    }

    fn find_similar_field(field: &str, known_fields: &[&str]) -> Option<String> {
        known_fields
            .iter()
            .filter(|known| levenshtein_distance(field, known) <= 2)
            .min_by_key(|known| levenshtein_distance(field, known))
            .map(|s| s.to_string())
    }
}

/// Common field name mistakes in survey files
const FIELD_CORRECTIONS: &[(&str, &str)] = &[
    ("skip_logic", "branching"),
    ("field_type", "type"),
    ("pagebreak", "page_break"),
    ("options", "choices"),
    ("name", "title"),
    ("next_question", "question"),
];

fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let a: Vec<char> = s1.chars().collect();
    let b: Vec<char> = s2.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            current[j + 1] = (previous[j + 1] + 1)
                .min(current[j] + 1)
                .min(previous[j] + cost);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_yaml() {
        let yaml = YamlParser::parse("name: test\nvalue: 42\n").unwrap();
        assert!(yaml.is_mapping());
    }

    #[test]
    fn test_get_string_accepts_scalars() {
        let yaml = YamlParser::parse("title: Hello\ncount: 3\n").unwrap();
        assert_eq!(YamlParser::get_string(&yaml, "title").unwrap(), "Hello");
        assert_eq!(YamlParser::get_string(&yaml, "count").unwrap(), "3");
        assert!(YamlParser::get_string(&yaml, "missing").is_err());
    }

    #[test]
    fn test_get_bool_or() {
        let yaml = YamlParser::parse("required: true\nbad: maybe\n").unwrap();
        assert!(YamlParser::get_bool_or(&yaml, "required", false).unwrap());
        assert!(!YamlParser::get_bool_or(&yaml, "absent", false).unwrap());
        assert!(YamlParser::get_bool_or(&yaml, "bad", false).is_err());
    }

    #[test]
    fn test_get_optional_u32_rejects_negative() {
        let yaml = YamlParser::parse("a: 4\nb: -1\n").unwrap();
        assert_eq!(YamlParser::get_optional_u32(&yaml, "a").unwrap(), Some(4));
        assert_eq!(YamlParser::get_optional_u32(&yaml, "c").unwrap(), None);
        assert!(YamlParser::get_optional_u32(&yaml, "b").is_err());
    }

    #[test]
    fn test_get_string_list_both_forms() {
        let yaml = YamlParser::parse("a: [x, y]\nb: \"x, y ,, z\"\n").unwrap();
        assert_eq!(YamlParser::get_string_list(&yaml, "a").unwrap(), vec!["x", "y"]);
        assert_eq!(YamlParser::get_string_list(&yaml, "b").unwrap(), vec!["x", "y", "z"]);
        assert!(YamlParser::get_string_list(&yaml, "c").unwrap().is_empty());
    }

    #[test]
    fn test_multi_document() {
        let docs = YamlParser::parse_multi_document("a: 1\n---\nb: 2\n").unwrap();
        assert_eq!(docs.len(), 2);
    }

    #[test]
    fn test_validate_fields_suggests() {
        let yaml = YamlParser::parse("title: Q\nskip_logic: []\nrequird: true\n").unwrap();
        let warnings = YamlParser::validate_fields(&yaml, &["title", "required", "branching"], "question");

        assert_eq!(warnings.len(), 2);
        assert!(warnings.iter().any(|w| w.contains("'branching'")));
        assert!(warnings.iter().any(|w| w.contains("'required'")));
    }

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein_distance("kitten", "sitting"), 3);
        assert_eq!(levenshtein_distance("", "abc"), 3);
        assert_eq!(levenshtein_distance("same", "same"), 0);
    }
}
