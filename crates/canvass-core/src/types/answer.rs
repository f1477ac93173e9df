//! Submitted answer values
//!
//! An [`Answers`] map is keyed by question label and holds whatever the
//! form submitted for that question: free text, the selected options of a
//! multiple-choice field, or a boolean.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A single submitted answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    /// Boolean value (already-cleaned checkbox data)
    Bool(bool),
    /// Free text or a single selected choice
    Text(String),
    /// Selected options of a multiple-choice field
    List(Vec<String>),
}

impl AnswerValue {
    /// Returns true for answers that carry no information
    /// (empty text, no selected options, or `false`)
    pub fn is_blank(&self) -> bool {
        match self {
            AnswerValue::Bool(b) => !b,
            AnswerValue::Text(s) => s.trim().is_empty(),
            AnswerValue::List(items) => items.is_empty(),
        }
    }

    /// Normalised choice string used to look an answer up in a choice list.
    ///
    /// A one-element list is treated as its single element.
    pub fn as_choice(&self) -> Option<&str> {
        match self {
            AnswerValue::Text(s) => Some(s.trim()),
            AnswerValue::List(items) if items.len() == 1 => Some(items[0].trim()),
            _ => None,
        }
    }

    /// Get the text value, if any
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AnswerValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Get the list value, if any
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            AnswerValue::List(items) => Some(items),
            _ => None,
        }
    }
}

impl fmt::Display for AnswerValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnswerValue::Bool(b) => write!(f, "{}", b),
            AnswerValue::Text(s) => write!(f, "{}", s),
            AnswerValue::List(items) => write!(f, "{}", items.join(", ")),
        }
    }
}

impl From<&str> for AnswerValue {
    fn from(value: &str) -> Self {
        AnswerValue::Text(value.to_string())
    }
}

impl From<String> for AnswerValue {
    fn from(value: String) -> Self {
        AnswerValue::Text(value)
    }
}

impl From<bool> for AnswerValue {
    fn from(value: bool) -> Self {
        AnswerValue::Bool(value)
    }
}

impl From<Vec<String>> for AnswerValue {
    fn from(value: Vec<String>) -> Self {
        AnswerValue::List(value)
    }
}

impl From<Vec<&str>> for AnswerValue {
    fn from(value: Vec<&str>) -> Self {
        AnswerValue::List(value.into_iter().map(str::to_string).collect())
    }
}

/// Question label -> submitted answer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Answers(HashMap<String, AnswerValue>);

impl Answers {
    /// Create an empty answer map
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    /// Builder-style insert
    pub fn with(mut self, label: impl Into<String>, value: impl Into<AnswerValue>) -> Self {
        self.insert(label, value);
        self
    }

    pub fn insert(&mut self, label: impl Into<String>, value: impl Into<AnswerValue>) {
        self.0.insert(label.into(), value.into());
    }

    pub fn get(&self, label: &str) -> Option<&AnswerValue> {
        self.0.get(label)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.0.contains_key(label)
    }

    pub fn remove(&mut self, label: &str) -> Option<AnswerValue> {
        self.0.remove(label)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AnswerValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Copy every entry of `other` into this map, overwriting existing labels
    pub fn extend(&mut self, other: &Answers) {
        for (label, value) in &other.0 {
            self.0.insert(label.clone(), value.clone());
        }
    }

    /// Return a new map holding this map's entries overlaid with `other`
    pub fn merged_with(&self, other: &Answers) -> Answers {
        let mut merged = self.clone();
        merged.extend(other);
        merged
    }

    /// Serialize for storage in a session
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Restore from session storage
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl<K, V> FromIterator<(K, V)> for Answers
where
    K: Into<String>,
    V: Into<AnswerValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
