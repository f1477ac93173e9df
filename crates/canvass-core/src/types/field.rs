//! Form field types

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of form field backing a question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Singleline,
    Multiline,
    Email,
    Number,
    Url,
    /// Single boolean checkbox
    Checkbox,
    /// Checkbox group (multiple choice)
    Checkboxes,
    Dropdown,
    Radio,
    Date,
    Datetime,
    PositiveNumber,
}

impl FieldType {
    /// Field types whose answers may carry branching rules
    pub fn supports_branching(&self) -> bool {
        matches!(
            self,
            FieldType::Checkbox | FieldType::Dropdown | FieldType::Radio
        )
    }

    /// Browsers submit nothing at all for an unticked checkbox, so these
    /// fields may be missing from an otherwise complete submission
    pub fn omits_when_blank(&self) -> bool {
        matches!(self, FieldType::Checkbox | FieldType::Checkboxes)
    }

    /// Returns true if answers are a list of selected options
    pub fn is_multiple_choice(&self) -> bool {
        matches!(self, FieldType::Checkboxes)
    }

    /// Returns true if the field offers a fixed set of choices
    pub fn has_choices(&self) -> bool {
        matches!(
            self,
            FieldType::Checkboxes | FieldType::Dropdown | FieldType::Radio
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Singleline => "singleline",
            FieldType::Multiline => "multiline",
            FieldType::Email => "email",
            FieldType::Number => "number",
            FieldType::Url => "url",
            FieldType::Checkbox => "checkbox",
            FieldType::Checkboxes => "checkboxes",
            FieldType::Dropdown => "dropdown",
            FieldType::Radio => "radio",
            FieldType::Date => "date",
            FieldType::Datetime => "datetime",
            FieldType::PositiveNumber => "positive_number",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "singleline" => Ok(FieldType::Singleline),
            "multiline" => Ok(FieldType::Multiline),
            "email" => Ok(FieldType::Email),
            "number" => Ok(FieldType::Number),
            "url" => Ok(FieldType::Url),
            "checkbox" => Ok(FieldType::Checkbox),
            "checkboxes" => Ok(FieldType::Checkboxes),
            "dropdown" => Ok(FieldType::Dropdown),
            "radio" => Ok(FieldType::Radio),
            "date" => Ok(FieldType::Date),
            "datetime" => Ok(FieldType::Datetime),
            "positive_number" => Ok(FieldType::PositiveNumber),
            other => Err(CoreError::UnknownFieldType(other.to_string())),
        }
    }
}
