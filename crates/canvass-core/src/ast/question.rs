//! Survey questions

use crate::ast::branch::{BranchAction, BranchKind, BranchRule};
use crate::types::{AnswerValue, FieldType};
use serde::{Deserialize, Serialize};

/// A single question of a survey
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Stable identifier, used as the key into answer maps
    pub label: String,

    /// Text shown to the user
    pub title: String,

    /// Position in the authored order
    pub sort_order: u32,

    pub field_type: FieldType,

    #[serde(default)]
    pub required: bool,

    /// Force a page boundary right after this question
    #[serde(default)]
    pub page_break: bool,

    #[serde(default)]
    pub choices: Vec<String>,

    /// One rule per choice, in choice order
    #[serde(default)]
    pub branch_rules: Vec<BranchRule>,

    /// Segment a visitor must match for this question to apply
    #[serde(default)]
    pub segment: Option<String>,
}

impl Question {
    /// Create a new question; the label is derived from the title
    pub fn new(title: impl Into<String>, field_type: FieldType, sort_order: u32) -> Self {
        let title = title.into();
        Self {
            label: clean_name(&title),
            title,
            sort_order,
            field_type,
            required: false,
            page_break: false,
            choices: Vec::new(),
            branch_rules: Vec::new(),
            segment: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn with_page_break(mut self, page_break: bool) -> Self {
        self.page_break = page_break;
        self
    }

    pub fn with_choices<I, S>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.choices = choices.into_iter().map(Into::into).collect();
        self
    }

    /// Attach branching rules. The choice list is rebuilt from the rules
    /// so both stay index-aligned.
    pub fn with_branching(mut self, rules: Vec<BranchRule>) -> Self {
        if self.field_type != FieldType::Checkbox {
            self.choices = rules.iter().map(|r| r.choice.clone()).collect();
        }
        self.branch_rules = rules;
        self
    }

    pub fn with_segment(mut self, segment: impl Into<String>) -> Self {
        self.segment = Some(segment.into());
        self
    }

    /// True iff any choice does something other than continue
    pub fn has_branching(&self) -> bool {
        self.field_type.supports_branching()
            && self
                .branch_rules
                .iter()
                .any(|rule| rule.action != BranchAction::Continue)
    }

    /// Position of the answer among this question's choices.
    ///
    /// A boolean checkbox maps `on`/`true` to 0 and `off`/`false` to 1.
    pub fn choice_index(&self, answer: &AnswerValue) -> Option<usize> {
        if self.field_type == FieldType::Checkbox {
            return match answer {
                AnswerValue::Text(token) => match token.trim() {
                    "on" => Some(0),
                    "off" => Some(1),
                    _ => None,
                },
                AnswerValue::Bool(true) => Some(0),
                AnswerValue::Bool(false) => Some(1),
                AnswerValue::List(_) => None,
            };
        }

        let choice = answer.as_choice()?;
        self.choices.iter().position(|c| c.trim() == choice)
    }

    /// Branch action selected by the answer
    pub fn branch_action(&self, answer: &AnswerValue) -> Option<&BranchAction> {
        let index = self.choice_index(answer)?;
        self.branch_rules.get(index).map(|rule| &rule.action)
    }

    /// Returns true if the answer selects an action of one of the given kinds
    pub fn is_next_action(&self, answer: &AnswerValue, kinds: &[BranchKind]) -> bool {
        self.branch_action(answer)
            .map(|action| kinds.contains(&action.kind()))
            .unwrap_or(false)
    }

    /// Returns true if `answer` is a value this question can take.
    ///
    /// Choice fields only take their listed choices, and a checkbox only
    /// takes its on/off tokens. A blank answer is accepted unless the
    /// question branches on it; whether it is required is checked
    /// elsewhere.
    pub fn accepts(&self, answer: &AnswerValue) -> bool {
        if self.field_type == FieldType::Checkbox {
            return self.choice_index(answer).is_some();
        }
        if answer.is_blank() {
            return !self.has_branching();
        }
        if !self.field_type.has_choices() || self.choices.is_empty() {
            return true;
        }

        let listed = |value: &str| self.choices.iter().any(|c| c.trim() == value.trim());
        match answer {
            AnswerValue::List(items) if self.field_type.is_multiple_choice() => {
                items.iter().all(|item| listed(item.as_str()))
            }
            _ => answer.as_choice().map_or(false, listed),
        }
    }
}

/// Derive a question label from its title.
///
/// Lowercases, drops punctuation, and collapses whitespace and hyphens
/// into single hyphens.
pub fn clean_name(title: &str) -> String {
    let kept: String = title
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == '-' || *c == '_')
        .collect::<String>()
        .trim()
        .to_lowercase();

    let mut label = String::with_capacity(kept.len());
    let mut in_separator = false;
    for c in kept.chars() {
        if c.is_whitespace() || c == '-' {
            if !in_separator {
                label.push('-');
                in_separator = true;
            }
        } else {
            label.push(c);
            in_separator = false;
        }
    }
    label
}
