//! Survey definitions

use crate::ast::question::Question;
use serde::{Deserialize, Serialize};

/// A survey: an ordered list of questions plus display metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyDefinition {
    pub slug: String,
    pub title: String,

    /// Segment a visitor must match to see this survey
    #[serde(default)]
    pub segment: Option<String>,

    #[serde(default)]
    pub thank_you_text: Option<String>,

    pub questions: Vec<Question>,
}

impl SurveyDefinition {
    /// Create a new, empty survey
    pub fn new(slug: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            title: title.into(),
            segment: None,
            thank_you_text: None,
            questions: Vec::new(),
        }
    }

    pub fn with_question(mut self, question: Question) -> Self {
        self.questions.push(question);
        self
    }

    pub fn with_segment(mut self, segment: impl Into<String>) -> Self {
        self.segment = Some(segment.into());
        self
    }

    pub fn with_thank_you_text(mut self, text: impl Into<String>) -> Self {
        self.thank_you_text = Some(text.into());
        self
    }

    /// Sort questions by `sort_order`
    pub fn sort_questions(&mut self) {
        self.questions.sort_by_key(|q| q.sort_order);
    }

    pub fn question(&self, label: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.label == label)
    }

    pub fn question_by_sort_order(&self, sort_order: u32) -> Option<&Question> {
        self.questions.iter().find(|q| q.sort_order == sort_order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FieldType;

    #[test]
    fn test_sort_and_lookup() {
        let mut survey = SurveyDefinition::new("feedback", "Feedback")
            .with_question(Question::new("Second", FieldType::Singleline, 5))
            .with_question(Question::new("First", FieldType::Singleline, 1));

        survey.sort_questions();
        assert_eq!(survey.questions[0].label, "first");
        assert_eq!(survey.question("second").map(|q| q.sort_order), Some(5));
        assert!(survey.question_by_sort_order(1).is_some());
        assert!(survey.question_by_sort_order(2).is_none());
    }
}
