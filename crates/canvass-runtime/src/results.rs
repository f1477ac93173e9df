//! Aggregated answers of a survey's submissions

use canvass_core::{Answers, SurveyDefinition};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Answer counts for one question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionTally {
    pub label: String,
    pub title: String,
    /// Count (or percentage) per distinct answer
    pub answers: BTreeMap<String, u32>,
}

impl QuestionTally {
    fn new(label: &str, title: &str) -> Self {
        Self {
            label: label.to_string(),
            title: title.to_string(),
            answers: BTreeMap::new(),
        }
    }

    /// Number of answers counted
    pub fn total(&self) -> u32 {
        self.answers.values().sum()
    }

    fn into_percentages(mut self) -> Self {
        let total = self.total();
        if total > 0 {
            for count in self.answers.values_mut() {
                *count = *count * 100 / total;
            }
        }
        self
    }
}

/// Results of a survey, one tally per answered question in survey order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyResults {
    pub survey: String,
    pub questions: Vec<QuestionTally>,
}

impl SurveyResults {
    /// Count the answers of every submission per question.
    ///
    /// Multiple choice answers are counted as one joined value
    /// (`"a, b"`). Empty answers, and answers to questions no longer in
    /// the survey, are ignored. With `as_percentage`, counts become whole percentages of
    /// the question's total, rounded down.
    pub fn tally<'a, I>(survey: &SurveyDefinition, submissions: I, as_percentage: bool) -> Self
    where
        I: IntoIterator<Item = &'a Answers>,
    {
        let mut tallies: Vec<QuestionTally> = survey
            .questions
            .iter()
            .map(|q| QuestionTally::new(&q.label, &q.title))
            .collect();

        for submission in submissions {
            for tally in &mut tallies {
                let Some(answer) = submission.get(&tally.label) else {
                    continue;
                };
                let value = answer.to_string();
                if value.trim().is_empty() {
                    continue;
                }
                *tally.answers.entry(value).or_insert(0) += 1;
            }
        }

        let questions = tallies
            .into_iter()
            .filter(|tally| !tally.answers.is_empty())
            .map(|tally| {
                if as_percentage {
                    tally.into_percentages()
                } else {
                    tally
                }
            })
            .collect();

        Self {
            survey: survey.slug.clone(),
            questions,
        }
    }

    /// Tally for the question titled `title`
    pub fn question(&self, title: &str) -> Option<&QuestionTally> {
        self.questions.iter().find(|tally| tally.title == title)
    }
}
