//! Testing atomic rules against a visitor

use crate::context::{RuleContext, SubmissionLookup};
use crate::error::{Result, RuntimeError};
use canvass_core::ast::{
    ArticleTagRule, GroupMembershipRule, LoggedInRule, MatchOperator, SurveySubmissionRule,
};
use canvass_core::{AnswerValue, FieldType, Rule};
use std::collections::HashSet;
use tracing::debug;

/// Predicate over the visitor of a request
pub trait TestUser {
    fn test_user(&self, ctx: &RuleContext<'_>) -> Result<bool>;
}

impl TestUser for Rule {
    fn test_user(&self, ctx: &RuleContext<'_>) -> Result<bool> {
        let matched = match self {
            Rule::LoggedIn(rule) => rule.test_user(ctx)?,
            Rule::GroupMembership(rule) => rule.test_user(ctx)?,
            Rule::ArticleTag(rule) => rule.test_user(ctx)?,
            Rule::SurveySubmission(rule) => rule.test_user(ctx)?,
            Rule::Combination(_) => {
                return Err(RuntimeError::UnsupportedRule(
                    self.kind().type_name().to_string(),
                ))
            }
        };
        debug!(rule = %self.kind(), matched, "Rule tested");
        Ok(matched)
    }
}

impl TestUser for LoggedInRule {
    fn test_user(&self, ctx: &RuleContext<'_>) -> Result<bool> {
        Ok(ctx.visitor.is_authenticated() == self.is_logged_in)
    }
}

impl TestUser for GroupMembershipRule {
    fn test_user(&self, ctx: &RuleContext<'_>) -> Result<bool> {
        Ok(ctx.visitor.is_authenticated() && ctx.visitor.is_member_of(&self.group))
    }
}

impl TestUser for ArticleTagRule {
    fn test_user(&self, ctx: &RuleContext<'_>) -> Result<bool> {
        let visits = ctx
            .visitor
            .tag_visit_count(&self.tag, self.date_from, self.date_to);
        Ok(self.operator.compare(visits, self.count))
    }
}

/// Expected response converted for the field it is compared with
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ExpectedResponse {
    Choices(HashSet<String>),
    Flag(bool),
    Text(String),
}

/// Comparison of a stored submission against a submission rule
pub(crate) trait SubmissionMatch {
    /// Convert the expected response according to the field type.
    ///
    /// Checkbox groups take a comma separated list, a single checkbox
    /// takes "0" or "1". Returns `None` when the value cannot be
    /// converted.
    fn expected_value(&self, field_type: FieldType) -> Option<ExpectedResponse>;

    fn matches(&self, expected: &ExpectedResponse, response: &AnswerValue) -> bool;
}

impl SubmissionMatch for SurveySubmissionRule {
    fn expected_value(&self, field_type: FieldType) -> Option<ExpectedResponse> {
        let expected = self.expected_response.trim();
        match field_type {
            FieldType::Checkboxes => Some(ExpectedResponse::Choices(
                expected
                    .split(',')
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(str::to_string)
                    .collect(),
            )),
            FieldType::Checkbox => match expected {
                "0" => Some(ExpectedResponse::Flag(false)),
                "1" => Some(ExpectedResponse::Flag(true)),
                _ => None,
            },
            _ => Some(ExpectedResponse::Text(expected.to_string())),
        }
    }

    fn matches(&self, expected: &ExpectedResponse, response: &AnswerValue) -> bool {
        match (expected, response) {
            (ExpectedResponse::Choices(expected), AnswerValue::List(given)) => {
                let given: HashSet<&str> = given.iter().map(String::as_str).collect();
                match self.operator {
                    MatchOperator::Contains => expected.iter().all(|v| given.contains(v.as_str())),
                    MatchOperator::Equals => {
                        expected.len() == given.len()
                            && expected.iter().all(|v| given.contains(v.as_str()))
                    }
                }
            }
            (ExpectedResponse::Text(expected), AnswerValue::Text(given)) => {
                let expected = expected.to_lowercase();
                let given = given.to_lowercase();
                match self.operator {
                    MatchOperator::Contains => given.contains(&expected),
                    MatchOperator::Equals => given == expected,
                }
            }
            (ExpectedResponse::Flag(expected), AnswerValue::Bool(given)) => expected == given,
            (ExpectedResponse::Flag(expected), AnswerValue::Text(token)) => match token.as_str() {
                "on" => *expected,
                "off" => !*expected,
                _ => false,
            },
            _ => false,
        }
    }
}

impl TestUser for SurveySubmissionRule {
    fn test_user(&self, ctx: &RuleContext<'_>) -> Result<bool> {
        if !ctx.visitor.is_authenticated() {
            return Ok(false);
        }

        let submission = match ctx.visitor.submission(&self.survey) {
            SubmissionLookup::Found(answers) => answers,
            SubmissionLookup::Missing | SubmissionLookup::Multiple => return Ok(false),
        };

        let Some(response) = submission.get(&self.field_name) else {
            return Ok(false);
        };
        if response.is_blank() {
            return Ok(false);
        }

        // the field may have been removed since the rule was written
        let Some(field_type) = ctx.catalog.field_type(&self.survey, &self.field_name) else {
            return Ok(false);
        };
        let Some(expected) = self.expected_value(field_type) else {
            return Ok(false);
        };

        Ok(self.matches(&expected, response))
    }
}
