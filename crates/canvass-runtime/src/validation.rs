//! Authoring-time validation of survey and segment definitions
//!
//! The paginator and the segment evaluator treat broken definitions as
//! fatal. This module finds those problems up front and reports all of
//! them at once, so a definition file can be fixed in one pass.
//!
//! # Survey checks
//!
//! - question labels are unique and sort orders strictly increase
//! - skip logic only appears on checkbox, dropdown and radio questions
//! - a question with skip logic is required
//! - a checkbox with skip logic has exactly two rules (checked, unchecked)
//! - question jumps name an existing question other than the source, in
//!   the same segment as the source question
//! - survey jumps name another existing survey that has no segment or
//!   the same segment as this one
//!
//! # Segment checks
//!
//! - the combination body alternates operands and operators and every
//!   reference token resolves to a rule of the segment
//! - article tag windows are not inverted
//! - survey submission rules name an existing field, with a `"0"`/`"1"`
//!   expected response for checkbox fields

use crate::context::SurveyCatalog;
use crate::error::{Result, RuntimeError};
use crate::segment::rules::SubmissionMatch;
use crate::segment::{get_rule, index_rules_by_type};
use canvass_core::ast::{ArticleTagRule, SurveySubmissionRule};
use canvass_core::{BranchAction, CombinationBlock, FieldType, Question, Rule, Segment, SurveyDefinition};
use std::collections::HashSet;
use std::fmt;
use tracing::debug;

/// Message reported for any malformed combination body
pub const COMBINATION_PATTERN: &str =
    "Rule Combination must follow the <Rule/NestedLogic> <Operator> <Rule/NestedLogic> pattern.";

/// Check that a combination body follows
/// `operand (Operator operand)*` with at least one operator.
///
/// A single block is rejected as too short to be a combination. Every
/// violation produces the same [`COMBINATION_PATTERN`] error.
pub fn validate_combination(blocks: &[CombinationBlock]) -> Result<()> {
    let well_formed = blocks.len() >= 3
        && blocks.len() % 2 == 1
        && blocks
            .iter()
            .enumerate()
            .all(|(i, block)| block.is_operand() == (i % 2 == 0));

    if well_formed {
        Ok(())
    } else {
        Err(RuntimeError::InvalidCombination(
            COMBINATION_PATTERN.to_string(),
        ))
    }
}

/// One problem found in a definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Survey slug or segment name
    pub subject: String,
    /// Question label or rule field the issue is attached to
    pub field: Option<String>,
    pub message: String,
}

impl ValidationIssue {
    /// Create a new issue
    pub fn new(subject: impl Into<String>, field: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            field: field.map(str::to_string),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.field {
            Some(field) => write!(f, "{}.{}: {}", self.subject, field, self.message),
            None => write!(f, "{}: {}", self.subject, self.message),
        }
    }
}

/// All issues found while validating one or more definitions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// Create an empty report
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, issue: ValidationIssue) {
        self.issues.push(issue);
    }

    /// Append the issues of another report
    pub fn merge(&mut self, other: ValidationReport) {
        self.issues.extend(other.issues);
    }

    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    /// Messages attached to `field`
    pub fn messages_for(&self, field: &str) -> Vec<&str> {
        self.issues
            .iter()
            .filter(|issue| issue.field.as_deref() == Some(field))
            .map(|issue| issue.message.as_str())
            .collect()
    }

    /// `Ok` when no issue was found, otherwise every issue in one error
    pub fn into_result(self) -> Result<()> {
        if self.is_valid() {
            return Ok(());
        }
        let joined = self
            .issues
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        Err(RuntimeError::InvalidDefinition(joined))
    }
}

/// Validates skip logic and segment rules against a survey catalog
pub struct SkipLogicValidator<'a> {
    catalog: &'a dyn SurveyCatalog,
}

impl<'a> SkipLogicValidator<'a> {
    /// Create a new validator resolving survey references in `catalog`
    pub fn new(catalog: &'a dyn SurveyCatalog) -> Self {
        Self { catalog }
    }

    /// Validate the questions and skip logic of a survey
    pub fn validate_survey(&self, survey: &SurveyDefinition) -> ValidationReport {
        let mut report = ValidationReport::new();
        let mut issue = |field: Option<&str>, message: String| {
            report.push(ValidationIssue::new(&survey.slug, field, message));
        };

        let mut labels = HashSet::new();
        let mut last_sort_order: Option<u32> = None;
        for question in &survey.questions {
            if !labels.insert(question.label.as_str()) {
                issue(Some(&question.label), "Duplicate question label.".to_string());
            }
            if last_sort_order.is_some_and(|last| question.sort_order <= last) {
                issue(
                    Some(&question.label),
                    format!("Sort order {} is out of order.", question.sort_order),
                );
            }
            last_sort_order = Some(question.sort_order);
        }

        for question in &survey.questions {
            if question.branch_rules.is_empty() {
                continue;
            }
            for message in self.question_issues(survey, question) {
                issue(Some(&question.label), message);
            }
        }

        debug!(survey = %survey.slug, issues = report.issues.len(), "Survey validated");
        report
    }

    fn question_issues(&self, survey: &SurveyDefinition, question: &Question) -> Vec<String> {
        let mut messages = Vec::new();

        if !question.field_type.supports_branching() {
            messages.push(format!(
                "Skip logic is not available on {} questions.",
                question.field_type
            ));
        }
        if !question.required {
            messages.push("A question with skip logic must be required.".to_string());
        }
        if question.field_type == FieldType::Checkbox && question.branch_rules.len() != 2 {
            messages.push(
                "A checkbox question needs exactly two skip logic rules, for checked and unchecked."
                    .to_string(),
            );
        }

        for rule in &question.branch_rules {
            match &rule.action {
                BranchAction::JumpToQuestion { question: target } => {
                    let linked = rule
                        .action
                        .target_sort_order()
                        .and_then(|sort_order| survey.question_by_sort_order(sort_order));
                    match linked {
                        None => messages.push(format!(
                            "Choice '{}' skips to question {} which does not exist.",
                            rule.choice, target
                        )),
                        Some(linked) if linked.label == question.label => messages.push(format!(
                            "Choice '{}' cannot skip to its own question.",
                            rule.choice
                        )),
                        Some(linked) if linked.segment != question.segment => messages
                            .push("Cannot link to a question with a different segment".to_string()),
                        Some(_) => {}
                    }
                }
                BranchAction::JumpToSurvey { survey: slug } => {
                    if *slug == survey.slug {
                        messages.push(
                            "Cannot skip to self, please select a different survey.".to_string(),
                        );
                        continue;
                    }
                    match self.catalog.survey(slug) {
                        None => messages.push(format!(
                            "Choice '{}' skips to survey '{}' which does not exist.",
                            rule.choice, slug
                        )),
                        Some(linked) => {
                            if linked.segment.is_some() && linked.segment != survey.segment {
                                messages.push(
                                    "Cannot select a survey with a different segment".to_string(),
                                );
                            }
                        }
                    }
                }
                BranchAction::Continue | BranchAction::End => {}
            }
        }

        messages
    }

    /// Validate the rules of a segment
    pub fn validate_segment(&self, segment: &Segment) -> ValidationReport {
        let mut report = ValidationReport::new();

        let combinations: Vec<_> = segment
            .rules
            .iter()
            .filter_map(|rule| match rule {
                Rule::Combination(combination) => Some(combination),
                _ => None,
            })
            .collect();
        if combinations.len() > 1 {
            report.push(ValidationIssue::new(
                &segment.name,
                None,
                "Only one rule combination is allowed per segment.",
            ));
        }

        if let Some(combination) = combinations.first() {
            match validate_combination(&combination.body) {
                Ok(()) => {
                    let indexed = index_rules_by_type(&segment.rules);
                    for token in combination.body.iter().flat_map(tokens) {
                        if let Err(err) = get_rule(token, &indexed) {
                            report.push(ValidationIssue::new(
                                &segment.name,
                                Some(token),
                                err.to_string(),
                            ));
                        }
                    }
                }
                Err(err) => {
                    report.push(ValidationIssue::new(&segment.name, None, err.to_string()))
                }
            }
        }

        for rule in &segment.rules {
            let message = match rule {
                Rule::ArticleTag(rule) => check_tag_window(rule).err(),
                Rule::SurveySubmission(rule) => self.check_submission_rule(rule).err(),
                _ => None,
            };
            if let Some(message) = message {
                report.push(ValidationIssue::new(
                    &segment.name,
                    Some(rule.kind().type_name()),
                    message,
                ));
            }
        }

        debug!(segment = %segment.name, issues = report.issues.len(), "Segment validated");
        report
    }

    fn check_submission_rule(&self, rule: &SurveySubmissionRule) -> std::result::Result<(), String> {
        let survey = self
            .catalog
            .survey(&rule.survey)
            .ok_or_else(|| format!("Survey '{}' does not exist.", rule.survey))?;

        let question = survey.question(&rule.field_name).ok_or_else(|| {
            let labels: Vec<&str> = survey.questions.iter().map(|q| q.label.as_str()).collect();
            format!(
                "You need to choose valid field name out of: \"{}\".",
                labels.join("\", \"")
            )
        })?;

        if rule.expected_value(question.field_type).is_none() {
            return Err("Please use \"0\" or \"1\" on this field.".to_string());
        }
        Ok(())
    }
}

fn check_tag_window(rule: &ArticleTagRule) -> std::result::Result<(), String> {
    match (rule.date_from, rule.date_to) {
        (Some(from), Some(to)) if from > to => Err("Date from must be before date to.".to_string()),
        _ => Ok(()),
    }
}

fn tokens(block: &CombinationBlock) -> Vec<&str> {
    match block {
        CombinationBlock::Rule(token) => vec![token.as_str()],
        CombinationBlock::NestedLogic(nested) => vec![nested.rule_1.as_str(), nested.rule_2.as_str()],
        CombinationBlock::Operator(_) => Vec::new(),
    }
}
