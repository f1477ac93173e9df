//! Segments and their targeting rules
//!
//! A segment holds a list of atomic rules. If it also holds a
//! [`CombinationRule`], the combination's block body decides how the
//! atomic rules are joined; otherwise they are combined with all/any
//! according to `match_any`.
//!
//! Combination bodies reference atomic rules by token, `<TypeName>_<n>`,
//! where `n` is the position of the rule among the segment's rules of
//! that type.

use crate::error::CoreError;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Boolean connective used by rule combinations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicOperator {
    And,
    Or,
}

impl LogicOperator {
    pub fn apply(&self, left: bool, right: bool) -> bool {
        match self {
            LogicOperator::And => left && right,
            LogicOperator::Or => left || right,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogicOperator::And => "and",
            LogicOperator::Or => "or",
        }
    }
}

impl fmt::Display for LogicOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogicOperator {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "and" => Ok(LogicOperator::And),
            "or" => Ok(LogicOperator::Or),
            other => Err(CoreError::UnknownOperator(other.to_string())),
        }
    }
}

/// Comparison for visit counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountOperator {
    Eq,
    Gt,
    Lt,
}

impl CountOperator {
    pub fn compare(&self, actual: u32, expected: u32) -> bool {
        match self {
            CountOperator::Eq => actual == expected,
            CountOperator::Gt => actual > expected,
            CountOperator::Lt => actual < expected,
        }
    }
}

impl Default for CountOperator {
    fn default() -> Self {
        CountOperator::Eq
    }
}

/// Comparison for stored survey answers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchOperator {
    #[serde(rename = "eq")]
    Equals,
    #[serde(rename = "in")]
    Contains,
}

impl Default for MatchOperator {
    fn default() -> Self {
        MatchOperator::Contains
    }
}

/// Matches on authentication state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggedInRule {
    pub is_logged_in: bool,
}

/// Matches authenticated members of a group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMembershipRule {
    pub group: String,
}

/// Matches on how many distinct articles with a tag were visited
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleTagRule {
    pub tag: String,
    #[serde(default)]
    pub operator: CountOperator,
    pub count: u32,
    /// Inclusive lower bound (UTC); open when absent
    #[serde(default)]
    pub date_from: Option<NaiveDateTime>,
    /// Inclusive upper bound (UTC); open when absent
    #[serde(default)]
    pub date_to: Option<NaiveDateTime>,
}

/// Matches on the visitor's stored answer to a survey question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveySubmissionRule {
    /// Slug of the survey the answer belongs to
    pub survey: String,
    /// Label of the question
    pub field_name: String,
    /// Expected answer; comma separated for checkbox groups,
    /// "0" or "1" for a single checkbox
    pub expected_response: String,
    #[serde(default)]
    pub operator: MatchOperator,
}

/// Compound expression over the segment's other rules
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombinationRule {
    pub body: Vec<CombinationBlock>,
}

/// `rule_1 operator rule_2`, evaluated as one operand
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NestedLogic {
    pub rule_1: String,
    pub operator: LogicOperator,
    pub rule_2: String,
}

/// One block of a combination body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum CombinationBlock {
    /// Reference token, e.g. `GroupMembershipRule_0`
    Rule(String),
    Operator(LogicOperator),
    NestedLogic(NestedLogic),
}

impl CombinationBlock {
    pub fn rule(token: impl Into<String>) -> Self {
        CombinationBlock::Rule(token.into())
    }

    pub fn nested(rule_1: impl Into<String>, operator: LogicOperator, rule_2: impl Into<String>) -> Self {
        CombinationBlock::NestedLogic(NestedLogic {
            rule_1: rule_1.into(),
            operator,
            rule_2: rule_2.into(),
        })
    }

    /// Rule and NestedLogic blocks are operands
    pub fn is_operand(&self) -> bool {
        !matches!(self, CombinationBlock::Operator(_))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            CombinationBlock::Rule(_) => "Rule",
            CombinationBlock::Operator(_) => "Operator",
            CombinationBlock::NestedLogic(_) => "NestedLogic",
        }
    }
}

/// Targeting rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Rule {
    LoggedIn(LoggedInRule),
    GroupMembership(GroupMembershipRule),
    ArticleTag(ArticleTagRule),
    SurveySubmission(SurveySubmissionRule),
    Combination(CombinationRule),
}

impl Rule {
    pub fn kind(&self) -> RuleKind {
        match self {
            Rule::LoggedIn(_) => RuleKind::LoggedIn,
            Rule::GroupMembership(_) => RuleKind::GroupMembership,
            Rule::ArticleTag(_) => RuleKind::ArticleTag,
            Rule::SurveySubmission(_) => RuleKind::SurveySubmission,
            Rule::Combination(_) => RuleKind::Combination,
        }
    }

    pub fn logged_in(is_logged_in: bool) -> Self {
        Rule::LoggedIn(LoggedInRule { is_logged_in })
    }

    pub fn group(group: impl Into<String>) -> Self {
        Rule::GroupMembership(GroupMembershipRule {
            group: group.into(),
        })
    }

    pub fn combination(body: Vec<CombinationBlock>) -> Self {
        Rule::Combination(CombinationRule { body })
    }
}

/// Discriminant of [`Rule`], named by the type names used in
/// combination tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RuleKind {
    LoggedIn,
    GroupMembership,
    ArticleTag,
    SurveySubmission,
    Combination,
}

impl RuleKind {
    /// Every rule kind, in display order
    pub const REGISTRY: [RuleKind; 5] = [
        RuleKind::LoggedIn,
        RuleKind::GroupMembership,
        RuleKind::ArticleTag,
        RuleKind::SurveySubmission,
        RuleKind::Combination,
    ];

    /// Name used in combination tokens
    pub fn type_name(&self) -> &'static str {
        match self {
            RuleKind::LoggedIn => "UserIsLoggedInRule",
            RuleKind::GroupMembership => "GroupMembershipRule",
            RuleKind::ArticleTag => "ArticleTagRule",
            RuleKind::SurveySubmission => "SurveySubmissionDataRule",
            RuleKind::Combination => "CombinationRule",
        }
    }

    /// Human readable name
    pub fn verbose_name(&self) -> &'static str {
        match self {
            RuleKind::LoggedIn => "Logged in",
            RuleKind::GroupMembership => "Group membership rule",
            RuleKind::ArticleTag => "Article tag rule",
            RuleKind::SurveySubmission => "Survey submission rule",
            RuleKind::Combination => "Rule combination",
        }
    }

    /// Position in [`RuleKind::REGISTRY`]
    pub fn display_order(&self) -> usize {
        Self::REGISTRY
            .iter()
            .position(|kind| kind == self)
            .unwrap_or(Self::REGISTRY.len())
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

impl FromStr for RuleKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::REGISTRY
            .iter()
            .copied()
            .find(|kind| kind.type_name() == s)
            .ok_or_else(|| CoreError::UnknownRuleType(s.to_string()))
    }
}

/// A named audience defined by targeting rules
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub name: String,

    /// Match when any (rather than all) of the rules pass
    #[serde(default)]
    pub match_any: bool,

    pub rules: Vec<Rule>,
}

impl Segment {
    /// Create a new segment with no rules
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            match_any: false,
            rules: Vec::new(),
        }
    }

    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn with_match_any(mut self, match_any: bool) -> Self {
        self.match_any = match_any;
        self
    }

    /// The segment's combination rule, if it has one
    pub fn combination(&self) -> Option<&CombinationRule> {
        self.rules.iter().find_map(|rule| match rule {
            Rule::Combination(combination) => Some(combination),
            _ => None,
        })
    }

    /// Rules other than the combination
    pub fn atomic_rules(&self) -> impl Iterator<Item = &Rule> {
        self.rules
            .iter()
            .filter(|rule| rule.kind() != RuleKind::Combination)
    }
}
