//! Boolean evaluation of segment rule combinations

use super::index::{get_rule, index_rules_by_type, IndexedRules};
use super::rules::TestUser;
use crate::context::RuleContext;
use crate::error::{Result, RuntimeError};
use canvass_core::{CombinationBlock, LogicOperator, Segment};
use std::fmt;
use tracing::debug;

/// One element of a flattened combination
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BooleanItem {
    Bool(bool),
    Operator(LogicOperator),
    Nested(Vec<BooleanItem>),
}

impl BooleanItem {
    fn operand(&self) -> Result<bool> {
        match self {
            BooleanItem::Bool(value) => Ok(*value),
            BooleanItem::Nested(items) => evaluate(items),
            BooleanItem::Operator(op) => Err(RuntimeError::MalformedExpression(format!(
                "expected an operand, found '{}'",
                op
            ))),
        }
    }
}

impl From<bool> for BooleanItem {
    fn from(value: bool) -> Self {
        BooleanItem::Bool(value)
    }
}

impl From<LogicOperator> for BooleanItem {
    fn from(op: LogicOperator) -> Self {
        BooleanItem::Operator(op)
    }
}

impl fmt::Display for BooleanItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BooleanItem::Bool(value) => write!(f, "{}", value),
            BooleanItem::Operator(op) => write!(f, "{}", op),
            BooleanItem::Nested(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

/// Reduce `operand (operator operand)*` strictly left to right.
///
/// There is no operator precedence: `[false, and, true, or, true]` is
/// `(false and true) or true`. Nested lists are evaluated recursively
/// and a single-element list evaluates to its element.
pub fn evaluate(items: &[BooleanItem]) -> Result<bool> {
    let (first, rest) = items.split_first().ok_or_else(|| {
        RuntimeError::MalformedExpression("empty expression".to_string())
    })?;

    let mut acc = first.operand()?;
    let mut pairs = rest.chunks_exact(2);
    for pair in &mut pairs {
        let op = match &pair[0] {
            BooleanItem::Operator(op) => *op,
            other => {
                return Err(RuntimeError::MalformedExpression(format!(
                    "expected an operator, found '{}'",
                    other
                )))
            }
        };
        acc = op.apply(acc, pair[1].operand()?);
    }

    if !pairs.remainder().is_empty() {
        return Err(RuntimeError::MalformedExpression(
            "expression ends with an operator".to_string(),
        ));
    }

    Ok(acc)
}

/// Resolve every rule token in a combination body and test it against
/// the visitor, keeping operators and nesting in place.
pub fn transform_into_boolean_list(
    body: &[CombinationBlock],
    indexed: &IndexedRules<'_>,
    ctx: &RuleContext<'_>,
) -> Result<Vec<BooleanItem>> {
    let test = |token: &str| -> Result<BooleanItem> {
        get_rule(token, indexed)?.test_user(ctx).map(BooleanItem::Bool)
    };

    body.iter()
        .map(|block| match block {
            CombinationBlock::Rule(token) => test(token),
            CombinationBlock::Operator(op) => Ok(BooleanItem::Operator(*op)),
            CombinationBlock::NestedLogic(nested) => Ok(BooleanItem::Nested(vec![
                test(&nested.rule_1)?,
                BooleanItem::Operator(nested.operator),
                test(&nested.rule_2)?,
            ])),
        })
        .collect()
}

/// Decides whether a visitor belongs to a segment
#[derive(Debug, Clone, Copy, Default)]
pub struct SegmentEvaluator;

impl SegmentEvaluator {
    /// Create a new evaluator
    pub fn new() -> Self {
        Self
    }

    /// Test a visitor against a segment.
    ///
    /// A segment without rules matches nobody. When the segment has a
    /// combination rule its body decides the outcome; otherwise the
    /// atomic rules are combined with `all`, or `any` when `match_any`
    /// is set.
    pub fn test_segment(&self, segment: &Segment, ctx: &RuleContext<'_>) -> Result<bool> {
        if segment.rules.is_empty() {
            debug!(segment = %segment.name, "Segment has no rules");
            return Ok(false);
        }

        let matched = match segment.combination() {
            Some(combination) => {
                let indexed = index_rules_by_type(&segment.rules);
                let items = transform_into_boolean_list(&combination.body, &indexed, ctx)?;
                evaluate(&items)?
            }
            None => {
                let mut results = segment.atomic_rules().map(|rule| rule.test_user(ctx));
                if segment.match_any {
                    let mut any = false;
                    for result in results {
                        if result? {
                            any = true;
                            break;
                        }
                    }
                    any
                } else {
                    results.try_fold(true, |all, result| result.map(|matched| all && matched))?
                }
            }
        };

        debug!(segment = %segment.name, matched, "Segment tested");
        Ok(matched)
    }
}
