//! Definitions of surveys and segments
//!
//! These are the structures produced by the YAML parser and consumed by
//! the runtime.

pub mod branch;
pub mod question;
pub mod segment;
pub mod survey;

pub use branch::{BranchAction, BranchKind, BranchRule};
pub use question::{clean_name, Question};
pub use segment::{
    ArticleTagRule, CombinationBlock, CombinationRule, CountOperator, GroupMembershipRule,
    LoggedInRule, LogicOperator, MatchOperator, NestedLogic, Rule, RuleKind, Segment,
    SurveySubmissionRule,
};
pub use survey::SurveyDefinition;
