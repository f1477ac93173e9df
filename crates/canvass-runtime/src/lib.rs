//! Canvass Runtime - Pagination and segmentation engine
//!
//! This crate provides the two engines that sit behind a survey request:
//! - the skip-logic paginator, which splits a survey into pages and
//!   follows branching from the answers given
//! - the segment evaluator, which decides whether a visitor matches a
//!   segment's targeting rules
//!
//! plus authoring-time validation of survey and segment definitions and
//! aggregation of submitted results.

pub mod context;
pub mod error;
pub mod pagination;
pub mod results;
pub mod segment;
pub mod validation;

// Re-export main types
pub use context::{RuleContext, SessionVisitor, SubmissionLookup, SurveyCatalog, VisitorContext};
pub use error::{Result, RuntimeError};
pub use pagination::{Page, Redirect, SkipLogicPaginator};
pub use results::{QuestionTally, SurveyResults};
pub use segment::{
    evaluate, get_rule, index_rules_by_type, transform_into_boolean_list, BooleanItem,
    IndexedRules, SegmentEvaluator, TestUser,
};
pub use validation::{validate_combination, SkipLogicValidator, ValidationIssue, ValidationReport};
