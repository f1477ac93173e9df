//! Canvass Core - Core types and definitions for the Canvass survey engine
//!
//! This crate provides the fundamental types used across the Canvass crates:
//! - Answer values and answer maps
//! - Form field types
//! - Survey definitions (questions and their branching rules)
//! - Segment definitions (targeting rules and rule combinations)
//! - Error types

pub mod ast;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use ast::{
    BranchAction, BranchKind, BranchRule, CombinationBlock, LogicOperator, Question, Rule,
    RuleKind, Segment, SurveyDefinition,
};
pub use error::CoreError;
pub use types::{AnswerValue, Answers, FieldType};
