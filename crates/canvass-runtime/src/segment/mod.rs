//! Segment evaluation
//!
//! Atomic rules are tested against the visitor. A segment's combination
//! rule, if any, is flattened into a list of booleans and operators and
//! reduced strictly left to right.

pub mod evaluator;
pub mod index;
pub mod rules;

pub use evaluator::{evaluate, transform_into_boolean_list, BooleanItem, SegmentEvaluator};
pub use index::{get_rule, index_rules_by_type, IndexedRules};
pub use rules::TestUser;
