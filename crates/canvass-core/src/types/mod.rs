//! Type definitions for answers and form fields

pub mod answer;
pub mod field;

pub use answer::{AnswerValue, Answers};
pub use field::FieldType;
