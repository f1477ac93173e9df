//! Error types for Canvass Core

use thiserror::Error;

/// Core error type
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Unknown field type: {0}")]
    UnknownFieldType(String),

    #[error("Unknown rule type: {0}")]
    UnknownRuleType(String),

    #[error("Unknown operator: {0}")]
    UnknownOperator(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
