//! Runtime error types

use thiserror::Error;

/// Runtime error
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Page number is not an integer or is less than 1
    #[error("Invalid page: {0}")]
    InvalidPage(String),

    /// Page number is past the last page
    #[error("Page {requested} is past the last page ({num_pages})")]
    EmptyPage { requested: usize, num_pages: usize },

    /// Two questions share a label
    #[error("Duplicate question label: {0}")]
    DuplicateLabel(String),

    /// Questions are not in strictly increasing sort order
    #[error("Question '{label}' is out of order (sort_order {sort_order})")]
    UnorderedQuestions { label: String, sort_order: u32 },

    /// Answer to a branching question matches none of its branch rules
    #[error("Answer '{answer}' to question '{label}' matches no branch rule")]
    UnknownChoice { label: String, answer: String },

    /// Branch target names a question that does not exist
    #[error("Question '{label}' jumps to missing question {target}")]
    UnknownQuestion { label: String, target: u32 },

    /// Rule reference token could not be resolved
    #[error("Unknown rule reference: {0}")]
    UnknownRule(String),

    /// Rule reference token is not of the form `<TypeName>_<n>`
    #[error("Malformed rule reference: {0}")]
    InvalidRuleToken(String),

    /// Rule cannot be tested on its own
    #[error("Rule cannot be tested directly: {0}")]
    UnsupportedRule(String),

    /// Boolean list does not alternate operands and operators
    #[error("Malformed boolean expression: {0}")]
    MalformedExpression(String),

    /// Combination body does not follow the operand/operator pattern
    #[error("{0}")]
    InvalidCombination(String),

    /// Survey or segment definition failed authoring validation
    #[error("Invalid definition: {0}")]
    InvalidDefinition(String),

    /// Generic runtime error
    #[error("Runtime error: {0}")]
    RuntimeError(String),
}

/// Result type for runtime operations
pub type Result<T> = std::result::Result<T, RuntimeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_error_messages() {
        let err = RuntimeError::EmptyPage {
            requested: 7,
            num_pages: 3,
        };
        assert_eq!(err.to_string(), "Page 7 is past the last page (3)");

        let err = RuntimeError::InvalidPage("abc".to_string());
        assert!(err.to_string().contains("abc"));
    }

    #[test]
    fn test_unknown_choice_message() {
        let err = RuntimeError::UnknownChoice {
            label: "colour".to_string(),
            answer: "mauve".to_string(),
        };
        assert!(err.to_string().contains("mauve"));
        assert!(err.to_string().contains("colour"));
    }
}
