//! Branching ("skip logic") attached to answer choices

use serde::{Deserialize, Serialize};

/// What happens after a choice is selected.
///
/// `JumpToQuestion` stores the target question's `sort_order + 1`, the same
/// 1-based form survey definitions are authored in. Use
/// [`BranchAction::jump_to`] and [`BranchAction::target_sort_order`] rather
/// than doing the arithmetic by hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum BranchAction {
    /// Continue with the next question in order
    #[serde(rename = "next")]
    Continue,
    /// End the survey
    End,
    /// Jump to another question of the same survey
    #[serde(rename = "question")]
    JumpToQuestion { question: u32 },
    /// Leave this survey for another one
    #[serde(rename = "survey")]
    JumpToSurvey { survey: String },
}

impl BranchAction {
    /// Jump to the question with the given (0-based) sort order
    pub fn jump_to(sort_order: u32) -> Self {
        BranchAction::JumpToQuestion {
            question: sort_order + 1,
        }
    }

    /// Jump to another survey
    pub fn jump_to_survey(slug: impl Into<String>) -> Self {
        BranchAction::JumpToSurvey {
            survey: slug.into(),
        }
    }

    /// Sort order of the target question for `JumpToQuestion`.
    ///
    /// Returns `None` for other actions and for a stored target of 0, which
    /// cannot name any question.
    pub fn target_sort_order(&self) -> Option<u32> {
        match self {
            BranchAction::JumpToQuestion { question } => question.checked_sub(1),
            _ => None,
        }
    }

    /// Target survey slug for `JumpToSurvey`
    pub fn target_survey(&self) -> Option<&str> {
        match self {
            BranchAction::JumpToSurvey { survey } => Some(survey),
            _ => None,
        }
    }

    pub fn kind(&self) -> BranchKind {
        match self {
            BranchAction::Continue => BranchKind::Continue,
            BranchAction::End => BranchKind::End,
            BranchAction::JumpToQuestion { .. } => BranchKind::Question,
            BranchAction::JumpToSurvey { .. } => BranchKind::Survey,
        }
    }

    /// Returns true if the survey stops after this action
    pub fn is_terminal(&self) -> bool {
        matches!(self.kind(), BranchKind::End | BranchKind::Survey)
    }
}

impl Default for BranchAction {
    fn default() -> Self {
        BranchAction::Continue
    }
}

/// Payload-free discriminant of [`BranchAction`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BranchKind {
    Continue,
    End,
    Question,
    Survey,
}

impl BranchKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BranchKind::Continue => "next",
            BranchKind::End => "end",
            BranchKind::Question => "question",
            BranchKind::Survey => "survey",
        }
    }
}

/// Branching rule for one answer choice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchRule {
    pub choice: String,
    #[serde(flatten)]
    pub action: BranchAction,
}

impl BranchRule {
    /// Create a new branch rule
    pub fn new(choice: impl Into<String>, action: BranchAction) -> Self {
        Self {
            choice: choice.into(),
            action,
        }
    }

    /// Choice that continues with the next question
    pub fn next(choice: impl Into<String>) -> Self {
        Self::new(choice, BranchAction::Continue)
    }

    /// Choice that ends the survey
    pub fn end(choice: impl Into<String>) -> Self {
        Self::new(choice, BranchAction::End)
    }

    /// Choice that jumps to the question with the given sort order
    pub fn question(choice: impl Into<String>, sort_order: u32) -> Self {
        Self::new(choice, BranchAction::jump_to(sort_order))
    }

    /// Choice that moves on to another survey
    pub fn survey(choice: impl Into<String>, slug: impl Into<String>) -> Self {
        Self::new(choice, BranchAction::jump_to_survey(slug))
    }
}
