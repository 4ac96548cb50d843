//! Error types for the combat core

use thiserror::Error;

use crate::combat::TurnPhase;

/// Errors reported by pattern management and the turn controller
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CombatError {
    #[error("No attack patterns are registered")]
    EmptyPatternSet,

    #[error("Attack pattern '{0}' is already registered")]
    DuplicatePattern(String),

    #[error("Unknown attack pattern '{0}'")]
    UnknownPattern(String),

    #[error("Not enough {resource}: need {required}, have {available}")]
    InsufficientResource {
        resource: &'static str,
        required: i32,
        available: i32,
    },

    #[error("No {item} left to use")]
    ItemUnavailable { item: String },

    #[error("Action not allowed during {phase:?}")]
    ActionNotAllowed { phase: TurnPhase },

    #[error("The encounter is already over")]
    CombatOver,
}

impl CombatError {
    /// True for rejections the player caused and can correct by choosing again
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            CombatError::InsufficientResource { .. }
                | CombatError::ItemUnavailable { .. }
                | CombatError::ActionNotAllowed { .. }
        )
    }
}
