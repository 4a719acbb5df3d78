//! Traversal phase state machine.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::StateMachine;

/// The phase of a questionnaire walk.
///
/// - `Loading`: questionnaire data not yet available
/// - `PresentingQuestion`: waiting for an answer to the current question
/// - `Finished`: no further question; recommendations can be computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TraversalPhase {
    #[default]
    Loading,
    PresentingQuestion,
    Finished,
}

impl TraversalPhase {
    /// Returns true if an answer can be given in this phase.
    pub fn accepts_answers(&self) -> bool {
        matches!(self, Self::PresentingQuestion)
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Finished)
    }
}

impl StateMachine for TraversalPhase {
    fn can_transition_to(&self, target: &Self) -> bool {
        use TraversalPhase::*;
        matches!(
            (self, target),
            // Data fetched, first question shown
            (Loading, PresentingQuestion) |
            // Answer leads to another question
            (PresentingQuestion, PresentingQuestion) |
            // Answer leads nowhere or to an end node
            (PresentingQuestion, Finished) |
            // Undo or rewind from the end
            (Finished, PresentingQuestion)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use TraversalPhase::*;
        match self {
            Loading => vec![PresentingQuestion],
            PresentingQuestion => vec![PresentingQuestion, Finished],
            Finished => vec![PresentingQuestion],
        }
    }
}
