//! State machine trait for lifecycle enums.

use super::ValidationError;

/// Trait for phase enums with an explicit transition table.
///
/// Implementors list their legal transitions once; `transition_to` then
/// refuses anything outside that table.
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// Returns true if transition from self to target is valid.
    fn can_transition_to(&self, target: &Self) -> bool;

    /// Returns all valid target states from current state.
    fn valid_transitions(&self) -> Vec<Self>;

    /// Performs transition with validation, returning error if invalid.
    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(ValidationError::invalid_format(
                "state_transition",
                format!("Cannot transition from {:?} to {:?}", self, target),
            ))
        }
    }

    /// Checks if current state is terminal (no valid outgoing transitions).
    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Fetch {
        Pending,
        Loaded,
        Failed,
    }

    impl StateMachine for Fetch {
        fn can_transition_to(&self, target: &Self) -> bool {
            matches!(
                (self, target),
                (Fetch::Pending, Fetch::Loaded) | (Fetch::Pending, Fetch::Failed)
            )
        }

        fn valid_transitions(&self) -> Vec<Self> {
            match self {
                Fetch::Pending => vec![Fetch::Loaded, Fetch::Failed],
                Fetch::Loaded | Fetch::Failed => vec![],
            }
        }
    }

    #[test]
    fn transition_to_succeeds_for_listed_target() {
        assert_eq!(Fetch::Pending.transition_to(Fetch::Loaded), Ok(Fetch::Loaded));
    }

    #[test]
    fn transition_to_rejects_unlisted_target() {
        assert!(Fetch::Loaded.transition_to(Fetch::Pending).is_err());
    }

    #[test]
    fn states_without_targets_are_terminal() {
        assert!(Fetch::Failed.is_terminal());
        assert!(!Fetch::Pending.is_terminal());
    }
}
