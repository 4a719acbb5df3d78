//! Foundation module - Shared domain primitives.
//!
//! Contains identifiers, timestamps, error types and the state machine
//! trait shared by the questionnaire, graph and conversation modules.

mod errors;
mod ids;
mod state_machine;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{
    compare_authored_ids, DocumentIndex, EdgeId, EndNodeId, NodeId, OptionId, QuestionId,
    SessionId,
};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
