//! Conversation traversal.
//!
//! Walks a user through a questionnaire one question at a time and works out
//! which documents apply once the walk is over.

mod answer;
mod engine;
mod evaluator;
mod session_record;
mod state;

pub use answer::{Answer, HistoryEntry};
pub use engine::{Conversation, Resumed, Step};
pub use evaluator::{DocumentEvaluator, Recommendation};
pub use session_record::SessionRecord;
pub use state::TraversalPhase;
