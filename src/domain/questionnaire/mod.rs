//! Questionnaire schema model.
//!
//! The typed form of the `<questions>` document: questions with their
//! options and routing rules, terminal end nodes, and dependency documents.
//! Both the editor graph and the conversation engine are built from it.

mod document;
mod question;
mod routing;
mod schema;

pub use document::{Condition, Document, DocumentType};
pub use question::{AnswerOption, EndNode, Question};
pub use routing::{resolve as resolve_next, NextRule, NextTarget};
pub use schema::{DanglingReference, Questionnaire, START_QUESTION_ID};
