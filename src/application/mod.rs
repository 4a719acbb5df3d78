//! Application layer - services that coordinate the domain with ports.
//!
//! - `EditorService` opens, saves and persists the layout of editor sessions
//! - `ConversationService` runs a questionnaire walk with persisted answers

mod conversation_service;
mod editor_service;

pub use conversation_service::{ActiveConversation, ConversationService};
pub use editor_service::EditorService;
