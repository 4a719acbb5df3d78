//! Domain layer containing the questionnaire model and its algorithms.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors)
//! - `questionnaire` - Typed questionnaire schema and routing rules
//! - `graph` - Editor graph, layout, and undoable editing
//! - `conversation` - Traversal engine and document evaluation
//! - `content` - Rich-text content for tooltips and descriptions

pub mod content;
pub mod conversation;
pub mod foundation;
pub mod graph;
pub mod questionnaire;
