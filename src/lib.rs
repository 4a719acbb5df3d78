//! Questionnaire Flow - questionnaire XML, flow graphs and guided walks
//!
//! This crate converts branching questionnaires between their XML document
//! form and an editable, automatically laid-out flow graph, and drives a
//! question-by-question walk that ends in a list of recommended documents.
//!
//! - `domain` - questionnaire model, flow graph, layout, traversal, rich text
//! - `ports` - interfaces to the questionnaire source, CMS and local storage
//! - `adapters` - XML codec plus file/HTTP/in-memory port implementations
//! - `application` - editor and conversation services
//! - `config` - environment-driven configuration

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
