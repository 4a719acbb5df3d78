//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Document Ports
//!
//! - `QuestionnaireSource` - Fetches (and optionally stores) questionnaire XML
//!
//! ## Content Ports
//!
//! - `ContentProvider` - Rich-text tooltips and document descriptions from a CMS
//!
//! ## Storage Ports
//!
//! - `KeyValueStore` - Client-local state such as the editor layout and answers

mod content_provider;
mod key_value_store;
mod questionnaire_source;

pub use content_provider::{ContentError, ContentProvider};
pub use key_value_store::{KeyValueStore, StoreError};
pub use questionnaire_source::{QuestionnaireSource, SourceError};
