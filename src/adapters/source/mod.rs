//! Questionnaire Source Adapters
//!
//! - **FileQuestionnaireSource** - reads/writes a local XML file
//! - **HttpQuestionnaireSource** - fetches XML over HTTP (read-only)

mod file_source;
mod http_source;

pub use file_source::FileQuestionnaireSource;
pub use http_source::HttpQuestionnaireSource;
