//! XML adapter errors.

use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode};

/// Errors raised while reading or writing questionnaire XML. A read error
/// aborts the load; no partial questionnaire is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum XmlError {
    #[error("Malformed XML: {0}")]
    Malformed(String),

    #[error("Missing required element: {0}")]
    MissingElement(String),

    #[error("Element <{element}> is missing attribute '{attribute}'")]
    MissingAttribute { element: String, attribute: String },

    #[error("Failed to write XML: {0}")]
    Write(String),
}

impl XmlError {
    pub fn missing_attribute(element: impl Into<String>, attribute: impl Into<String>) -> Self {
        XmlError::MissingAttribute {
            element: element.into(),
            attribute: attribute.into(),
        }
    }
}

impl From<XmlError> for DomainError {
    fn from(err: XmlError) -> Self {
        let code = match &err {
            XmlError::Write(_) => ErrorCode::InternalError,
            _ => ErrorCode::InvalidSchema,
        };
        DomainError::new(code, err.to_string())
    }
}
