//! Questionnaire Source Port - where questionnaire XML comes from.
//!
//! The editor and the conversation both start by fetching the XML document.
//! A fetch failure is fatal to loading; there is no built-in retry.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode};

/// Errors raised while fetching or storing questionnaire XML.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Questionnaire not found at {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Source {0} is read-only")]
    ReadOnly(String),
}

impl From<SourceError> for DomainError {
    fn from(err: SourceError) -> Self {
        DomainError::new(ErrorCode::SourceUnavailable, err.to_string())
    }
}

/// Port for reading (and optionally writing) the questionnaire document.
#[async_trait]
pub trait QuestionnaireSource: Send + Sync {
    /// Fetches the raw XML text.
    async fn fetch(&self) -> Result<String, SourceError>;

    /// Replaces the stored XML text. Sources that cannot be written refuse
    /// with [`SourceError::ReadOnly`].
    async fn store(&self, xml: &str) -> Result<(), SourceError> {
        let _ = xml;
        Err(SourceError::ReadOnly(self.describe()))
    }

    /// Human-readable location, for logs.
    fn describe(&self) -> String;
}
