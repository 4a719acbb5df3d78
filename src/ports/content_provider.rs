//! Content Provider Port - auxiliary CMS content.
//!
//! Tooltips are keyed by question id, document descriptions by document
//! title. Callers treat every failure here as soft: the content is simply
//! left out.

use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;

use crate::domain::content::RichText;
use crate::domain::foundation::QuestionId;

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("Content request failed: {0}")]
    Request(String),

    #[error("Unexpected content payload: {0}")]
    InvalidPayload(String),
}

#[async_trait]
pub trait ContentProvider: Send + Sync {
    /// Tooltip content for every question that has one.
    async fn tooltips(&self) -> Result<HashMap<QuestionId, RichText>, ContentError>;

    /// Description content keyed by document title.
    async fn document_descriptions(&self) -> Result<HashMap<String, RichText>, ContentError>;
}
