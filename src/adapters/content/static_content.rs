//! In-memory content provider.
//!
//! Used when no CMS is configured, and in tests.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::domain::content::RichText;
use crate::domain::foundation::QuestionId;
use crate::ports::{ContentError, ContentProvider};

#[derive(Debug, Clone, Default)]
pub struct StaticContentProvider {
    tooltips: HashMap<QuestionId, RichText>,
    descriptions: HashMap<String, RichText>,
}

impl StaticContentProvider {
    /// A provider with no content at all.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_tooltip(mut self, question: QuestionId, content: RichText) -> Self {
        self.tooltips.insert(question, content);
        self
    }

    pub fn with_description(mut self, title: impl Into<String>, content: RichText) -> Self {
        self.descriptions.insert(title.into(), content);
        self
    }
}

#[async_trait]
impl ContentProvider for StaticContentProvider {
    async fn tooltips(&self) -> Result<HashMap<QuestionId, RichText>, ContentError> {
        Ok(self.tooltips.clone())
    }

    async fn document_descriptions(&self) -> Result<HashMap<String, RichText>, ContentError> {
        Ok(self.descriptions.clone())
    }
}
