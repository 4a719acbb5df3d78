//! CMS HTTP client.
//!
//! Two collection endpoints, both answering `{"data":[...]}`:
//!
//! - `GET {base}/api/tooltips` -> `{"questionId":"1","content":[blocks]}`
//! - `GET {base}/api/documents` -> `{"title":"Passport","description":[blocks]}`
//!
//! Entries may also be wrapped in an `attributes` object.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

use crate::domain::content::RichText;
use crate::domain::foundation::QuestionId;
use crate::ports::{ContentError, ContentProvider};

#[derive(Debug, Deserialize)]
struct Collection<T> {
    #[serde(default = "Vec::new")]
    data: Vec<Entry<T>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Entry<T> {
    Wrapped { attributes: T },
    Flat(T),
}

impl<T> Entry<T> {
    fn into_inner(self) -> T {
        match self {
            Entry::Wrapped { attributes } => attributes,
            Entry::Flat(inner) => inner,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TooltipEntry {
    question_id: serde_json::Value,
    #[serde(default)]
    content: RichText,
}

#[derive(Debug, Deserialize)]
struct DescriptionEntry {
    title: String,
    #[serde(default)]
    description: RichText,
}

#[derive(Debug, Clone)]
pub struct HttpContentProvider {
    base_url: String,
    client: Client,
}

impl HttpContentProvider {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ContentError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ContentError::Request(e.to_string()))?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, collection: &str) -> String {
        format!("{}/api/{}", self.base_url, collection)
    }

    async fn fetch<T: DeserializeOwned>(&self, collection: &str) -> Result<Vec<T>, ContentError> {
        let url = self.url(collection);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ContentError::Request(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(ContentError::Request(format!(
                "Unexpected status {} from {}",
                status, url
            )));
        }
        let body = response
            .text()
            .await
            .map_err(|e| ContentError::Request(e.to_string()))?;
        let entries = parse_collection(&body)?;
        debug!(%url, entries = entries.len(), "CMS collection fetched");
        Ok(entries)
    }
}

fn parse_collection<T: DeserializeOwned>(body: &str) -> Result<Vec<T>, ContentError> {
    let collection: Collection<T> =
        serde_json::from_str(body).map_err(|e| ContentError::InvalidPayload(e.to_string()))?;
    Ok(collection.data.into_iter().map(Entry::into_inner).collect())
}

fn tooltip_map(entries: Vec<TooltipEntry>) -> HashMap<QuestionId, RichText> {
    entries
        .into_iter()
        .filter_map(|entry| {
            let raw = match entry.question_id {
                serde_json::Value::String(text) => text,
                serde_json::Value::Number(number) => number.to_string(),
                _ => return None,
            };
            let id = QuestionId::new(raw).ok()?;
            (!entry.content.is_empty()).then_some((id, entry.content))
        })
        .collect()
}

fn description_map(entries: Vec<DescriptionEntry>) -> HashMap<String, RichText> {
    entries
        .into_iter()
        .filter(|entry| !entry.description.is_empty())
        .map(|entry| (entry.title.trim().to_string(), entry.description))
        .collect()
}

#[async_trait]
impl ContentProvider for HttpContentProvider {
    async fn tooltips(&self) -> Result<HashMap<QuestionId, RichText>, ContentError> {
        Ok(tooltip_map(self.fetch("tooltips").await?))
    }

    async fn document_descriptions(&self) -> Result<HashMap<String, RichText>, ContentError> {
        Ok(description_map(self.fetch("documents").await?))
    }
}
