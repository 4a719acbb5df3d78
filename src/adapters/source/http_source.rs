//! HTTP questionnaire source.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::debug;

use crate::ports::{QuestionnaireSource, SourceError};

/// Fetches the questionnaire XML with a single GET. No retry.
#[derive(Debug, Clone)]
pub struct HttpQuestionnaireSource {
    url: String,
    client: Client,
}

impl HttpQuestionnaireSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SourceError::Request(e.to_string()))?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }
}

#[async_trait]
impl QuestionnaireSource for HttpQuestionnaireSource {
    async fn fetch(&self) -> Result<String, SourceError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| SourceError::Request(e.to_string()))?;

        let status = response.status();
        debug!(url = %self.url, %status, "Questionnaire fetched");
        match status {
            s if s.is_success() => response
                .text()
                .await
                .map_err(|e| SourceError::Request(e.to_string())),
            StatusCode::NOT_FOUND => Err(SourceError::NotFound(self.url.clone())),
            other => Err(SourceError::Request(format!(
                "Unexpected status {} from {}",
                other, self.url
            ))),
        }
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}
