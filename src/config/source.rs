//! Questionnaire source configuration

use serde::Deserialize;
use std::path::PathBuf;

use super::error::ValidationError;

/// Where the questionnaire XML is read from. A local `path` takes
/// precedence over `url`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourceConfig {
    pub path: Option<PathBuf>,
    pub url: Option<String>,
}

impl SourceConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(url) = &self.url {
            if !is_http_url(url) {
                return Err(ValidationError::InvalidSourceUrl);
            }
        }
        Ok(())
    }
}

pub(super) fn is_http_url(url: &str) -> bool {
    match reqwest::Url::parse(url) {
        Ok(parsed) => matches!(parsed.scheme(), "http" | "https") && parsed.has_host(),
        Err(_) => false,
    }
}
