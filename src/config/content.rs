//! CMS content configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use super::source::is_http_url;

/// Content configuration. Without a `base_url` no CMS is queried and the
/// XML tooltips/descriptions are used as-is.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentConfig {
    pub base_url: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl ContentConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.timeout_secs == 0 || self.timeout_secs > 300 {
            return Err(ValidationError::InvalidTimeout);
        }
        if let Some(url) = &self.base_url {
            if !is_http_url(url) {
                return Err(ValidationError::InvalidContentUrl);
            }
        }
        Ok(())
    }
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: default_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    10
}
