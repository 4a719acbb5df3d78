//! Client-local storage configuration

use serde::Deserialize;
use std::path::PathBuf;

use super::error::ValidationError;

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory holding one JSON file per key
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_layout_key")]
    pub layout_key: String,

    #[serde(default = "default_session_key")]
    pub session_key: String,
}

impl StorageConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !is_valid_key(&self.layout_key) {
            return Err(ValidationError::InvalidStorageKey("layout_key"));
        }
        if !is_valid_key(&self.session_key) {
            return Err(ValidationError::InvalidStorageKey("session_key"));
        }
        Ok(())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            layout_key: default_layout_key(),
            session_key: default_session_key(),
        }
    }
}

// Mirrors the key rules of the file store so a bad key fails at startup.
fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_layout_key() -> String {
    "flow-layout".to_string()
}

fn default_session_key() -> String {
    "questionnaire-answers".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_defaults() {
        let config = StorageConfig::default();
        assert_eq!(config.layout_key, "flow-layout");
        assert_eq!(config.session_key, "questionnaire-answers");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_key_rejected() {
        let config = StorageConfig {
            session_key: String::new(),
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::InvalidStorageKey("session_key"))
        );
    }

    #[test]
    fn test_path_like_key_rejected() {
        let config = StorageConfig {
            layout_key: "../layout".into(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
