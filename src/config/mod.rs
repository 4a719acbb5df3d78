//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `QUESTIONNAIRE_FLOW` prefix and nested values use double underscores as separators.
//! Every value has a default, so an empty environment yields a usable configuration.
//!
//! # Example
//!
//! ```no_run
//! use questionnaire_flow::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Layout stored under {}", config.storage.layout_key);
//! ```

mod content;
mod error;
mod layout;
mod logging;
mod source;
mod storage;

pub use content::ContentConfig;
pub use error::{ConfigError, ValidationError};
pub use layout::LayoutConfig;
pub use logging::LoggingConfig;
pub use source::SourceConfig;
pub use storage::StorageConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Questionnaire XML location (file path or URL)
    #[serde(default)]
    pub source: SourceConfig,

    /// CMS endpoint for tooltips and document descriptions
    #[serde(default)]
    pub content: ContentConfig,

    /// Client-local persisted state (layout, answers)
    #[serde(default)]
    pub storage: StorageConfig,

    /// Automatic layout spacing
    #[serde(default)]
    pub layout: LayoutConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `QUESTIONNAIRE_FLOW` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `QUESTIONNAIRE_FLOW__LAYOUT__RANK_SPACING=160` -> `layout.rank_spacing = 160`
    /// - `QUESTIONNAIRE_FLOW__CONTENT__BASE_URL=...` -> `content.base_url = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("QUESTIONNAIRE_FLOW")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for non-positive spacings, unusable storage
    /// keys, a zero timeout, or a malformed URL.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.source.validate()?;
        self.content.validate()?;
        self.storage.validate()?;
        self.layout.validate()?;
        Ok(())
    }
}
