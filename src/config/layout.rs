//! Layout spacing configuration

use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::graph::LayoutSettings;

#[derive(Debug, Clone, Deserialize)]
pub struct LayoutConfig {
    #[serde(default = "default_rank_spacing")]
    pub rank_spacing: f64,

    #[serde(default = "default_node_spacing")]
    pub node_spacing: f64,

    #[serde(default = "default_document_column_gap")]
    pub document_column_gap: f64,

    #[serde(default = "default_document_min_gap")]
    pub document_min_gap: f64,
}

impl LayoutConfig {
    pub fn settings(&self) -> LayoutSettings {
        LayoutSettings {
            rank_spacing: self.rank_spacing,
            node_spacing: self.node_spacing,
            document_column_gap: self.document_column_gap,
            document_min_gap: self.document_min_gap,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let spacings = [
            ("rank_spacing", self.rank_spacing),
            ("node_spacing", self.node_spacing),
            ("document_column_gap", self.document_column_gap),
            ("document_min_gap", self.document_min_gap),
        ];
        for (name, value) in spacings {
            if !(value.is_finite() && value > 0.0) {
                return Err(ValidationError::InvalidSpacing(name));
            }
        }
        Ok(())
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            rank_spacing: default_rank_spacing(),
            node_spacing: default_node_spacing(),
            document_column_gap: default_document_column_gap(),
            document_min_gap: default_document_min_gap(),
        }
    }
}

fn default_rank_spacing() -> f64 {
    150.0
}

fn default_node_spacing() -> f64 {
    220.0
}

fn default_document_column_gap() -> f64 {
    320.0
}

fn default_document_min_gap() -> f64 {
    140.0
}
