//! Dependency documents and their qualification conditions.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{DocumentIndex, OptionId, QuestionId, ValidationError};

/// Whether a qualifying document is required or merely recommended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    #[default]
    Mandatory,
    Optional,
}

impl DocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Mandatory => "mandatory",
            DocumentType::Optional => "optional",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mandatory" => Ok(DocumentType::Mandatory),
            "optional" => Ok(DocumentType::Optional),
            other => Err(ValidationError::invalid_format(
                "type",
                format!("expected 'mandatory' or 'optional', got '{}'", other),
            )),
        }
    }
}

/// One `(question, option)` pair a document depends on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    pub question_id: QuestionId,
    pub option_id: OptionId,
}

impl Condition {
    pub fn new(question_id: QuestionId, option_id: OptionId) -> Self {
        Self {
            question_id,
            option_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub index: DocumentIndex,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub kind: DocumentType,
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

impl Document {
    pub fn new(index: DocumentIndex, title: impl Into<String>, kind: DocumentType) -> Self {
        Self {
            index,
            title: title.into(),
            description: None,
            kind,
            conditions: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        let description = description.into();
        self.description = if description.trim().is_empty() {
            None
        } else {
            Some(description)
        };
        self
    }

    pub fn with_condition(mut self, question_id: QuestionId, option_id: OptionId) -> Self {
        self.conditions.push(Condition::new(question_id, option_id));
        self
    }

    /// Conditions grouped by question: each group lists the acceptable options.
    pub fn condition_groups(&self) -> BTreeMap<&QuestionId, Vec<&OptionId>> {
        let mut groups: BTreeMap<&QuestionId, Vec<&OptionId>> = BTreeMap::new();
        for condition in &self.conditions {
            let group = groups.entry(&condition.question_id).or_default();
            if !group.contains(&&condition.option_id) {
                group.push(&condition.option_id);
            }
        }
        groups
    }
}
