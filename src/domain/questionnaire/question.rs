//! Questions, their answer options, and end nodes.

use serde::{Deserialize, Serialize};

use super::routing::{self, NextRule, NextTarget};
use crate::domain::foundation::{EndNodeId, OptionId, QuestionId};

/// An answer option. Carries its parent question id explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOption {
    pub id: OptionId,
    pub question_id: QuestionId,
    pub label: String,
}

/// A question with its ordered options and routing rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
    pub options: Vec<AnswerOption>,
    #[serde(default)]
    pub next: Vec<NextRule>,
}

impl Question {
    pub fn new(id: QuestionId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            tooltip: None,
            options: Vec::new(),
            next: Vec::new(),
        }
    }

    pub fn with_tooltip(mut self, tooltip: impl Into<String>) -> Self {
        let tooltip = tooltip.into();
        self.tooltip = if tooltip.trim().is_empty() {
            None
        } else {
            Some(tooltip)
        };
        self
    }

    pub fn with_option(mut self, id: OptionId, label: impl Into<String>) -> Self {
        self.options.push(AnswerOption {
            id,
            question_id: self.id.clone(),
            label: label.into(),
        });
        self
    }

    pub fn with_rule(mut self, rule: NextRule) -> Self {
        self.next.push(rule);
        self
    }

    pub fn option(&self, id: &OptionId) -> Option<&AnswerOption> {
        self.options.iter().find(|option| &option.id == id)
    }

    /// The default (option-agnostic) target, if any.
    pub fn default_next(&self) -> Option<&NextTarget> {
        self.next
            .iter()
            .find(|rule| rule.is_default())
            .map(|rule| &rule.target)
    }

    /// Where answering `option` leads. `None` means the walk ends here.
    pub fn resolve_next(&self, option: &OptionId) -> Option<&NextTarget> {
        routing::resolve(&self.next, option)
    }
}

/// A terminal state with no outgoing transitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndNode {
    pub id: EndNodeId,
    pub label: String,
}
