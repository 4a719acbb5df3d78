//! Next-question routing rules.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{EndNodeId, OptionId, QuestionId};

/// Where an answered option leads.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum NextTarget {
    Question(QuestionId),
    EndNode(EndNodeId),
}

impl NextTarget {
    pub fn as_question(&self) -> Option<&QuestionId> {
        match self {
            NextTarget::Question(id) => Some(id),
            NextTarget::EndNode(_) => None,
        }
    }

    pub fn as_end_node(&self) -> Option<&EndNodeId> {
        match self {
            NextTarget::EndNode(id) => Some(id),
            NextTarget::Question(_) => None,
        }
    }
}

/// A single `<next>` entry.
///
/// `option == None` is the question-level default, used for every option
/// that has no rule of its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextRule {
    pub option: Option<OptionId>,
    pub target: NextTarget,
}

impl NextRule {
    pub fn specific(option: OptionId, target: NextTarget) -> Self {
        Self {
            option: Some(option),
            target,
        }
    }

    pub fn default_for_question(target: NextTarget) -> Self {
        Self {
            option: None,
            target,
        }
    }

    pub fn is_default(&self) -> bool {
        self.option.is_none()
    }
}

/// Resolves the target for `option`: an option-specific rule wins over the
/// default, and the first matching rule of each kind is used.
pub fn resolve<'a>(rules: &'a [NextRule], option: &OptionId) -> Option<&'a NextTarget> {
    rules
        .iter()
        .find(|rule| rule.option.as_ref() == Some(option))
        .or_else(|| rules.iter().find(|rule| rule.is_default()))
        .map(|rule| &rule.target)
}
