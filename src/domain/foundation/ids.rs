//! Strongly-typed identifier value objects.
//!
//! Questionnaire keys (`QuestionId`, `OptionId`, `EndNodeId`) are the string
//! ids authored in the XML. Graph keys (`NodeId`, `EdgeId`) are derived from
//! them and double as the keys of the persisted editor layout.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::ValidationError;

/// Compares two authored ids numerically when both parse as integers,
/// falling back to plain string order otherwise. Numeric ids sort first.
pub fn compare_authored_ids(a: &str, b: &str) -> Ordering {
    match (a.trim().parse::<u64>(), b.trim().parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

macro_rules! authored_id {
    ($(#[$meta:meta])* $name:ident, $field:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates an id, rejecting blank values.
            pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
                let value = value.into();
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    return Err(ValidationError::empty_field($field));
                }
                Ok(Self(trimmed.to_string()))
            }

            /// Wraps a known non-blank literal.
            #[allow(dead_code)]
            pub(crate) fn from_static(value: &'static str) -> Self {
                Self(value.to_string())
            }

            /// Returns the raw authored value.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl PartialOrd for $name {
            fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
                Some(self.cmp(other))
            }
        }

        impl Ord for $name {
            fn cmp(&self, other: &Self) -> Ordering {
                compare_authored_ids(&self.0, &other.0)
            }
        }
    };
}

authored_id!(
    /// Identifier of a question as authored in the questionnaire.
    QuestionId,
    "question_id"
);

authored_id!(
    /// Identifier of an option, unique within its parent question.
    OptionId,
    "option_id"
);

authored_id!(
    /// Identifier of a terminal end node.
    EndNodeId,
    "end_node_id"
);

/// Positional index of a dependency document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentIndex(usize);

impl DocumentIndex {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn value(&self) -> usize {
        self.0
    }
}

impl fmt::Display for DocumentIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a node in the editor graph.
///
/// Built from the questionnaire ids: `q{question}`, `q{question}-opt{option}`,
/// `doc{index}`, `end{id}`, and `wp-{edge}-{n}` for waypoints. Graph records
/// carry their parent ids explicitly, so these strings are only ever used as
/// lookup keys and are never parsed back.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn question(question: &QuestionId) -> Self {
        Self(format!("q{}", question))
    }

    pub fn option(question: &QuestionId, option: &OptionId) -> Self {
        Self(format!("q{}-opt{}", question, option))
    }

    pub fn document(index: DocumentIndex) -> Self {
        Self(format!("doc{}", index))
    }

    pub fn end(end: &EndNodeId) -> Self {
        Self(format!("end{}", end))
    }

    pub fn waypoint(edge: &EdgeId, ordinal: usize) -> Self {
        Self(format!("wp-{}-{}", edge, ordinal))
    }

    /// Wraps an arbitrary key, e.g. one read back from a persisted layout.
    pub fn from_raw(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of an edge in the editor graph: `e-{source}-{target}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(String);

impl EdgeId {
    pub fn between(source: &NodeId, target: &NodeId) -> Self {
        Self(format!("e-{}-{}", source, target))
    }

    pub fn from_raw(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a conversation session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Creates a new random SessionId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}
