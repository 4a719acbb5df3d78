//! Graph nodes.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{DocumentIndex, EndNodeId, NodeId, OptionId, QuestionId};
use crate::domain::questionnaire::DocumentType;

/// A 2D canvas coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// What a node represents. Option and document records name their owners
/// directly instead of relying on the node id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum NodeKind {
    #[serde(rename = "questionNode", rename_all = "camelCase")]
    Question {
        question_id: QuestionId,
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tooltip: Option<String>,
    },
    #[serde(rename = "optionNode", rename_all = "camelCase")]
    AnswerOption {
        question_id: QuestionId,
        option_id: OptionId,
        label: String,
    },
    #[serde(rename = "documentNode", rename_all = "camelCase")]
    Document {
        index: DocumentIndex,
        title: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        document_type: DocumentType,
    },
    #[serde(rename = "endNode", rename_all = "camelCase")]
    End { end_id: EndNodeId, label: String },
    #[serde(rename = "waypointNode")]
    Waypoint,
}

/// Coarse node classification used for connection rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeCategory {
    Question,
    Option,
    Document,
    End,
    Waypoint,
}

impl fmt::Display for NodeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NodeCategory::Question => "question",
            NodeCategory::Option => "option",
            NodeCategory::Document => "document",
            NodeCategory::End => "end",
            NodeCategory::Waypoint => "waypoint",
        };
        f.write_str(s)
    }
}

impl NodeKind {
    pub fn category(&self) -> NodeCategory {
        match self {
            NodeKind::Question { .. } => NodeCategory::Question,
            NodeKind::AnswerOption { .. } => NodeCategory::Option,
            NodeKind::Document { .. } => NodeCategory::Document,
            NodeKind::End { .. } => NodeCategory::End,
            NodeKind::Waypoint => NodeCategory::Waypoint,
        }
    }

    /// The visible text of the node, if it has one.
    pub fn label(&self) -> Option<&str> {
        match self {
            NodeKind::Question { text, .. } => Some(text),
            NodeKind::AnswerOption { label, .. } => Some(label),
            NodeKind::Document { title, .. } => Some(title),
            NodeKind::End { label, .. } => Some(label),
            NodeKind::Waypoint => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowNode {
    pub id: NodeId,
    #[serde(flatten)]
    pub kind: NodeKind,
    pub position: Point,
}

impl FlowNode {
    pub fn new(id: NodeId, kind: NodeKind) -> Self {
        Self {
            id,
            kind,
            position: Point::default(),
        }
    }

    pub fn question(question_id: QuestionId, text: impl Into<String>, tooltip: Option<String>) -> Self {
        Self::new(
            NodeId::question(&question_id),
            NodeKind::Question {
                question_id,
                text: text.into(),
                tooltip,
            },
        )
    }

    pub fn option(question_id: QuestionId, option_id: OptionId, label: impl Into<String>) -> Self {
        Self::new(
            NodeId::option(&question_id, &option_id),
            NodeKind::AnswerOption {
                question_id,
                option_id,
                label: label.into(),
            },
        )
    }

    pub fn document(
        index: DocumentIndex,
        title: impl Into<String>,
        description: Option<String>,
        document_type: DocumentType,
    ) -> Self {
        Self::new(
            NodeId::document(index),
            NodeKind::Document {
                index,
                title: title.into(),
                description,
                document_type,
            },
        )
    }

    pub fn end(end_id: EndNodeId, label: impl Into<String>) -> Self {
        Self::new(
            NodeId::end(&end_id),
            NodeKind::End {
                end_id,
                label: label.into(),
            },
        )
    }

    pub fn waypoint(id: NodeId, position: Point) -> Self {
        Self {
            id,
            kind: NodeKind::Waypoint,
            position,
        }
    }

    pub fn category(&self) -> NodeCategory {
        self.kind.category()
    }

    pub fn is_waypoint(&self) -> bool {
        matches!(self.kind, NodeKind::Waypoint)
    }
}
