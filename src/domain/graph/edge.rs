//! Graph edges.

use serde::{Deserialize, Serialize};

use super::NodeCategory;
use crate::domain::foundation::{EdgeId, NodeId};

/// The semantic type of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    QuestionToOption,
    OptionToQuestion,
    OptionToDocument,
    ToEnd,
}

impl EdgeKind {
    /// The edge type implied by two logical (non-waypoint) endpoints, or
    /// `None` when the pair may not be connected.
    pub fn between(source: NodeCategory, target: NodeCategory) -> Option<Self> {
        match (source, target) {
            (NodeCategory::Question, NodeCategory::Option) => Some(EdgeKind::QuestionToOption),
            (NodeCategory::Option, NodeCategory::Question) => Some(EdgeKind::OptionToQuestion),
            (NodeCategory::Option, NodeCategory::Document) => Some(EdgeKind::OptionToDocument),
            (NodeCategory::Option, NodeCategory::End) => Some(EdgeKind::ToEnd),
            _ => None,
        }
    }

    /// Whether this edge is an option's "next" transition.
    pub fn is_transition(&self) -> bool {
        matches!(self, EdgeKind::OptionToQuestion | EdgeKind::ToEnd)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowEdge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    pub kind: EdgeKind,
}

impl FlowEdge {
    pub fn new(source: NodeId, target: NodeId, kind: EdgeKind) -> Self {
        Self {
            id: EdgeId::between(&source, &target),
            source,
            target,
            kind,
        }
    }

    /// Presentation hint: document conditions are drawn animated.
    pub fn animated(&self) -> bool {
        self.kind == EdgeKind::OptionToDocument
    }
}

/// An edge with any waypoint chain collapsed: the real source and target
/// plus the waypoints passed on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct LogicalEdge {
    pub source: NodeId,
    pub target: NodeId,
    pub kind: EdgeKind,
    pub via: Vec<NodeId>,
}

impl LogicalEdge {
    pub fn id(&self) -> EdgeId {
        EdgeId::between(&self.source, &self.target)
    }
}
