//! The editor graph container.
//!
//! Nodes and edges are kept in insertion order so that layout and
//! serialization are deterministic. Mutations that would break an
//! invariant return a [`ConnectRejection`] and leave the graph untouched.

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

use super::{EdgeKind, FlowEdge, FlowNode, LogicalEdge, NodeCategory, NodeKind};
use crate::domain::foundation::{EdgeId, NodeId};

/// Why a connection or insertion was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectRejection {
    UnknownNode(NodeId),
    UnknownEdge(EdgeId),
    DuplicateNode(NodeId),
    SelfLoop(NodeId),
    DuplicateConnection { source: NodeId, target: NodeId },
    IncompatibleEndpoints { source: NodeCategory, target: NodeCategory },
    OptionAlreadyRouted(NodeId),
    ForeignOption { question: NodeId, option: NodeId },
}

impl fmt::Display for ConnectRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectRejection::UnknownNode(id) => write!(f, "node {} does not exist", id),
            ConnectRejection::UnknownEdge(id) => write!(f, "edge {} does not exist", id),
            ConnectRejection::DuplicateNode(id) => write!(f, "node {} already exists", id),
            ConnectRejection::SelfLoop(id) => write!(f, "node {} cannot connect to itself", id),
            ConnectRejection::DuplicateConnection { source, target } => {
                write!(f, "{} is already connected to {}", source, target)
            }
            ConnectRejection::IncompatibleEndpoints { source, target } => {
                write!(f, "a {} node cannot connect to a {} node", source, target)
            }
            ConnectRejection::OptionAlreadyRouted(id) => {
                write!(f, "option {} already has a next transition", id)
            }
            ConnectRejection::ForeignOption { question, option } => {
                write!(f, "option {} does not belong to question {}", option, question)
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowGraph {
    nodes: Vec<FlowNode>,
    edges: Vec<FlowEdge>,
}

impl FlowGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nodes(&self) -> &[FlowNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[FlowEdge] {
        &self.edges
    }

    pub fn node(&self, id: &NodeId) -> Option<&FlowNode> {
        self.nodes.iter().find(|node| &node.id == id)
    }

    pub fn node_mut(&mut self, id: &NodeId) -> Option<&mut FlowNode> {
        self.nodes.iter_mut().find(|node| &node.id == id)
    }

    pub fn contains_node(&self, id: &NodeId) -> bool {
        self.node(id).is_some()
    }

    pub fn edge(&self, id: &EdgeId) -> Option<&FlowEdge> {
        self.edges.iter().find(|edge| &edge.id == id)
    }

    pub fn has_direct_edge(&self, source: &NodeId, target: &NodeId) -> bool {
        self.edges
            .iter()
            .any(|edge| &edge.source == source && &edge.target == target)
    }

    pub fn outgoing<'a>(&'a self, id: &'a NodeId) -> impl Iterator<Item = &'a FlowEdge> + 'a {
        self.edges.iter().filter(move |edge| &edge.source == id)
    }

    pub fn incoming<'a>(&'a self, id: &'a NodeId) -> impl Iterator<Item = &'a FlowEdge> + 'a {
        self.edges.iter().filter(move |edge| &edge.target == id)
    }

    pub fn nodes_of(&self, category: NodeCategory) -> impl Iterator<Item = &FlowNode> {
        self.nodes
            .iter()
            .filter(move |node| node.category() == category)
    }

    pub fn add_node(&mut self, node: FlowNode) -> Result<(), ConnectRejection> {
        if self.contains_node(&node.id) {
            return Err(ConnectRejection::DuplicateNode(node.id));
        }
        self.nodes.push(node);
        Ok(())
    }

    /// Appends an edge without semantic checks. Only structural duplicates
    /// and missing endpoints are refused.
    pub fn insert_edge(&mut self, edge: FlowEdge) -> Result<(), ConnectRejection> {
        if !self.contains_node(&edge.source) {
            return Err(ConnectRejection::UnknownNode(edge.source));
        }
        if !self.contains_node(&edge.target) {
            return Err(ConnectRejection::UnknownNode(edge.target));
        }
        if self.edge(&edge.id).is_some() || self.has_direct_edge(&edge.source, &edge.target) {
            return Err(ConnectRejection::DuplicateConnection {
                source: edge.source,
                target: edge.target,
            });
        }
        self.edges.push(edge);
        Ok(())
    }

    /// Checks whether `source -> target` may be added as a new logical
    /// connection and returns the edge type it would carry.
    pub fn validate_connection(
        &self,
        source: &NodeId,
        target: &NodeId,
    ) -> Result<EdgeKind, ConnectRejection> {
        if source == target {
            return Err(ConnectRejection::SelfLoop(source.clone()));
        }
        let source_node = self
            .node(source)
            .ok_or_else(|| ConnectRejection::UnknownNode(source.clone()))?;
        let target_node = self
            .node(target)
            .ok_or_else(|| ConnectRejection::UnknownNode(target.clone()))?;

        let kind = EdgeKind::between(source_node.category(), target_node.category()).ok_or(
            ConnectRejection::IncompatibleEndpoints {
                source: source_node.category(),
                target: target_node.category(),
            },
        )?;

        let already_linked = self
            .logical_edges()
            .iter()
            .any(|edge| &edge.source == source && &edge.target == target);
        if already_linked {
            return Err(ConnectRejection::DuplicateConnection {
                source: source.clone(),
                target: target.clone(),
            });
        }

        match (&source_node.kind, &target_node.kind) {
            (
                NodeKind::Question { question_id, .. },
                NodeKind::AnswerOption {
                    question_id: owner, ..
                },
            ) if question_id != owner => {
                return Err(ConnectRejection::ForeignOption {
                    question: source.clone(),
                    option: target.clone(),
                });
            }
            _ => {}
        }

        if kind.is_transition() && self.next_transition(source).is_some() {
            return Err(ConnectRejection::OptionAlreadyRouted(source.clone()));
        }

        Ok(kind)
    }

    /// Adds a validated logical connection.
    pub fn connect(&mut self, source: &NodeId, target: &NodeId) -> Result<EdgeId, ConnectRejection> {
        let kind = self.validate_connection(source, target)?;
        let edge = FlowEdge::new(source.clone(), target.clone(), kind);
        let id = edge.id.clone();
        self.insert_edge(edge)?;
        Ok(id)
    }

    pub fn remove_edge(&mut self, id: &EdgeId) -> Option<FlowEdge> {
        let position = self.edges.iter().position(|edge| &edge.id == id)?;
        Some(self.edges.remove(position))
    }

    /// Removes a node together with every edge touching it.
    pub fn remove_node(&mut self, id: &NodeId) -> Option<FlowNode> {
        let position = self.nodes.iter().position(|node| &node.id == id)?;
        self.edges
            .retain(|edge| &edge.source != id && &edge.target != id);
        Some(self.nodes.remove(position))
    }

    /// Drops waypoint nodes that no longer sit on a complete chain.
    pub fn prune_orphan_waypoints(&mut self) -> usize {
        let mut removed = 0;
        loop {
            let orphan = self
                .nodes
                .iter()
                .filter(|node| node.is_waypoint())
                .find(|node| {
                    self.incoming(&node.id).next().is_none()
                        || self.outgoing(&node.id).next().is_none()
                })
                .map(|node| node.id.clone());
            match orphan {
                Some(id) => {
                    self.remove_node(&id);
                    removed += 1;
                }
                None => return removed,
            }
        }
    }

    /// Follows waypoint chains so that every edge leaving a real node is
    /// reported once, from its real source to its real target.
    pub fn logical_edges(&self) -> Vec<LogicalEdge> {
        let mut logical = Vec::new();
        for edge in &self.edges {
            let starts_at_waypoint = self
                .node(&edge.source)
                .map(FlowNode::is_waypoint)
                .unwrap_or(false);
            if starts_at_waypoint {
                continue;
            }

            let mut via = Vec::new();
            let mut seen = HashSet::new();
            let mut current = edge.target.clone();
            let mut complete = true;
            while let Some(node) = self.node(&current) {
                if !node.is_waypoint() {
                    break;
                }
                if !seen.insert(current.clone()) {
                    complete = false;
                    break;
                }
                via.push(current.clone());
                let next = self.outgoing(&current).next().map(|edge| edge.target.clone());
                match next {
                    Some(next) => current = next,
                    None => {
                        complete = false;
                        break;
                    }
                }
            }

            if complete && self.contains_node(&current) {
                logical.push(LogicalEdge {
                    source: edge.source.clone(),
                    target: current,
                    kind: edge.kind,
                    via,
                });
            }
        }
        logical
    }

    /// The logical transition leaving an option, if any.
    pub fn next_transition(&self, option: &NodeId) -> Option<LogicalEdge> {
        self.logical_edges()
            .into_iter()
            .find(|edge| &edge.source == option && edge.kind.is_transition())
    }

    /// Returns the question/option cycles of the graph. A conversation over
    /// a graph with cycles may never finish.
    pub fn find_cycles(&self) -> Vec<Vec<NodeId>> {
        let (graph, _) = self.routing_digraph();
        tarjan_scc(&graph)
            .into_iter()
            .filter(|scc| scc.len() > 1)
            .map(|scc| scc.into_iter().map(|index| graph[index].clone()).collect())
            .collect()
    }

    /// The question/option/end subgraph as a petgraph digraph, with waypoint
    /// chains collapsed and document edges left out.
    pub(crate) fn routing_digraph(&self) -> (DiGraph<NodeId, EdgeKind>, HashMap<NodeId, NodeIndex>) {
        let mut graph = DiGraph::new();
        let mut indices = HashMap::new();
        for node in &self.nodes {
            if matches!(
                node.category(),
                NodeCategory::Question | NodeCategory::Option | NodeCategory::End
            ) {
                indices.insert(node.id.clone(), graph.add_node(node.id.clone()));
            }
        }
        for edge in self.logical_edges() {
            if let (Some(&from), Some(&to)) = (indices.get(&edge.source), indices.get(&edge.target)) {
                graph.add_edge(from, to, edge.kind);
            }
        }
        (graph, indices)
    }
}
