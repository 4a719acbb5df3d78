//! Layout pass for the editor graph.
//!
//! 1. Hierarchical placement of question/option/end nodes: rank by
//!    breadth-first distance from the roots, siblings spread on one row.
//! 2. Saved manual positions override computed ones.
//! 3. Documents go in a column left of everything else, ordered by the mean
//!    height of the options that reference them, with a minimum gap.
//! 4. Saved waypoint routes are re-attached and the direct edges they
//!    replace are dropped.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, VecDeque};
use tracing::debug;

use super::{EdgeKind, FlowEdge, FlowGraph, FlowNode, NodeCategory, Point};
use crate::domain::foundation::{EdgeId, NodeId};

/// Spacing used by the automatic layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutSettings {
    /// Vertical distance between ranks.
    pub rank_spacing: f64,
    /// Horizontal distance between siblings within a rank.
    pub node_spacing: f64,
    /// Horizontal distance between the document column and the leftmost node.
    pub document_column_gap: f64,
    /// Minimum vertical distance between consecutive documents.
    pub document_min_gap: f64,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            rank_spacing: 150.0,
            node_spacing: 220.0,
            document_column_gap: 320.0,
            document_min_gap: 140.0,
        }
    }
}

/// A saved waypoint route for one logical edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRoute {
    pub source: NodeId,
    pub target: NodeId,
    #[serde(default)]
    pub waypoints: Vec<Point>,
}

/// Manual positions and waypoint routes that survive reloads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedLayout {
    #[serde(default)]
    pub positions: BTreeMap<NodeId, Point>,
    #[serde(default)]
    pub edges: BTreeMap<EdgeId, EdgeRoute>,
}

impl PersistedLayout {
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() && self.edges.is_empty()
    }
}

/// Runs the full layout pass on `graph` in place.
pub fn apply_layout(graph: &mut FlowGraph, settings: &LayoutSettings, saved: &PersistedLayout) {
    let mut positions = hierarchical_positions(graph, settings);

    for (id, point) in &saved.positions {
        if let Some(node) = graph.node(id) {
            if node.category() != NodeCategory::Document {
                positions.insert(id.clone(), *point);
            }
        }
    }

    for (id, point) in &positions {
        if let Some(node) = graph.node_mut(id) {
            node.position = *point;
        }
    }

    place_documents(graph, settings, saved);
    attach_routes(graph, saved);
}

/// Computes rank-based positions for every non-document, non-waypoint node.
pub fn hierarchical_positions(graph: &FlowGraph, settings: &LayoutSettings) -> HashMap<NodeId, Point> {
    let (digraph, indices) = graph.routing_digraph();
    let order: Vec<&NodeId> = graph
        .nodes()
        .iter()
        .map(|node| &node.id)
        .filter(|id| indices.contains_key(*id))
        .collect();

    let mut ranks: HashMap<&NodeId, usize> = HashMap::new();
    let mut queue = VecDeque::new();
    for id in &order {
        let index = indices[*id];
        let has_parent = digraph
            .neighbors_directed(index, petgraph::Direction::Incoming)
            .next()
            .is_some();
        if !has_parent {
            ranks.insert(*id, 0);
            queue.push_back(index);
        }
    }

    while let Some(index) = queue.pop_front() {
        let rank = ranks[&digraph[index]];
        for next in digraph.neighbors_directed(index, petgraph::Direction::Outgoing) {
            let next_id = &digraph[next];
            if !ranks.contains_key(next_id) {
                ranks.insert(next_id, rank + 1);
                queue.push_back(next);
            }
        }
    }

    // Nodes only reachable through a cycle sit one rank below their
    // deepest ranked parent.
    for id in &order {
        if ranks.contains_key(*id) {
            continue;
        }
        let index = indices[*id];
        let rank = digraph
            .neighbors_directed(index, petgraph::Direction::Incoming)
            .filter_map(|parent| ranks.get(&digraph[parent]).map(|rank| rank + 1))
            .max()
            .unwrap_or(0);
        ranks.insert(*id, rank);
    }

    let mut layers: BTreeMap<usize, Vec<&NodeId>> = BTreeMap::new();
    for id in &order {
        layers.entry(ranks[*id]).or_default().push(*id);
    }

    let mut positions = HashMap::new();
    for (rank, ids) in layers {
        let span = settings.node_spacing * (ids.len().saturating_sub(1)) as f64;
        let start_x = -span / 2.0;
        let y = rank as f64 * settings.rank_spacing;
        for (column, id) in ids.into_iter().enumerate() {
            let x = start_x + column as f64 * settings.node_spacing;
            positions.insert(id.clone(), Point::new(x, y));
        }
    }
    positions
}

fn place_documents(graph: &mut FlowGraph, settings: &LayoutSettings, saved: &PersistedLayout) {
    let column_x = graph
        .nodes()
        .iter()
        .filter(|node| !matches!(node.category(), NodeCategory::Document | NodeCategory::Waypoint))
        .map(|node| node.position.x)
        .fold(None, |min: Option<f64>, x| Some(min.map_or(x, |m| m.min(x))))
        .unwrap_or(0.0)
        - settings.document_column_gap;

    let logical = graph.logical_edges();
    let mut anchored: Vec<(NodeId, Option<f64>)> = graph
        .nodes_of(NodeCategory::Document)
        .filter(|node| !saved.positions.contains_key(&node.id))
        .map(|node| {
            let ys: Vec<f64> = logical
                .iter()
                .filter(|edge| edge.target == node.id && edge.kind == EdgeKind::OptionToDocument)
                .filter_map(|edge| graph.node(&edge.source).map(|source| source.position.y))
                .collect();
            let mean = if ys.is_empty() {
                None
            } else {
                Some(ys.iter().sum::<f64>() / ys.len() as f64)
            };
            (node.id.clone(), mean)
        })
        .collect();

    // Referenced documents first, by mean height; unreferenced ones after,
    // in graph order.
    anchored.sort_by(|(_, a), (_, b)| match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(b),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });

    let mut previous: Option<f64> = None;
    for (id, mean) in anchored {
        let wanted = mean.unwrap_or_else(|| previous.map_or(0.0, |p| p + settings.document_min_gap));
        let y = match previous {
            Some(p) if wanted < p + settings.document_min_gap => p + settings.document_min_gap,
            _ => wanted,
        };
        if let Some(node) = graph.node_mut(&id) {
            node.position = Point::new(column_x, y);
        }
        previous = Some(y);
    }

    for (id, point) in &saved.positions {
        if let Some(node) = graph.node_mut(id) {
            if node.category() == NodeCategory::Document {
                node.position = *point;
            }
        }
    }
}

fn attach_routes(graph: &mut FlowGraph, saved: &PersistedLayout) {
    for (edge_id, route) in &saved.edges {
        if route.waypoints.is_empty() {
            continue;
        }
        let endpoints = (graph.node(&route.source), graph.node(&route.target));
        let (Some(source), Some(target)) = endpoints else {
            continue;
        };
        if source.is_waypoint() || target.is_waypoint() {
            continue;
        }
        // A route only re-attaches to a connection the questionnaire still has.
        let direct_kind = graph
            .outgoing(&route.source)
            .find(|edge| edge.target == route.target)
            .map(|edge| edge.kind);
        let Some(kind) = direct_kind else {
            debug!(edge = %edge_id, "Skipping saved route without a matching edge");
            continue;
        };
        let already_routed = graph
            .logical_edges()
            .iter()
            .any(|edge| edge.source == route.source && edge.target == route.target && !edge.via.is_empty());
        if already_routed {
            continue;
        }

        let mut chain = vec![route.source.clone()];
        for (ordinal, point) in route.waypoints.iter().enumerate() {
            let id = NodeId::waypoint(edge_id, ordinal);
            if graph.add_node(FlowNode::waypoint(id.clone(), *point)).is_err() {
                if let Some(node) = graph.node_mut(&id) {
                    node.position = *point;
                }
            }
            chain.push(id);
        }
        chain.push(route.target.clone());

        for pair in chain.windows(2) {
            let _ = graph.insert_edge(FlowEdge::new(pair[0].clone(), pair[1].clone(), kind));
        }
    }

    remove_superseded_edges(graph);
}

/// Drops every direct edge whose endpoints are also joined through a
/// waypoint chain.
pub fn remove_superseded_edges(graph: &mut FlowGraph) -> usize {
    let superseded: Vec<EdgeId> = graph
        .logical_edges()
        .into_iter()
        .filter(|edge| !edge.via.is_empty())
        .filter_map(|edge| {
            graph
                .outgoing(&edge.source)
                .find(|direct| direct.target == edge.target)
                .map(|direct| direct.id.clone())
        })
        .collect();
    let count = superseded.len();
    for id in superseded {
        graph.remove_edge(&id);
    }
    count
}

/// Captures what must be persisted: the given manual positions plus the
/// waypoint route of every chained edge.
pub fn capture_layout<'a>(
    graph: &FlowGraph,
    manual: impl IntoIterator<Item = &'a NodeId>,
) -> PersistedLayout {
    let positions = manual
        .into_iter()
        .filter_map(|id| graph.node(id))
        .filter(|node| !node.is_waypoint())
        .map(|node| (node.id.clone(), node.position))
        .collect();

    let edges = graph
        .logical_edges()
        .into_iter()
        .filter(|edge| !edge.via.is_empty())
        .map(|edge| {
            let waypoints = edge
                .via
                .iter()
                .filter_map(|id| graph.node(id).map(|node| node.position))
                .collect();
            (
                edge.id(),
                EdgeRoute {
                    source: edge.source,
                    target: edge.target,
                    waypoints,
                },
            )
        })
        .collect();

    PersistedLayout { positions, edges }
}
