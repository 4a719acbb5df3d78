//! Session-scoped editor state.
//!
//! An [`EditorSession`] owns one graph, the set of nodes the user has moved
//! by hand, and the undo/redo history. Every applied edit records a snapshot
//! first; a rejected edit changes nothing and records nothing.

use std::collections::BTreeSet;
use tracing::debug;

use super::{
    apply_layout, capture_layout, read_graph, ConnectRejection, EdgeKind, EditHistory, FlowEdge,
    FlowGraph, FlowNode, LayoutSettings, NodeCategory, NodeKind, PersistedLayout, Point,
};
use crate::domain::foundation::{
    compare_authored_ids, DocumentIndex, EdgeId, EndNodeId, NodeId, OptionId, QuestionId,
};
use crate::domain::questionnaire::{DocumentType, Questionnaire};

/// Result of an edit request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    Applied,
    Rejected(ConnectRejection),
}

impl EditOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, EditOutcome::Applied)
    }
}

#[derive(Debug, Clone)]
struct Snapshot {
    graph: FlowGraph,
    manual: BTreeSet<NodeId>,
}

#[derive(Debug, Clone)]
pub struct EditorSession {
    graph: FlowGraph,
    manual: BTreeSet<NodeId>,
    history: EditHistory<Snapshot>,
    settings: LayoutSettings,
}

impl EditorSession {
    /// Wraps a laid-out graph. Nodes with a saved position count as moved.
    pub fn new(graph: FlowGraph, settings: LayoutSettings, saved: &PersistedLayout) -> Self {
        let manual = saved
            .positions
            .keys()
            .filter(|id| graph.contains_node(id))
            .cloned()
            .collect();
        Self {
            graph,
            manual,
            history: EditHistory::default(),
            settings,
        }
    }

    /// Builds a session from a questionnaire, running the layout pass.
    pub fn from_questionnaire(
        questionnaire: &Questionnaire,
        settings: LayoutSettings,
        saved: &PersistedLayout,
    ) -> Self {
        let mut graph = super::build_graph(questionnaire);
        apply_layout(&mut graph, &settings, saved);
        Self::new(graph, settings, saved)
    }

    pub fn graph(&self) -> &FlowGraph {
        &self.graph
    }

    pub fn manual_positions(&self) -> &BTreeSet<NodeId> {
        &self.manual
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn to_questionnaire(&self) -> Questionnaire {
        read_graph(&self.graph)
    }

    pub fn layout_snapshot(&self) -> PersistedLayout {
        capture_layout(&self.graph, &self.manual)
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            graph: self.graph.clone(),
            manual: self.manual.clone(),
        }
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.graph = snapshot.graph;
        self.manual = snapshot.manual;
    }

    /// Runs `edit` against a scratch copy and commits it with an undo point
    /// only if it succeeds.
    fn apply<R>(
        &mut self,
        edit: impl FnOnce(&mut FlowGraph, &mut BTreeSet<NodeId>) -> Result<R, ConnectRejection>,
    ) -> Result<R, ConnectRejection> {
        let before = self.snapshot();
        let mut graph = self.graph.clone();
        let mut manual = self.manual.clone();
        match edit(&mut graph, &mut manual) {
            Ok(result) => {
                self.history.record(before);
                self.graph = graph;
                self.manual = manual;
                Ok(result)
            }
            Err(rejection) => {
                debug!(%rejection, "Edit rejected");
                Err(rejection)
            }
        }
    }

    fn outcome<R>(result: Result<R, ConnectRejection>) -> EditOutcome {
        match result {
            Ok(_) => EditOutcome::Applied,
            Err(rejection) => EditOutcome::Rejected(rejection),
        }
    }

    pub fn undo(&mut self) -> bool {
        let current = self.snapshot();
        match self.history.undo(current) {
            Some(previous) => {
                self.restore(previous);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        let current = self.snapshot();
        match self.history.redo(current) {
            Some(next) => {
                self.restore(next);
                true
            }
            None => false,
        }
    }

    /// Drags a node. The node keeps this position across reloads.
    pub fn move_node(&mut self, id: &NodeId, to: Point) -> EditOutcome {
        Self::outcome(self.apply(|graph, manual| {
            let node = graph
                .node_mut(id)
                .ok_or_else(|| ConnectRejection::UnknownNode(id.clone()))?;
            node.position = to;
            if !node.is_waypoint() {
                manual.insert(id.clone());
            }
            Ok(())
        }))
    }

    pub fn connect(&mut self, source: &NodeId, target: &NodeId) -> EditOutcome {
        Self::outcome(self.apply(|graph, _| graph.connect(source, target)))
    }

    /// Removes an edge. Removing any segment of a waypoint chain removes the
    /// whole chain.
    pub fn disconnect(&mut self, edge: &EdgeId) -> EditOutcome {
        Self::outcome(self.apply(|graph, _| {
            graph
                .remove_edge(edge)
                .ok_or_else(|| ConnectRejection::UnknownEdge(edge.clone()))?;
            graph.prune_orphan_waypoints();
            Ok(())
        }))
    }

    /// Deletes a node with its edges. Deleting a question also deletes its
    /// options; deleting a waypoint splices its neighbours together.
    pub fn delete_node(&mut self, id: &NodeId) -> EditOutcome {
        Self::outcome(self.apply(|graph, manual| {
            let node = graph
                .node(id)
                .cloned()
                .ok_or_else(|| ConnectRejection::UnknownNode(id.clone()))?;

            match &node.kind {
                NodeKind::Question { question_id, .. } => {
                    let options: Vec<NodeId> = graph
                        .nodes()
                        .iter()
                        .filter(|candidate| {
                            matches!(&candidate.kind, NodeKind::AnswerOption { question_id: owner, .. } if owner == question_id)
                        })
                        .map(|candidate| candidate.id.clone())
                        .collect();
                    for option in options {
                        graph.remove_node(&option);
                        manual.remove(&option);
                    }
                    graph.remove_node(id);
                }
                NodeKind::Waypoint => {
                    let incoming = graph.incoming(id).next().cloned();
                    let outgoing = graph.outgoing(id).next().cloned();
                    graph.remove_node(id);
                    if let (Some(incoming), Some(outgoing)) = (incoming, outgoing) {
                        let _ = graph.insert_edge(FlowEdge::new(
                            incoming.source,
                            outgoing.target,
                            incoming.kind,
                        ));
                    }
                }
                _ => {
                    graph.remove_node(id);
                }
            }
            manual.remove(id);
            graph.prune_orphan_waypoints();
            Ok(())
        }))
    }

    /// Changes the visible text of a question, option, document or end node.
    pub fn relabel(&mut self, id: &NodeId, text: impl Into<String>) -> EditOutcome {
        let text = text.into();
        Self::outcome(self.apply(|graph, _| {
            let node = graph
                .node_mut(id)
                .ok_or_else(|| ConnectRejection::UnknownNode(id.clone()))?;
            match &mut node.kind {
                NodeKind::Question { text: value, .. }
                | NodeKind::AnswerOption { label: value, .. }
                | NodeKind::Document { title: value, .. }
                | NodeKind::End { label: value, .. } => {
                    *value = text;
                    Ok(())
                }
                NodeKind::Waypoint => Err(ConnectRejection::IncompatibleEndpoints {
                    source: NodeCategory::Waypoint,
                    target: NodeCategory::Waypoint,
                }),
            }
        }))
    }

    pub fn set_tooltip(&mut self, id: &NodeId, tooltip: Option<String>) -> EditOutcome {
        let tooltip = tooltip.filter(|t| !t.trim().is_empty());
        Self::outcome(self.apply(|graph, _| match graph.node_mut(id).map(|n| &mut n.kind) {
            Some(NodeKind::Question { tooltip: value, .. }) => {
                *value = tooltip;
                Ok(())
            }
            _ => Err(ConnectRejection::UnknownNode(id.clone())),
        }))
    }

    pub fn set_description(&mut self, id: &NodeId, description: Option<String>) -> EditOutcome {
        let description = description.filter(|d| !d.trim().is_empty());
        Self::outcome(self.apply(|graph, _| match graph.node_mut(id).map(|n| &mut n.kind) {
            Some(NodeKind::Document {
                description: value, ..
            }) => {
                *value = description;
                Ok(())
            }
            _ => Err(ConnectRejection::UnknownNode(id.clone())),
        }))
    }

    pub fn set_document_type(&mut self, id: &NodeId, kind: DocumentType) -> EditOutcome {
        Self::outcome(self.apply(|graph, _| match graph.node_mut(id).map(|n| &mut n.kind) {
            Some(NodeKind::Document { document_type, .. }) => {
                *document_type = kind;
                Ok(())
            }
            _ => Err(ConnectRejection::UnknownNode(id.clone())),
        }))
    }

    /// Adds a question with the next free numeric id, one rank below the
    /// lowest node.
    pub fn add_question(&mut self, text: impl Into<String>) -> Result<NodeId, ConnectRejection> {
        let text = text.into();
        let below = self.lowest_y() + self.settings.rank_spacing;
        self.apply(|graph, _| {
            let taken: Vec<&str> = graph
                .nodes()
                .iter()
                .filter_map(|node| match &node.kind {
                    NodeKind::Question { question_id, .. } => Some(question_id.as_str()),
                    _ => None,
                })
                .collect();
            let question_id = QuestionId::new(next_free_id(&taken))
                .map_err(|_| ConnectRejection::UnknownNode(NodeId::from_raw("q")))?;
            let mut node = FlowNode::question(question_id, text, None);
            node.position = Point::new(0.0, below);
            let id = node.id.clone();
            graph.add_node(node)?;
            Ok(id)
        })
    }

    /// Adds an option to a question and links it.
    pub fn add_option(
        &mut self,
        question: &NodeId,
        label: impl Into<String>,
    ) -> Result<NodeId, ConnectRejection> {
        let label = label.into();
        let spacing = self.settings.rank_spacing;
        self.apply(|graph, _| {
            let parent = graph
                .node(question)
                .ok_or_else(|| ConnectRejection::UnknownNode(question.clone()))?;
            let NodeKind::Question { question_id, .. } = &parent.kind else {
                return Err(ConnectRejection::IncompatibleEndpoints {
                    source: parent.category(),
                    target: NodeCategory::Option,
                });
            };
            let question_id = question_id.clone();
            let parent_position = parent.position;
            let taken: Vec<&str> = graph
                .nodes()
                .iter()
                .filter_map(|node| match &node.kind {
                    NodeKind::AnswerOption {
                        question_id: owner,
                        option_id,
                        ..
                    } if owner == &question_id => Some(option_id.as_str()),
                    _ => None,
                })
                .collect();
            let siblings = taken.len();
            let option_id = OptionId::new(next_free_id(&taken))
                .map_err(|_| ConnectRejection::UnknownNode(question.clone()))?;

            let mut node = FlowNode::option(question_id, option_id, label);
            node.position = Point::new(
                parent_position.x + siblings as f64 * spacing,
                parent_position.y + spacing,
            );
            let id = node.id.clone();
            graph.add_node(node)?;
            graph.insert_edge(FlowEdge::new(question.clone(), id.clone(), EdgeKind::QuestionToOption))?;
            Ok(id)
        })
    }

    pub fn add_document(
        &mut self,
        title: impl Into<String>,
        kind: DocumentType,
    ) -> Result<NodeId, ConnectRejection> {
        let title = title.into();
        self.apply(|graph, _| {
            let index = graph
                .nodes_of(NodeCategory::Document)
                .filter_map(|node| match &node.kind {
                    NodeKind::Document { index, .. } => Some(index.value() + 1),
                    _ => None,
                })
                .max()
                .unwrap_or(0);
            let node = FlowNode::document(DocumentIndex::new(index), title, None, kind);
            let id = node.id.clone();
            graph.add_node(node)?;
            Ok(id)
        })
    }

    pub fn add_end_node(&mut self, label: impl Into<String>) -> Result<NodeId, ConnectRejection> {
        let label = label.into();
        let below = self.lowest_y() + self.settings.rank_spacing;
        self.apply(|graph, _| {
            let taken: Vec<&str> = graph
                .nodes()
                .iter()
                .filter_map(|node| match &node.kind {
                    NodeKind::End { end_id, .. } => Some(end_id.as_str()),
                    _ => None,
                })
                .collect();
            let end_id = EndNodeId::new(next_free_id(&taken))
                .map_err(|_| ConnectRejection::UnknownNode(NodeId::from_raw("end")))?;
            let mut node = FlowNode::end(end_id, label);
            node.position = Point::new(0.0, below);
            let id = node.id.clone();
            graph.add_node(node)?;
            Ok(id)
        })
    }

    /// Splits an edge with a waypoint at `at`.
    pub fn insert_waypoint(&mut self, edge: &EdgeId, at: Point) -> Result<NodeId, ConnectRejection> {
        self.apply(|graph, _| {
            let split = graph
                .edge(edge)
                .cloned()
                .ok_or_else(|| ConnectRejection::UnknownEdge(edge.clone()))?;
            let logical = graph
                .logical_edges()
                .into_iter()
                .find(|candidate| {
                    let path: Vec<&NodeId> = std::iter::once(&candidate.source)
                        .chain(candidate.via.iter())
                        .chain(std::iter::once(&candidate.target))
                        .collect();
                    path.windows(2)
                        .any(|pair| pair[0] == &split.source && pair[1] == &split.target)
                })
                .map(|candidate| candidate.id())
                .unwrap_or_else(|| edge.clone());

            let mut ordinal = 0;
            let id = loop {
                let id = NodeId::waypoint(&logical, ordinal);
                if !graph.contains_node(&id) {
                    break id;
                }
                ordinal += 1;
            };

            graph.add_node(FlowNode::waypoint(id.clone(), at))?;
            graph.remove_edge(edge);
            graph.insert_edge(FlowEdge::new(split.source.clone(), id.clone(), split.kind))?;
            graph.insert_edge(FlowEdge::new(id.clone(), split.target.clone(), split.kind))?;
            Ok(id)
        })
    }

    /// Forgets manual positions and lays the graph out from scratch.
    /// Waypoint routes are kept.
    pub fn relayout(&mut self) -> EditOutcome {
        let settings = self.settings;
        Self::outcome(self.apply(|graph, manual| {
            manual.clear();
            let routes = capture_layout(graph, std::iter::empty());
            apply_layout(graph, &settings, &routes);
            Ok(())
        }))
    }

    fn lowest_y(&self) -> f64 {
        self.graph
            .nodes()
            .iter()
            .filter(|node| node.category() != NodeCategory::Document)
            .map(|node| node.position.y)
            .fold(0.0, f64::max)
    }
}

/// One past the largest numeric id in `taken`, or `taken.len() + 1` when
/// none are numeric, skipping anything already in use.
fn next_free_id(taken: &[&str]) -> String {
    let mut candidate = taken
        .iter()
        .filter_map(|id| id.parse::<u64>().ok())
        .max()
        .map(|max| max + 1)
        .unwrap_or(taken.len() as u64 + 1);
    while taken
        .iter()
        .any(|id| compare_authored_ids(id, &candidate.to_string()).is_eq())
    {
        candidate += 1;
    }
    candidate.to_string()
}
