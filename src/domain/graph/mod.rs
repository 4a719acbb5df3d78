//! Editable node/edge graph of a questionnaire.
//!
//! The graph is the editor's view of the data: every question, option,
//! document and end node becomes a positioned node, routing and document
//! conditions become edges. [`build_graph`] and [`read_graph`] convert
//! between the two representations; [`EditorSession`] applies user edits
//! with undo/redo.

mod builder;
mod edge;
mod editor;
mod flow_graph;
mod history;
mod layout;
mod layout_format;
mod node;
mod reader;

pub use builder::build_graph;
pub use edge::{EdgeKind, FlowEdge, LogicalEdge};
pub use editor::{EditOutcome, EditorSession};
pub use flow_graph::{ConnectRejection, FlowGraph};
pub use history::{EditHistory, HISTORY_LIMIT};
pub use layout::{
    apply_layout, capture_layout, hierarchical_positions, remove_superseded_edges, EdgeRoute,
    LayoutSettings, PersistedLayout,
};
pub use layout_format::{decode_layout, encode_layout, LAYOUT_FORMAT_VERSION};
pub use node::{FlowNode, NodeCategory, NodeKind, Point};
pub use reader::read_graph;
