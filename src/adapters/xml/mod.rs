//! XML Adapter
//!
//! Reads and writes the `<questions>` document format.
//!
//! ## Pipeline
//!
//! - **parse_questionnaire** - XML text to typed [`Questionnaire`]
//! - **write_questionnaire** - typed [`Questionnaire`] to canonical XML
//! - **parse_graph** / **serialize_graph** - the same, through the editor graph
//!
//! [`Questionnaire`]: crate::domain::questionnaire::Questionnaire

mod element;
mod error;
mod reader;
mod writer;

pub use element::{parse_document, Element};
pub use error::XmlError;
pub use reader::parse_questionnaire;
pub use writer::write_questionnaire;

use crate::domain::graph::{
    apply_layout, build_graph, read_graph, FlowGraph, LayoutSettings, PersistedLayout,
};

/// Parses XML into a laid-out editor graph.
pub fn parse_graph(
    xml: &str,
    settings: &LayoutSettings,
    saved: &PersistedLayout,
) -> Result<FlowGraph, XmlError> {
    let questionnaire = parse_questionnaire(xml)?;
    let mut graph = build_graph(&questionnaire);
    apply_layout(&mut graph, settings, saved);
    Ok(graph)
}

/// Serializes an editor graph back to canonical XML.
pub fn serialize_graph(graph: &FlowGraph) -> Result<String, XmlError> {
    write_questionnaire(&read_graph(graph))
}
