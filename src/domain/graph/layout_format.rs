//! JSON encoding of the persisted layout, including the older shapes still
//! found in local storage.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{EdgeRoute, FlowGraph, PersistedLayout, Point};
use crate::domain::foundation::{EdgeId, NodeId};

pub const LAYOUT_FORMAT_VERSION: u32 = 2;

#[derive(Serialize)]
struct EncodedLayout<'a> {
    version: u32,
    positions: &'a BTreeMap<NodeId, Point>,
    edges: &'a BTreeMap<EdgeId, EdgeRoute>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredLayout {
    Versioned {
        #[allow(dead_code)]
        version: u32,
        #[serde(default)]
        positions: BTreeMap<NodeId, Point>,
        #[serde(default)]
        edges: BTreeMap<EdgeId, EdgeRoute>,
    },
    WaypointLists {
        positions: BTreeMap<NodeId, Point>,
        #[serde(default)]
        waypoints: BTreeMap<EdgeId, Vec<Point>>,
    },
    PositionsOnly(BTreeMap<NodeId, Point>),
}

pub fn encode_layout(layout: &PersistedLayout) -> Result<String, serde_json::Error> {
    serde_json::to_string(&EncodedLayout {
        version: LAYOUT_FORMAT_VERSION,
        positions: &layout.positions,
        edges: &layout.edges,
    })
}

/// Decodes any known layout shape. Waypoint lists keyed only by edge id get
/// their endpoints back by matching the id against nodes of `graph`.
pub fn decode_layout(json: &str, graph: &FlowGraph) -> Result<PersistedLayout, serde_json::Error> {
    let stored: StoredLayout = serde_json::from_str(json)?;
    let layout = match stored {
        StoredLayout::Versioned {
            positions, edges, ..
        } => PersistedLayout { positions, edges },
        StoredLayout::WaypointLists {
            positions,
            waypoints,
        } => {
            let edges = waypoints
                .into_iter()
                .filter_map(|(id, waypoints)| {
                    let (source, target) = split_edge_id(&id, graph)?;
                    Some((
                        id,
                        EdgeRoute {
                            source,
                            target,
                            waypoints,
                        },
                    ))
                })
                .collect();
            PersistedLayout { positions, edges }
        }
        StoredLayout::PositionsOnly(positions) => PersistedLayout {
            positions,
            edges: BTreeMap::new(),
        },
    };
    Ok(layout)
}

/// Splits `e-{source}-{target}` at the first dash for which both halves
/// name nodes of `graph`. Node ids contain dashes themselves, so the split
/// point cannot be found syntactically.
fn split_edge_id(id: &EdgeId, graph: &FlowGraph) -> Option<(NodeId, NodeId)> {
    let body = id.as_str().strip_prefix("e-")?;
    body.match_indices('-').find_map(|(at, _)| {
        let source = NodeId::from_raw(&body[..at]);
        let target = NodeId::from_raw(&body[at + 1..]);
        (graph.contains_node(&source) && graph.contains_node(&target)).then_some((source, target))
    })
}
