//! JSON graph loader.
//!
//! # Document format
//!
//! ```json
//! {
//!   "nodes": [ { "id": 53017, "x": -122.3396, "y": 48.4181 }, ... ],
//!   "edges": [ { "u": 53017, "v": 53018, "key": 0,
//!                "travel_time": 12.4, "length": 151.0 }, ... ]
//! }
//! ```
//!
//! * `x`/`y` are planar coordinates, conventionally lon/lat.
//! * Each edge is directed `u → v`.  Exports that list both directions of a
//!   two-way street need nothing else; set `"bidirectional": true` to have
//!   the loader add the reverse edge.
//! * `travel_time` is in seconds.  When absent it is inferred from `length`
//!   and the mode's default speed; when `length` is absent too it is the
//!   great-circle distance between the endpoints.
//! * `key` (parallel-edge discriminator) and any other attributes are
//!   accepted and ignored.  Parallel edges are all kept; Dijkstra takes the
//!   cheapest.
//!
//! Decompression and download of the document happen upstream; this module
//! only sees bytes.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use log::{debug, info};
use rustc_hash::FxHashMap;
use serde::Deserialize;

use pr_core::{GeoPoint, NodeId, TravelMode};

use crate::network::{RoadNetwork, RoadNetworkBuilder};
use crate::{NetworkError, NetworkResult};

// ── Document records ──────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct GraphDocument {
    nodes: Vec<NodeRecord>,
    #[serde(default)]
    edges: Vec<EdgeRecord>,
}

#[derive(Deserialize)]
struct NodeRecord {
    id: i64,
    x:  f64,
    y:  f64,
}

#[derive(Deserialize)]
struct EdgeRecord {
    u: i64,
    v: i64,
    #[serde(default)]
    travel_time: Option<f64>,
    #[serde(default)]
    length: Option<f64>,
    #[serde(default)]
    bidirectional: bool,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Parse a graph document held in memory.
///
/// # Errors
///
/// [`NetworkError::Json`] for malformed JSON, [`NetworkError::DuplicateNode`]
/// and [`NetworkError::UnknownNode`] for inconsistent ids, and
/// [`NetworkError::Invalid`] for non-finite coordinates or unusable weights.
pub fn load_graph_json(bytes: &[u8], mode: TravelMode) -> NetworkResult<RoadNetwork> {
    let doc: GraphDocument = serde_json::from_slice(bytes)?;
    build_from_document(doc, mode)
}

/// Like [`load_graph_json`] but streams from any `Read` source.
pub fn load_graph_reader<R: Read>(reader: R, mode: TravelMode) -> NetworkResult<RoadNetwork> {
    let doc: GraphDocument = serde_json::from_reader(reader)?;
    build_from_document(doc, mode)
}

/// Load a graph document from a file.
pub fn load_graph_path(path: &Path, mode: TravelMode) -> NetworkResult<RoadNetwork> {
    info!("loading {mode} graph from {}", path.display());
    let file = File::open(path)?;
    load_graph_reader(BufReader::new(file), mode)
}

// ── Internals ─────────────────────────────────────────────────────────────────

fn build_from_document(doc: GraphDocument, mode: TravelMode) -> NetworkResult<RoadNetwork> {
    let mut builder = RoadNetworkBuilder::with_capacity(doc.nodes.len(), doc.edges.len() * 2);
    let mut by_ext: FxHashMap<i64, NodeId> = FxHashMap::default();
    by_ext.reserve(doc.nodes.len());

    for node in &doc.nodes {
        if !node.x.is_finite() || !node.y.is_finite() {
            return Err(NetworkError::Invalid(format!(
                "node {} has non-finite coordinates ({}, {})",
                node.id, node.x, node.y
            )));
        }
        let id = builder.add_node(node.id, GeoPoint::from_xy(node.x, node.y));
        if by_ext.insert(node.id, id).is_some() {
            return Err(NetworkError::DuplicateNode(node.id));
        }
    }

    let mut inferred = 0usize;
    for edge in &doc.edges {
        let resolve = |ext: i64| {
            by_ext.get(&ext).copied().ok_or(NetworkError::UnknownNode {
                from:    edge.u,
                to:      edge.v,
                missing: ext,
            })
        };
        let from = resolve(edge.u)?;
        let to   = resolve(edge.v)?;

        let length_m = match edge.length {
            Some(len) => len,
            None => builder.node_pos(from).distance_m(builder.node_pos(to)),
        };
        let travel_secs = match edge.travel_time {
            Some(t) => t,
            None => {
                inferred += 1;
                length_m / mode.default_speed_mps()
            }
        };
        let travel_ms = to_millis(travel_secs).ok_or_else(|| {
            NetworkError::Invalid(format!(
                "edge {} -> {} has unusable travel time {travel_secs}",
                edge.u, edge.v
            ))
        })?;
        if !length_m.is_finite() || length_m < 0.0 {
            return Err(NetworkError::Invalid(format!(
                "edge {} -> {} has unusable length {length_m}",
                edge.u, edge.v
            )));
        }

        if edge.bidirectional {
            builder.add_road(from, to, length_m, travel_ms);
        } else {
            builder.add_directed_edge(from, to, length_m, travel_ms);
        }
    }

    if inferred > 0 {
        debug!("{inferred} {mode} edges had no travel_time; inferred from length");
    }

    let network = builder.build();
    info!(
        "parsed {mode} graph: {} nodes, {} edges",
        network.node_count(),
        network.edge_count()
    );
    Ok(network)
}

/// Seconds → whole milliseconds; `None` for negative, non-finite, or
/// values that would collide with the `u32::MAX` "unreached" sentinel.
fn to_millis(secs: f64) -> Option<u32> {
    let ms = (secs * 1_000.0).round();
    (ms.is_finite() && ms >= 0.0 && ms < f64::from(u32::MAX)).then_some(ms as u32)
}
