//! Network-subsystem error types.

use thiserror::Error;

use pr_core::{GeoPoint, NodeId};

/// Errors from loading a graph or querying it by id.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("graph document is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid graph: {0}")]
    Invalid(String),

    #[error("edge {from} -> {to} references unknown node {missing}")]
    UnknownNode { from: i64, to: i64, missing: i64 },

    #[error("node id {0} appears more than once")]
    DuplicateNode(i64),

    #[error("node {0} not found in network")]
    NodeNotFound(NodeId),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type NetworkResult<T> = Result<T, NetworkError>;

/// Why a point or polygon could not be mapped to a graph node.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SnapError {
    #[error("network has no edges to snap to")]
    EmptyNetwork,

    #[error("{0} lies outside the network's coordinate domain")]
    OutsideDomain(GeoPoint),

    #[error("polygon has no usable boundary or interior point")]
    DegenerateGeometry,
}
