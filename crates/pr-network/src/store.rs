//! Per-mode graph registry.
//!
//! Filled once at startup, then only read.  Every network passes through
//! [`retain_largest_component`] on its way in; there is no way to publish an
//! unpruned graph.

use std::collections::BTreeMap;
use std::path::Path;

use pr_core::TravelMode;

use crate::components::retain_largest_component;
use crate::loader::{load_graph_json, load_graph_path};
use crate::network::RoadNetwork;
use crate::NetworkResult;

#[derive(Default)]
pub struct GraphStore {
    graphs: BTreeMap<TravelMode, RoadNetwork>,
}

impl GraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prune `network` and register it for `mode`, replacing any earlier one.
    pub fn insert(&mut self, mode: TravelMode, network: RoadNetwork) -> &RoadNetwork {
        let pruned = retain_largest_component(network);
        self.graphs.insert(mode, pruned);
        &self.graphs[&mode]
    }

    /// Parse a JSON graph document and [`insert`](Self::insert) it.
    pub fn load(&mut self, mode: TravelMode, bytes: &[u8]) -> NetworkResult<&RoadNetwork> {
        let network = load_graph_json(bytes, mode)?;
        Ok(self.insert(mode, network))
    }

    /// Read a JSON graph document from disk and [`insert`](Self::insert) it.
    pub fn load_path(&mut self, mode: TravelMode, path: &Path) -> NetworkResult<&RoadNetwork> {
        let network = load_graph_path(path, mode)?;
        Ok(self.insert(mode, network))
    }

    pub fn get(&self, mode: TravelMode) -> Option<&RoadNetwork> {
        self.graphs.get(&mode)
    }

    /// Configured modes in `drive`, `walk` order.
    pub fn modes(&self) -> impl Iterator<Item = TravelMode> + '_ {
        self.graphs.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.graphs.is_empty()
    }
}
