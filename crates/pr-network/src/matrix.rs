//! Shortest-path travel times and the stop-to-stop time matrix.
//!
//! # Cost units
//!
//! Searches run on integer milliseconds (`edge_travel_ms`) with
//! `u32::MAX` as "not reached".  [`TimeMatrix`] cells are `f64` seconds with
//! `f64::INFINITY` for unreachable pairs.
//!
//! # Complexity
//!
//! One full single-source Dijkstra per *distinct* stop node:
//! O(n · (V + E) log V).  Callers must bound `n` per request.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use log::debug;
use rustc_hash::FxHashMap;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use pr_core::{NodeId, TimeMatrix};

use crate::network::RoadNetwork;
use crate::{NetworkError, NetworkResult};

/// Single-source Dijkstra over the whole network.
///
/// Returns the best known cost (ms) to every node, `u32::MAX` where no path
/// exists.
pub fn shortest_times(network: &RoadNetwork, source: NodeId) -> NetworkResult<Vec<u32>> {
    if !network.contains(source) {
        return Err(NetworkError::NodeNotFound(source));
    }

    let mut dist = vec![u32::MAX; network.node_count()];
    dist[source.index()] = 0;

    // Min-heap via Reverse; NodeId as secondary key keeps pop order
    // deterministic among equal costs.
    let mut heap: BinaryHeap<Reverse<(u32, NodeId)>> = BinaryHeap::new();
    heap.push(Reverse((0, source)));

    while let Some(Reverse((cost, node))) = heap.pop() {
        // Skip stale heap entries.
        if cost > dist[node.index()] {
            continue;
        }

        for edge in network.out_edges(node) {
            let neighbor = network.edge_to[edge.index()];
            let new_cost = cost.saturating_add(network.edge_travel_ms[edge.index()]);

            if new_cost < dist[neighbor.index()] {
                dist[neighbor.index()] = new_cost;
                heap.push(Reverse((new_cost, neighbor)));
            }
        }
    }

    Ok(dist)
}

/// Builds [`TimeMatrix`]es over an ordered list of snapped nodes.
pub struct TimeMatrixBuilder<'a> {
    network: &'a RoadNetwork,
}

impl<'a> TimeMatrixBuilder<'a> {
    pub fn new(network: &'a RoadNetwork) -> Self {
        Self { network }
    }

    /// `matrix[i][j]` = shortest time from `nodes[i]` to `nodes[j]`.
    ///
    /// Unreachable pairs become `+∞` rather than an error; the sequencer
    /// decides what to do with them.  Repeated nodes share one search.
    ///
    /// # Errors
    ///
    /// [`NetworkError::NodeNotFound`] if any id was not issued by this network.
    pub fn build(&self, nodes: &[NodeId]) -> NetworkResult<TimeMatrix> {
        let mut distinct: Vec<NodeId> = nodes.to_vec();
        distinct.sort_unstable();
        distinct.dedup();

        let rows = self.search_all(&distinct)?;
        let row_of: FxHashMap<NodeId, &Vec<u32>> = distinct.iter().copied().zip(&rows).collect();

        let n = nodes.len();
        let mut matrix = TimeMatrix::unreachable(n);
        for (i, src) in nodes.iter().enumerate() {
            let dist = row_of[src];
            for (j, dst) in nodes.iter().enumerate() {
                let ms = dist[dst.index()];
                if i != j && ms != u32::MAX {
                    matrix.set(i, j, f64::from(ms) / 1_000.0);
                }
            }
        }

        debug!(
            "time matrix {n}x{n} from {} searches, {} unreachable pairs",
            distinct.len(),
            matrix.unreachable_pairs().len()
        );
        Ok(matrix)
    }

    #[cfg(feature = "parallel")]
    fn search_all(&self, sources: &[NodeId]) -> NetworkResult<Vec<Vec<u32>>> {
        sources.par_iter().map(|&s| shortest_times(self.network, s)).collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn search_all(&self, sources: &[NodeId]) -> NetworkResult<Vec<Vec<u32>>> {
        sources.iter().map(|&s| shortest_times(self.network, s)).collect()
    }
}
