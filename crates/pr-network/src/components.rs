//! Largest-connected-component pruning.
//!
//! Components are computed on the *undirected* view of the graph: an edge
//! in either direction joins its endpoints.  Everything outside the largest
//! component is dropped so that any two snapped nodes are at least weakly
//! connected.  One-way streets can still leave a pair unreachable in one
//! direction; the matrix reports those as `+∞`.

use log::info;
use petgraph::unionfind::UnionFind;

use pr_core::NodeId;

use crate::network::{RoadNetwork, RoadNetworkBuilder};

/// Membership mask of the largest undirected component.
///
/// When two components tie for size, the one containing the lowest node
/// index wins.  Empty for an empty network.
pub fn largest_component_mask(network: &RoadNetwork) -> Vec<bool> {
    let n = network.node_count();
    if n == 0 {
        return Vec::new();
    }

    let mut sets = UnionFind::<usize>::new(n);
    for (from, to) in network.edge_from.iter().zip(&network.edge_to) {
        sets.union(from.index(), to.index());
    }

    let roots = sets.into_labeling();
    let mut size = vec![0usize; n];
    for &r in &roots {
        size[r] += 1;
    }
    let best_size = size.iter().copied().max().unwrap_or(0);
    // Nodes are scanned in ascending order, so the first hit is the
    // component with the lowest node index.
    let best_root = roots.iter().copied().find(|&r| size[r] == best_size).unwrap_or(0);

    roots.into_iter().map(|r| r == best_root).collect()
}

/// Rebuild `network` keeping only its largest undirected component.
///
/// Surviving nodes keep their relative order and external ids but receive
/// new dense `NodeId`s.  Returns the input unchanged if nothing is pruned.
pub fn retain_largest_component(network: RoadNetwork) -> RoadNetwork {
    let keep = largest_component_mask(&network);
    let kept = keep.iter().filter(|&&k| k).count();
    if kept == network.node_count() {
        return network;
    }

    let mut remap = vec![NodeId::INVALID; network.node_count()];
    let mut builder = RoadNetworkBuilder::with_capacity(kept, network.edge_count());
    for (old, &keep_it) in keep.iter().enumerate() {
        if keep_it {
            remap[old] = builder.add_node(network.node_ext_id[old], network.node_pos[old]);
        }
    }

    for e in 0..network.edge_count() {
        let from = remap[network.edge_from[e].index()];
        let to   = remap[network.edge_to[e].index()];
        // Both ends share a component, so one check is enough.
        if from.is_valid() {
            builder.add_directed_edge(from, to, network.edge_length_m[e], network.edge_travel_ms[e]);
        }
    }

    info!(
        "pruned to largest component: kept {kept} of {} nodes",
        network.node_count()
    );
    builder.build()
}
