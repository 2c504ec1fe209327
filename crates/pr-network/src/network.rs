//! Road network representation and builder.
//!
//! # Data layout
//!
//! Outgoing edges are stored in **Compressed Sparse Row (CSR)** form.  The
//! outgoing edges of `NodeId n` are the `EdgeId`s
//!
//! ```text
//! node_out_start[n] .. node_out_start[n+1]
//! ```
//!
//! and every per-edge array (`edge_from`, `edge_to`, `edge_length_m`,
//! `edge_travel_ms`) is indexed by that `EdgeId`.  Dijkstra's inner loop is a
//! contiguous scan.
//!
//! # Spatial index
//!
//! Snapping needs the nearest *edge*, not the nearest node, so the R-tree
//! holds one line segment per connected node pair (`u → v` and `v → u`
//! collapse into one entry, tagged with the lower id first).  Coordinates are
//! planar `[x, y] = [lon, lat]`.

use geo::{Coord, Line};
use rstar::primitives::GeomWithData;
use rstar::RTree;
use rustc_hash::FxHashMap;

use pr_core::{EdgeId, GeoPoint, NodeId};

/// R-tree entry: an undirected segment with its endpoint ids `(low, high)`.
pub(crate) type Segment = GeomWithData<Line<f64>, (NodeId, NodeId)>;

// ── Bounds ────────────────────────────────────────────────────────────────────

/// Axis-aligned bounding box of all node positions.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Bounds {
    pub min: GeoPoint,
    pub max: GeoPoint,
}

impl Bounds {
    /// `true` if `p` is inside the box grown by `margin` on every side.
    pub fn contains_padded(&self, p: GeoPoint, margin: f64) -> bool {
        p.lat >= self.min.lat - margin
            && p.lat <= self.max.lat + margin
            && p.lon >= self.min.lon - margin
            && p.lon <= self.max.lon + margin
    }

    fn of(points: &[GeoPoint]) -> Option<Self> {
        let first = *points.first()?;
        Some(points.iter().fold(Self { min: first, max: first }, |b, p| Self {
            min: GeoPoint::new(b.min.lat.min(p.lat), b.min.lon.min(p.lon)),
            max: GeoPoint::new(b.max.lat.max(p.lat), b.max.lon.max(p.lon)),
        }))
    }
}

// ── RoadNetwork ───────────────────────────────────────────────────────────────

/// Directed road graph in CSR format plus a segment index for snapping.
///
/// Immutable once built.  Fields are `pub` for direct indexed access on hot
/// paths; construct through [`RoadNetworkBuilder`].
pub struct RoadNetwork {
    // ── Node data ─────────────────────────────────────────────────────────
    /// Position of each node.  Indexed by `NodeId`.
    pub node_pos: Vec<GeoPoint>,

    /// Identifier of each node in the source data (e.g. the OSM id).
    pub node_ext_id: Vec<i64>,

    // ── CSR edge adjacency ────────────────────────────────────────────────
    /// Length = `node_count + 1`.
    pub node_out_start: Vec<u32>,

    // ── Edge data (indexed by EdgeId = position in sorted order) ──────────
    pub edge_from: Vec<NodeId>,
    pub edge_to: Vec<NodeId>,

    /// Length of each edge in metres.
    pub edge_length_m: Vec<f64>,

    /// Travel time in milliseconds.  The Dijkstra edge cost.
    pub edge_travel_ms: Vec<u32>,

    // ── Lookup structures ─────────────────────────────────────────────────
    ext_lookup: FxHashMap<i64, NodeId>,
    segments: RTree<Segment>,
    bounds: Option<Bounds>,
}

impl RoadNetwork {
    /// A network with no nodes or edges.  Every snap against it fails.
    pub fn empty() -> Self {
        RoadNetworkBuilder::new().build()
    }

    // ── Graph dimensions ──────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.node_pos.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_to.len()
    }

    /// Number of undirected segments in the spatial index.
    pub fn segment_count(&self) -> usize {
        self.segments.size()
    }

    pub fn is_empty(&self) -> bool {
        self.node_pos.is_empty()
    }

    /// `true` if `node` was issued by this network.
    #[inline]
    pub fn contains(&self, node: NodeId) -> bool {
        node.index() < self.node_count()
    }

    // ── Node attributes ───────────────────────────────────────────────────

    #[inline]
    pub fn pos(&self, node: NodeId) -> GeoPoint {
        self.node_pos[node.index()]
    }

    #[inline]
    pub fn ext_id(&self, node: NodeId) -> i64 {
        self.node_ext_id[node.index()]
    }

    /// Resolve a source-data node id to its graph-local `NodeId`.
    pub fn find_ext(&self, ext_id: i64) -> Option<NodeId> {
        self.ext_lookup.get(&ext_id).copied()
    }

    /// Bounding box of all nodes, `None` for an empty network.
    pub fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }

    // ── Graph traversal ───────────────────────────────────────────────────

    #[inline]
    pub fn out_edges(&self, node: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        (start..end).map(|i| EdgeId(i as u32))
    }

    #[inline]
    pub fn out_degree(&self, node: NodeId) -> usize {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        end - start
    }

    pub(crate) fn segments(&self) -> &RTree<Segment> {
        &self.segments
    }
}

/// Summary only: the per-node and per-edge arrays are far too large to print.
impl std::fmt::Debug for RoadNetwork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoadNetwork")
            .field("nodes", &self.node_count())
            .field("edges", &self.edge_count())
            .field("segments", &self.segment_count())
            .field("bounds", &self.bounds)
            .finish()
    }
}

// ── RoadNetworkBuilder ────────────────────────────────────────────────────────

/// Construct a [`RoadNetwork`] incrementally, then call [`build`](Self::build).
///
/// # Example
///
/// ```
/// use pr_core::GeoPoint;
/// use pr_network::RoadNetworkBuilder;
///
/// let mut b = RoadNetworkBuilder::new();
/// let a = b.add_node(101, GeoPoint::new(48.41, -122.34));
/// let c = b.add_node(102, GeoPoint::new(48.42, -122.33));
/// b.add_road(a, c, 1_200.0, 90_000); // 1.2 km, 90 s
/// let net = b.build();
/// assert_eq!(net.node_count(), 2);
/// assert_eq!(net.edge_count(), 2);    // both directions
/// assert_eq!(net.segment_count(), 1); // one segment to snap to
/// ```
pub struct RoadNetworkBuilder {
    nodes:     Vec<GeoPoint>,
    ext_ids:   Vec<i64>,
    raw_edges: Vec<RawEdge>,
}

struct RawEdge {
    from:      NodeId,
    to:        NodeId,
    length_m:  f64,
    travel_ms: u32,
}

impl RoadNetworkBuilder {
    pub fn new() -> Self {
        Self { nodes: Vec::new(), ext_ids: Vec::new(), raw_edges: Vec::new() }
    }

    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        Self {
            nodes:     Vec::with_capacity(nodes),
            ext_ids:   Vec::with_capacity(nodes),
            raw_edges: Vec::with_capacity(edges),
        }
    }

    /// Add a node and return its `NodeId` (sequential from 0).
    pub fn add_node(&mut self, ext_id: i64, pos: GeoPoint) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(pos);
        self.ext_ids.push(ext_id);
        id
    }

    /// Add a **directed** edge from `from` to `to`.
    pub fn add_directed_edge(&mut self, from: NodeId, to: NodeId, length_m: f64, travel_ms: u32) {
        self.raw_edges.push(RawEdge { from, to, length_m, travel_ms });
    }

    /// Add edges in **both directions** for a two-way street.
    pub fn add_road(&mut self, a: NodeId, b: NodeId, length_m: f64, travel_ms: u32) {
        self.add_directed_edge(a, b, length_m, travel_ms);
        self.add_directed_edge(b, a, length_m, travel_ms);
    }

    pub fn node_pos(&self, id: NodeId) -> GeoPoint {
        self.nodes[id.index()]
    }

    pub fn node_count(&self) -> usize { self.nodes.len() }
    pub fn edge_count(&self) -> usize { self.raw_edges.len() }

    /// Consume the builder and produce a [`RoadNetwork`].
    ///
    /// O(E log E) for the edge sort and segment dedup, O(N log N) for the
    /// R-tree bulk load.
    pub fn build(self) -> RoadNetwork {
        let node_count = self.nodes.len();
        let edge_count = self.raw_edges.len();

        // Stable sort keeps parallel edges in insertion order.
        let mut raw = self.raw_edges;
        raw.sort_by_key(|e| e.from.0);

        let edge_from:      Vec<NodeId> = raw.iter().map(|e| e.from).collect();
        let edge_to:        Vec<NodeId> = raw.iter().map(|e| e.to).collect();
        let edge_length_m:  Vec<f64>    = raw.iter().map(|e| e.length_m).collect();
        let edge_travel_ms: Vec<u32>    = raw.iter().map(|e| e.travel_ms).collect();

        let mut node_out_start = vec![0u32; node_count + 1];
        for e in &raw {
            node_out_start[e.from.index() + 1] += 1;
        }
        for i in 1..=node_count {
            node_out_start[i] += node_out_start[i - 1];
        }
        debug_assert_eq!(node_out_start[node_count] as usize, edge_count);

        // One segment per unordered node pair; self-loops have no extent.
        let mut pairs: Vec<(NodeId, NodeId)> = raw
            .iter()
            .filter(|e| e.from != e.to)
            .map(|e| (e.from.min(e.to), e.from.max(e.to)))
            .collect();
        pairs.sort_unstable();
        pairs.dedup();

        let segments: Vec<Segment> = pairs
            .into_iter()
            .map(|(a, b)| {
                let [ax, ay] = self.nodes[a.index()].xy();
                let [bx, by] = self.nodes[b.index()].xy();
                GeomWithData::new(Line::new(Coord { x: ax, y: ay }, Coord { x: bx, y: by }), (a, b))
            })
            .collect();

        let ext_lookup: FxHashMap<i64, NodeId> = self
            .ext_ids
            .iter()
            .enumerate()
            .map(|(i, &ext)| (ext, NodeId(i as u32)))
            .collect();

        RoadNetwork {
            bounds: Bounds::of(&self.nodes),
            node_pos: self.nodes,
            node_ext_id: self.ext_ids,
            node_out_start,
            edge_from,
            edge_to,
            edge_length_m,
            edge_travel_ms,
            ext_lookup,
            segments: RTree::bulk_load(segments),
        }
    }
}

impl Default for RoadNetworkBuilder {
    fn default() -> Self {
        Self::new()
    }
}
