//! Snapping points and parcel footprints onto the road graph.
//!
//! Both entry points resolve to a *segment* first and then pick one of its
//! two endpoints.  Snapping to the nearest segment rather than the nearest
//! node keeps neighbouring parcels on the street they actually front.
//!
//! Distances are Euclidean in the network's planar `[x, y]` space.  Every
//! tie is broken by id, so identical inputs always give the same node.

use geo::line_intersection::{line_intersection, LineIntersection};
use geo::{Closest, ClosestPoint, Coord, InteriorPoint, Line, LineString, Point, Polygon};

use pr_core::{GeoPoint, NodeId};

use crate::network::{RoadNetwork, Segment};
use crate::SnapError;

/// Tunables for [`NodeSnapper`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SnapConfig {
    /// How far (in coordinate units) outside the network's bounding box a
    /// point may lie and still be snapped.  Anything further is a
    /// [`SnapError::OutsideDomain`].
    pub domain_margin: f64,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self { domain_margin: 0.05 }
    }
}

/// Maps coordinates and polygons to graph nodes.
#[derive(Copy, Clone, Debug, Default)]
pub struct NodeSnapper {
    pub config: SnapConfig,
}

impl NodeSnapper {
    pub fn new(config: SnapConfig) -> Self {
        Self { config }
    }

    /// Snap a single coordinate.
    ///
    /// Finds the nearest segment and returns whichever endpoint is closer to
    /// `pos` (lower `NodeId` on an exact tie).
    pub fn snap_point(&self, network: &RoadNetwork, pos: GeoPoint) -> Result<NodeId, SnapError> {
        self.check_domain(network, pos)?;
        let query = Point::from(pos.xy());
        let segment = nearest_segment(network, query).ok_or(SnapError::EmptyNetwork)?;
        Ok(closer_endpoint(network, segment, query.0))
    }

    /// Snap a parcel footprint.
    ///
    /// The segment nearest the polygon's representative interior point is
    /// chosen; the point on that segment closest to the polygon boundary is
    /// computed; the segment endpoint closer to *that* point wins.  This
    /// anchors the stop where the parcel meets the street instead of at a
    /// centroid that may sit far inside a large lot.
    pub fn snap_polygon(&self, network: &RoadNetwork, polygon: &Polygon<f64>) -> Result<NodeId, SnapError> {
        let ring = polygon.exterior();
        if ring.0.len() < 2 {
            return Err(SnapError::DegenerateGeometry);
        }
        let rep = polygon.interior_point().ok_or(SnapError::DegenerateGeometry)?;
        self.check_domain(network, GeoPoint::from_xy(rep.x(), rep.y()))?;

        let segment = nearest_segment(network, rep).ok_or(SnapError::EmptyNetwork)?;
        let access = point_on_segment_nearest_ring(segment.geom(), ring);
        Ok(closer_endpoint(network, segment, access))
    }

    fn check_domain(&self, network: &RoadNetwork, pos: GeoPoint) -> Result<(), SnapError> {
        let bounds = network.bounds().ok_or(SnapError::EmptyNetwork)?;
        if !pos.lat.is_finite() || !pos.lon.is_finite() || !bounds.contains_padded(pos, self.config.domain_margin) {
            return Err(SnapError::OutsideDomain(pos));
        }
        Ok(())
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Nearest segment to `query`; among exactly equidistant segments the one
/// with the lowest `(low, high)` endpoint pair.
fn nearest_segment(network: &RoadNetwork, query: Point<f64>) -> Option<&Segment> {
    let mut iter = network.segments().nearest_neighbor_iter_with_distance_2(&query);
    let (first, best_d2) = iter.next()?;
    Some(
        iter.take_while(|&(_, d2)| d2 == best_d2)
            .map(|(s, _)| s)
            .fold(first, |best, s| if s.data < best.data { s } else { best }),
    )
}

fn closer_endpoint(network: &RoadNetwork, segment: &Segment, p: Coord<f64>) -> NodeId {
    let (a, b) = segment.data;
    let target = GeoPoint::from_xy(p.x, p.y);
    let da = network.pos(a).planar_distance_2(target);
    let db = network.pos(b).planar_distance_2(target);
    // `a < b` by construction, so `<=` prefers the lower id on a tie.
    if da <= db { a } else { b }
}

/// The point of `segment` closest to any side of `ring`.
///
/// If the segment crosses the ring the first crossing (in ring order) is
/// returned.  Otherwise the closest pair between two non-intersecting
/// segments always involves an endpoint of one of them, so it is enough to
/// project the ring vertices onto `segment` and the segment's endpoints onto
/// each side.
fn point_on_segment_nearest_ring(segment: &Line<f64>, ring: &LineString<f64>) -> Coord<f64> {
    let mut best = (f64::INFINITY, segment.start);
    let mut consider = |d: f64, c: Coord<f64>| {
        if d < best.0 {
            best = (d, c);
        }
    };

    for side in ring.lines() {
        match line_intersection(*segment, side) {
            Some(LineIntersection::SinglePoint { intersection, .. }) => return intersection,
            Some(LineIntersection::Collinear { intersection }) => return intersection.start,
            None => {}
        }
        for v in [side.start, side.end] {
            let on_segment = closest_on_line(segment, v);
            consider(distance(on_segment, v), on_segment);
        }
        for end in [segment.start, segment.end] {
            let on_side = closest_on_line(&side, end);
            consider(distance(end, on_side), end);
        }
    }
    best.1
}

fn distance(a: Coord<f64>, b: Coord<f64>) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}

fn closest_on_line(line: &Line<f64>, c: Coord<f64>) -> Coord<f64> {
    match line.closest_point(&Point::from(c)) {
        Closest::Intersection(p) | Closest::SinglePoint(p) => p.into(),
        Closest::Indeterminate => line.start,
    }
}
