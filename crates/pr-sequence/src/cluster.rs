//! Graph-free fallback: greedy proximity clustering.
//!
//! Answers requests that name no graph action.  Distances are planar Euclidean
//! on raw `(lat, lon)` degrees, which is only an approximation but good
//! enough to keep a route's stops together.
//!
//! # Algorithm
//!
//! Seed a route with the first unassigned point in input order, then keep
//! appending the remaining point nearest to the *most recently added* stop
//! (earliest in input order on a tie) until the route holds `max_per_route`
//! stops.  Repeat until every point is assigned.  O(n²) overall.

use std::fmt;
use std::str::FromStr;

use log::debug;

use pr_core::GeoPoint;

use crate::SequenceError;

/// Fixed dwell estimate per stop, minutes.
pub const STOP_DWELL_MIN: u32 = 5;

/// Fixed travel allowance per route, minutes.
pub const ROUTE_OVERHEAD_MIN: u32 = 20;

// ── ClusterMode ───────────────────────────────────────────────────────────────

/// Named route-size presets.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ClusterMode {
    Fast,
    #[default]
    Efficient,
    Thorough,
}

impl ClusterMode {
    pub fn max_stops(self) -> usize {
        match self {
            ClusterMode::Fast => 15,
            ClusterMode::Efficient => 12,
            ClusterMode::Thorough => 8,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ClusterMode::Fast => "fast",
            ClusterMode::Efficient => "efficient",
            ClusterMode::Thorough => "thorough",
        }
    }

    /// Anything missing or not exactly a mode name is `Efficient`.
    pub fn parse_or_default(s: Option<&str>) -> Self {
        s.and_then(|s| s.parse().ok()).unwrap_or_default()
    }
}

impl FromStr for ClusterMode {
    type Err = SequenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fast" => Ok(ClusterMode::Fast),
            "efficient" => Ok(ClusterMode::Efficient),
            "thorough" => Ok(ClusterMode::Thorough),
            _ => Err(SequenceError::UnknownClusterMode(s.to_owned())),
        }
    }
}

impl fmt::Display for ClusterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Route data ────────────────────────────────────────────────────────────────

/// One parcel to place into a route.
#[derive(Clone, Debug, PartialEq)]
pub struct ClusterPoint {
    pub id:  String,
    pub pos: GeoPoint,
}

impl ClusterPoint {
    pub fn new(id: impl Into<String>, pos: GeoPoint) -> Self {
        Self { id: id.into(), pos }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Stop {
    pub parcel_id: String,
    /// 1-based position within the route.
    pub order: usize,
    pub lat: f64,
    pub lng: f64,
    /// Minutes spent at the stop.
    #[cfg_attr(feature = "serde", serde(rename = "estimated_time"))]
    pub estimated_dwell: u32,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Route {
    /// 1-based, in creation order.
    pub route_id: usize,
    /// Estimated minutes: `stops × 5 + 20`.
    pub total_time: u32,
    pub stops: Vec<Stop>,
}

impl Route {
    fn from_points(route_id: usize, points: Vec<ClusterPoint>) -> Self {
        let stops: Vec<Stop> = points
            .into_iter()
            .enumerate()
            .map(|(i, p)| Stop {
                parcel_id:       p.id,
                order:           i + 1,
                lat:             p.pos.lat,
                lng:             p.pos.lon,
                estimated_dwell: STOP_DWELL_MIN,
            })
            .collect();
        let total_time = stops.len() as u32 * STOP_DWELL_MIN + ROUTE_OVERHEAD_MIN;
        Self { route_id, total_time, stops }
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }
}

// ── ProximityClusterer ────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ProximityClusterer {
    pub max_per_route: usize,
}

impl ProximityClusterer {
    /// A clusterer capped at `max_per_route` stops (at least one).
    pub fn new(max_per_route: usize) -> Self {
        Self { max_per_route: max_per_route.max(1) }
    }

    pub fn for_mode(mode: ClusterMode) -> Self {
        Self::new(mode.max_stops())
    }

    /// Partition `points` into routes.  Never fails; an empty input gives no
    /// routes.
    pub fn cluster(&self, points: Vec<ClusterPoint>) -> Vec<Route> {
        let total = points.len();
        // Remaining points in input order; `Vec::remove` keeps that order so
        // "earliest remaining" stays well-defined.
        let mut remaining = points;
        let mut routes = Vec::with_capacity(total.div_ceil(self.max_per_route));

        while !remaining.is_empty() {
            let mut members = Vec::with_capacity(self.max_per_route.min(remaining.len()));
            members.push(remaining.remove(0));

            while members.len() < self.max_per_route && !remaining.is_empty() {
                let last = members[members.len() - 1].pos;
                let mut nearest = 0;
                let mut nearest_d2 = f64::INFINITY;
                for (i, p) in remaining.iter().enumerate() {
                    let d2 = last.planar_distance_2(p.pos);
                    if d2 < nearest_d2 {
                        nearest = i;
                        nearest_d2 = d2;
                    }
                }
                members.push(remaining.remove(nearest));
            }

            routes.push(Route::from_points(routes.len() + 1, members));
        }

        debug!("clustered {total} points into {} routes (max {})", routes.len(), self.max_per_route);
        routes
    }
}
