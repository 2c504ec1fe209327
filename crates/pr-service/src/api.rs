//! Wire types: request bodies, response bodies, and the transport-neutral
//! [`Reply`].

use log::error;
use serde::{Deserialize, Serialize};

use pr_core::TravelMode;
use pr_sequence::Route;

use crate::parcel::ParcelGeometry;
use crate::ServiceError;

// ── Requests ──────────────────────────────────────────────────────────────────

/// One incoming request, as the transport hands it over.
#[derive(Clone, Debug, PartialEq)]
pub struct Request {
    pub method: String,
    pub path:   String,
    pub body:   Vec<u8>,
}

impl Request {
    pub fn new(method: impl Into<String>, path: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self { method: method.into(), path: path.into(), body: body.into() }
    }

    /// A `POST /` carrying `body`.
    pub fn post(body: impl Into<Vec<u8>>) -> Self {
        Self::new("POST", "/", body)
    }
}

/// Body of `POST /`.
///
/// The id list is accepted under any of its historical names.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct RouteRequest {
    #[serde(default, alias = "parcels", alias = "parcels_or_parcel_ids")]
    pub parcel_ids: Vec<String>,
    /// `drive`/`walk` for graph actions, `fast`/`efficient`/`thorough` for
    /// clustering.
    #[serde(default)]
    pub mode:       Option<String>,
    #[serde(default)]
    pub action:     Option<String>,
    /// Accepted for compatibility; no map is ever rendered.
    #[serde(default)]
    pub return_map: bool,
}

/// What a `POST /` asks for.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Action {
    /// No `action` field: geometric clustering.
    Cluster,
    GetParcels,
    OptimizeRoute,
}

impl Action {
    pub fn parse(action: Option<&str>) -> Result<Self, ServiceError> {
        match action.map(str::trim) {
            None | Some("") => Ok(Action::Cluster),
            Some("get_parcels") => Ok(Action::GetParcels),
            Some("optimize_route") => Ok(Action::OptimizeRoute),
            Some(other) => Err(ServiceError::UnknownAction(other.to_owned())),
        }
    }
}

// ── Responses ─────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ClusterStats {
    pub total_routes:      usize,
    pub found_parcels:     usize,
    pub not_found_parcels: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ClusterResponse {
    pub routes: Vec<Route>,
    pub stats:  ClusterStats,
}

/// A parcel placed on the network.  `lat`/`lon` are the snapped node's.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SnappedParcel {
    pub parcel_id: String,
    pub lat:       f64,
    pub lon:       f64,
    /// Source-data id of the snapped node.
    pub node_id:   i64,
    pub geometry:  Option<ParcelGeometry>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ParcelsResponse {
    pub success:     bool,
    pub parcels:     Vec<SnappedParcel>,
    pub count:       usize,
    pub not_found:   Vec<String>,
    pub snap_failed: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OptimizeResponse {
    pub status:          &'static str,
    pub optimized_order: Vec<String>,
    /// Whole seconds along `optimized_order`, depot leg included.
    pub total_time:      u64,
    pub not_found:       Vec<String>,
    pub snap_failed:     Vec<String>,
    pub unreachable:     Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DepotInfo {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HealthResponse {
    pub status:        &'static str,
    pub graphs:        Vec<TravelMode>,
    pub parcel_source: String,
    pub depot:         DepotInfo,
    pub max_stops:     usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RouteResponse {
    Clusters(ClusterResponse),
    Parcels(ParcelsResponse),
    Optimized(OptimizeResponse),
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

// ── Reply ─────────────────────────────────────────────────────────────────────

/// CORS headers attached to every reply.
pub const CORS_HEADERS: [(&str, &str); 4] = [
    ("Access-Control-Allow-Origin", "*"),
    ("Access-Control-Allow-Methods", "GET, POST, OPTIONS"),
    ("Access-Control-Allow-Headers", "Content-Type"),
    ("Access-Control-Max-Age", "3600"),
];

/// Transport-neutral response: status, headers, and a (possibly empty) body.
#[derive(Clone, Debug, PartialEq)]
pub struct Reply {
    pub status:  u16,
    pub headers: Vec<(&'static str, String)>,
    pub body:    String,
}

impl Reply {
    /// A body-less reply carrying only the CORS headers.
    pub fn empty(status: u16) -> Self {
        Self { status, headers: cors(), body: String::new() }
    }

    /// Serialize `value` as the JSON body.
    pub fn json<T: Serialize>(status: u16, value: &T) -> Self {
        match serde_json::to_string(value) {
            Ok(body) => {
                let mut headers = cors();
                headers.push(("Content-Type", "application/json".to_owned()));
                Self { status, headers, body }
            }
            Err(e) => {
                error!("failed to serialize response: {e}");
                Self::message(500, "failed to serialize response")
            }
        }
    }

    pub fn error(err: &ServiceError) -> Self {
        Self::message(err.status(), &err.to_string())
    }

    fn message(status: u16, message: &str) -> Self {
        // A single string field cannot fail to serialize.
        let body = serde_json::to_string(&ErrorBody { error: message })
            .unwrap_or_else(|_| String::from(r#"{"error":"internal error"}"#));
        let mut headers = cors();
        headers.push(("Content-Type", "application/json".to_owned()));
        Self { status, headers, body }
    }

    /// Look up a header by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Parse the body back into JSON.
    pub fn json_body(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::from_str(&self.body)
    }
}

fn cors() -> Vec<(&'static str, String)> {
    CORS_HEADERS.iter().map(|&(k, v)| (k, v.to_owned())).collect()
}
