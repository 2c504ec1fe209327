//! Request dispatch and the three `POST /` pipelines.
//!
//! | Request                       | Pipeline                                       |
//! |-------------------------------|------------------------------------------------|
//! | `POST /` without `action`     | lookup → [`ProximityClusterer`]                |
//! | `POST /` `get_parcels`        | lookup → snap each parcel                      |
//! | `POST /` `optimize_route`     | lookup → snap depot + parcels → matrix → tour  |
//! | `GET /health`                 | configuration summary                          |
//!
//! Handlers only read the [`ServiceContext`]; every request is independent.

use log::{debug, info, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use pr_core::{NodeId, TravelMode};
use pr_network::{NodeSnapper, RoadNetwork, SnapError, TimeMatrixBuilder};
use pr_sequence::{ClusterMode, ClusterPoint, ProximityClusterer};

use crate::api::{
    Action, ClusterResponse, ClusterStats, DepotInfo, HealthResponse, OptimizeResponse,
    ParcelsResponse, Reply, Request, RouteRequest, RouteResponse, SnappedParcel,
};
use crate::context::ServiceContext;
use crate::parcel::{dedup_ids, Parcel, ParcelLookup};
use crate::{ServiceError, ServiceResult};

// ── Dispatch ──────────────────────────────────────────────────────────────────

/// Answer one request.  Never fails: errors become JSON error replies.
pub fn handle(ctx: &ServiceContext, method: &str, path: &str, body: &[u8]) -> Reply {
    let path = path.split('?').next().unwrap_or(path);
    let method = method.to_ascii_uppercase();

    let result = match (method.as_str(), path) {
        ("OPTIONS", _) => return Reply::empty(204),
        ("GET", "/health") => Ok(Reply::json(200, &health(ctx))),
        ("POST", "/") => parse_body(body)
            .and_then(|req| route_request(ctx, &req))
            .map(|resp| Reply::json(200, &resp)),
        (_, "/" | "/health") => Err(ServiceError::MethodNotAllowed(method.clone())),
        _ => Err(ServiceError::NotFound(path.to_owned())),
    };

    result.unwrap_or_else(|e| {
        if e.status() >= 500 {
            warn!("{method} {path} failed: {e}");
        } else {
            debug!("{method} {path} rejected: {e}");
        }
        Reply::error(&e)
    })
}

/// [`handle`] for an owned [`Request`].
pub fn handle_request(ctx: &ServiceContext, request: &Request) -> Reply {
    handle(ctx, &request.method, &request.path, &request.body)
}

/// Answer many requests, concurrently when the `parallel` feature is on.
///
/// `replies[i]` always answers `requests[i]`.
pub fn handle_batch(ctx: &ServiceContext, requests: &[Request]) -> Vec<Reply> {
    #[cfg(feature = "parallel")]
    let replies = requests.par_iter().map(|r| handle_request(ctx, r)).collect();
    #[cfg(not(feature = "parallel"))]
    let replies = requests.iter().map(|r| handle_request(ctx, r)).collect();
    replies
}

fn parse_body(body: &[u8]) -> ServiceResult<RouteRequest> {
    serde_json::from_slice(body).map_err(|e| ServiceError::BadRequest(format!("invalid JSON body: {e}")))
}

/// Run the pipeline selected by `req.action`.
pub fn route_request(ctx: &ServiceContext, req: &RouteRequest) -> ServiceResult<RouteResponse> {
    let action = Action::parse(req.action.as_deref())?;
    if req.parcel_ids.is_empty() {
        return Err(ServiceError::BadRequest("no parcel ids provided".into()));
    }
    match action {
        Action::Cluster => cluster_routes(ctx, req).map(RouteResponse::Clusters),
        Action::GetParcels => get_parcels(ctx, req).map(RouteResponse::Parcels),
        Action::OptimizeRoute => optimize_route(ctx, req).map(RouteResponse::Optimized),
    }
}

// ── Health ────────────────────────────────────────────────────────────────────

pub fn health(ctx: &ServiceContext) -> HealthResponse {
    let config = ctx.config();
    HealthResponse {
        status:        "healthy",
        graphs:        ctx.graphs().modes().collect(),
        parcel_source: ctx.parcels().describe(),
        depot:         DepotInfo { lat: config.depot.lat, lon: config.depot.lon },
        max_stops:     config.max_stops,
    }
}

// ── Clustering ────────────────────────────────────────────────────────────────

/// Group the found parcels into bounded routes by proximity.
///
/// Unlike the graph actions, finding nothing is not an error: the reply just
/// has no routes.
pub fn cluster_routes(ctx: &ServiceContext, req: &RouteRequest) -> ServiceResult<ClusterResponse> {
    let mode = ClusterMode::parse_or_default(req.mode.as_deref());
    if req.return_map {
        debug!("return_map requested; maps are not rendered");
    }

    let ParcelLookup { found, not_found } = ctx.parcels().lookup(&req.parcel_ids)?;
    let found_count = found.len();
    let points = found.into_iter().map(|p| ClusterPoint::new(p.id, p.centroid)).collect();
    let routes = ProximityClusterer::for_mode(mode).cluster(points);

    info!(
        "clustered {found_count} parcels into {} {mode} routes ({} not found)",
        routes.len(),
        not_found.len()
    );
    Ok(ClusterResponse {
        stats: ClusterStats {
            total_routes:      routes.len(),
            found_parcels:     found_count,
            not_found_parcels: not_found,
        },
        routes,
    })
}

// ── Graph actions ─────────────────────────────────────────────────────────────

fn travel_mode(req: &RouteRequest) -> ServiceResult<TravelMode> {
    Ok(req.mode.as_deref().map(str::parse::<TravelMode>).transpose()?.unwrap_or_default())
}

/// Resolve ids, failing with 404 when none exist.
fn lookup_some(ctx: &ServiceContext, ids: &[String]) -> ServiceResult<ParcelLookup> {
    let lookup = ctx.parcels().lookup(ids)?;
    if lookup.found.is_empty() {
        return Err(ServiceError::NoParcelsFound);
    }
    Ok(lookup)
}

/// Snap a parcel by its footprint when it has one, by its centroid otherwise.
fn snap_parcel(snapper: &NodeSnapper, network: &RoadNetwork, parcel: &Parcel) -> Result<NodeId, SnapError> {
    match parcel.geometry.as_ref().and_then(|g| g.to_polygon()) {
        Some(polygon) => snapper.snap_polygon(network, &polygon),
        None => snapper.snap_point(network, parcel.centroid),
    }
}

/// Snap every parcel, splitting successes from failures (input order kept).
fn snap_all<'p>(
    snapper: &NodeSnapper,
    network: &RoadNetwork,
    parcels: &'p [Parcel],
) -> (Vec<(&'p Parcel, NodeId)>, Vec<String>) {
    let mut snapped = Vec::with_capacity(parcels.len());
    let mut failed = Vec::new();
    for parcel in parcels {
        match snap_parcel(snapper, network, parcel) {
            Ok(node) => snapped.push((parcel, node)),
            Err(e) => {
                warn!("parcel {} not snapped: {e}", parcel.id);
                failed.push(parcel.id.clone());
            }
        }
    }
    (snapped, failed)
}

/// Resolve and snap parcels, returning each with its network node.
pub fn get_parcels(ctx: &ServiceContext, req: &RouteRequest) -> ServiceResult<ParcelsResponse> {
    let mode = travel_mode(req)?;
    let network = ctx.graph(mode)?;
    let lookup = lookup_some(ctx, &req.parcel_ids)?;

    let (snapped, snap_failed) = snap_all(ctx.snapper(), network, &lookup.found);
    if snapped.is_empty() {
        return Err(ServiceError::NothingSnapped(mode));
    }

    let parcels: Vec<SnappedParcel> = snapped
        .into_iter()
        .map(|(parcel, node)| {
            let pos = network.pos(node);
            SnappedParcel {
                parcel_id: parcel.id.clone(),
                lat:       pos.lat,
                lon:       pos.lon,
                node_id:   network.ext_id(node),
                geometry:  parcel.geometry.clone(),
            }
        })
        .collect();

    info!(
        "get_parcels ({mode}): {} snapped, {} not found, {} snap failures",
        parcels.len(),
        lookup.not_found.len(),
        snap_failed.len()
    );
    Ok(ParcelsResponse {
        success: true,
        count: parcels.len(),
        parcels,
        not_found: lookup.not_found,
        snap_failed,
    })
}

/// Full pipeline: snap depot and parcels, build the time matrix, sequence.
///
/// The depot is matrix index 0.  Parcels that fail to snap or cannot be
/// reached are reported, not fatal; the request only fails when nothing is
/// left to route.
pub fn optimize_route(ctx: &ServiceContext, req: &RouteRequest) -> ServiceResult<OptimizeResponse> {
    let config = ctx.config();
    let requested = dedup_ids(&req.parcel_ids).len();
    if requested > config.max_stops {
        return Err(ServiceError::TooManyStops { got: requested, max: config.max_stops });
    }

    let mode = travel_mode(req)?;
    let network = ctx.graph(mode)?;
    let lookup = lookup_some(ctx, &req.parcel_ids)?;

    let depot = ctx
        .snapper()
        .snap_point(network, config.depot)
        .map_err(ServiceError::DepotUnsnappable)?;

    let (snapped, snap_failed) = snap_all(ctx.snapper(), network, &lookup.found);
    if snapped.is_empty() {
        return Err(ServiceError::NothingSnapped(mode));
    }

    let nodes: Vec<NodeId> = std::iter::once(depot).chain(snapped.iter().map(|&(_, n)| n)).collect();
    let matrix = TimeMatrixBuilder::new(network).build(&nodes)?;
    let tour = config.sequencer.solve(&matrix, 0)?;

    // Matrix index k > 0 is snapped[k - 1].
    let id_at = |k: usize| snapped[k - 1].0.id.clone();
    let optimized_order: Vec<String> = tour.order.iter().skip(1).map(|&k| id_at(k)).collect();
    let unreachable: Vec<String> = tour.unreachable.iter().map(|&k| id_at(k)).collect();
    let total_time = tour.total_time.round() as u64;

    info!(
        "optimize_route ({mode}): {} stops in {total_time} s, {} not found, {} snap failures, {} unreachable",
        optimized_order.len(),
        lookup.not_found.len(),
        snap_failed.len(),
        unreachable.len()
    );
    Ok(OptimizeResponse {
        status: "success",
        optimized_order,
        total_time,
        not_found: lookup.not_found,
        snap_failed,
        unreachable,
    })
}
