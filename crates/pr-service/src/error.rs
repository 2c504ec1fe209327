//! Service-level error types.
//!
//! Every request failure is a [`ServiceError`]; [`ServiceError::status`]
//! gives the HTTP-equivalent status the transport should answer with.

use thiserror::Error;

use pr_core::{CoreError, TravelMode};
use pr_network::{NetworkError, SnapError};
use pr_sequence::SequenceError;

/// Failures of the parcel data source.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("parcel table parse error: {0}")]
    Csv(#[from] csv::Error),

    #[error("parcel {id}: {reason}")]
    InvalidRecord { id: String, reason: String },

    #[error("parcel source unavailable: {0}")]
    Unavailable(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ServiceError {
    // ── 4xx ───────────────────────────────────────────────────────────────
    #[error("{0}")]
    BadRequest(String),

    #[error("unknown action {0:?} (expected get_parcels or optimize_route)")]
    UnknownAction(String),

    #[error("too many parcels: {got} requested, at most {max} per route")]
    TooManyStops { got: usize, max: usize },

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("no parcels found")]
    NoParcelsFound,

    #[error("none of the requested parcels could be placed on the {0} network")]
    NothingSnapped(TravelMode),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("method {0} not allowed")]
    MethodNotAllowed(String),

    // ── 5xx ───────────────────────────────────────────────────────────────
    #[error("no {0} network is configured")]
    GraphUnavailable(TravelMode),

    #[error("parcel lookup failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("data unavailable: {0}")]
    DataUnavailable(String),

    #[error("depot cannot be placed on the network: {0}")]
    DepotUnsnappable(SnapError),

    #[error("travel-time matrix failed: {0}")]
    Network(#[from] NetworkError),

    #[error("sequencing failed: {0}")]
    Sequence(#[from] SequenceError),
}

impl ServiceError {
    /// HTTP-equivalent status code.
    pub fn status(&self) -> u16 {
        match self {
            ServiceError::BadRequest(_)
            | ServiceError::UnknownAction(_)
            | ServiceError::TooManyStops { .. }
            | ServiceError::Core(_) => 400,
            ServiceError::NoParcelsFound | ServiceError::NotFound(_) => 404,
            ServiceError::MethodNotAllowed(_) => 405,
            ServiceError::NothingSnapped(_) => 422,
            ServiceError::DepotUnsnappable(_)
            | ServiceError::Network(_)
            | ServiceError::Sequence(_) => 500,
            ServiceError::GraphUnavailable(_)
            | ServiceError::Provider(_)
            | ServiceError::DataUnavailable(_) => 503,
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
