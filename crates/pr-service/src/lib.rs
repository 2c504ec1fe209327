//! `pr-service` — the parcel routing service behind a transport-neutral
//! handler.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                     |
//! |--------------|--------------------------------------------------------------|
//! | [`config`]   | `ServiceConfig`, default depot and stop cap                  |
//! | [`parcel`]   | `ParcelProvider` trait, `InMemoryParcelProvider`, geometry   |
//! | [`context`]  | `ServiceContext` (immutable, shared) and its builder         |
//! | [`api`]      | Request/response bodies, `Reply`, CORS headers               |
//! | [`handlers`] | `handle`, `handle_batch`, and the per-action pipelines       |
//! | [`error`]    | `ServiceError` (with HTTP-equivalent status), `ProviderError`|
//!
//! The crate does no socket I/O.  A transport calls [`handle`] with the
//! method, path, and body of each request and writes back the [`Reply`].
//!
//! # Feature flags
//!
//! | Flag       | Effect                                                     |
//! |------------|------------------------------------------------------------|
//! | `parallel` | (default) parallel matrix rows and batch handling.         |

pub mod api;
pub mod config;
pub mod context;
pub mod error;
pub mod handlers;
pub mod parcel;


pub use api::{Reply, Request, RouteRequest, RouteResponse};
pub use config::{ServiceConfig, DEFAULT_DEPOT, DEFAULT_MAX_STOPS};
pub use context::{ServiceContext, ServiceContextBuilder};
pub use error::{ProviderError, ServiceError, ServiceResult};
pub use handlers::{handle, handle_batch, handle_request, health, route_request};
pub use parcel::{InMemoryParcelProvider, Parcel, ParcelGeometry, ParcelLookup, ParcelProvider};
