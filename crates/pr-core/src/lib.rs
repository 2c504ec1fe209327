//! `pr-core` — foundational types for the parcel routing engine.
//!
//! This crate is a dependency of every other `pr-*` crate.  It intentionally
//! has no `pr-*` dependencies and minimal external ones (only `thiserror`,
//! plus optional `serde`).
//!
//! # What lives here
//!
//! | Module     | Contents                                              |
//! |------------|-------------------------------------------------------|
//! | [`ids`]    | `NodeId`, `EdgeId`                                    |
//! | [`geo`]    | `GeoPoint`, haversine and planar distance             |
//! | [`mode`]   | `TravelMode` (`drive` / `walk`)                       |
//! | [`matrix`] | `TimeMatrix` (square, row-major, `+∞` = unreachable)  |
//! | [`error`]  | `CoreError`, `CoreResult`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod error;
pub mod geo;
pub mod ids;
pub mod matrix;
pub mod mode;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{CoreError, CoreResult};
pub use geo::GeoPoint;
pub use ids::{EdgeId, NodeId};
pub use matrix::TimeMatrix;
pub use mode::TravelMode;
