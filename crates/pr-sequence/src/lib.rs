//! `pr-sequence` — ordering stops and grouping parcels into routes.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`sequencer`] | `RouteSequencer`, `Tour`, `tour_cost`                     |
//! | [`cluster`]   | `ProximityClusterer`, `ClusterMode`, `Route`, `Stop`      |
//! | [`error`]     | `SequenceError`, `SequenceResult<T>`                      |
//!
//! The sequencer works purely on a [`TimeMatrix`](pr_core::TimeMatrix); the
//! clusterer purely on planar coordinates.  Neither touches a road graph.

pub mod cluster;
pub mod error;
pub mod sequencer;

#[cfg(test)]
mod tests;

pub use cluster::{ClusterMode, ClusterPoint, ProximityClusterer, Route, Stop};
pub use error::{SequenceError, SequenceResult};
pub use sequencer::{tour_cost, RouteSequencer, Tour};
