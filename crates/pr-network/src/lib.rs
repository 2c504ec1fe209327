//! `pr-network` — road graph, snapping, and travel-time matrices.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                    |
//! |----------------|-------------------------------------------------------------|
//! | [`network`]    | `RoadNetwork` (CSR + segment R-tree), `RoadNetworkBuilder`  |
//! | [`loader`]     | `load_graph_json` and friends (JSON graph documents)        |
//! | [`components`] | `retain_largest_component`                                  |
//! | [`store`]      | `GraphStore`: one pruned, read-only network per mode        |
//! | [`snap`]       | `NodeSnapper`, `SnapConfig`                                 |
//! | [`matrix`]     | `shortest_times` (Dijkstra), `TimeMatrixBuilder`            |
//! | [`error`]      | `NetworkError`, `SnapError`, `NetworkResult<T>`             |
//!
//! # Feature flags
//!
//! | Flag       | Effect                                                    |
//! |------------|-----------------------------------------------------------|
//! | `parallel` | Matrix rows are computed on Rayon's thread pool.          |
//! | `serde`    | Derives `Serialize`/`Deserialize` on `pr-core` types.     |

pub mod components;
pub mod error;
pub mod loader;
pub mod matrix;
pub mod network;
pub mod snap;
pub mod store;


pub use components::retain_largest_component;
pub use error::{NetworkError, NetworkResult, SnapError};
pub use loader::{load_graph_json, load_graph_path, load_graph_reader};
pub use matrix::{shortest_times, TimeMatrixBuilder};
pub use network::{Bounds, RoadNetwork, RoadNetworkBuilder};
pub use snap::{NodeSnapper, SnapConfig};
pub use store::GraphStore;
