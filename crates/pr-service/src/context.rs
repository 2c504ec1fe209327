//! The immutable per-process service context and its builder.

use std::path::PathBuf;

use log::info;

use pr_core::TravelMode;
use pr_network::{GraphStore, NodeSnapper, RoadNetwork};

use crate::config::ServiceConfig;
use crate::parcel::ParcelProvider;
use crate::{ServiceError, ServiceResult};

/// Everything a request handler needs: configuration, pruned road networks,
/// and the parcel source.
///
/// Built once by [`ServiceContextBuilder`] and never mutated afterwards, so a
/// single `&ServiceContext` can be shared by any number of request threads.
pub struct ServiceContext {
    config:  ServiceConfig,
    graphs:  GraphStore,
    parcels: Box<dyn ParcelProvider>,
    snapper: NodeSnapper,
}

impl ServiceContext {
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn graphs(&self) -> &GraphStore {
        &self.graphs
    }

    /// The network for `mode`.
    ///
    /// # Errors
    ///
    /// [`ServiceError::GraphUnavailable`] if that mode was not configured.
    pub fn graph(&self, mode: TravelMode) -> ServiceResult<&RoadNetwork> {
        self.graphs.get(mode).ok_or(ServiceError::GraphUnavailable(mode))
    }

    pub fn parcels(&self) -> &dyn ParcelProvider {
        self.parcels.as_ref()
    }

    pub fn snapper(&self) -> &NodeSnapper {
        &self.snapper
    }
}

enum GraphSource {
    Network(RoadNetwork),
    Json(Vec<u8>),
    Path(PathBuf),
}

/// Fluent builder for [`ServiceContext`].
///
/// # Required inputs
///
/// - a [`ParcelProvider`] via [`.parcels(p)`](Self::parcels)
///
/// # Optional inputs
///
/// | Method                   | Default                              |
/// |--------------------------|--------------------------------------|
/// | `.config(c)`             | `ServiceConfig::default()`           |
/// | `.network(mode, net)`    | mode not configured                  |
/// | `.graph_json(mode, b)`   | mode not configured                  |
/// | `.graph_path(mode, p)`   | mode not configured                  |
///
/// A context with no graphs at all still serves clustering requests.
///
/// # Example
///
/// ```rust,ignore
/// let ctx = ServiceContextBuilder::new()
///     .graph_path(TravelMode::Drive, "drive.json")
///     .parcels(InMemoryParcelProvider::from_csv_path(csv)?)
///     .build()?;
/// let reply = handle(&ctx, "GET", "/health", b"");
/// ```
pub struct ServiceContextBuilder {
    config:  ServiceConfig,
    graphs:  Vec<(TravelMode, GraphSource)>,
    parcels: Option<Box<dyn ParcelProvider>>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self { config: ServiceConfig::default(), graphs: Vec::new(), parcels: None }
    }

    pub fn config(mut self, config: ServiceConfig) -> Self {
        self.config = config;
        self
    }

    /// Use an already-built network for `mode`.  It is still pruned.
    pub fn network(mut self, mode: TravelMode, network: RoadNetwork) -> Self {
        self.graphs.push((mode, GraphSource::Network(network)));
        self
    }

    /// Parse a JSON graph document for `mode` at build time.
    pub fn graph_json(mut self, mode: TravelMode, bytes: impl Into<Vec<u8>>) -> Self {
        self.graphs.push((mode, GraphSource::Json(bytes.into())));
        self
    }

    /// Read a JSON graph document for `mode` from disk at build time.
    pub fn graph_path(mut self, mode: TravelMode, path: impl Into<PathBuf>) -> Self {
        self.graphs.push((mode, GraphSource::Path(path.into())));
        self
    }

    pub fn parcels(mut self, provider: impl ParcelProvider + 'static) -> Self {
        self.parcels = Some(Box::new(provider));
        self
    }

    /// Validate the configuration, then load and prune every graph.
    ///
    /// Any failure is fatal and reported as
    /// [`ServiceError::DataUnavailable`]; no partially loaded context is
    /// ever returned.
    pub fn build(self) -> ServiceResult<ServiceContext> {
        self.config
            .validate()
            .map_err(|e| ServiceError::DataUnavailable(format!("invalid configuration: {e}")))?;

        let parcels = self
            .parcels
            .ok_or_else(|| ServiceError::DataUnavailable("no parcel provider configured".into()))?;

        let mut graphs = GraphStore::new();
        for (mode, source) in self.graphs {
            let loaded = match source {
                GraphSource::Network(network) => Ok(graphs.insert(mode, network)),
                GraphSource::Json(bytes) => graphs.load(mode, &bytes),
                GraphSource::Path(path) => graphs.load_path(mode, &path),
            };
            let network =
                loaded.map_err(|e| ServiceError::DataUnavailable(format!("{mode} graph: {e}")))?;
            info!(
                "{mode} graph ready: {} nodes, {} edges",
                network.node_count(),
                network.edge_count()
            );
        }

        info!("parcel source: {}", parcels.describe());
        Ok(ServiceContext {
            snapper: NodeSnapper::new(self.config.snap),
            config: self.config,
            graphs,
            parcels,
        })
    }
}

impl Default for ServiceContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}
