//! Service configuration.

use pr_core::GeoPoint;
use pr_network::SnapConfig;
use pr_sequence::RouteSequencer;

use crate::{ServiceError, ServiceResult};

/// Default depot: the field office every optimized route starts from.
pub const DEFAULT_DEPOT: GeoPoint = GeoPoint::new(48.418_145_4, -122.339_589);

/// Default cap on parcels per `optimize_route` request (the depot is extra).
pub const DEFAULT_MAX_STOPS: usize = 25;

/// Runtime configuration shared by every request.
///
/// | Field       | Default                          |
/// |-------------|----------------------------------|
/// | `depot`     | [`DEFAULT_DEPOT`]                |
/// | `max_stops` | [`DEFAULT_MAX_STOPS`]            |
/// | `snap`      | `SnapConfig::default()`          |
/// | `sequencer` | nearest neighbour + 2-opt, 50 passes |
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ServiceConfig {
    pub depot:     GeoPoint,
    pub max_stops: usize,
    pub snap:      SnapConfig,
    pub sequencer: RouteSequencer,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            depot:     DEFAULT_DEPOT,
            max_stops: DEFAULT_MAX_STOPS,
            snap:      SnapConfig::default(),
            sequencer: RouteSequencer::default(),
        }
    }
}

impl ServiceConfig {
    /// Reject configurations the service cannot run with.
    pub fn validate(&self) -> ServiceResult<()> {
        GeoPoint::checked(self.depot.lat, self.depot.lon)?;
        if self.max_stops == 0 {
            return Err(ServiceError::DataUnavailable("max_stops must be at least 1".into()));
        }
        if !self.snap.domain_margin.is_finite() || self.snap.domain_margin < 0.0 {
            return Err(ServiceError::DataUnavailable(format!(
                "snap domain margin must be a non-negative number, got {}",
                self.snap.domain_margin
            )));
        }
        Ok(())
    }
}
