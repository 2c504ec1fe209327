//! Routing mode: which road graph a request is answered on.

use std::str::FromStr;

use crate::CoreError;

/// Selects one of the graphs held by the graph store.
///
/// This is a request-level option; nodes and edges carry no mode of their
/// own.  Each mode's graph is loaded from its own source file.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum TravelMode {
    /// Drivable street network.
    #[default]
    Drive,
    /// Pedestrian network.
    Walk,
}

impl TravelMode {
    pub const ALL: [TravelMode; 2] = [TravelMode::Drive, TravelMode::Walk];

    pub fn as_str(self) -> &'static str {
        match self {
            TravelMode::Drive => "drive",
            TravelMode::Walk  => "walk",
        }
    }

    /// Fallback speed (m/s) used when a graph edge has a length but no
    /// travel time: ~30 mph urban driving, 1.4 m/s walking.
    pub fn default_speed_mps(self) -> f64 {
        match self {
            TravelMode::Drive => 13.4,
            TravelMode::Walk  => 1.4,
        }
    }
}

impl FromStr for TravelMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "drive" => Ok(TravelMode::Drive),
            "walk"  => Ok(TravelMode::Walk),
            _       => Err(CoreError::UnknownMode(s.to_owned())),
        }
    }
}

impl std::fmt::Display for TravelMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
