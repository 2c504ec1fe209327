//! Geographic coordinate type.
//!
//! `GeoPoint` is WGS-84 latitude/longitude in `f64`.  Road networks and the
//! fallback clusterer both treat it as a planar point with `x = lon` and
//! `y = lat`; only edge-length inference uses the great-circle distance.

use crate::{CoreError, CoreResult};

/// A WGS-84 geographic coordinate.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    #[inline]
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Like [`new`](Self::new) but rejects NaN/∞ and out-of-range values.
    pub fn checked(lat: f64, lon: f64) -> CoreResult<Self> {
        if !lat.is_finite() || !lon.is_finite() || lat.abs() > 90.0 || lon.abs() > 180.0 {
            return Err(CoreError::InvalidCoordinate { lat, lon });
        }
        Ok(Self { lat, lon })
    }

    /// Planar `[x, y]` = `[lon, lat]`, the order used by the spatial index.
    #[inline]
    pub fn xy(self) -> [f64; 2] {
        [self.lon, self.lat]
    }

    #[inline]
    pub fn from_xy(x: f64, y: f64) -> Self {
        Self { lat: y, lon: x }
    }

    /// Squared planar distance in degree space.
    #[inline]
    pub fn planar_distance_2(self, other: GeoPoint) -> f64 {
        let dx = self.lon - other.lon;
        let dy = self.lat - other.lat;
        dx * dx + dy * dy
    }

    /// Planar (Euclidean) distance in degree space.
    ///
    /// Not a physical distance: one degree of longitude is shorter than one
    /// degree of latitude away from the equator.  Good enough for ranking
    /// neighbours within a county.
    #[inline]
    pub fn planar_distance(self, other: GeoPoint) -> f64 {
        self.planar_distance_2(other).sqrt()
    }

    /// Haversine great-circle distance in metres.
    pub fn distance_m(self, other: GeoPoint) -> f64 {
        const R: f64 = 6_371_000.0; // mean Earth radius, metres

        let d_lat = (other.lat - self.lat).to_radians();
        let d_lon = (other.lon - self.lon).to_radians();

        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();

        let a = (d_lat * 0.5).sin().powi(2)
            + lat1.cos() * lat2.cos() * (d_lon * 0.5).sin().powi(2);

        2.0 * R * a.sqrt().atan2((1.0 - a).sqrt())
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}
