//! Parcel data access.
//!
//! Request handlers only see the [`ParcelProvider`] trait.  The production
//! implementation, [`InMemoryParcelProvider`], is loaded once at startup from
//! a CSV table and answers lookups from a hash map.
//!
//! # CSV format
//!
//! ```csv
//! parcel_id,lat,lon,geometry
//! P000123,48.4112,-122.3301,
//! P000124,,,"{""type"":""Polygon"",""coordinates"":[[[-122.33,48.41],...]]}"
//! ```
//!
//! `geometry` is an optional GeoJSON `Point`, `Polygon`, or `MultiPolygon`
//! with `[lon, lat]` positions.  When `lat`/`lon` are blank the centroid of
//! the geometry is used instead; a row with neither is rejected.

use std::collections::hash_map::Entry;
use std::io::Read;
use std::path::Path;

use geo::{Area, Centroid, Coord, LineString, Polygon};
use log::{info, warn};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use pr_core::GeoPoint;

use crate::ProviderError;

// ── Geometry ──────────────────────────────────────────────────────────────────

type Position = [f64; 2];

/// The subset of GeoJSON geometry a parcel footprint can use.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ParcelGeometry {
    Point { coordinates: Position },
    Polygon { coordinates: Vec<Vec<Position>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<Position>>> },
}

impl ParcelGeometry {
    /// The footprint as a polygon.
    ///
    /// `None` for points and empty geometries.  A multipolygon yields its
    /// largest member.
    pub fn to_polygon(&self) -> Option<Polygon<f64>> {
        match self {
            ParcelGeometry::Point { .. } => None,
            ParcelGeometry::Polygon { coordinates } => polygon_from_rings(coordinates),
            ParcelGeometry::MultiPolygon { coordinates } => coordinates
                .iter()
                .filter_map(|rings| polygon_from_rings(rings))
                .max_by(|a, b| a.unsigned_area().total_cmp(&b.unsigned_area())),
        }
    }

    /// Point position, or the planar centroid of the footprint.
    pub fn centroid(&self) -> Option<GeoPoint> {
        match self {
            ParcelGeometry::Point { coordinates: [x, y] } => Some(GeoPoint::from_xy(*x, *y)),
            _ => {
                let c = self.to_polygon()?.centroid()?;
                Some(GeoPoint::from_xy(c.x(), c.y()))
            }
        }
    }
}

fn polygon_from_rings(rings: &[Vec<Position>]) -> Option<Polygon<f64>> {
    let (exterior, holes) = rings.split_first()?;
    if exterior.is_empty() {
        return None;
    }
    Some(Polygon::new(ring(exterior), holes.iter().map(|h| ring(h)).collect()))
}

fn ring(positions: &[Position]) -> LineString<f64> {
    positions.iter().map(|&[x, y]| Coord { x, y }).collect()
}

// ── Parcels and lookups ───────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Parcel {
    pub id:       String,
    /// Representative coordinate, always present.
    pub centroid: GeoPoint,
    pub geometry: Option<ParcelGeometry>,
}

/// Result of resolving a list of parcel ids.
///
/// Both lists follow input order with duplicates collapsed to their first
/// occurrence.  Every distinct input id is in exactly one of them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParcelLookup {
    pub found:     Vec<Parcel>,
    pub not_found: Vec<String>,
}

impl ParcelLookup {
    pub fn found_ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.found.iter().map(|p| p.id.as_str())
    }
}

/// Source of parcel records.
///
/// Implementations are shared by reference across concurrent requests.
pub trait ParcelProvider: Send + Sync {
    fn lookup(&self, ids: &[String]) -> Result<ParcelLookup, ProviderError>;

    /// Human-readable description of the source, reported by `/health`.
    fn describe(&self) -> String;
}

/// Drop repeated ids, keeping the first occurrence of each.
pub fn dedup_ids(ids: &[String]) -> Vec<&str> {
    let mut seen = FxHashSet::default();
    ids.iter().map(String::as_str).filter(|id| seen.insert(*id)).collect()
}

// ── InMemoryParcelProvider ────────────────────────────────────────────────────

#[derive(Deserialize)]
struct ParcelRecord {
    parcel_id: String,
    #[serde(default)]
    lat:       Option<f64>,
    #[serde(default)]
    lon:       Option<f64>,
    #[serde(default)]
    geometry:  Option<String>,
}

/// Parcel table held entirely in memory.
pub struct InMemoryParcelProvider {
    parcels: FxHashMap<String, Parcel>,
    source:  String,
}

impl InMemoryParcelProvider {
    /// Build from already-constructed parcels.  Later duplicates are ignored.
    pub fn from_parcels(parcels: impl IntoIterator<Item = Parcel>, source: impl Into<String>) -> Self {
        let mut map = FxHashMap::default();
        for parcel in parcels {
            match map.entry(parcel.id.clone()) {
                Entry::Occupied(_) => warn!("duplicate parcel {} ignored", parcel.id),
                Entry::Vacant(slot) => {
                    slot.insert(parcel);
                }
            }
        }
        Self { parcels: map, source: source.into() }
    }

    /// Load the parcel table from a CSV file.
    pub fn from_csv_path(path: &Path) -> Result<Self, ProviderError> {
        let file = std::fs::File::open(path)?;
        let provider = Self::from_csv_reader(file, path.display().to_string())?;
        info!("loaded {} parcels from {}", provider.len(), path.display());
        Ok(provider)
    }

    /// Like [`from_csv_path`](Self::from_csv_path) but reads any `Read`
    /// source.
    pub fn from_csv_reader<R: Read>(reader: R, source: impl Into<String>) -> Result<Self, ProviderError> {
        let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let mut parcels = Vec::new();
        for result in csv_reader.deserialize::<ParcelRecord>() {
            parcels.push(parcel_from_record(result?)?);
        }
        Ok(Self::from_parcels(parcels, source))
    }

    pub fn len(&self) -> usize {
        self.parcels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parcels.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Parcel> {
        self.parcels.get(id)
    }
}

impl ParcelProvider for InMemoryParcelProvider {
    fn lookup(&self, ids: &[String]) -> Result<ParcelLookup, ProviderError> {
        let mut lookup = ParcelLookup::default();
        for id in dedup_ids(ids) {
            match self.parcels.get(id) {
                Some(parcel) => lookup.found.push(parcel.clone()),
                None => lookup.not_found.push(id.to_owned()),
            }
        }
        Ok(lookup)
    }

    fn describe(&self) -> String {
        format!("{} ({} parcels)", self.source, self.parcels.len())
    }
}

fn parcel_from_record(record: ParcelRecord) -> Result<Parcel, ProviderError> {
    let invalid = |reason: String| ProviderError::InvalidRecord { id: record.parcel_id.clone(), reason };

    if record.parcel_id.is_empty() {
        return Err(invalid("empty parcel_id".into()));
    }

    let geometry = match record.geometry.as_deref() {
        None | Some("") => None,
        Some(json) => Some(
            serde_json::from_str::<ParcelGeometry>(json)
                .map_err(|e| invalid(format!("bad geometry: {e}")))?,
        ),
    };

    let centroid = match (record.lat, record.lon) {
        (Some(lat), Some(lon)) => GeoPoint::checked(lat, lon).map_err(|e| invalid(e.to_string()))?,
        _ => geometry
            .as_ref()
            .and_then(ParcelGeometry::centroid)
            .ok_or_else(|| invalid("no lat/lon and no usable geometry".into()))?,
    };

    Ok(Parcel { id: record.parcel_id, centroid, geometry })
}
