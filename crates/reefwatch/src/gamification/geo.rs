//! Spatial attribution: coordinates, region boxes, and MPA point-in-polygon tests.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Tolerance used when deciding whether a point lies on a boundary edge.
const EDGE_TOLERANCE: f64 = 1e-9;

/// Validated WGS84 coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGeoPoint")]
pub struct GeoPoint {
    longitude: f64,
    latitude: f64,
}

#[derive(Deserialize)]
struct RawGeoPoint {
    longitude: f64,
    latitude: f64,
}

impl TryFrom<RawGeoPoint> for GeoPoint {
    type Error = CoordinateError;

    fn try_from(raw: RawGeoPoint) -> Result<Self, Self::Error> {
        GeoPoint::new(raw.longitude, raw.latitude)
    }
}

impl GeoPoint {
    pub fn new(longitude: f64, latitude: f64) -> Result<Self, CoordinateError> {
        if !longitude.is_finite() || !latitude.is_finite() {
            return Err(CoordinateError::NonFinite);
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(CoordinateError::LongitudeOutOfRange(longitude));
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(CoordinateError::LatitudeOutOfRange(latitude));
        }

        Ok(Self {
            longitude,
            latitude,
        })
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.longitude, self.latitude)
    }
}

/// Coordinate validation failures.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoordinateError {
    #[error("coordinates must be finite numbers")]
    NonFinite,
    #[error("longitude {0} outside [-180, 180]")]
    LongitudeOutOfRange(f64),
    #[error("latitude {0} outside [-90, 90]")]
    LatitudeOutOfRange(f64),
    #[error("point {0} lies outside the service region")]
    OutsideRegion(GeoPoint),
}

/// Axis-aligned box in degrees, inclusive on every side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl BoundingBox {
    /// Approximate extent of the Commonwealth of The Bahamas and its banks.
    pub const BAHAMAS: BoundingBox = BoundingBox {
        west: -80.5,
        south: 20.9,
        east: -72.7,
        north: 27.3,
    };

    pub const fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    pub fn contains(&self, point: &GeoPoint) -> bool {
        point.longitude >= self.west
            && point.longitude <= self.east
            && point.latitude >= self.south
            && point.latitude <= self.north
    }

    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.west <= other.east
            && other.west <= self.east
            && self.south <= other.north
            && other.south <= self.north
    }

    fn around(points: &[GeoPoint]) -> Option<Self> {
        let first = points.first()?;
        let mut bbox = BoundingBox::new(
            first.longitude,
            first.latitude,
            first.longitude,
            first.latitude,
        );
        for point in &points[1..] {
            bbox.west = bbox.west.min(point.longitude);
            bbox.east = bbox.east.max(point.longitude);
            bbox.south = bbox.south.min(point.latitude);
            bbox.north = bbox.north.max(point.latitude);
        }
        Some(bbox)
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::BAHAMAS
    }
}

/// Parses `west,south,east,north`.
impl FromStr for BoundingBox {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let parts = value
            .split(',')
            .map(|part| {
                part.trim()
                    .parse::<f64>()
                    .map_err(|err| format!("invalid bounding box component '{part}': {err}"))
            })
            .collect::<Result<Vec<_>, _>>()?;

        match parts.as_slice() {
            [west, south, east, north] if west <= east && south <= north => {
                Ok(BoundingBox::new(*west, *south, *east, *north))
            }
            [_, _, _, _] => Err("bounding box must satisfy west <= east and south <= north".into()),
            _ => Err(format!(
                "bounding box needs 4 components (west,south,east,north), found {}",
                parts.len()
            )),
        }
    }
}

/// Identifier for a Marine Protected Area.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MpaId(pub String);

impl fmt::Display for MpaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reference boundary of a Marine Protected Area: a single exterior ring, no holes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MpaBoundary {
    pub id: MpaId,
    pub name: String,
    pub ring: Vec<GeoPoint>,
}

impl MpaBoundary {
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::around(&self.ring)
    }

    pub fn contains(&self, point: &GeoPoint) -> bool {
        match self.bounding_box() {
            Some(bbox) if bbox.contains(point) => contains(point, &self.ring),
            _ => false,
        }
    }
}

/// Boundary-inclusive ray-casting test against a simple ring.
///
/// The ring may be open or explicitly closed (first vertex repeated). Rings with
/// fewer than three vertices contain nothing.
pub fn contains(point: &GeoPoint, ring: &[GeoPoint]) -> bool {
    let vertices = match ring {
        [first, .., last] if first == last => &ring[..ring.len() - 1],
        _ => ring,
    };
    if vertices.len() < 3 {
        return false;
    }

    let (x, y) = (point.longitude, point.latitude);
    let mut inside = false;
    let mut previous = vertices[vertices.len() - 1];

    for current in vertices {
        if on_segment(point, &previous, current) {
            return true;
        }

        let (xi, yi) = (current.longitude, current.latitude);
        let (xj, yj) = (previous.longitude, previous.latitude);
        if (yi > y) != (yj > y) {
            let crossing = (xj - xi) * (y - yi) / (yj - yi) + xi;
            if x < crossing {
                inside = !inside;
            }
        }

        previous = *current;
    }

    inside
}

fn on_segment(point: &GeoPoint, a: &GeoPoint, b: &GeoPoint) -> bool {
    let cross = (b.longitude - a.longitude) * (point.latitude - a.latitude)
        - (b.latitude - a.latitude) * (point.longitude - a.longitude);
    if cross.abs() > EDGE_TOLERANCE {
        return false;
    }

    point.longitude >= a.longitude.min(b.longitude) - EDGE_TOLERANCE
        && point.longitude <= a.longitude.max(b.longitude) + EDGE_TOLERANCE
        && point.latitude >= a.latitude.min(b.latitude) - EDGE_TOLERANCE
        && point.latitude <= a.latitude.max(b.latitude) + EDGE_TOLERANCE
}

/// First boundary in caller order containing the point.
pub fn find_containing_mpa<'a>(
    point: &GeoPoint,
    boundaries: &'a [MpaBoundary],
) -> Option<&'a MpaBoundary> {
    boundaries.iter().find(|boundary| boundary.contains(point))
}

/// Every boundary containing the point, in caller order. More than one entry
/// indicates overlapping reference data.
pub fn find_all_containing<'a>(
    point: &GeoPoint,
    boundaries: &'a [MpaBoundary],
) -> Vec<&'a MpaBoundary> {
    boundaries
        .iter()
        .filter(|boundary| boundary.contains(point))
        .collect()
}
