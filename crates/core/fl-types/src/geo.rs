//! Geographic point type.

use serde::{Deserialize, Serialize};

/// A geographic point serialized as `{"lat": .., "lon": ..}`.
///
/// This is the object form of an Elasticsearch `geo_point`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees
    pub lat: f64,

    /// Longitude in degrees
    pub lon: f64,
}

impl GeoPoint {
    /// The point used for airports with no known position.
    pub const ORIGIN: GeoPoint = GeoPoint { lat: 0.0, lon: 0.0 };

    /// Creates a new point.
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Returns the point as a `(lat, lon)` tuple.
    pub fn as_tuple(&self) -> (f64, f64) {
        (self.lat, self.lon)
    }
}

impl Default for GeoPoint {
    fn default() -> Self {
        Self::ORIGIN
    }
}

impl From<(f64, f64)> for GeoPoint {
    fn from((lat, lon): (f64, f64)) -> Self {
        Self { lat, lon }
    }
}
