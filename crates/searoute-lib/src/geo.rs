//! Spherical geometry helpers shared by routing and port lookup.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Mean Earth radius used for great-circle distances, in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

impl GeoPoint {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Great-circle distance to `other` in kilometres.
    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        haversine_km(self.lon, self.lat, other.lon, other.lat)
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.4}, {:.4})", self.lon, self.lat)
    }
}

impl FromStr for GeoPoint {
    type Err = Error;

    /// Parse `"LON,LAT"` (whitespace around either value is ignored).
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidCoordinate {
            input: s.to_string(),
        };

        let (lon, lat) = s.split_once(',').ok_or_else(invalid)?;
        let lon: f64 = lon.trim().parse().map_err(|_| invalid())?;
        let lat: f64 = lat.trim().parse().map_err(|_| invalid())?;

        if !lon.is_finite() || !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(invalid());
        }

        Ok(Self { lon, lat })
    }
}

/// Haversine distance between two `(lon, lat)` positions in kilometres.
pub fn haversine_km(lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> f64 {
    let dlon = (lon2 - lon1).to_radians();
    let dlat = (lat2 - lat1).to_radians();
    let a = (dlat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// Map a latitude/longitude pair onto the unit sphere.
///
/// Euclidean distance between embedded points (the chord) grows
/// monotonically with the angular distance, so a single nearest-neighbour
/// query in this space picks the great-circle nearest point.
pub fn unit_sphere(lat: f64, lon: f64) -> [f64; 3] {
    let lat_r = lat.to_radians();
    let lon_r = lon.to_radians();
    [
        lat_r.cos() * lon_r.cos(),
        lat_r.cos() * lon_r.sin(),
        lat_r.sin(),
    ]
}

/// Sum of consecutive haversine segment lengths along `points`.
pub fn path_length_km(points: &[GeoPoint]) -> f64 {
    points
        .windows(2)
        .map(|pair| pair[0].distance_to(&pair[1]))
        .sum()
}

/// Round to two decimal places.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
