use serde::{Deserialize, Serialize};

/// A validated WGS84 position in degrees.
///
/// Construction goes through [`LonLat::new`], so a value of this type always
/// has finite coordinates with `lat ∈ [-90, 90]` and `lon ∈ [-180, 180]`.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawLonLat")]
pub struct LonLat {
    lon_deg: f64,
    lat_deg: f64,
}

#[derive(Deserialize)]
struct RawLonLat {
    lon_deg: f64,
    lat_deg: f64,
}

impl TryFrom<RawLonLat> for LonLat {
    type Error = GeoError;

    fn try_from(raw: RawLonLat) -> Result<Self, Self::Error> {
        LonLat::new(raw.lon_deg, raw.lat_deg)
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum GeoError {
    NotFinite,
    LatitudeOutOfRange(f64),
    LongitudeOutOfRange(f64),
}

impl std::fmt::Display for GeoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeoError::NotFinite => write!(f, "coordinate is not a finite number"),
            GeoError::LatitudeOutOfRange(v) => write!(f, "latitude {v} outside [-90, 90]"),
            GeoError::LongitudeOutOfRange(v) => write!(f, "longitude {v} outside [-180, 180]"),
        }
    }
}

impl std::error::Error for GeoError {}

impl LonLat {
    pub fn new(lon_deg: f64, lat_deg: f64) -> Result<Self, GeoError> {
        if !lon_deg.is_finite() || !lat_deg.is_finite() {
            return Err(GeoError::NotFinite);
        }
        if !(-90.0..=90.0).contains(&lat_deg) {
            return Err(GeoError::LatitudeOutOfRange(lat_deg));
        }
        if !(-180.0..=180.0).contains(&lon_deg) {
            return Err(GeoError::LongitudeOutOfRange(lon_deg));
        }
        Ok(Self { lon_deg, lat_deg })
    }

    pub fn lon_deg(&self) -> f64 {
        self.lon_deg
    }

    pub fn lat_deg(&self) -> f64 {
        self.lat_deg
    }

    /// Arithmetic mean of the given positions.
    ///
    /// Returns `None` for an empty slice. No antimeridian handling: campus-scale
    /// footprints never straddle it.
    pub fn mean(points: &[LonLat]) -> Option<LonLat> {
        if points.is_empty() {
            return None;
        }
        let n = points.len() as f64;
        let (lon, lat) = points
            .iter()
            .fold((0.0, 0.0), |(lon, lat), p| (lon + p.lon_deg, lat + p.lat_deg));
        // The mean of in-range values is in range.
        Some(LonLat {
            lon_deg: lon / n,
            lat_deg: lat / n,
        })
    }
}
