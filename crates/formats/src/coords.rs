use foundation::geo::LonLat;

use crate::dataset::RowRejection;
use crate::rows::{Row, field};

pub const LATITUDE_FIELDS: &[&str] = &["Latitude", "lat"];
pub const LONGITUDE_FIELDS: &[&str] = &["Longitude", "lon", "lng"];
pub const COORDINATES_FIELDS: &[&str] = &["Coordinates"];

fn parse_number(name: &str, raw: &str) -> Result<f64, RowRejection> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| RowRejection::InvalidNumber {
            field: name.to_string(),
            value: raw.to_string(),
        })
}

/// Position from separate latitude/longitude columns.
pub fn position_from_lat_lon(row: &Row) -> Result<LonLat, RowRejection> {
    let lat = field(row, LATITUDE_FIELDS).ok_or(RowRejection::MissingField("Latitude"))?;
    let lon = field(row, LONGITUDE_FIELDS).ok_or(RowRejection::MissingField("Longitude"))?;
    let lat = parse_number("Latitude", lat)?;
    let lon = parse_number("Longitude", lon)?;
    Ok(LonLat::new(lon, lat)?)
}

/// Parses `"lat,lon;lat,lon;..."` into the arithmetic mean of its pairs.
///
/// Blank segments (e.g. a trailing `;`) are ignored; any malformed or
/// out-of-range pair rejects the whole list.
pub fn parse_coordinate_list(raw: &str) -> Result<LonLat, RowRejection> {
    let mut points = Vec::new();
    for segment in raw.split(';') {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }
        let mut parts = segment.split(',');
        let (Some(lat), Some(lon), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(RowRejection::InvalidCoordinates(raw.to_string()));
        };
        let lat = parse_number("Coordinates", lat)?;
        let lon = parse_number("Coordinates", lon)?;
        points.push(LonLat::new(lon, lat)?);
    }
    LonLat::mean(&points).ok_or_else(|| RowRejection::InvalidCoordinates(raw.to_string()))
}

/// Position from a `Coordinates` list, falling back to latitude/longitude columns.
pub fn position_from_any(row: &Row) -> Result<LonLat, RowRejection> {
    match field(row, COORDINATES_FIELDS) {
        Some(raw) => parse_coordinate_list(raw),
        None => position_from_lat_lon(row),
    }
}
