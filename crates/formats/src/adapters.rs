use std::collections::HashSet;

use foundation::geo::LonLat;
use scene::entity::{EntityId, EntityKind, MapEntity, TextField};

use crate::coords::{
    COORDINATES_FIELDS, LATITUDE_FIELDS, LONGITUDE_FIELDS, position_from_any,
    position_from_lat_lon,
};
use crate::dataset::RowRejection;
use crate::rows::{Row, field, header_matches};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PositionColumns {
    /// `Latitude` + `Longitude` only.
    LatLon,
    /// `Coordinates` list (`"lat,lon;lat,lon"`), falling back to `Latitude`/`Longitude`.
    CoordinatesOrLatLon,
}

/// Column mapping for one dataset.
///
/// Every list is tried in order; header matching is case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterSpec {
    pub kind: EntityKind,
    pub name_fields: &'static [&'static str],
    pub number_fields: &'static [&'static str],
    pub description_fields: &'static [&'static str],
    pub location_fields: &'static [&'static str],
    /// Prefix used to synthesize a name from the number when the name is blank.
    pub name_prefix: &'static str,
    pub position: PositionColumns,
}

pub const BUILDINGS: AdapterSpec = AdapterSpec {
    kind: EntityKind::Building,
    name_fields: &["Name", "Building Name"],
    number_fields: &["Building Number", "Number"],
    description_fields: &["Description"],
    location_fields: &["Location"],
    name_prefix: "Building",
    position: PositionColumns::CoordinatesOrLatLon,
};

pub const PARKING_LOTS: AdapterSpec = AdapterSpec {
    kind: EntityKind::ParkingLot,
    name_fields: &["Name", "Lot Name"],
    number_fields: &["Lot Number", "Number"],
    description_fields: &["Description", "Type"],
    location_fields: &["Location"],
    name_prefix: "Lot",
    position: PositionColumns::CoordinatesOrLatLon,
};

pub const BUS_STOPS: AdapterSpec = AdapterSpec {
    kind: EntityKind::BusStop,
    name_fields: &["stop_name", "Name"],
    number_fields: &["stop_id", "stop_code"],
    description_fields: &["bus_lines", "Description"],
    location_fields: &["Location"],
    name_prefix: "Stop",
    position: PositionColumns::LatLon,
};

pub const SERVICES: AdapterSpec = AdapterSpec {
    kind: EntityKind::Service,
    name_fields: &["Name", "Service"],
    number_fields: &["Building Number"],
    description_fields: &["Description"],
    location_fields: &["Location"],
    name_prefix: "Service",
    position: PositionColumns::LatLon,
};

pub fn spec_for(kind: EntityKind) -> &'static AdapterSpec {
    match kind {
        EntityKind::Building => &BUILDINGS,
        EntityKind::ParkingLot => &PARKING_LOTS,
        EntityKind::BusStop => &BUS_STOPS,
        EntityKind::Service => &SERVICES,
    }
}

impl AdapterSpec {
    fn consumed(&self, header: &str) -> bool {
        let position_fields: &[&[&str]] = match self.position {
            PositionColumns::LatLon => &[LATITUDE_FIELDS, LONGITUDE_FIELDS],
            PositionColumns::CoordinatesOrLatLon => {
                &[COORDINATES_FIELDS, LATITUDE_FIELDS, LONGITUDE_FIELDS]
            }
        };
        [
            self.name_fields,
            self.number_fields,
            self.description_fields,
            self.location_fields,
        ]
        .iter()
        .chain(position_fields.iter())
        .any(|names| header_matches(header, names))
    }

    fn position(&self, row: &Row) -> Result<LonLat, RowRejection> {
        match self.position {
            PositionColumns::LatLon => position_from_lat_lon(row),
            PositionColumns::CoordinatesOrLatLon => position_from_any(row),
        }
    }

    /// Converts the row at CSV `line` into an entity.
    ///
    /// Only the position can reject a row. A row with neither name nor
    /// number is named after its line.
    pub fn adapt_row(&self, row: &Row, line: usize) -> Result<MapEntity, RowRejection> {
        let position = self.position(row)?;
        let number = field(row, self.number_fields);
        let name = match (field(row, self.name_fields), number) {
            (Some(name), _) => name.to_string(),
            (None, Some(number)) => format!("{} {number}", self.name_prefix),
            (None, None) => format!("{} {line}", self.name_prefix),
        };
        let key = number.map(str::to_string).unwrap_or_else(|| name.clone());

        let mut entity = MapEntity::new(EntityId::new(self.kind, key), name, position);
        if let Some(number) = number {
            entity = entity.with_text(TextField::Number, number);
        }
        if let Some(description) = field(row, self.description_fields) {
            entity = entity.with_text(TextField::Description, description);
        }
        if let Some(location) = field(row, self.location_fields) {
            entity = entity.with_text(TextField::Location, location);
        }

        for (header, value) in row {
            let value = value.trim();
            if value.is_empty() || self.consumed(header) {
                continue;
            }
            entity = entity.with_extra(header.clone(), value);
        }
        // Secondary description columns stay visible in the popup.
        for header in self.description_fields.iter().skip(1) {
            if let Some(v) = field(row, &[*header]) {
                entity = entity.with_extra(*header, v);
            }
        }
        Ok(entity)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRow {
    /// 1-based CSV line number (the header is line 1).
    pub line: usize,
    pub reason: RowRejection,
}

/// Result of adapting one dataset: partial success is the norm.
#[derive(Debug, Clone, PartialEq)]
pub struct AdaptReport {
    pub kind: EntityKind,
    pub entities: Vec<MapEntity>,
    pub skipped: Vec<SkippedRow>,
}

/// Adapts `rows` in order, skipping (and logging) every row without a
/// usable position.
///
/// Keys stay unique within the dataset: a repeated key gets `#<line>`
/// appended, so every positioned row yields exactly one entity.
pub fn adapt_rows(spec: &AdapterSpec, rows: &[Row]) -> AdaptReport {
    let mut entities = Vec::with_capacity(rows.len());
    let mut skipped = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for (i, row) in rows.iter().enumerate() {
        let line = i + 2;
        match spec.adapt_row(row, line) {
            Ok(mut e) => {
                if !seen.insert(e.id.key.clone()) {
                    let key = format!("{}#{line}", e.id.key);
                    tracing::debug!(kind = %spec.kind, line, %key, "repeated key renamed");
                    seen.insert(key.clone());
                    e.id = EntityId::new(spec.kind, key);
                }
                entities.push(e);
            }
            Err(reason) => {
                tracing::warn!(kind = %spec.kind, line, %reason, "skipping row");
                skipped.push(SkippedRow { line, reason });
            }
        }
    }

    if !skipped.is_empty() {
        tracing::warn!(
            kind = %spec.kind,
            loaded = entities.len(),
            skipped = skipped.len(),
            "dataset loaded with skipped rows"
        );
    }

    AdaptReport {
        kind: spec.kind,
        entities,
        skipped,
    }
}

#[cfg(test)]
mod tests {
    use super::{BUILDINGS, BUS_STOPS, PARKING_LOTS, SERVICES, adapt_rows};
    use crate::dataset::RowRejection;
    use crate::rows::parse_rows;
    use pretty_assertions::assert_eq;
    use scene::entity::{EntityKind, TextField};

    #[test]
    fn one_invalid_row_among_valid_rows_is_skipped() {
        let csv = "\
Name,Building Number,Latitude,Longitude,Description
Library,10,34.0530,-118.1425,Study
Broken,11,NaN,-118.1,Bad
Science Center,12,34.0525,-118.1440,Labs
Gym,13,34.0,200.0,Out of range
";
        let rows = parse_rows(csv).unwrap();
        let report = adapt_rows(&BUILDINGS, &rows);
        assert_eq!(report.entities.len(), 2);
        assert_eq!(report.skipped.len(), 2);
        assert_eq!(report.skipped[0].line, 3);
        assert_eq!(report.skipped[1].line, 5);
        let names: Vec<&str> = report.entities.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Library", "Science Center"]);
        assert_eq!(report.entities[1].id.key, "12");
    }

    #[test]
    fn parking_lot_position_is_mean_of_coordinates() {
        let csv = "Lot Number,Name,Type,Coordinates\n5,,Student,\"32.1,-117.1;32.2,-117.2\"\n";
        let rows = parse_rows(csv).unwrap();
        let report = adapt_rows(&PARKING_LOTS, &rows);
        assert_eq!(report.entities.len(), 1);
        let lot = &report.entities[0];
        assert_eq!(lot.kind(), EntityKind::ParkingLot);
        assert_eq!(lot.name, "Lot 5");
        assert!((lot.position.lat_deg() - 32.15).abs() < 1e-9);
        assert!((lot.position.lon_deg() - -117.15).abs() < 1e-9);
        assert_eq!(lot.text(TextField::Description), Some("Student"));
        assert_eq!(lot.extra.get("Type").map(String::as_str), Some("Student"));
    }

    #[test]
    fn bus_stops_use_stop_name_and_lines() {
        let csv = "stop_name,bus_lines,Latitude,Longitude,shelter\nTransit Center,\"1, 7\",32.8,-116.9,yes\n";
        let rows = parse_rows(csv).unwrap();
        let report = adapt_rows(&BUS_STOPS, &rows);
        let stop = &report.entities[0];
        assert_eq!(stop.id.key, "Transit Center");
        assert_eq!(stop.text(TextField::Description), Some("1, 7"));
        assert_eq!(stop.extra.get("shelter").map(String::as_str), Some("yes"));
        assert!(!stop.extra.contains_key("Latitude"));
    }

    #[test]
    fn repeated_keys_get_line_suffix() {
        let csv = "\
stop_name,bus_lines,Latitude,Longitude
Transit Center,1,32.80,-116.90
Transit Center,7,32.81,-116.91
";
        let rows = parse_rows(csv).unwrap();
        let report = adapt_rows(&BUS_STOPS, &rows);
        assert!(report.skipped.is_empty());
        let keys: Vec<&str> = report.entities.iter().map(|e| e.id.key.as_str()).collect();
        assert_eq!(keys, vec!["Transit Center", "Transit Center#3"]);
        assert_eq!(report.entities[1].name, "Transit Center");
        assert_eq!(report.entities[1].text(TextField::Description), Some("7"));
    }

    #[test]
    fn nameless_rows_are_named_after_their_line() {
        let rows = parse_rows("Type,Coordinates\nStudent,\"32.1,-117.1;32.2,-117.2\"\n").unwrap();
        let report = adapt_rows(&PARKING_LOTS, &rows);
        assert!(report.skipped.is_empty());
        assert_eq!(report.entities.len(), 1);
        assert_eq!(report.entities[0].name, "Lot 2");
        assert_eq!(report.entities[0].id.key, "Lot 2");
    }

    #[test]
    fn every_positioned_row_becomes_one_entity() {
        let csv = "\
Name,Location,Latitude,Longitude
Health,Room 1,32.0,-117.0
Health,Room 2,32.0,-117.0
,Room 3,32.0,-117.0
Health,Room 4,,-117.0
";
        let rows = parse_rows(csv).unwrap();
        let report = adapt_rows(&SERVICES, &rows);
        assert_eq!(report.entities.len(), 3);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].reason, RowRejection::MissingField("Latitude"));
    }
}
