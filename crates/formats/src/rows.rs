use std::collections::BTreeMap;

use crate::dataset::DatasetError;

/// One CSV data row keyed by header name.
pub type Row = BTreeMap<String, String>;

/// Parses CSV text with a header row into loosely-typed rows.
///
/// Headers and values are trimmed; short rows simply lack the trailing keys.
/// Rows whose cells are all blank are dropped.
pub fn parse_rows(text: &str) -> Result<Vec<Row>, DatasetError> {
    let text = text.trim_start_matches('\u{feff}');
    if text.trim().is_empty() {
        return Err(DatasetError::Empty);
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(DatasetError::Empty);
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let mut row = Row::new();
        for (header, value) in headers.iter().zip(record.iter()) {
            if header.is_empty() {
                continue;
            }
            row.insert(header.clone(), value.to_string());
        }
        if row.values().all(|v| v.is_empty()) {
            continue;
        }
        rows.push(row);
    }

    if rows.is_empty() {
        return Err(DatasetError::Empty);
    }
    Ok(rows)
}

/// Looks up the first non-blank value among `names`, matching headers
/// case-insensitively.
pub fn field<'a>(row: &'a Row, names: &[&str]) -> Option<&'a str> {
    for name in names {
        if let Some(v) = row.get(*name) {
            let v = v.trim();
            if !v.is_empty() {
                return Some(v);
            }
            continue;
        }
        for (k, v) in row {
            if k.eq_ignore_ascii_case(name) {
                let v = v.trim();
                if !v.is_empty() {
                    return Some(v);
                }
            }
        }
    }
    None
}

/// Returns `true` if `header` is one of `names` (case-insensitive).
pub fn header_matches(header: &str, names: &[&str]) -> bool {
    names.iter().any(|n| header.eq_ignore_ascii_case(n))
}

#[cfg(test)]
mod tests {
    use super::{field, parse_rows};
    use crate::dataset::DatasetError;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_quoted_coordinates_and_trims() {
        let csv = "Lot Number, Name ,Coordinates\n7,North Lot,\"32.1,-117.1;32.2,-117.2\"\n";
        let rows = parse_rows(csv).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["Name"], "North Lot");
        assert_eq!(rows[0]["Coordinates"], "32.1,-117.1;32.2,-117.2");
    }

    #[test]
    fn empty_inputs_are_typed_failures() {
        assert_eq!(parse_rows(""), Err(DatasetError::Empty));
        assert_eq!(parse_rows("  \n"), Err(DatasetError::Empty));
        assert_eq!(parse_rows("Name,Latitude\n"), Err(DatasetError::Empty));
        assert_eq!(parse_rows("Name,Latitude\n,\n"), Err(DatasetError::Empty));
    }

    #[test]
    fn short_rows_are_tolerated() {
        let rows = parse_rows("Name,Latitude,Longitude\nLibrary,34.05\n").unwrap();
        assert_eq!(rows[0].get("Longitude"), None);
        assert_eq!(field(&rows[0], &["latitude"]), Some("34.05"));
    }

    #[test]
    fn strips_byte_order_mark() {
        let rows = parse_rows("\u{feff}Name\nGym\n").unwrap();
        assert_eq!(field(&rows[0], &["Name"]), Some("Gym"));
    }

    #[test]
    fn field_skips_blank_candidates() {
        let rows = parse_rows("stop_name,Name\n,Transit Center\n").unwrap();
        assert_eq!(field(&rows[0], &["stop_name", "Name"]), Some("Transit Center"));
    }
}
