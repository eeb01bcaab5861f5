//! Built-in campus locations, usable as an offline building dataset.

pub const SEED_BUILDINGS_CSV: &str = "\
Name,Latitude,Longitude,Description
Main Building,34.0522,-118.1435,Central campus building
Science Center,34.0525,-118.1440,Science and research building
Library,34.0530,-118.1425,Campus library and study center
Student Center,34.0515,-118.1445,Student activities and services
";

#[cfg(test)]
mod tests {
    use super::SEED_BUILDINGS_CSV;
    use crate::adapters::{BUILDINGS, adapt_rows};
    use crate::rows::parse_rows;

    #[test]
    fn seed_rows_adapt_cleanly() {
        let rows = parse_rows(SEED_BUILDINGS_CSV).unwrap();
        let report = adapt_rows(&BUILDINGS, &rows);
        assert_eq!(report.entities.len(), 4);
        assert!(report.skipped.is_empty());
        assert_eq!(report.entities[0].name, "Main Building");
    }
}
