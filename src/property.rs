use std::{fs::File, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer};

/// One row of the input table.
///
/// Blank or unparsable coordinates load as NaN and fail later for that
/// record only.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct PropertyRecord {
    pub id: String,
    #[serde(deserialize_with = "lenient_f64")]
    pub lat: f64,
    #[serde(rename = "long", deserialize_with = "lenient_f64")]
    pub lon: f64,
}

fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let text = String::deserialize(deserializer)?;
    Ok(text.trim().parse().unwrap_or(f64::NAN))
}

/// Reads every record from a CSV file with at least `id`, `lat` and `long`
/// columns. A missing column or a row with the wrong number of fields fails
/// the whole load.
pub fn load_properties(path: &Path) -> Result<Vec<PropertyRecord>> {
    let file = File::open(path).with_context(|| format!("Failed to open {:?}", path))?;
    read_properties(file).with_context(|| format!("Failed to read properties from {:?}", path))
}

fn read_properties<R: std::io::Read>(reader: R) -> Result<Vec<PropertyRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    for (row_idx, result) in rdr.deserialize().enumerate() {
        // +2: header line, 1-based
        let record: PropertyRecord =
            result.with_context(|| format!("Bad record on line {}", row_idx + 2))?;
        records.push(record);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use tempfile::tempdir;

    #[test]
    fn read_with_extra_columns() {
        let csv = "id,date,price,lat,long,sqft\n\
                   7129300520,20141013,221900,47.5112,-122.257,1180\n\
                   6414100192,20141209,538000,47.721,-122.319,2570\n";

        let records = read_properties(csv.as_bytes()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "7129300520");
        assert_eq!(records[0].lat, 47.5112);
        assert_eq!(records[0].lon, -122.257);
        assert_eq!(records[1].id, "6414100192");
    }

    #[test]
    fn identifier_kept_as_text() {
        let csv = "id,lat,long\n 00042 ,1.0,2.0\nabc-1,3.0,4.0\n";

        let records = read_properties(csv.as_bytes()).unwrap();

        assert_eq!(records[0].id, "00042");
        assert_eq!(records[1].id, "abc-1");
    }

    #[test]
    fn missing_column_fails() {
        let csv = "id,lat\n1,2.0\n";

        assert!(read_properties(csv.as_bytes()).is_err());
    }

    #[test]
    fn bad_coordinates_load_as_nan() {
        let csv = "id,lat,long\n1,north,2.0\n2,,3.0\n3,4.0, \n";

        let records = read_properties(csv.as_bytes()).unwrap();

        assert_eq!(records.len(), 3);
        assert!(records[0].lat.is_nan());
        assert_eq!(records[0].lon, 2.0);
        assert!(records[1].lat.is_nan());
        assert_eq!(records[2].lat, 4.0);
        assert!(records[2].lon.is_nan());
    }

    #[test]
    fn short_row_fails() {
        let csv = "id,lat,long\n1,40.0,-74.0\n2,41.0\n";

        let err = read_properties(csv.as_bytes()).unwrap_err();

        assert!(err.to_string().contains("line 3"));
    }

    #[test]
    fn load_from_file() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("train.csv");
        fs::write(&path, "id,lat,long\n1,40.0,-74.0\n").unwrap();

        let records = load_properties(&path).unwrap();

        assert_eq!(
            records,
            vec![PropertyRecord {
                id: "1".to_string(),
                lat: 40.0,
                lon: -74.0
            }]
        );
    }

    #[test]
    fn load_missing_file_fails() {
        let temp_dir = tempdir().unwrap();

        assert!(load_properties(&temp_dir.path().join("nope.csv")).is_err());
    }
}
