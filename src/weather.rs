//! Normalizer for the raw weather export.
//!
//! The export is malformed in three known ways: the first line is a junk
//! header and the true column names sit in the first data row, the fifth
//! column name is corrupted, and the file may carry a UTF-8 BOM. This module
//! repairs all three and produces typed hourly records.
//!
//! Rows whose timestamp fails to parse are dropped here rather than kept
//! with a null timestamp: the timestamp is the join key, so a null-keyed
//! observation could never match an event and would only pad the table.
//! The drop is logged and counted, never fatal.

use crate::error::{Error, IoCause, Result};
use crate::parse;
use chrono::NaiveDateTime;
use csv::{ReaderBuilder, StringRecord};
use std::path::Path;
use tracing::{debug, info, warn};

/// A single hourly weather observation. The timestamp is hour-aligned.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherRecord {
    pub timestamp: NaiveDateTime,
    pub temperature: Option<f64>,
    pub precipitation_mm: Option<f64>,
    pub wind_speed: Option<f64>,
    pub wind_direction: Option<String>,
}

/// Known header defects in the source export: (column position, canonical
/// label). Applied after the name row is extracted.
const HEADER_REPAIRS: &[(usize, &str)] = &[(4, "wind direction")];

/// Data rows 0..FIRST_OBSERVATION_ROW are the embedded name row plus filler.
const FIRST_OBSERVATION_ROW: usize = 3;

const COL_TIMESTAMP: &str = "timestamp";
const COL_TEMPERATURE: &str = "temperature";
const COL_PRECIPITATION: &str = "precipitation_mm";
const COL_WIND_SPEED: &str = "wind_speed";
const COL_WIND_DIRECTION: &str = "wind direction";

/// Loads and repairs the weather export at `path`.
///
/// # Errors
///
/// Returns [`Error::MissingInput`] if the file does not exist,
/// [`Error::UnexpectedIo`] if it cannot be read or decoded, and
/// [`Error::MissingColumn`] if a required column is absent after repair.
/// Rows with unparseable timestamps are dropped and logged, never fatal.
pub fn load_weather(path: &Path) -> Result<Vec<WeatherRecord>> {
    if !path.exists() {
        return Err(Error::MissingInput {
            path: path.to_path_buf(),
        });
    }

    let bytes = std::fs::read(path).map_err(|e| Error::UnexpectedIo {
        path: path.to_path_buf(),
        source: e.into(),
    })?;
    let text = decode_utf8(&bytes).map_err(|e| Error::UnexpectedIo {
        path: path.to_path_buf(),
        source: e,
    })?;

    normalize(text, path)
}

/// Strips a leading UTF-8 BOM and decodes the remainder as UTF-8.
fn decode_utf8(bytes: &[u8]) -> std::result::Result<String, IoCause> {
    let bytes = bytes.strip_prefix(b"\xef\xbb\xbf").unwrap_or(bytes);
    Ok(std::str::from_utf8(bytes)?.to_string())
}

fn normalize(text: String, path: &Path) -> Result<Vec<WeatherRecord>> {
    // The junk header line is consumed as the csv header and ignored; the
    // rows we care about all sit in the record stream.
    let reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let rows: Vec<StringRecord> = reader
        .into_records()
        .collect::<std::result::Result<_, _>>()
        .map_err(|e| Error::UnexpectedIo {
            path: path.to_path_buf(),
            source: e.into(),
        })?;

    let Some(name_row) = rows.first() else {
        warn!(path = %path.display(), "weather export has no data rows");
        return Ok(Vec::new());
    };

    let columns = repaired_columns(name_row);
    debug!(?columns, "repaired weather header");

    let col = |name: &str| -> Result<usize> {
        columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| Error::MissingColumn {
                path: path.to_path_buf(),
                name: name.to_string(),
            })
    };
    let ts_idx = col(COL_TIMESTAMP)?;
    let temp_idx = col(COL_TEMPERATURE)?;
    let precip_idx = col(COL_PRECIPITATION)?;
    let wind_idx = col(COL_WIND_SPEED)?;
    let dir_idx = col(COL_WIND_DIRECTION)?;

    let mut records = Vec::new();
    let mut dropped = 0usize;

    for row in rows.iter().skip(FIRST_OBSERVATION_ROW) {
        let cell = |idx: usize| row.get(idx).unwrap_or("");

        let Some(ts) = parse::timestamp_opt(cell(ts_idx)) else {
            dropped += 1;
            warn!(raw = cell(ts_idx), "dropping weather row with unparseable timestamp");
            continue;
        };

        let direction = cell(dir_idx).trim();
        records.push(WeatherRecord {
            // hour alignment is an invariant the join relies on
            timestamp: parse::floor_to_hour(ts),
            temperature: parse::f64_opt(cell(temp_idx)),
            precipitation_mm: parse::f64_opt(cell(precip_idx)),
            wind_speed: parse::f64_opt(cell(wind_idx)),
            wind_direction: (!direction.is_empty()).then(|| direction.to_string()),
        });
    }

    info!(
        path = %path.display(),
        retained = records.len(),
        dropped,
        "weather export normalized"
    );
    Ok(records)
}

/// Extracts column names from the embedded name row, applying the known
/// repairs.
fn repaired_columns(name_row: &StringRecord) -> Vec<String> {
    let mut columns: Vec<String> = name_row.iter().map(|c| c.trim().to_string()).collect();
    for &(pos, canonical) in HEADER_REPAIRS {
        if pos < columns.len() {
            columns[pos] = canonical.to_string();
        }
    }
    columns
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io::Write;

    /// A miniature copy of the real export's shape: junk header line, name
    /// row with a corrupted fifth label, two filler rows, then observations.
    const RAW: &str = "\
col_0,col_1,col_2,col_3,col_4
timestamp,temperature,precipitation_mm,wind_speed,###bad###
station,sakai,sakai,sakai,sakai
unit,degC,mm,m/s,16dir
2024-06-01 08:00:00,21.5,0,2.1,NNE
2024-06-01 09:00:00,22.0,2.5,3.4,N
2024-06-01 10:00:00,--,,4.0,
garbage-timestamp,20.0,0,1.0,S
";

    fn write_fixture(name: &str, bytes: &[u8]) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(bytes).unwrap();
        path
    }

    fn hour(h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_normalize_repairs_and_types() {
        let path = write_fixture("decel_weather_test_normalize.csv", RAW.as_bytes());
        let records = load_weather(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        // 4 observation rows, one dropped for its timestamp
        assert_eq!(records.len(), 3);

        assert_eq!(records[0].timestamp, hour(8));
        assert_eq!(records[0].temperature, Some(21.5));
        assert_eq!(records[0].precipitation_mm, Some(0.0));
        assert_eq!(records[0].wind_direction.as_deref(), Some("NNE"));

        assert_eq!(records[1].precipitation_mm, Some(2.5));

        // coercive parse: "--" and empty cells become None
        assert_eq!(records[2].temperature, None);
        assert_eq!(records[2].precipitation_mm, None);
        assert_eq!(records[2].wind_direction, None);
    }

    #[test]
    fn test_bom_is_stripped() {
        let mut bytes = b"\xef\xbb\xbf".to_vec();
        bytes.extend_from_slice(RAW.as_bytes());
        let path = write_fixture("decel_weather_test_bom.csv", &bytes);
        let records = load_weather(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].timestamp, hour(8));
    }

    #[test]
    fn test_sub_hour_timestamps_are_floored() {
        let raw = RAW.replace("2024-06-01 08:00:00", "2024-06-01 08:42:10");
        let path = write_fixture("decel_weather_test_floor.csv", raw.as_bytes());
        let records = load_weather(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(records[0].timestamp, hour(8));
    }

    #[test]
    fn test_missing_file() {
        let err = load_weather(Path::new("/nonexistent/weather.csv")).unwrap_err();
        assert!(matches!(err, Error::MissingInput { .. }));
    }

    #[test]
    fn test_missing_column() {
        let raw = RAW.replace("precipitation_mm", "precip");
        let path = write_fixture("decel_weather_test_missing_col.csv", raw.as_bytes());
        let err = load_weather(&path).unwrap_err();
        std::fs::remove_file(&path).unwrap();

        match err {
            Error::MissingColumn { name, .. } => assert_eq!(name, "precipitation_mm"),
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn test_header_repair_overrides_fifth_label() {
        let row = StringRecord::from(vec![
            "timestamp",
            "temperature",
            "precipitation_mm",
            "wind_speed",
            "\u{98a8}\u{5411}:::",
        ]);
        let columns = repaired_columns(&row);
        assert_eq!(columns[4], "wind direction");
    }
}
