//! Reader for the hard-deceleration event export.
//!
//! Unlike the weather export this file has a sane header row, but it shares
//! the optional BOM. Event cells are carried as verbatim text: the merged
//! output must reproduce event columns byte-for-byte, so typed views are
//! derived on demand instead of at load time.

use crate::error::{Error, Result};
use crate::parse;
use chrono::NaiveDateTime;
use csv::ReaderBuilder;
use std::path::Path;
use tracing::info;

/// One hard-deceleration event, fields verbatim from the source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecelerationEvent {
    pub timestamp: String,
    pub latitude: String,
    pub longitude: String,
    pub speed_kmph: String,
    pub deceleration_g: String,
}

impl DecelerationEvent {
    /// Coercive view of the timestamp; `None` when the text never parses.
    pub fn event_time(&self) -> Option<NaiveDateTime> {
        parse::timestamp_opt(&self.timestamp)
    }
}

const COL_TIMESTAMP: &str = "timestamp";
const COL_LATITUDE: &str = "latitude";
const COL_LONGITUDE: &str = "longitude";
const COL_SPEED: &str = "speed_kmph";
const COL_DECELERATION: &str = "deceleration_G";

/// Loads the deceleration export at `path`.
///
/// # Errors
///
/// Returns [`Error::MissingInput`] if the file does not exist,
/// [`Error::UnexpectedIo`] on read/decode failure, and
/// [`Error::MissingColumn`] if a required column is absent. Defective cells
/// are not errors here; they surface as `None` from the typed views.
pub fn load_events(path: &Path) -> Result<Vec<DecelerationEvent>> {
    if !path.exists() {
        return Err(Error::MissingInput {
            path: path.to_path_buf(),
        });
    }

    let bytes = std::fs::read(path).map_err(|e| Error::UnexpectedIo {
        path: path.to_path_buf(),
        source: e.into(),
    })?;
    let bytes = bytes.strip_prefix(b"\xef\xbb\xbf").unwrap_or(&bytes);
    let text = std::str::from_utf8(bytes).map_err(|e| Error::UnexpectedIo {
        path: path.to_path_buf(),
        source: e.into(),
    })?;

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| Error::UnexpectedIo {
            path: path.to_path_buf(),
            source: e.into(),
        })?
        .clone();

    let col = |name: &str| -> Result<usize> {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| Error::MissingColumn {
                path: path.to_path_buf(),
                name: name.to_string(),
            })
    };
    let ts_idx = col(COL_TIMESTAMP)?;
    let lat_idx = col(COL_LATITUDE)?;
    let lon_idx = col(COL_LONGITUDE)?;
    let speed_idx = col(COL_SPEED)?;
    let decel_idx = col(COL_DECELERATION)?;

    let mut events = Vec::new();
    for row in reader.into_records() {
        let row = row.map_err(|e| Error::UnexpectedIo {
            path: path.to_path_buf(),
            source: e.into(),
        })?;
        let cell = |idx: usize| row.get(idx).unwrap_or("").to_string();

        events.push(DecelerationEvent {
            timestamp: cell(ts_idx),
            latitude: cell(lat_idx),
            longitude: cell(lon_idx),
            speed_kmph: cell(speed_idx),
            deceleration_g: cell(decel_idx),
        });
    }

    info!(path = %path.display(), events = events.len(), "deceleration export loaded");
    Ok(events)
}
