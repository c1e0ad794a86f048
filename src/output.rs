//! Persistence and reporting for the merged table and analysis results.

use crate::analyzers::types::AxisSummary;
use crate::error::{Error, IoCause, Result};
use crate::join::MergedRecord;
use anyhow::Result as AnyResult;
use csv::{Reader, Writer};
use std::path::Path;
use tracing::{debug, info};

/// Writes the merged table as UTF-8 CSV with a header row. Column order is
/// fixed by the field order of [`MergedRecord`].
pub fn write_merged(path: &Path, records: &[MergedRecord]) -> Result<()> {
    let io_err = |e: IoCause| Error::UnexpectedIo {
        path: path.to_path_buf(),
        source: e,
    };

    let mut writer = Writer::from_path(path).map_err(|e| io_err(e.into()))?;
    for record in records {
        writer.serialize(record).map_err(|e| io_err(e.into()))?;
    }
    writer.flush().map_err(|e| io_err(e.into()))?;

    info!(path = %path.display(), rows = records.len(), "merged table written");
    Ok(())
}

/// Reads a previously written merged table back for analysis.
pub fn load_merged(path: &Path) -> Result<Vec<MergedRecord>> {
    if !path.exists() {
        return Err(Error::MissingInput {
            path: path.to_path_buf(),
        });
    }

    let io_err = |e: IoCause| Error::UnexpectedIo {
        path: path.to_path_buf(),
        source: e,
    };

    let mut reader = Reader::from_path(path).map_err(|e| io_err(e.into()))?;
    let mut rows = Vec::new();
    for result in reader.deserialize() {
        let record: MergedRecord = result.map_err(|e| io_err(e.into()))?;
        rows.push(record);
    }

    debug!(path = %path.display(), rows = rows.len(), "merged table loaded");
    Ok(rows)
}

/// Logs the first few merged rows, mirroring the sample printed after a
/// successful merge.
pub fn print_sample(records: &[MergedRecord], limit: usize) {
    for record in records.iter().take(limit) {
        info!(
            timestamp = %record.timestamp,
            latitude = %record.latitude,
            longitude = %record.longitude,
            speed_kmph = %record.speed_kmph,
            deceleration_g = %record.deceleration_g,
            precipitation_mm = ?record.precipitation_mm,
            "merged row"
        );
    }
}

/// Prints an axis result table to stdout and logs it as pretty JSON.
pub fn print_summary(summary: &AxisSummary) -> AnyResult<()> {
    println!(
        "{:<20} {:>16} {:>10}",
        summary.axis, "clear_or_cloudy", "rain"
    );
    for bucket in &summary.buckets {
        println!(
            "{:<20} {:>16} {:>10}",
            bucket.bucket,
            format_cell(bucket.clear_or_cloudy),
            format_cell(bucket.rain),
        );
    }

    info!("{}", serde_json::to_string_pretty(summary)?);
    Ok(())
}

fn format_cell(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.4}"),
        None => "-".to_string(),
    }
}
