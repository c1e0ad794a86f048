//! Comparison-fair aggregation, shared by the speed and time axes.
//!
//! Inside each bucket, a location only contributes if it was observed under
//! at least two distinct weather categories. This keeps a location's
//! intrinsic deceleration tendency from masquerading as a weather effect
//! when only one condition was ever seen there.

use crate::analyzers::category::{Bucket, WeatherCategory};
use crate::analyzers::types::{AxisSummary, BucketSummary};
use crate::analyzers::utility::mean;
use crate::join::MergedRecord;
use std::collections::HashMap;
use tracing::debug;

/// Exact-equality location key. Coordinates are compared by bit pattern,
/// matching the source data's repeated-measurement semantics.
type LocationKey = (u64, u64);

fn location_key(record: &MergedRecord) -> Option<LocationKey> {
    record
        .coordinates()
        .map(|(lat, lon)| (lat.to_bits(), lon.to_bits()))
}

/// Aggregates one analysis axis over rows already restricted to the region
/// of interest.
///
/// `bucket_of` assigns each row to a bucket or excludes it (`None`); `order`
/// fixes the report rows. Every label in `order` appears in the result even
/// when it has no fair data.
pub fn aggregate_axis<B: Bucket>(
    axis: &str,
    rows: &[MergedRecord],
    bucket_of: impl Fn(&MergedRecord) -> Option<B>,
    order: &[B],
) -> AxisSummary {
    // Categorize once; rows outside the axis or without coordinates drop out.
    let tagged: Vec<(B, LocationKey, WeatherCategory, Option<f64>)> = rows
        .iter()
        .filter_map(|r| {
            let bucket = bucket_of(r)?;
            let location = location_key(r)?;
            Some((bucket, location, WeatherCategory::of(r), r.deceleration()))
        })
        .collect();

    let buckets = order
        .iter()
        .map(|&label| summarize_bucket(label, &tagged))
        .collect();

    AxisSummary {
        axis: axis.to_string(),
        buckets,
    }
}

fn summarize_bucket<B: Bucket>(
    label: B,
    tagged: &[(B, LocationKey, WeatherCategory, Option<f64>)],
) -> BucketSummary {
    let in_bucket: Vec<_> = tagged.iter().filter(|(b, ..)| *b == label).collect();

    // Which weather categories were seen at each location in this bucket.
    let mut seen: HashMap<LocationKey, (bool, bool)> = HashMap::new();
    for (_, location, category, _) in &in_bucket {
        let entry = seen.entry(*location).or_default();
        match category {
            WeatherCategory::ClearOrCloudy => entry.0 = true,
            WeatherCategory::Rain => entry.1 = true,
        }
    }

    let mut clear_values = Vec::new();
    let mut rain_values = Vec::new();
    for (_, location, category, deceleration) in &in_bucket {
        if seen[location] != (true, true) {
            continue;
        }
        // null/NaN deceleration contributes to neither numerator nor count
        let Some(d) = (*deceleration).filter(|d| !d.is_nan()) else {
            continue;
        };
        match category {
            WeatherCategory::ClearOrCloudy => clear_values.push(d),
            WeatherCategory::Rain => rain_values.push(d),
        }
    }

    debug!(
        bucket = label.label(),
        rows = in_bucket.len(),
        fair_clear = clear_values.len(),
        fair_rain = rain_values.len(),
        "bucket summarized"
    );

    BucketSummary {
        bucket: label.label().to_string(),
        clear_or_cloudy: mean(&clear_values),
        rain: mean(&rain_values),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::category::{SpeedBin, TimeSlot};

    fn row(ts: &str, lat: &str, lon: &str, speed: &str, decel: &str, precip: f64) -> MergedRecord {
        MergedRecord {
            timestamp: ts.to_string(),
            latitude: lat.to_string(),
            longitude: lon.to_string(),
            speed_kmph: speed.to_string(),
            deceleration_g: decel.to_string(),
            temperature: Some(20.0),
            precipitation_mm: Some(precip),
            wind_speed: None,
            wind_direction: None,
        }
    }

    #[test]
    fn test_rain_only_location_is_excluded() {
        // Location A seen under both categories, location B only under rain.
        let rows = vec![
            row("2024-06-01 08:15:00", "34.5", "135.5", "40.0", "0.40", 0.0),
            row("2024-06-01 09:45:00", "34.5", "135.5", "40.0", "0.60", 2.5),
            row("2024-06-01 09:50:00", "34.51", "135.51", "40.0", "0.90", 2.5),
        ];

        let summary = aggregate_axis("time_slot", &rows, TimeSlot::of_record, &TimeSlot::ORDER);
        let morning = &summary.buckets[0];
        assert_eq!(morning.bucket, TimeSlot::Morning.label());
        // B's 0.90 must not leak into the rain mean
        assert_eq!(morning.rain, Some(0.6));
        assert_eq!(morning.clear_or_cloudy, Some(0.4));
    }

    #[test]
    fn test_no_fair_locations_reports_missing_not_zero() {
        // Every location seen under a single category only.
        let rows = vec![
            row("2024-06-01 08:15:00", "34.5", "135.5", "40.0", "0.40", 0.0),
            row("2024-06-01 08:20:00", "34.51", "135.51", "40.0", "0.50", 2.5),
        ];

        let summary = aggregate_axis("speed_bin", &rows, SpeedBin::of_record, &SpeedBin::ORDER);
        let mid = &summary.buckets[1];
        assert_eq!(mid.bucket, SpeedBin::Mid.label());
        assert_eq!(mid.clear_or_cloudy, None);
        assert_eq!(mid.rain, None);
    }

    #[test]
    fn test_all_labels_present_in_order() {
        let summary = aggregate_axis("speed_bin", &[], SpeedBin::of_record, &SpeedBin::ORDER);
        let labels: Vec<_> = summary.buckets.iter().map(|b| b.bucket.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                SpeedBin::Low.label(),
                SpeedBin::Mid.label(),
                SpeedBin::High.label()
            ]
        );
    }

    #[test]
    fn test_fairness_is_scoped_per_bucket() {
        // The same location is fair in the mid band but rain-only in high.
        let rows = vec![
            row("2024-06-01 08:15:00", "34.5", "135.5", "40.0", "0.40", 0.0),
            row("2024-06-01 09:45:00", "34.5", "135.5", "40.0", "0.60", 2.5),
            row("2024-06-01 09:50:00", "34.5", "135.5", "70.0", "0.80", 2.5),
        ];

        let summary = aggregate_axis("speed_bin", &rows, SpeedBin::of_record, &SpeedBin::ORDER);
        let mid = &summary.buckets[1];
        assert_eq!(mid.clear_or_cloudy, Some(0.4));
        assert_eq!(mid.rain, Some(0.6));

        let high = &summary.buckets[2];
        assert_eq!(high.clear_or_cloudy, None);
        assert_eq!(high.rain, None);
    }

    #[test]
    fn test_nan_deceleration_excluded_from_mean() {
        let mut nan_row = row("2024-06-01 08:30:00", "34.5", "135.5", "40.0", "0.0", 2.5);
        nan_row.deceleration_g = "NaN".to_string();
        let rows = vec![
            row("2024-06-01 08:15:00", "34.5", "135.5", "40.0", "0.40", 0.0),
            row("2024-06-01 09:45:00", "34.5", "135.5", "40.0", "0.60", 2.5),
            nan_row,
        ];

        let summary = aggregate_axis("speed_bin", &rows, SpeedBin::of_record, &SpeedBin::ORDER);
        let mid = &summary.buckets[1];
        // NaN row neither raises nor drags the mean toward zero
        assert_eq!(mid.rain, Some(0.6));
    }

    #[test]
    fn test_null_deceleration_excluded_from_mean() {
        let mut null_row = row("2024-06-01 08:30:00", "34.5", "135.5", "40.0", "0.0", 0.0);
        null_row.deceleration_g = String::new();
        let rows = vec![
            row("2024-06-01 08:15:00", "34.5", "135.5", "40.0", "0.40", 0.0),
            row("2024-06-01 09:45:00", "34.5", "135.5", "40.0", "0.60", 2.5),
            null_row,
        ];

        let summary = aggregate_axis("speed_bin", &rows, SpeedBin::of_record, &SpeedBin::ORDER);
        assert_eq!(summary.buckets[1].clear_or_cloudy, Some(0.4));
    }

    #[test]
    fn test_unmatched_weather_defaults_to_clear() {
        // Rows with null weather fields stay in the analysis as clear.
        let mut no_weather = row("2024-06-01 08:30:00", "34.5", "135.5", "40.0", "0.20", 0.0);
        no_weather.precipitation_mm = None;
        let rows = vec![
            no_weather,
            row("2024-06-01 09:45:00", "34.5", "135.5", "40.0", "0.60", 2.5),
        ];

        let summary = aggregate_axis("speed_bin", &rows, SpeedBin::of_record, &SpeedBin::ORDER);
        assert_eq!(summary.buckets[1].clear_or_cloudy, Some(0.2));
        assert_eq!(summary.buckets[1].rain, Some(0.6));
    }
}
