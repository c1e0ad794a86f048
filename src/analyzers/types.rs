//! Result types produced by the aggregation pipeline.

use serde::Serialize;

/// Mean deceleration for one bucket, split by weather category. `None`
/// means no comparison-fair data existed for that bucket, not zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketSummary {
    pub bucket: String,
    pub clear_or_cloudy: Option<f64>,
    pub rain: Option<f64>,
}

/// Complete result table for one analysis axis, rows in display order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisSummary {
    pub axis: String,
    pub buckets: Vec<BucketSummary>,
}
