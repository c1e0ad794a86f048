//! Geographic bounding-box filter applied before aggregation.

use crate::join::MergedRecord;
use clap::Args;

/// Inclusive latitude/longitude bounds. Defaults cover the reference
/// deployment region (Sakai City).
#[derive(Debug, Clone, Copy, PartialEq, Args)]
pub struct BoundingBox {
    /// Southern boundary (inclusive)
    #[arg(long, default_value_t = 34.45)]
    pub lat_min: f64,

    /// Northern boundary (inclusive)
    #[arg(long, default_value_t = 34.60)]
    pub lat_max: f64,

    /// Western boundary (inclusive)
    #[arg(long, default_value_t = 135.40)]
    pub lon_min: f64,

    /// Eastern boundary (inclusive)
    #[arg(long, default_value_t = 135.60)]
    pub lon_max: f64,
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self {
            lat_min: 34.45,
            lat_max: 34.60,
            lon_min: 135.40,
            lon_max: 135.60,
        }
    }
}

impl BoundingBox {
    /// Rows with unparseable coordinates are outside every box.
    pub fn contains(&self, record: &MergedRecord) -> bool {
        let Some((lat, lon)) = record.coordinates() else {
            return false;
        };
        lat >= self.lat_min && lat <= self.lat_max && lon >= self.lon_min && lon <= self.lon_max
    }
}
