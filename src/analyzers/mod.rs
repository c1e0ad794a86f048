//! Categorical analysis over the merged table.
//!
//! Derives semantic categories (speed band, time-of-day slot, weather class)
//! for each merged row and computes comparison-fair mean deceleration per
//! bucket and weather category.

pub mod aggregate;
pub mod category;
pub mod types;
pub mod utility;
