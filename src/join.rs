//! Temporal join of deceleration events against hourly weather.
//!
//! Each event timestamp is floored to its containing hour and looked up in
//! the weather index. Events always survive the join; weather fields are
//! null when no observation exists for that hour.

use crate::error::{Error, Result};
use crate::events::DecelerationEvent;
use crate::parse;
use crate::weather::WeatherRecord;
use chrono::NaiveDateTime;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{info, warn};

/// One row of the merged artifact. Field order here fixes the CSV column
/// order. Event columns are verbatim source text so the merge never mutates
/// event data; weather columns are typed and null when the hour had no
/// observation. Typed views of the event columns are derived on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedRecord {
    pub timestamp: String,
    pub latitude: String,
    pub longitude: String,
    pub speed_kmph: String,
    #[serde(rename = "deceleration_G")]
    pub deceleration_g: String,
    pub temperature: Option<f64>,
    pub precipitation_mm: Option<f64>,
    pub wind_speed: Option<f64>,
    pub wind_direction: Option<String>,
}

impl MergedRecord {
    pub fn event_time(&self) -> Option<NaiveDateTime> {
        parse::timestamp_opt(&self.timestamp)
    }

    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (
            parse::f64_opt(&self.latitude),
            parse::f64_opt(&self.longitude),
        ) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }

    pub fn speed(&self) -> Option<f64> {
        parse::f64_opt(&self.speed_kmph)
    }

    pub fn deceleration(&self) -> Option<f64> {
        parse::f64_opt(&self.deceleration_g)
    }
}

/// What to do when two normalized weather rows share the same hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum DuplicatePolicy {
    /// Keep the first occurrence in file order, log the rest.
    #[default]
    First,
    /// Abort the merge with [`Error::DuplicateKey`].
    Fail,
}

/// Builds the hour index over the normalized weather table.
fn index_weather(
    weather: &[WeatherRecord],
    policy: DuplicatePolicy,
) -> Result<HashMap<NaiveDateTime, &WeatherRecord>> {
    let mut index: HashMap<NaiveDateTime, &WeatherRecord> = HashMap::with_capacity(weather.len());
    for record in weather {
        if index.contains_key(&record.timestamp) {
            match policy {
                DuplicatePolicy::Fail => {
                    return Err(Error::DuplicateKey {
                        key: record.timestamp,
                    });
                }
                DuplicatePolicy::First => {
                    warn!(key = %record.timestamp, "duplicate weather hour, keeping first occurrence");
                }
            }
            continue;
        }
        index.insert(record.timestamp, record);
    }
    Ok(index)
}

/// Left-joins every event with the weather record for its hour.
///
/// Output order follows event input order; every input event produces
/// exactly one merged row.
pub fn merge(
    events: &[DecelerationEvent],
    weather: &[WeatherRecord],
    policy: DuplicatePolicy,
) -> Result<Vec<MergedRecord>> {
    let index = index_weather(weather, policy)?;

    let mut matched = 0usize;
    let merged: Vec<MergedRecord> = events
        .iter()
        .map(|event| {
            let hour = event.event_time().map(parse::floor_to_hour);
            let observation = hour.and_then(|h| index.get(&h));
            if observation.is_some() {
                matched += 1;
            }
            MergedRecord {
                timestamp: event.timestamp.clone(),
                latitude: event.latitude.clone(),
                longitude: event.longitude.clone(),
                speed_kmph: event.speed_kmph.clone(),
                deceleration_g: event.deceleration_g.clone(),
                temperature: observation.and_then(|w| w.temperature),
                precipitation_mm: observation.and_then(|w| w.precipitation_mm),
                wind_speed: observation.and_then(|w| w.wind_speed),
                wind_direction: observation.and_then(|w| w.wind_direction.clone()),
            }
        })
        .collect();

    info!(
        events = merged.len(),
        matched,
        unmatched = merged.len() - matched,
        "temporal join complete"
    );
    Ok(merged)
}
