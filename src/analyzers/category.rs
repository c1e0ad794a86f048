//! Derived categorical fields: weather class, speed band, time-of-day slot.

use crate::join::MergedRecord;
use chrono::Timelike;

/// Weather class of a joined row. Rain requires positive measured
/// precipitation; null or NaN precipitation counts as clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeatherCategory {
    ClearOrCloudy,
    Rain,
}

impl WeatherCategory {
    pub fn of(record: &MergedRecord) -> Self {
        match record.precipitation_mm {
            Some(p) if p > 0.0 => Self::Rain,
            _ => Self::ClearOrCloudy,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::ClearOrCloudy => "clear_or_cloudy",
            Self::Rain => "rain",
        }
    }
}

/// A partition axis value. Implementors carry the display label used in
/// report tables and chart axes.
pub trait Bucket: Copy + Eq {
    fn label(&self) -> &'static str;
}

/// Speed band. Boundaries are closed on the mid band: 30 and 60 km/h are
/// both mid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpeedBin {
    Low,
    Mid,
    High,
}

impl SpeedBin {
    /// Display order for report rows and chart axes.
    pub const ORDER: [SpeedBin; 3] = [SpeedBin::Low, SpeedBin::Mid, SpeedBin::High];

    pub fn of(speed_kmph: f64) -> Self {
        if speed_kmph < 30.0 {
            Self::Low
        } else if speed_kmph <= 60.0 {
            Self::Mid
        } else {
            Self::High
        }
    }

    /// Bucketing function for the speed axis; rows without a parseable
    /// speed fall outside the axis.
    pub fn of_record(record: &MergedRecord) -> Option<Self> {
        record.speed().map(Self::of)
    }
}

impl Bucket for SpeedBin {
    fn label(&self) -> &'static str {
        match self {
            Self::Low => "low (<30 km/h)",
            Self::Mid => "mid (30-60 km/h)",
            Self::High => "high (>60 km/h)",
        }
    }
}

/// Time-of-day slot. Night wraps around midnight (22:00 through 04:59);
/// hours 5-6 and 20-21 belong to no slot and are excluded from the axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeSlot {
    Morning,
    Midday,
    Evening,
    Night,
}

impl TimeSlot {
    /// Display order for report rows and chart axes.
    pub const ORDER: [TimeSlot; 4] = [
        TimeSlot::Morning,
        TimeSlot::Midday,
        TimeSlot::Evening,
        TimeSlot::Night,
    ];

    pub fn of_hour(hour: u32) -> Option<Self> {
        match hour {
            7..=9 => Some(Self::Morning),
            10..=16 => Some(Self::Midday),
            17..=19 => Some(Self::Evening),
            22..=23 | 0..=4 => Some(Self::Night),
            _ => None,
        }
    }

    /// Bucketing function for the time axis; rows whose timestamp never
    /// parsed are excluded along with out-of-slot hours.
    pub fn of_record(record: &MergedRecord) -> Option<Self> {
        record.event_time().and_then(|ts| Self::of_hour(ts.hour()))
    }
}

impl Bucket for TimeSlot {
    fn label(&self) -> &'static str {
        match self {
            Self::Morning => "morning (7-9h)",
            Self::Midday => "midday (10-16h)",
            Self::Evening => "evening (17-19h)",
            Self::Night => "night (22-4h)",
        }
    }
}
