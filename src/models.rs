//! Data models for the dashboard pipeline.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

// ---

/// Location name used when a reading carries no location information.
pub const UNDEFINED_LOCATION: &str = "Undefined";

/// Time-of-day bucket derived from a reading's timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DayPeriod {
    Morning,
    Afternoon,
    Night,
}

impl DayPeriod {
    // ---
    pub const ALL: [DayPeriod; 3] = [DayPeriod::Morning, DayPeriod::Afternoon, DayPeriod::Night];

    /// Classify an hour of day: [6,12) is Morning, [12,18) is Afternoon,
    /// everything else is Night.
    pub fn from_hour(hour: u32) -> Self {
        // ---
        match hour {
            6..=11 => DayPeriod::Morning,
            12..=17 => DayPeriod::Afternoon,
            _ => DayPeriod::Night,
        }
    }

    pub fn as_str(&self) -> &'static str {
        // ---
        match self {
            DayPeriod::Morning => "Morning",
            DayPeriod::Afternoon => "Afternoon",
            DayPeriod::Night => "Night",
        }
    }
}

impl fmt::Display for DayPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DayPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // ---
        match s.trim().to_ascii_lowercase().as_str() {
            "morning" => Ok(DayPeriod::Morning),
            "afternoon" => Ok(DayPeriod::Afternoon),
            "night" => Ok(DayPeriod::Night),
            other => Err(format!("unknown day period: {other:?}")),
        }
    }
}

// ---

/// One of the sensor measures a reading can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorKind {
    Humidity,
    Temperature,
    Pressure,
    Co2,
}

impl SensorKind {
    // ---
    pub const ALL: [SensorKind; 4] = [
        SensorKind::Humidity,
        SensorKind::Temperature,
        SensorKind::Pressure,
        SensorKind::Co2,
    ];

    pub fn as_str(&self) -> &'static str {
        // ---
        match self {
            SensorKind::Humidity => "humidity",
            SensorKind::Temperature => "temperature",
            SensorKind::Pressure => "pressure",
            SensorKind::Co2 => "co2",
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SensorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // ---
        match s.trim().to_ascii_lowercase().as_str() {
            "humidity" => Ok(SensorKind::Humidity),
            "temperature" => Ok(SensorKind::Temperature),
            "pressure" => Ok(SensorKind::Pressure),
            "co2" => Ok(SensorKind::Co2),
            other => Err(format!("unknown sensor: {other:?}")),
        }
    }
}

// ---

/// Raw reading row as fetched from the database.
///
/// Every cell is optional: the source adapter hands rows over as-is and
/// normalization decides what is usable. The timestamp stays a string here
/// so that unparsable values can be dropped per row instead of failing the
/// whole fetch.
#[derive(Debug, Clone, Default)]
pub struct RawReading {
    // ---
    pub timestamp: Option<String>,
    pub humidity: Option<f64>,
    pub temperature: Option<f64>,
    pub pressure: Option<f64>,
    pub co2: Option<f64>,
    pub location: Option<String>,
    pub location_id: Option<i64>,
}

/// Normalized sensor reading, ready for filtering and aggregation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reading {
    // ---
    pub timestamp: NaiveDateTime,
    pub period: DayPeriod,
    pub location: String,
    pub humidity: Option<f64>,
    pub temperature: Option<f64>,
    pub pressure: Option<f64>,
    pub co2: Option<f64>,
}

impl Reading {
    /// Value of the given sensor measure, if this reading has one.
    pub fn sensor(&self, kind: SensorKind) -> Option<f64> {
        // ---
        match kind {
            SensorKind::Humidity => self.humidity,
            SensorKind::Temperature => self.temperature,
            SensorKind::Pressure => self.pressure,
            SensorKind::Co2 => self.co2,
        }
    }

    /// Time-of-day bucket for a timestamp.
    pub fn period_of(timestamp: NaiveDateTime) -> DayPeriod {
        DayPeriod::from_hour(timestamp.hour())
    }
}

// ---

/// A place readings are collected at. Coordinates are optional; the map
/// aggregate only covers locations that have both.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Location {
    // ---
    pub id: i64,
    pub name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// A named collection interval offered as a date-range shortcut in the
/// filter widgets. Not joined to readings beyond filtering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimePeriod {
    // ---
    pub id: i64,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}
