//! Normalization of raw database rows into [`Reading`]s.
//!
//! This is the data-quality gate of the pipeline:
//! - timestamps are parsed here; rows that fail to parse are dropped and
//!   counted, never fatal
//! - the time-of-day bucket is derived from the parsed hour
//! - location names are resolved (inline column, city-id join, or the
//!   `"Undefined"` sentinel)
//! - an empty table in the inline layout is answered with a fixed synthetic
//!   series, carried behind an explicit [`DataOrigin`] signal so it can
//!   never be mistaken for live data

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::models::{RawReading, Reading, UNDEFINED_LOCATION};
use crate::schema::SchemaMapping;
use crate::Location;

// ---

/// Whether a reading set came from the database or is the synthetic
/// empty-database placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataOrigin {
    Live,
    Placeholder,
}

/// Output of normalization: the readings plus where they came from.
///
/// The placeholder variant exists only to keep the filter widgets populated
/// when the inline-layout database is empty; callers must surface the origin
/// to the user instead of presenting the series as measurements.
#[derive(Debug, Clone)]
pub enum ReadingSet {
    Live { readings: Vec<Reading>, dropped: usize },
    Placeholder(Vec<Reading>),
}

impl ReadingSet {
    // ---
    pub fn readings(&self) -> &[Reading] {
        match self {
            ReadingSet::Live { readings, .. } => readings,
            ReadingSet::Placeholder(readings) => readings,
        }
    }

    pub fn origin(&self) -> DataOrigin {
        match self {
            ReadingSet::Live { .. } => DataOrigin::Live,
            ReadingSet::Placeholder(_) => DataOrigin::Placeholder,
        }
    }

    /// Rows discarded for unparsable timestamps. Zero for placeholder data.
    pub fn dropped(&self) -> usize {
        match self {
            ReadingSet::Live { dropped, .. } => *dropped,
            ReadingSet::Placeholder(_) => 0,
        }
    }
}

// ---

/// Normalize raw rows into readings, preserving input order.
///
/// `locations` is only consulted for rows that carry a city id; an id with
/// no matching city resolves to the sentinel like any other missing
/// location.
pub fn normalize(raw: Vec<RawReading>, locations: &[Location], mapping: &SchemaMapping) -> ReadingSet {
    // ---
    let names_by_id: HashMap<i64, &str> = locations
        .iter()
        .map(|loc| (loc.id, loc.name.as_str()))
        .collect();

    let mut readings = Vec::with_capacity(raw.len());
    let mut dropped = 0usize;

    for row in raw {
        let Some(timestamp) = row.timestamp.as_deref().and_then(parse_timestamp) else {
            dropped += 1;
            continue;
        };

        let location = row
            .location
            .filter(|name| !name.trim().is_empty())
            .or_else(|| {
                row.location_id
                    .and_then(|id| names_by_id.get(&id).map(|name| name.to_string()))
            })
            .unwrap_or_else(|| UNDEFINED_LOCATION.to_string());

        readings.push(Reading {
            timestamp,
            period: Reading::period_of(timestamp),
            location,
            humidity: row.humidity,
            temperature: row.temperature,
            pressure: row.pressure,
            co2: row.co2,
        });
    }

    if dropped > 0 {
        tracing::warn!("Dropped {} reading(s) with unparsable timestamps", dropped);
    }

    if readings.is_empty() && mapping.placeholder_on_empty() {
        tracing::warn!("No usable readings in the database, serving the placeholder series");
        return ReadingSet::Placeholder(placeholder_series());
    }

    ReadingSet::Live { readings, dropped }
}

/// Parse a raw timestamp cell.
///
/// The deployed databases store timestamps as DATETIME or as text in a few
/// close formats, so several are tried in order. `None` means the row gets
/// dropped upstream.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    // ---
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    const FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
        "%d/%m/%Y %H:%M:%S",
    ];

    for format in FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(ts);
        }
    }

    // RFC 3339 with an offset; normalized to the wall-clock instant in UTC.
    if let Ok(ts) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Some(ts.naive_utc());
    }

    // Bare date, taken as midnight.
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Fixed 10-row synthetic series: one reading per day from 2025-01-01 with
/// flat nominal sensor values, hours cycling morning/afternoon/night, all at
/// the sentinel location. Exists solely so the filter widgets have options
/// to show when the database is empty.
pub fn placeholder_series() -> Vec<Reading> {
    // ---
    const HOURS: [u32; 3] = [8, 14, 20];
    let first_day = NaiveDate::from_ymd_opt(2025, 1, 1).expect("static date");

    (0..10)
        .map(|i| {
            let timestamp = first_day
                .checked_add_days(chrono::Days::new(i as u64))
                .expect("static range")
                .and_hms_opt(HOURS[i % HOURS.len()], 0, 0)
                .expect("static hour");
            Reading {
                timestamp,
                period: Reading::period_of(timestamp),
                location: UNDEFINED_LOCATION.to_string(),
                humidity: Some(50.0),
                temperature: Some(25.0),
                pressure: Some(1013.0),
                co2: Some(400.0),
            }
        })
        .collect()
}
