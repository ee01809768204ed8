//! Chart data builders.
//!
//! Each builder is a pure function from the filtered readings to the small
//! summary table one chart consumes. Builders never fail: when the input is
//! empty, or the data has no values for the requested measure, they return
//! `None` and the chart is simply omitted.
//!
//! Grouped outputs are ordered by their group key, so equal inputs always
//! produce byte-equal payloads.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::models::{Location, Reading, SensorKind};

// ---

/// Point on the humidity-over-time line chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimePoint {
    pub timestamp: NaiveDateTime,
    pub mean_humidity: f64,
}

/// Slice of the mean-per-ISO-week pie chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekMean {
    /// ISO week label, e.g. `2025-W01`.
    pub week: String,
    pub mean: f64,
}

/// Bar of the sensor-comparison chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorMean {
    pub sensor: SensorKind,
    pub mean: f64,
}

/// Bar of the per-location comparison chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationMean {
    pub location: String,
    pub mean: f64,
}

/// Map point: a located mean, sized/colored by the mean itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoMean {
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
    pub mean: f64,
}

/// One series sample of the per-location daily comparison (radar/multi-line).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyLocationMean {
    pub location: String,
    pub day: NaiveDate,
    pub mean: f64,
}

// ---

/// Running mean accumulator, the in-memory shape of `AVG(...)`/`COUNT(*)`.
#[derive(Debug, Default, Clone, Copy)]
struct Acc {
    sum: f64,
    count: usize,
}

impl Acc {
    // ---
    fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

/// Mean of a measure per group key. Readings without a value for the
/// measure contribute to no group; groups therefore never hold a NaN.
fn group_means<K: Ord>(
    readings: &[Reading],
    key: impl Fn(&Reading) -> K,
    value: impl Fn(&Reading) -> Option<f64>,
) -> BTreeMap<K, f64> {
    // ---
    let mut groups: BTreeMap<K, Acc> = BTreeMap::new();
    for reading in readings {
        if let Some(v) = value(reading) {
            groups.entry(key(reading)).or_default().push(v);
        }
    }
    groups
        .into_iter()
        .filter_map(|(k, acc)| acc.mean().map(|m| (k, m)))
        .collect()
}

fn non_empty<T>(rows: Vec<T>) -> Option<Vec<T>> {
    (!rows.is_empty()).then_some(rows)
}

// ---

/// Number of readings in the filtered set.
pub fn reading_count(readings: &[Reading]) -> usize {
    readings.len()
}

/// Mean humidity over the filtered set. `None` means "no data", which the
/// presentation layer renders as such; never NaN.
pub fn mean_humidity(readings: &[Reading]) -> Option<f64> {
    // ---
    let mut acc = Acc::default();
    for value in readings.iter().filter_map(|r| r.humidity) {
        acc.push(value);
    }
    acc.mean()
}

/// Mean humidity per exact timestamp, ordered by timestamp.
pub fn humidity_over_time(readings: &[Reading]) -> Option<Vec<TimePoint>> {
    // ---
    non_empty(
        group_means(readings, |r| r.timestamp, |r| r.humidity)
            .into_iter()
            .map(|(timestamp, mean_humidity)| TimePoint { timestamp, mean_humidity })
            .collect(),
    )
}

/// Mean of one sensor measure per ISO week, ordered by week label.
pub fn weekly_mean(readings: &[Reading], sensor: SensorKind) -> Option<Vec<WeekMean>> {
    // ---
    non_empty(
        group_means(readings, |r| week_label(r.timestamp), |r| r.sensor(sensor))
            .into_iter()
            .map(|(week, mean)| WeekMean { week, mean })
            .collect(),
    )
}

/// ISO week label for a timestamp, zero-padded so labels sort correctly.
pub fn week_label(timestamp: NaiveDateTime) -> String {
    // ---
    let week = timestamp.iso_week();
    format!("{}-W{:02}", week.year(), week.week())
}

/// Mean per sensor measure across the filtered set, one row per measure the
/// data actually has values for. Measures absent from the layout (or all
/// NULL) are omitted rather than zero-filled.
pub fn sensor_means(readings: &[Reading]) -> Option<Vec<SensorMean>> {
    // ---
    let rows: Vec<SensorMean> = SensorKind::ALL
        .into_iter()
        .filter_map(|sensor| {
            let mut acc = Acc::default();
            for value in readings.iter().filter_map(|r| r.sensor(sensor)) {
                acc.push(value);
            }
            acc.mean().map(|mean| SensorMean { sensor, mean })
        })
        .collect();
    non_empty(rows)
}

/// Mean of one sensor measure per location name, ordered by name. Locations
/// with no readings in the filtered set do not appear.
pub fn location_means(readings: &[Reading], sensor: SensorKind) -> Option<Vec<LocationMean>> {
    // ---
    non_empty(
        group_means(readings, |r| r.location.clone(), |r| r.sensor(sensor))
            .into_iter()
            .map(|(location, mean)| LocationMean { location, mean })
            .collect(),
    )
}

/// Per-location means joined with coordinates for the map chart. Only
/// locations with both latitude and longitude qualify; `None` when none do.
pub fn geo_means(
    readings: &[Reading],
    sensor: SensorKind,
    locations: &[Location],
) -> Option<Vec<GeoMean>> {
    // ---
    let rows: Vec<GeoMean> = group_means(readings, |r| r.location.clone(), |r| r.sensor(sensor))
        .into_iter()
        .filter_map(|(name, mean)| {
            let location = locations.iter().find(|loc| loc.name == name)?;
            Some(GeoMean {
                location: name,
                latitude: location.latitude?,
                longitude: location.longitude?,
                mean,
            })
        })
        .collect();
    non_empty(rows)
}

/// Mean of one sensor measure per (location, calendar day), for the
/// multi-series daily comparison. Ordered by location then day.
pub fn daily_location_means(
    readings: &[Reading],
    sensor: SensorKind,
) -> Option<Vec<DailyLocationMean>> {
    // ---
    non_empty(
        group_means(
            readings,
            |r| (r.location.clone(), r.timestamp.date()),
            |r| r.sensor(sensor),
        )
        .into_iter()
        .map(|((location, day), mean)| DailyLocationMean { location, day, mean })
        .collect(),
    )
}
