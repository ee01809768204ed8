//! Filter selection and application.
//!
//! A [`FilterSelection`] is built once per render from the request
//! parameters and passed by value through the pipeline; nothing downstream
//! reads widget state. [`apply`] is a pure intersection of the three
//! predicates (date range, time-of-day buckets, locations).

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{DayPeriod, Reading};

// ---

/// The user's active filter choices.
///
/// All three predicates are ANDed. An empty accepted set on the period or
/// the location dimension therefore matches nothing: deselecting every
/// widget option means "show nothing".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterSelection {
    // ---
    /// Inclusive lower bound on the reading date.
    pub start: NaiveDate,
    /// Inclusive upper bound on the reading date.
    pub end: NaiveDate,
    pub periods: BTreeSet<DayPeriod>,
    pub locations: BTreeSet<String>,
}

impl FilterSelection {
    /// The widest selection for the given readings: full date range, every
    /// time-of-day bucket and location present in the data.
    ///
    /// Returns `None` when there are no readings to take bounds from: the
    /// degraded mode in which the caller passes the table through
    /// unfiltered and reports "no valid date values" instead of a chart.
    pub fn covering(readings: &[Reading]) -> Option<Self> {
        // ---
        let start = readings.iter().map(|r| r.timestamp.date()).min()?;
        let end = readings.iter().map(|r| r.timestamp.date()).max()?;

        Some(FilterSelection {
            start,
            end,
            periods: readings.iter().map(|r| r.period).collect(),
            locations: readings.iter().map(|r| r.location.clone()).collect(),
        })
    }

    fn accepts(&self, reading: &Reading) -> bool {
        // ---
        let date = reading.timestamp.date();
        self.start <= date
            && date <= self.end
            && self.periods.contains(&reading.period)
            && self.locations.contains(&reading.location)
    }
}

/// Readings matching the selection, in their original order.
pub fn apply(readings: &[Reading], selection: &FilterSelection) -> Vec<Reading> {
    // ---
    readings
        .iter()
        .filter(|r| selection.accepts(r))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::models::UNDEFINED_LOCATION;
    use chrono::NaiveDateTime;

    fn reading(raw_ts: &str, location: &str) -> Reading {
        // ---
        let timestamp = NaiveDateTime::parse_from_str(raw_ts, "%Y-%m-%d %H:%M:%S").unwrap();
        Reading {
            timestamp,
            period: Reading::period_of(timestamp),
            location: location.to_string(),
            humidity: Some(50.0),
            temperature: None,
            pressure: None,
            co2: None,
        }
    }

    fn sample_table() -> Vec<Reading> {
        // ---
        vec![
            reading("2025-01-01 07:00:00", "Recife"),
            reading("2025-01-02 13:00:00", "Natal"),
            reading("2025-01-03 20:00:00", "Recife"),
            reading("2025-01-04 09:30:00", UNDEFINED_LOCATION),
        ]
    }

    #[test]
    fn test_covering_selection_is_identity() {
        // ---
        let table = sample_table();
        let selection = FilterSelection::covering(&table).unwrap();

        let filtered = apply(&table, &selection);
        assert_eq!(filtered, table, "default selection must keep every row in order");
    }

    #[test]
    fn test_covering_returns_none_for_empty_table() {
        assert!(FilterSelection::covering(&[]).is_none());
    }

    #[test]
    fn test_apply_is_idempotent() {
        // ---
        let table = sample_table();
        let mut selection = FilterSelection::covering(&table).unwrap();
        selection.periods.remove(&DayPeriod::Night);

        let once = apply(&table, &selection);
        let twice = apply(&once, &selection);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_empty_location_set_matches_nothing() {
        // ---
        let table = sample_table();
        let mut selection = FilterSelection::covering(&table).unwrap();
        selection.locations.clear();

        assert!(apply(&table, &selection).is_empty());
    }

    #[test]
    fn test_date_bounds_are_inclusive() {
        // ---
        let table = sample_table();
        let mut selection = FilterSelection::covering(&table).unwrap();
        selection.start = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
        selection.end = NaiveDate::from_ymd_opt(2025, 1, 3).unwrap();

        let filtered = apply(&table, &selection);
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered[0].location, "Natal");
        assert_eq!(filtered[1].location, "Recife");
    }

    #[test]
    fn test_period_and_location_predicates_intersect() {
        // ---
        let table = sample_table();
        let mut selection = FilterSelection::covering(&table).unwrap();
        selection.periods = [DayPeriod::Morning].into_iter().collect();
        selection.locations = ["Recife".to_string()].into_iter().collect();

        let filtered = apply(&table, &selection);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].timestamp.date(), NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
    }
}
