//! End-to-end pipeline tests: raw rows in, chart tables out, for both
//! database layouts. No server or database required: the pipeline between
//! the SQL fetch and the HTTP surface is pure.

use chrono::NaiveDate;

use humidash::aggregate;
use humidash::filter::{self, FilterSelection};
use humidash::ingest::{normalize, DataOrigin};
use humidash::models::RawReading;
use humidash::{DayPeriod, Location, SchemaLayout, SchemaMapping, SensorKind, UNDEFINED_LOCATION};

// ---

fn inline_row(ts: &str, humidity: f64, temperature: f64, local: &str) -> RawReading {
    // ---
    RawReading {
        timestamp: Some(ts.to_string()),
        humidity: Some(humidity),
        temperature: Some(temperature),
        pressure: Some(1010.0),
        co2: Some(415.0),
        location: Some(local.to_string()),
        location_id: None,
    }
}

fn city_row(ts: &str, humidity: f64, city_id: i64) -> RawReading {
    // ---
    RawReading {
        timestamp: Some(ts.to_string()),
        humidity: Some(humidity),
        location_id: Some(city_id),
        ..RawReading::default()
    }
}

#[test]
fn inline_layout_full_render() {
    // ---
    let mapping = SchemaMapping::for_layout(SchemaLayout::Inline);

    let raw = vec![
        inline_row("2025-01-01 07:15:00", 40.0, 24.0, "Recife"),
        inline_row("2025-01-01 14:00:00", 44.0, 27.0, "Recife"),
        inline_row("2025-01-02 07:15:00", 60.0, 23.0, "Natal"),
        RawReading { timestamp: Some("broken".into()), ..RawReading::default() },
        inline_row("2025-01-08 21:00:00", 80.0, 22.0, "Natal"),
    ];

    let set = normalize(raw, &[], &mapping);
    assert_eq!(set.origin(), DataOrigin::Live);
    assert_eq!(set.dropped(), 1);

    let readings = set.readings();
    assert_eq!(readings.len(), 4);

    // Default selection keeps everything, in order.
    let selection = FilterSelection::covering(readings).unwrap();
    let all = filter::apply(readings, &selection);
    assert_eq!(all, readings.to_vec());

    // Metric cards over the full set.
    assert_eq!(aggregate::reading_count(&all), 4);
    assert_eq!(aggregate::mean_humidity(&all), Some(56.0));

    // Line chart: one point per distinct timestamp, chronological.
    let line = aggregate::humidity_over_time(&all).unwrap();
    assert_eq!(line.len(), 4);
    assert!(line.windows(2).all(|w| w[0].timestamp < w[1].timestamp));

    // Pie chart: Jan 1-2 share an ISO week, Jan 8 starts another.
    let weeks = aggregate::weekly_mean(&all, SensorKind::Humidity).unwrap();
    assert_eq!(weeks.len(), 2);
    assert_eq!(weeks[0].week, "2025-W01");
    assert_eq!(weeks[0].mean, 48.0);
    assert_eq!(weeks[1].week, "2025-W02");
    assert_eq!(weeks[1].mean, 80.0);

    // Bar chart: all four sensors carry values in this layout.
    let sensors = aggregate::sensor_means(&all).unwrap();
    assert_eq!(sensors.len(), 4);

    // No city table in this layout: the map is skipped, not an error.
    assert!(aggregate::geo_means(&all, SensorKind::Humidity, &[]).is_none());

    // Narrow to mornings in Natal and re-check the cards.
    let mut narrowed = selection.clone();
    narrowed.periods = [DayPeriod::Morning].into_iter().collect();
    narrowed.locations = ["Natal".to_string()].into_iter().collect();

    let filtered = filter::apply(readings, &narrowed);
    assert_eq!(aggregate::reading_count(&filtered), 1);
    assert_eq!(aggregate::mean_humidity(&filtered), Some(60.0));

    // Recife fell out of the window, so it must not appear in the
    // per-location aggregate at all.
    let by_location = aggregate::location_means(&filtered, SensorKind::Humidity).unwrap();
    assert_eq!(by_location.len(), 1);
    assert_eq!(by_location[0].location, "Natal");
}

#[test]
fn inline_layout_empty_database_serves_labelled_placeholder() {
    // ---
    let mapping = SchemaMapping::for_layout(SchemaLayout::Inline);

    let set = normalize(Vec::new(), &[], &mapping);
    assert_eq!(set.origin(), DataOrigin::Placeholder);

    let readings = set.readings();
    assert_eq!(readings.len(), 10);
    assert!(readings.iter().all(|r| r.location == UNDEFINED_LOCATION));

    // The placeholder still flows through the widgets and charts so the UI
    // stays populated.
    let selection = FilterSelection::covering(readings).unwrap();
    assert_eq!(selection.start, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
    assert_eq!(selection.end, NaiveDate::from_ymd_opt(2025, 1, 10).unwrap());
    assert_eq!(aggregate::mean_humidity(readings), Some(50.0));
}

#[test]
fn city_layout_full_render() {
    // ---
    let mapping = SchemaMapping::for_layout(SchemaLayout::City);
    let cities = vec![
        Location { id: 1, name: "Recife".into(), latitude: Some(-8.05), longitude: Some(-34.88) },
        Location { id: 2, name: "Natal".into(), latitude: Some(-5.79), longitude: Some(-35.21) },
        Location { id: 3, name: "Olinda".into(), latitude: None, longitude: None },
    ];

    let raw = vec![
        city_row("2025-02-03 08:00:00", 55.0, 1),
        city_row("2025-02-03 16:00:00", 65.0, 1),
        city_row("2025-02-03 08:30:00", 70.0, 2),
        city_row("2025-02-04 08:30:00", 90.0, 2),
        city_row("2025-02-04 09:00:00", 62.0, 99), // no such city
    ];

    let set = normalize(raw, &cities, &mapping);
    assert_eq!(set.origin(), DataOrigin::Live);
    assert_eq!(set.dropped(), 0);

    let readings = set.readings();
    assert_eq!(readings[0].location, "Recife");
    assert_eq!(readings[4].location, UNDEFINED_LOCATION);

    let selection = FilterSelection::covering(readings).unwrap();
    let all = filter::apply(readings, &selection);

    // This layout has humidity only: the sensor comparison holds one row.
    let sensors = aggregate::sensor_means(&all).unwrap();
    assert_eq!(sensors.len(), 1);
    assert_eq!(sensors[0].sensor, SensorKind::Humidity);

    // Map points only for cities with coordinates and readings.
    let geo = aggregate::geo_means(&all, SensorKind::Humidity, &cities).unwrap();
    assert_eq!(geo.len(), 2);
    assert!(geo.iter().any(|g| g.location == "Recife" && g.mean == 60.0));
    assert!(geo.iter().any(|g| g.location == "Natal" && g.mean == 80.0));
    assert!(!geo.iter().any(|g| g.location == "Olinda"));

    // Daily multi-series: one row per (city, day) with readings.
    let daily = aggregate::daily_location_means(&all, SensorKind::Humidity).unwrap();
    assert_eq!(daily.len(), 4);
    let feb3 = NaiveDate::from_ymd_opt(2025, 2, 3).unwrap();
    assert!(daily
        .iter()
        .any(|d| d.location == "Natal" && d.day == feb3 && d.mean == 70.0));

    // Empty-selection edge: deselecting every city collapses everything to
    // "no data" without a crash.
    let mut none_selected = selection.clone();
    none_selected.locations.clear();
    let empty = filter::apply(readings, &none_selected);
    assert_eq!(aggregate::reading_count(&empty), 0);
    assert_eq!(aggregate::mean_humidity(&empty), None);
    assert!(aggregate::humidity_over_time(&empty).is_none());
    assert!(aggregate::weekly_mean(&empty, SensorKind::Humidity).is_none());
    assert!(aggregate::sensor_means(&empty).is_none());
    assert!(aggregate::location_means(&empty, SensorKind::Humidity).is_none());
    assert!(aggregate::geo_means(&empty, SensorKind::Humidity, &cities).is_none());
    assert!(aggregate::daily_location_means(&empty, SensorKind::Humidity).is_none());
}

#[test]
fn city_layout_empty_database_stays_live_and_degraded() {
    // ---
    let mapping = SchemaMapping::for_layout(SchemaLayout::City);

    // Where a city table exists, nothing is fabricated: the set is live and
    // empty, and no selection can be built (the degraded mode).
    let set = normalize(Vec::new(), &[], &mapping);
    assert_eq!(set.origin(), DataOrigin::Live);
    assert!(set.readings().is_empty());
    assert!(FilterSelection::covering(set.readings()).is_none());
}
