//! Dashboard payload endpoint.
//!
//! `GET /dashboard` runs the whole pipeline for one render: fetch,
//! normalize, build the `FilterSelection` from the query parameters, filter,
//! and compute every chart table plus the scalar metric cards. Charts whose
//! builder is skipped are omitted from the JSON; data-quality issues come
//! back as warnings in the payload rather than errors.

use axum::{
    extract::Query, extract::State, http::StatusCode, response::IntoResponse, routing::get, Json,
    Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde::Serialize;
use sqlx::PgPool;
use tracing::{debug, error, info};

use crate::aggregate::{
    self, DailyLocationMean, GeoMean, LocationMean, SensorMean, TimePoint, WeekMean,
};
use crate::{filter, Config, DataOrigin, FilterSelection, Reading, SensorKind, TimePeriod};

// ---

pub fn router() -> Router<(PgPool, Config)> {
    // ---
    Router::new().route("/dashboard", get(handler))
}

/// Query parameters for one dashboard render.
///
/// Absent parameters default to "everything in the data"; a present but
/// empty list is an empty accepted set and matches nothing. `period_id`
/// swaps the date-range bounds for a stored collection period's; explicit
/// `start`/`end` still win over it.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    // ---
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    /// Comma-separated day-period names (`Morning,Night`).
    day_periods: Option<String>,
    /// Comma-separated location names.
    locations: Option<String>,
    /// Sensor measure for the per-week and per-location charts
    /// (default: humidity).
    sensor: Option<String>,
    period_id: Option<i64>,
}

/// Everything the presentation layer needs for one render.
#[derive(Debug, Serialize)]
struct DashboardPayload {
    // ---
    origin: DataOrigin,
    /// Rows discarded for unparsable timestamps.
    dropped_rows: usize,
    /// True when no filter could be built (no valid dates at all) and the
    /// table passed through unfiltered.
    degraded: bool,
    warnings: Vec<String>,
    /// The measure the per-week and per-location charts were built for.
    sensor: SensorKind,

    // Metric cards. `mean_humidity: null` renders as "no data".
    reading_count: usize,
    mean_humidity: Option<f64>,

    // One field per chart; omitted entirely when the builder was skipped.
    #[serde(skip_serializing_if = "Option::is_none")]
    humidity_over_time: Option<Vec<TimePoint>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    weekly_mean: Option<Vec<WeekMean>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sensor_means: Option<Vec<SensorMean>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    location_means: Option<Vec<LocationMean>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    geo_means: Option<Vec<GeoMean>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    daily_location_means: Option<Vec<DailyLocationMean>>,
}

async fn handler(
    Query(params): Query<DashboardQuery>,
    State((pool, config)): State<(PgPool, Config)>,
) -> impl IntoResponse {
    // ---
    info!("GET /dashboard - Starting render");

    // Step 1: fetch and normalize
    debug!("GET /dashboard - Step 1: load tables");

    let (reading_set, locations, periods) = match super::load_tables(&pool, &config).await {
        Ok(tables) => tables,
        Err(e) => {
            error!("Failed to load tables for /dashboard: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json("Failed to fetch data"),
            )
                .into_response();
        }
    };

    let mut warnings = Vec::new();
    if reading_set.dropped() > 0 {
        warnings.push(format!(
            "{} reading(s) had unparsable timestamps and were dropped",
            reading_set.dropped()
        ));
    }
    if reading_set.origin() == DataOrigin::Placeholder {
        warnings.push("No readings in the database; showing a synthetic series".to_string());
    }

    // Step 2: build the selection and filter
    debug!("GET /dashboard - Step 2: apply filters");

    let sensor = sensor_from_params(&params, &mut warnings);
    let readings = reading_set.readings();

    let (filtered, degraded) = match selection_from_params(&params, readings, &periods, &mut warnings)
    {
        Some(selection) => {
            debug!("Apply filter: {:?}", selection);
            (filter::apply(readings, &selection), false)
        }
        None => {
            warnings.push("No valid date values; filters were not applied".to_string());
            (readings.to_vec(), true)
        }
    };

    // Step 3: aggregate
    debug!("GET /dashboard - Step 3: build chart tables");

    let payload = DashboardPayload {
        origin: reading_set.origin(),
        dropped_rows: reading_set.dropped(),
        degraded,
        warnings,
        sensor,
        reading_count: aggregate::reading_count(&filtered),
        mean_humidity: aggregate::mean_humidity(&filtered),
        humidity_over_time: aggregate::humidity_over_time(&filtered),
        weekly_mean: aggregate::weekly_mean(&filtered, sensor),
        sensor_means: aggregate::sensor_means(&filtered),
        location_means: aggregate::location_means(&filtered, sensor),
        geo_means: aggregate::geo_means(&filtered, sensor, &locations),
        daily_location_means: aggregate::daily_location_means(&filtered, sensor),
    };

    info!(
        "Render complete: {} of {} reading(s) after filtering",
        payload.reading_count,
        readings.len()
    );
    (StatusCode::OK, Json(payload)).into_response()
}

// ---

/// Sensor measure requested for the configurable charts, defaulting to
/// humidity. An unknown name is a data-quality notice, not an error.
fn sensor_from_params(params: &DashboardQuery, warnings: &mut Vec<String>) -> SensorKind {
    // ---
    match params.sensor.as_deref() {
        None => SensorKind::Humidity,
        Some(raw) => raw.parse().unwrap_or_else(|e: String| {
            warnings.push(format!("{e}; falling back to humidity"));
            SensorKind::Humidity
        }),
    }
}

/// Build the selection for this render: start from the widest selection the
/// data supports, then narrow by each parameter the request actually set.
///
/// `None` means the degraded mode: there are no readings, hence no valid
/// dates to build a selection from.
fn selection_from_params(
    params: &DashboardQuery,
    readings: &[Reading],
    periods: &[TimePeriod],
    warnings: &mut Vec<String>,
) -> Option<FilterSelection> {
    // ---
    let mut selection = FilterSelection::covering(readings)?;

    if let Some(id) = params.period_id {
        match periods.iter().find(|p| p.id == id) {
            Some(period) => {
                selection.start = period.start.date();
                selection.end = period.end.date();
            }
            None => warnings.push(format!("Unknown period id {id}; using the full date range")),
        }
    }
    if let Some(start) = params.start {
        selection.start = start;
    }
    if let Some(end) = params.end {
        selection.end = end;
    }

    if let Some(raw) = &params.day_periods {
        selection.periods = csv_values(raw)
            .filter_map(|token| match token.parse() {
                Ok(period) => Some(period),
                Err(e) => {
                    warnings.push(e);
                    None
                }
            })
            .collect();
    }
    if let Some(raw) = &params.locations {
        selection.locations = csv_values(raw).map(str::to_string).collect();
    }

    Some(selection)
}

/// Non-empty trimmed values of a comma-separated parameter. An empty or
/// all-whitespace parameter yields no values (an empty accepted set).
fn csv_values(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty())
}
