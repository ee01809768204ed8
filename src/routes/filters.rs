//! Filter widget options endpoint.
//!
//! The sidebar widgets (date slider, time-of-day and location multiselects,
//! period picker) populate themselves from `GET /filters`: the option sets
//! are whatever is present in the normalized data, plus the selectable
//! collection periods where the layout has them. The origin flag tells the
//! UI when it is looking at the empty-database placeholder series.

use std::collections::BTreeSet;

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use chrono::NaiveDate;
use serde::Serialize;
use sqlx::PgPool;
use tracing::error;

use crate::{Config, DataOrigin, Reading, TimePeriod};

// ---

pub fn router() -> Router<(PgPool, Config)> {
    // ---
    Router::new().route("/filters", get(handler))
}

/// Option sets for the filter widgets.
#[derive(Debug, PartialEq, Serialize)]
pub struct FilterOptions {
    // ---
    pub origin: DataOrigin,
    /// Earliest reading date, `None` when there is no data at all.
    pub first_day: Option<NaiveDate>,
    /// Latest reading date.
    pub last_day: Option<NaiveDate>,
    /// Time-of-day buckets present in the data.
    pub day_periods: Vec<String>,
    /// Location names present in the data.
    pub locations: Vec<String>,
    /// Selectable collection periods (city layout only).
    pub periods: Vec<TimePeriod>,
}

async fn handler(State((pool, config)): State<(PgPool, Config)>) -> impl IntoResponse {
    // ---
    let (readings, _locations, periods) = match super::load_tables(&pool, &config).await {
        Ok(tables) => tables,
        Err(e) => {
            error!("Failed to load tables for /filters: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json("Failed to fetch data"),
            )
                .into_response();
        }
    };

    let options = options_from(readings.readings(), readings.origin(), periods);
    (StatusCode::OK, Json(options)).into_response()
}

/// Widget options for a normalized reading set. Pure; deduplicates and
/// sorts so equal data always yields equal options.
fn options_from(readings: &[Reading], origin: DataOrigin, periods: Vec<TimePeriod>) -> FilterOptions {
    // ---
    let day_periods: BTreeSet<_> = readings.iter().map(|r| r.period).collect();
    let locations: BTreeSet<_> = readings.iter().map(|r| r.location.clone()).collect();

    FilterOptions {
        origin,
        first_day: readings.iter().map(|r| r.timestamp.date()).min(),
        last_day: readings.iter().map(|r| r.timestamp.date()).max(),
        day_periods: day_periods.into_iter().map(|p| p.to_string()).collect(),
        locations: locations.into_iter().collect(),
        periods,
    }
}
