use anyhow::Result;
use axum::Router;
use sqlx::PgPool;

use crate::{ingest, source, Config, Location, ReadingSet, TimePeriod};

mod dashboard;
mod filters;
mod health;

// ---

pub fn router(pool: PgPool, config: Config) -> Router {
    // ---
    Router::new()
        .merge(dashboard::router())
        .merge(filters::router())
        .merge(health::router())
        .with_state((pool, config))
}

/// Fetch and normalize every logical table for one render. Both data
/// endpoints start here; within one request the result is read-only.
pub(crate) async fn load_tables(
    pool: &PgPool,
    config: &Config,
) -> Result<(ReadingSet, Vec<Location>, Vec<TimePeriod>)> {
    // ---
    let mapping = &config.schema;
    let locations = source::fetch_locations(pool, mapping).await?;
    let periods = source::fetch_periods(pool, mapping).await?;
    let raw = source::fetch_readings(pool, mapping).await?;
    let readings = ingest::normalize(raw, &locations, mapping);
    Ok((readings, locations, periods))
}
