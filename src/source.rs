//! Data source adapter: the only module that talks SQL.
//!
//! Each logical table is fetched with a single parameterless SELECT built
//! from the [`SchemaMapping`]. Cells are CAST in the query (timestamps to
//! TEXT, measures to DOUBLE PRECISION) so that decoding never depends on
//! the exact column types of the deployed database, and so that timestamp
//! parsing (with its drop-the-row policy) stays in `ingest` where it is
//! testable.
//!
//! Connectivity and query errors are propagated as-is; retrying is the
//! hosting environment's concern, not this service's.

use anyhow::Result;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::ingest::parse_timestamp;
use crate::models::{Location, RawReading, SensorKind, TimePeriod};
use crate::schema::SchemaMapping;

// ---

/// Fetch every reading row, as raw optional cells.
pub async fn fetch_readings(pool: &PgPool, mapping: &SchemaMapping) -> Result<Vec<RawReading>> {
    // ---
    let sql = readings_select(mapping);
    tracing::debug!("Fetching readings: {}", sql);

    let rows = sqlx::query(&sql).fetch_all(pool).await?;
    tracing::info!("Fetched {} reading row(s)", rows.len());

    Ok(rows.iter().map(|row| extract_reading(row, mapping)).collect())
}

/// Fetch the city table, or an empty list when the layout has none.
/// Rows missing an id or a name cannot be joined or displayed and are
/// skipped with a debug log.
pub async fn fetch_locations(pool: &PgPool, mapping: &SchemaMapping) -> Result<Vec<Location>> {
    // ---
    let Some(cities) = &mapping.cities else {
        return Ok(Vec::new());
    };

    let sql = format!(
        "SELECT CAST({id} AS BIGINT) AS id, CAST({name} AS TEXT) AS name, \
         CAST({lat} AS DOUBLE PRECISION) AS latitude, CAST({lon} AS DOUBLE PRECISION) AS longitude \
         FROM {table}",
        id = quote_ident(&cities.id_col),
        name = quote_ident(&cities.name_col),
        lat = quote_ident(&cities.latitude_col),
        lon = quote_ident(&cities.longitude_col),
        table = quote_ident(&cities.table),
    );
    tracing::debug!("Fetching locations: {}", sql);

    let rows = sqlx::query(&sql).fetch_all(pool).await?;

    let mut locations = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        let id = opt_cell::<i64>(row, "id");
        let name = opt_cell::<String>(row, "name");
        match (id, name) {
            (Some(id), Some(name)) => locations.push(Location {
                id,
                name,
                latitude: opt_cell(row, "latitude"),
                longitude: opt_cell(row, "longitude"),
            }),
            _ => tracing::debug!("Skipping city row {} with missing id or name", i),
        }
    }

    tracing::info!("Fetched {} location(s)", locations.len());
    Ok(locations)
}

/// Fetch the selectable collection periods, or an empty list when the
/// layout has none. Rows whose bounds do not parse are skipped.
pub async fn fetch_periods(pool: &PgPool, mapping: &SchemaMapping) -> Result<Vec<TimePeriod>> {
    // ---
    let Some(periods) = &mapping.periods else {
        return Ok(Vec::new());
    };

    let sql = format!(
        "SELECT CAST({id} AS BIGINT) AS id, CAST({start} AS TEXT) AS start, CAST({finish} AS TEXT) AS finish \
         FROM {table}",
        id = quote_ident(&periods.id_col),
        start = quote_ident(&periods.start_col),
        finish = quote_ident(&periods.end_col),
        table = quote_ident(&periods.table),
    );
    tracing::debug!("Fetching periods: {}", sql);

    let rows = sqlx::query(&sql).fetch_all(pool).await?;

    let mut out = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        let id = opt_cell::<i64>(row, "id");
        let start = opt_cell::<String>(row, "start").as_deref().and_then(parse_timestamp);
        let end = opt_cell::<String>(row, "finish").as_deref().and_then(parse_timestamp);
        match (id, start, end) {
            (Some(id), Some(start), Some(end)) => out.push(TimePeriod { id, start, end }),
            _ => tracing::debug!("Skipping period row {} with missing id or unparsable bounds", i),
        }
    }

    tracing::info!("Fetched {} selectable period(s)", out.len());
    Ok(out)
}

// ---

/// `SELECT` over the readings table projecting every mapped column under
/// its logical alias.
fn readings_select(mapping: &SchemaMapping) -> String {
    // ---
    let mut projections = vec![
        format!("CAST({} AS TEXT) AS ts", quote_ident(&mapping.timestamp_col)),
        format!("CAST({} AS DOUBLE PRECISION) AS humidity", quote_ident(&mapping.humidity_col)),
    ];

    for kind in [SensorKind::Temperature, SensorKind::Pressure, SensorKind::Co2] {
        if let Some(col) = mapping.sensor_col(kind) {
            projections.push(format!(
                "CAST({} AS DOUBLE PRECISION) AS {}",
                quote_ident(col),
                kind
            ));
        }
    }
    if let Some(col) = &mapping.location_col {
        projections.push(format!("CAST({} AS TEXT) AS location", quote_ident(col)));
    }
    if let Some(col) = &mapping.location_id_col {
        projections.push(format!("CAST({} AS BIGINT) AS location_id", quote_ident(col)));
    }

    format!(
        "SELECT {} FROM {}",
        projections.join(", "),
        quote_ident(&mapping.readings_table)
    )
}

fn extract_reading(row: &PgRow, mapping: &SchemaMapping) -> RawReading {
    // ---
    RawReading {
        timestamp: opt_cell(row, "ts"),
        humidity: opt_cell(row, "humidity"),
        temperature: mapping.temperature_col.as_ref().and_then(|_| opt_cell(row, "temperature")),
        pressure: mapping.pressure_col.as_ref().and_then(|_| opt_cell(row, "pressure")),
        co2: mapping.co2_col.as_ref().and_then(|_| opt_cell(row, "co2")),
        location: mapping.location_col.as_ref().and_then(|_| opt_cell(row, "location")),
        location_id: mapping.location_id_col.as_ref().and_then(|_| opt_cell(row, "location_id")),
    }
}

/// NULL-or-undecodable cell as `None`. A bad cell degrades that one value,
/// never the fetch.
fn opt_cell<'r, T>(row: &'r PgRow, alias: &str) -> Option<T>
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    row.try_get::<Option<T>, _>(alias).ok().flatten()
}

/// Double-quote an identifier; the deployed schemas use accented and
/// mixed-case column names (`pressão`, `CO2`) that Postgres folds without
/// quoting.
fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::schema::SchemaLayout;

    #[test]
    fn test_readings_select_inline_layout() {
        // ---
        let sql = readings_select(&SchemaMapping::for_layout(SchemaLayout::Inline));
        assert_eq!(
            sql,
            "SELECT CAST(\"tempo_registro\" AS TEXT) AS ts, \
             CAST(\"umidade\" AS DOUBLE PRECISION) AS humidity, \
             CAST(\"temperatura\" AS DOUBLE PRECISION) AS temperature, \
             CAST(\"pressão\" AS DOUBLE PRECISION) AS pressure, \
             CAST(\"CO2\" AS DOUBLE PRECISION) AS co2, \
             CAST(\"local\" AS TEXT) AS location \
             FROM \"leitura\""
        );
    }

    #[test]
    fn test_readings_select_city_layout() {
        // ---
        let sql = readings_select(&SchemaMapping::for_layout(SchemaLayout::City));
        assert_eq!(
            sql,
            "SELECT CAST(\"data_hora_leitura\" AS TEXT) AS ts, \
             CAST(\"valor_umidade\" AS DOUBLE PRECISION) AS humidity, \
             CAST(\"id_cidade\" AS BIGINT) AS location_id \
             FROM \"leitura\""
        );
    }

    #[test]
    fn test_quote_ident_escapes_embedded_quotes() {
        // ---
        assert_eq!(quote_ident("CO2"), "\"CO2\"");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }
}
