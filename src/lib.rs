//! Core library for the `humidash` backend service.
//!
//! The dashboard pipeline is a straight line, re-run in full on every render:
//! - `source` fetches the logical tables (readings, cities, periods) from
//!   PostgreSQL using the column mapping in `schema`
//! - `ingest` parses timestamps, derives the time-of-day bucket, resolves
//!   location names, and signals placeholder vs. live data
//! - `filter` intersects the user's `FilterSelection` with the normalized
//!   readings
//! - `aggregate` produces the per-chart summary tables and scalar metrics
//! - `routes` exposes the whole thing over HTTP for the widget/plotting layer
//!
//! Everything between `source` and `routes` is pure and synchronous; only
//! the SQL fetch and the HTTP surface are async.

pub mod aggregate;
pub mod config;
pub mod filter;
pub mod ingest;
pub mod models;
pub mod routes;
pub mod schema;
pub mod source;

pub use config::Config;

// Re-exported so routes/*.rs and the binary only need knowledge of the crate
// root, not of which sibling module a type lives in (EMBP).
pub use filter::FilterSelection;
pub use ingest::{DataOrigin, ReadingSet};
pub use models::{DayPeriod, Location, Reading, SensorKind, TimePeriod, UNDEFINED_LOCATION};
pub use schema::{SchemaLayout, SchemaMapping};
