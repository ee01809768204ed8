//! Table-layout knowledge for the dashboard data source.
//!
//! The two deployed sensor databases use different table layouts with
//! different (Portuguese) column names. All of that knowledge lives here as
//! a [`SchemaMapping`] from logical field names to physical columns, chosen
//! once at startup; ingestion and aggregation only ever see logical fields.

use std::fmt;
use std::str::FromStr;

use crate::models::SensorKind;

// ---

/// Which of the two supported table layouts the target database uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaLayout {
    /// One flat readings table with an inline location name column.
    Inline,
    /// Readings keyed to a city table by id, plus a selectable-periods table.
    City,
}

impl SchemaLayout {
    pub fn as_str(&self) -> &'static str {
        // ---
        match self {
            SchemaLayout::Inline => "inline",
            SchemaLayout::City => "city",
        }
    }
}

impl fmt::Display for SchemaLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SchemaLayout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // ---
        match s.trim().to_ascii_lowercase().as_str() {
            "inline" => Ok(SchemaLayout::Inline),
            "city" => Ok(SchemaLayout::City),
            other => Err(format!("unknown schema layout: {other:?} (expected \"inline\" or \"city\")")),
        }
    }
}

// ---

/// Physical columns of the city table, present only in the city layout.
#[derive(Debug, Clone)]
pub struct CityTable {
    // ---
    pub table: String,
    pub id_col: String,
    pub name_col: String,
    pub latitude_col: String,
    pub longitude_col: String,
}

/// Physical columns of the selectable-periods table.
#[derive(Debug, Clone)]
pub struct PeriodTable {
    // ---
    pub table: String,
    pub id_col: String,
    pub start_col: String,
    pub end_col: String,
}

/// Logical-field to physical-column mapping for one database layout.
///
/// Optional columns are `None` when the layout simply does not have them;
/// every consumer treats a missing column as "skip the dependent feature",
/// never as an error.
#[derive(Debug, Clone)]
pub struct SchemaMapping {
    // ---
    pub readings_table: String,
    pub timestamp_col: String,
    pub humidity_col: String,
    pub temperature_col: Option<String>,
    pub pressure_col: Option<String>,
    pub co2_col: Option<String>,
    /// Inline location name column (inline layout).
    pub location_col: Option<String>,
    /// Foreign key into the city table (city layout).
    pub location_id_col: Option<String>,
    pub cities: Option<CityTable>,
    pub periods: Option<PeriodTable>,
}

impl SchemaMapping {
    /// Mapping for the given layout.
    pub fn for_layout(layout: SchemaLayout) -> Self {
        // ---
        match layout {
            SchemaLayout::Inline => Self::inline(),
            SchemaLayout::City => Self::city(),
        }
    }

    /// Flat `leitura` table; location is an inline text column.
    fn inline() -> Self {
        // ---
        SchemaMapping {
            readings_table: "leitura".into(),
            timestamp_col: "tempo_registro".into(),
            humidity_col: "umidade".into(),
            temperature_col: Some("temperatura".into()),
            pressure_col: Some("pressão".into()),
            co2_col: Some("CO2".into()),
            location_col: Some("local".into()),
            location_id_col: None,
            cities: None,
            periods: None,
        }
    }

    /// `leitura` keyed to `cidade` by `id_cidade`; humidity only, plus the
    /// `periodo_leitura` table of selectable collection intervals.
    fn city() -> Self {
        // ---
        SchemaMapping {
            readings_table: "leitura".into(),
            timestamp_col: "data_hora_leitura".into(),
            humidity_col: "valor_umidade".into(),
            temperature_col: None,
            pressure_col: None,
            co2_col: None,
            location_col: None,
            location_id_col: Some("id_cidade".into()),
            cities: Some(CityTable {
                table: "cidade".into(),
                id_col: "id".into(),
                name_col: "nome_cidade".into(),
                latitude_col: "latitude".into(),
                longitude_col: "longitude".into(),
            }),
            periods: Some(PeriodTable {
                table: "periodo_leitura".into(),
                id_col: "id".into(),
                start_col: "data_inicio".into(),
                end_col: "data_fim".into(),
            }),
        }
    }

    /// Physical column holding the given sensor measure, if the layout has one.
    pub fn sensor_col(&self, kind: SensorKind) -> Option<&str> {
        // ---
        match kind {
            SensorKind::Humidity => Some(&self.humidity_col),
            SensorKind::Temperature => self.temperature_col.as_deref(),
            SensorKind::Pressure => self.pressure_col.as_deref(),
            SensorKind::Co2 => self.co2_col.as_deref(),
        }
    }

    /// Whether an empty readings table should be answered with the synthetic
    /// placeholder series. Only the layout without a city table does this;
    /// where a city table exists the UI shows its own empty-state warning.
    pub fn placeholder_on_empty(&self) -> bool {
        self.cities.is_none()
    }
}
