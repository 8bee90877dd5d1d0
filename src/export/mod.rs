// Parcel exports: CSV for spreadsheets, GeoJSON for GIS tools

pub mod csv;
pub mod geojson;

use thiserror::Error;

pub use self::csv::{read_csv, write_csv, write_csv_file, CsvRow, CSV_HEADER};
pub use self::geojson::{feature_collection, write_geojson};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] ::csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Output format accepted by the export command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    GeoJson,
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "geojson" | "json" => Ok(Self::GeoJson),
            other => Err(format!("unknown export format: {other}")),
        }
    }
}
