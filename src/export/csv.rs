use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::path::Path;

use super::ExportError;
use crate::domain::{Parcel, ValidationState};

const BOM: &[u8] = b"\xEF\xBB\xBF";

pub const CSV_HEADER: [&str; 9] = [
    "reference_fonciere",
    "surface_totale",
    "surface_imposable",
    "zonage",
    "statut_foncier",
    "etat_validation",
    "exonere",
    "montant_total_tnb",
    "nb_proprietaires",
];

/// One exported parcel line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsvRow {
    pub reference_fonciere: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub surface_totale: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub surface_imposable: Decimal,
    pub zonage: String,
    pub statut_foncier: String,
    pub etat_validation: ValidationState,
    pub exonere: bool,
    #[serde(with = "rust_decimal::serde::str")]
    pub montant_total_tnb: Decimal,
    pub nb_proprietaires: usize,
}

impl From<&Parcel> for CsvRow {
    fn from(parcel: &Parcel) -> Self {
        Self {
            reference_fonciere: parcel.reference.clone(),
            surface_totale: parcel.total_surface,
            surface_imposable: parcel.taxable_surface,
            zonage: parcel.zoning.clone(),
            statut_foncier: parcel.land_status.clone(),
            etat_validation: parcel.validation_state,
            exonere: parcel.is_exempted(),
            montant_total_tnb: parcel.tnb_amount,
            nb_proprietaires: parcel.active_owners().count(),
        }
    }
}

/// Semicolon-separated, prefixed with a UTF-8 BOM so spreadsheet tools
/// detect the encoding.
pub fn write_csv<W: Write>(mut writer: W, parcels: &[Parcel]) -> Result<usize, ExportError> {
    writer.write_all(BOM)?;
    let mut csv = ::csv::WriterBuilder::new()
        .delimiter(b';')
        .has_headers(true)
        .from_writer(writer);
    for parcel in parcels {
        csv.serialize(CsvRow::from(parcel))?;
    }
    // an empty export still carries the header row
    if parcels.is_empty() {
        csv.write_record(CSV_HEADER)?;
    }
    csv.flush()?;
    Ok(parcels.len())
}

pub fn write_csv_file(path: &Path, parcels: &[Parcel]) -> Result<usize, ExportError> {
    let file = std::fs::File::create(path)?;
    let count = write_csv(std::io::BufWriter::new(file), parcels)?;
    tracing::info!(path = %path.display(), rows = count, "CSV export written");
    Ok(count)
}

/// Reads rows written by [`write_csv`]; the BOM is optional.
pub fn read_csv<R: Read>(mut reader: R) -> Result<Vec<CsvRow>, ExportError> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    let content = bytes.strip_prefix(BOM).unwrap_or(&bytes);

    let mut csv = ::csv::ReaderBuilder::new().delimiter(b';').from_reader(content);
    let mut rows = Vec::new();
    for result in csv.deserialize() {
        let row: CsvRow = result?;
        rows.push(row);
    }
    Ok(rows)
}
