use serde_json::{json, Value};
use std::io::Write;

use super::ExportError;
use crate::domain::Parcel;

/// One feature per parcel that has a geometry.
pub fn feature_collection(parcels: &[Parcel]) -> Value {
    let features: Vec<Value> = parcels
        .iter()
        .filter_map(|parcel| {
            let geometry = parcel.geometry.as_ref()?;
            Some(json!({
                "type": "Feature",
                "id": parcel.id,
                "geometry": geometry,
                "properties": {
                    "reference_fonciere": parcel.reference,
                    "zonage": parcel.zoning,
                    "etat_validation": parcel.validation_state,
                    "surface_imposable": parcel.taxable_surface,
                    "montant_total_tnb": parcel.tnb_amount,
                    "exonere": parcel.is_exempted(),
                },
            }))
        })
        .collect();

    json!({
        "type": "FeatureCollection",
        "features": features,
    })
}

pub fn write_geojson<W: Write>(writer: W, parcels: &[Parcel]) -> Result<usize, ExportError> {
    let collection = feature_collection(parcels);
    let count = collection["features"].as_array().map_or(0, Vec::len);
    serde_json::to_writer_pretty(writer, &collection)?;
    Ok(count)
}
