// TNB computation: zone tariffs, exemptions, per-owner assessment

pub mod calculator;
pub mod zones;

use rust_decimal::Decimal;
use thiserror::Error;

pub use calculator::{assess_parcel, compute_tnb, compute_tnb_for_zone, round2, AssessmentLine, TnbAssessment, TnbComputation};
pub use zones::{exemption_label, tariff_for_zone, zone, ZoneTariff, EXEMPTIONS, ZONE_TARIFFS};

#[derive(Debug, Error, PartialEq)]
pub enum TaxError {
    #[error("Taxable surface must be positive, got {0}")]
    NonPositiveSurface(Decimal),
    #[error("Quota share must be in (0, 1], got {0}")]
    QuotaOutOfRange(Decimal),
    #[error("Tariff must not be negative, got {0}")]
    NegativeTariff(Decimal),
    #[error("Unknown zoning code: {0}")]
    UnknownZone(String),
}
