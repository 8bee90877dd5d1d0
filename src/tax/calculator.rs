use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::zones::tariff_for_zone;
use super::TaxError;
use crate::domain::{Parcel, NO_EXEMPTION};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TnbComputation {
    pub amount: Decimal,
    pub is_exempted: bool,
    pub exemption_code: Option<String>,
}

/// One owner's share of a parcel's tax
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentLine {
    pub owner_id: u64,
    pub owner_name: String,
    pub quota_share: Decimal,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TnbAssessment {
    pub reference: String,
    pub taxable_surface: Decimal,
    pub tariff: Decimal,
    pub is_exempted: bool,
    pub lines: Vec<AssessmentLine>,
    pub total: Decimal,
}

pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// TNB due for one share of a parcel.
///
/// Inputs must satisfy `surface > 0`, `0 < quota_share <= 1` and
/// `tariff_per_m2 >= 0`.
pub fn compute_tnb(
    surface: Decimal,
    tariff_per_m2: Decimal,
    quota_share: Decimal,
    exemption_code: &str,
) -> Result<TnbComputation, TaxError> {
    if surface <= Decimal::ZERO {
        return Err(TaxError::NonPositiveSurface(surface));
    }
    if quota_share <= Decimal::ZERO || quota_share > Decimal::ONE {
        return Err(TaxError::QuotaOutOfRange(quota_share));
    }
    if tariff_per_m2 < Decimal::ZERO {
        return Err(TaxError::NegativeTariff(tariff_per_m2));
    }

    let code = exemption_code.trim();
    if code != NO_EXEMPTION {
        tracing::debug!(exemption_code = %code, "Exempted from TNB");
        return Ok(TnbComputation {
            amount: Decimal::ZERO,
            is_exempted: true,
            exemption_code: Some(code.to_string()),
        });
    }

    Ok(TnbComputation {
        amount: round2(surface * tariff_per_m2 * quota_share),
        is_exempted: false,
        exemption_code: None,
    })
}

/// `compute_tnb` with the tariff taken from the zone table.
pub fn compute_tnb_for_zone(
    surface: Decimal,
    zone: &str,
    quota_share: Decimal,
    exemption_code: &str,
) -> Result<TnbComputation, TaxError> {
    compute_tnb(surface, tariff_for_zone(zone)?, quota_share, exemption_code)
}

/// Per-owner assessment of a parcel. The parcel's unit price, when set,
/// overrides the zone tariff. A parcel with no active owner is assessed as a
/// single full share.
pub fn assess_parcel(parcel: &Parcel) -> Result<TnbAssessment, TaxError> {
    let tariff = match parcel.unit_price {
        Some(price) => price,
        None => tariff_for_zone(&parcel.zoning)?,
    };
    let exemption = if parcel.exempted && parcel.exemption_code == NO_EXEMPTION {
        "exonere"
    } else {
        parcel.exemption_code.as_str()
    };

    let mut lines = Vec::new();
    for owner in parcel.active_owners() {
        let share = compute_tnb(parcel.taxable_surface, tariff, owner.quota_share, exemption)?;
        lines.push(AssessmentLine {
            owner_id: owner.owner_id,
            owner_name: owner.name.clone(),
            quota_share: owner.quota_share,
            amount: share.amount,
        });
    }

    let (total, is_exempted) = if lines.is_empty() {
        let full = compute_tnb(parcel.taxable_surface, tariff, Decimal::ONE, exemption)?;
        (full.amount, full.is_exempted)
    } else {
        (lines.iter().map(|l| l.amount).sum(), exemption != NO_EXEMPTION)
    };

    tracing::debug!(
        parcel = %parcel.reference,
        tariff = %tariff,
        total = %total,
        owners = lines.len(),
        "Parcel assessed"
    );

    Ok(TnbAssessment {
        reference: parcel.reference.clone(),
        taxable_surface: parcel.taxable_surface,
        tariff,
        is_exempted,
        lines,
        total,
    })
}
