use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::role::{has_capability, Permission, User};
use super::state::ValidationState;
use super::DomainError;

/// Allowed absolute deviation of the active quota-share sum from 1.
pub const QUOTA_TOLERANCE: Decimal = dec!(0.01);

/// Exemption code meaning "not exempted".
pub const NO_EXEMPTION: &str = "none";

/// GeoJSON polygon geometry, exterior ring first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinates: Vec<Vec<[f64; 2]>>,
}

impl Geometry {
    pub fn polygon(ring: Vec<[f64; 2]>) -> Self {
        Self {
            kind: "Polygon".to_string(),
            coordinates: vec![ring],
        }
    }

    pub fn exterior(&self) -> &[[f64; 2]] {
        self.coordinates.first().map(Vec::as_slice).unwrap_or(&[])
    }

    /// First and last points compared with exact equality, no epsilon.
    pub fn is_closed(&self) -> bool {
        let ring = self.exterior();
        match (ring.first(), ring.last()) {
            (Some(first), Some(last)) => first == last,
            _ => false,
        }
    }
}

/// Link between a parcel and one of its owners
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnerShare {
    #[serde(rename = "proprietaire_id")]
    pub owner_id: u64,
    #[serde(rename = "nom", default)]
    pub name: String,
    #[serde(rename = "quote_part")]
    pub quota_share: Decimal,
    #[serde(rename = "est_actif", default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

fn default_exemption() -> String {
    NO_EXEMPTION.to_string()
}

impl OwnerShare {
    pub fn new(owner_id: u64, name: impl Into<String>, quota_share: Decimal) -> Self {
        Self {
            owner_id,
            name: name.into(),
            quota_share,
            active: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuotaSummary {
    pub sum: Decimal,
    pub is_valid: bool,
}

/// A land unit subject to TNB
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parcel {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(rename = "reference_fonciere")]
    pub reference: String,
    #[serde(rename = "surface_totale", default)]
    pub total_surface: Decimal,
    #[serde(rename = "surface_imposable", default)]
    pub taxable_surface: Decimal,
    #[serde(rename = "statut_foncier", default)]
    pub land_status: String,
    #[serde(rename = "statut_occupation", default)]
    pub occupation_status: String,
    #[serde(rename = "zonage", default)]
    pub zoning: String,
    #[serde(rename = "prix_unitaire", default)]
    pub unit_price: Option<Decimal>,
    #[serde(rename = "montant_total_tnb", default)]
    pub tnb_amount: Decimal,
    #[serde(rename = "exonere", default)]
    pub exempted: bool,
    #[serde(rename = "code_exoneration", default = "default_exemption")]
    pub exemption_code: String,
    #[serde(rename = "etat_validation", default)]
    pub validation_state: ValidationState,
    #[serde(default)]
    pub geometry: Option<Geometry>,
    #[serde(rename = "proprietaires", default)]
    pub owners: Vec<OwnerShare>,
    /// Sent by the backend, never read or incremented.
    #[serde(default)]
    pub version: Option<i64>,
}

impl Parcel {
    /// New draft parcel with no owners and no geometry.
    pub fn draft(reference: impl Into<String>, zoning: impl Into<String>, taxable_surface: Decimal) -> Self {
        Self {
            id: None,
            reference: reference.into(),
            total_surface: taxable_surface,
            taxable_surface,
            land_status: String::new(),
            occupation_status: String::new(),
            zoning: zoning.into(),
            unit_price: None,
            tnb_amount: Decimal::ZERO,
            exempted: false,
            exemption_code: default_exemption(),
            validation_state: ValidationState::Draft,
            geometry: None,
            owners: Vec::new(),
            version: None,
        }
    }

    pub fn active_owners(&self) -> impl Iterator<Item = &OwnerShare> {
        self.owners.iter().filter(|o| o.active)
    }

    pub fn quota_summary(&self) -> QuotaSummary {
        quota_summary(self.active_owners().map(|o| o.quota_share))
    }

    pub fn is_exempted(&self) -> bool {
        self.exempted || self.exemption_code != NO_EXEMPTION
    }

    /// Field edits are allowed in Draft/Validated for holders of `ParcelUpdate`,
    /// and in the locked states only with `AdminOverride`.
    pub fn ensure_editable_by(&self, user: &User) -> Result<(), DomainError> {
        if !has_capability(user, Permission::ParcelUpdate) {
            return Err(DomainError::Forbidden {
                role: user.role,
                permission: Permission::ParcelUpdate,
            });
        }
        if self.validation_state.is_locked() && !has_capability(user, Permission::AdminOverride) {
            return Err(DomainError::Locked {
                reference: self.reference.clone(),
                state: self.validation_state,
            });
        }
        Ok(())
    }
}

pub fn quota_summary<I>(shares: I) -> QuotaSummary
where
    I: IntoIterator<Item = Decimal>,
{
    let sum: Decimal = shares.into_iter().sum();
    QuotaSummary {
        sum,
        is_valid: (sum - Decimal::ONE).abs() <= QUOTA_TOLERANCE,
    }
}
