use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::{User, ValidationState};

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
    /// Lifetime of the access token in seconds
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// Paginated list returned by collection endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub size: u32,
}

impl<T> Page<T> {
    pub fn total_pages(&self) -> u64 {
        if self.size == 0 {
            return 0;
        }
        self.total.div_ceil(u64::from(self.size))
    }
}

/// Query filters for `/parcelles`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParcelFilter {
    pub reference: Option<String>,
    pub zoning: Option<String>,
    pub state: Option<ValidationState>,
    pub exempted: Option<bool>,
    pub page: Option<u32>,
    pub size: Option<u32>,
}

impl ParcelFilter {
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if let Some(reference) = &self.reference {
            query.push(("reference_fonciere".to_string(), reference.clone()));
        }
        if let Some(zoning) = &self.zoning {
            query.push(("zonage".to_string(), zoning.clone()));
        }
        if let Some(state) = self.state {
            query.push(("etat_validation".to_string(), state.wire_name().to_string()));
        }
        if let Some(exempted) = self.exempted {
            query.push(("exonere".to_string(), exempted.to_string()));
        }
        if let Some(page) = self.page {
            query.push(("page".to_string(), page.to_string()));
        }
        if let Some(size) = self.size {
            query.push(("size".to_string(), size.to_string()));
        }
        query
    }
}

/// Body of `/parcelles/:id/validate|publish|archive`
#[derive(Debug, Clone, Default, Serialize)]
pub struct TransitionBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commentaire: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OwnerKind {
    #[serde(rename = "PHYSIQUE")]
    Natural,
    #[serde(rename = "MORALE")]
    Legal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Owner {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(rename = "nom")]
    pub last_name: String,
    #[serde(rename = "prenom", default)]
    pub first_name: Option<String>,
    #[serde(rename = "type", default = "default_owner_kind")]
    pub kind: OwnerKind,
    /// National id (CIN) or company registry number (RC)
    #[serde(rename = "identifiant", default)]
    pub identifier: Option<String>,
    #[serde(rename = "adresse", default)]
    pub address: Option<String>,
    #[serde(rename = "telephone", default)]
    pub phone: Option<String>,
}

fn default_owner_kind() -> OwnerKind {
    OwnerKind::Natural
}

#[derive(Debug, Clone, Serialize)]
pub struct FicheFiscaleRequest {
    pub parcelle_id: u64,
    pub annee: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FicheFiscale {
    pub id: u64,
    #[serde(rename = "numero")]
    pub number: String,
    pub parcelle_id: u64,
    #[serde(rename = "annee")]
    pub year: i32,
    #[serde(rename = "montant")]
    pub amount: Decimal,
    #[serde(rename = "date_generation", default)]
    pub generated_at: Option<DateTime<Utc>>,
    #[serde(rename = "date_echeance", default)]
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    #[serde(rename = "total_parcelles")]
    pub total_parcels: u64,
    #[serde(rename = "parcelles_par_etat", default)]
    pub parcels_by_state: BTreeMap<String, u64>,
    #[serde(rename = "parcelles_exonerees", default)]
    pub exempted_parcels: u64,
    #[serde(rename = "surface_totale", default)]
    pub total_surface: Decimal,
    #[serde(rename = "montant_total_tnb", default)]
    pub total_tnb: Decimal,
    #[serde(rename = "total_proprietaires", default)]
    pub total_owners: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportLineError {
    #[serde(rename = "ligne")]
    pub line: u64,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportReport {
    pub total: u64,
    #[serde(rename = "importes")]
    pub imported: u64,
    #[serde(rename = "erreurs", default)]
    pub errors: Vec<ImportLineError>,
}

/// Audit trail entry from `/journal-action`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: u64,
    pub action: String,
    #[serde(rename = "entite")]
    pub entity: String,
    #[serde(rename = "entite_id", default)]
    pub entity_id: Option<u64>,
    #[serde(rename = "utilisateur")]
    pub user: String,
    #[serde(rename = "date_action")]
    pub at: DateTime<Utc>,
    #[serde(default)]
    pub details: Option<String>,
}
