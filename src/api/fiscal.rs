// Fiche fiscale generation, dashboard statistics, imports and the action journal

use std::sync::Arc;

use super::client::{ApiClient, RequestOptions};
use super::errors::ApiError;
use super::types::{DashboardStats, FicheFiscale, FicheFiscaleRequest, ImportReport, JournalEntry, Page};

#[derive(Debug, Clone)]
pub struct FicheFiscaleHandler {
    client: Arc<ApiClient>,
}

impl FicheFiscaleHandler {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    pub async fn generate(&self, parcel_id: u64, year: i32) -> Result<FicheFiscale, ApiError> {
        let body = FicheFiscaleRequest {
            parcelle_id: parcel_id,
            annee: year,
        };
        let fiche: FicheFiscale = self
            .client
            .post("/fiche-fiscale/generate", &body, RequestOptions::new())
            .await?;
        tracing::info!(parcel_id = parcel_id, year = year, numero = %fiche.number, "Fiche fiscale generated");
        Ok(fiche)
    }

    pub async fn for_parcel(&self, parcel_id: u64) -> Result<Vec<FicheFiscale>, ApiError> {
        self.client
            .get(&format!("/fiche-fiscale/parcelle/{parcel_id}"), RequestOptions::new().cached())
            .await
    }

    /// PDF document as produced by the backend.
    pub async fn download_pdf(&self, fiche_id: u64) -> Result<Vec<u8>, ApiError> {
        self.client
            .download_file(&format!("/fiche-fiscale/{fiche_id}/pdf"), RequestOptions::new())
            .await
    }
}

#[derive(Debug, Clone)]
pub struct DashboardHandler {
    client: Arc<ApiClient>,
}

impl DashboardHandler {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    pub async fn stats(&self) -> Result<DashboardStats, ApiError> {
        self.client.get("/dashboard/stats", RequestOptions::new().cached()).await
    }
}

#[derive(Debug, Clone)]
pub struct ImportHandler {
    client: Arc<ApiClient>,
}

impl ImportHandler {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// `kind` is the import target, e.g. `parcelles` or `proprietaires`.
    pub async fn upload(&self, kind: &str, file_name: &str, bytes: Vec<u8>) -> Result<ImportReport, ApiError> {
        let report: ImportReport = self
            .client
            .upload_file(&format!("/import/{kind}"), "file", file_name, bytes)
            .await?;
        tracing::info!(
            kind = %kind,
            total = report.total,
            imported = report.imported,
            errors = report.errors.len(),
            "Import finished"
        );
        // imported rows land in the target collection's cache
        self.client.invalidate_resource(&format!("/{kind}")).await;
        Ok(report)
    }
}

#[derive(Debug, Clone)]
pub struct JournalHandler {
    client: Arc<ApiClient>,
}

impl JournalHandler {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    pub async fn list(&self, page: u32, size: u32) -> Result<Page<JournalEntry>, ApiError> {
        let options = RequestOptions::new().query("page", page).query("size", size);
        self.client.get("/journal-action", options).await
    }

    pub async fn for_entity(&self, entity: &str, id: u64) -> Result<Vec<JournalEntry>, ApiError> {
        self.client
            .get(&format!("/journal-action/entite/{entity}/{id}"), RequestOptions::new())
            .await
    }
}
