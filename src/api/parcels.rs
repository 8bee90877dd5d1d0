use std::sync::Arc;

use super::client::{ApiClient, RequestOptions};
use super::errors::ApiError;
use super::types::{Page, ParcelFilter, TransitionBody};
use crate::domain::{Parcel, ValidationState};

/// Handler for `/parcelles`
#[derive(Debug, Clone)]
pub struct ParcelHandler {
    client: Arc<ApiClient>,
}

/// Backend action path for a requested target state.
pub fn transition_action(to: ValidationState) -> &'static str {
    match to {
        ValidationState::Validated => "validate",
        ValidationState::Published => "publish",
        ValidationState::Archived => "archive",
        ValidationState::Draft => "draft",
    }
}

impl ParcelHandler {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    pub async fn list(&self, filter: &ParcelFilter) -> Result<Page<Parcel>, ApiError> {
        let options = RequestOptions {
            query: filter.to_query(),
            ..RequestOptions::new().cached()
        };
        self.client.get("/parcelles", options).await
    }

    /// Every page of a filtered listing.
    pub async fn list_all(&self, filter: &ParcelFilter) -> Result<Vec<Parcel>, ApiError> {
        let mut filter = filter.clone();
        let size = filter.size.unwrap_or(100);
        filter.size = Some(size);
        let mut page = 0;
        let mut parcels = Vec::new();
        loop {
            filter.page = Some(page);
            let result = self.list(&filter).await?;
            let fetched = result.items.len();
            parcels.extend(result.items);
            if fetched == 0 || parcels.len() as u64 >= result.total {
                break;
            }
            page += 1;
        }
        Ok(parcels)
    }

    pub async fn get(&self, id: u64) -> Result<Parcel, ApiError> {
        self.client
            .get(&format!("/parcelles/{id}"), RequestOptions::new().cached())
            .await
    }

    pub async fn create(&self, parcel: &Parcel) -> Result<Parcel, ApiError> {
        let created: Parcel = self.client.post("/parcelles", parcel, RequestOptions::new()).await?;
        tracing::info!(parcel = %created.reference, id = ?created.id, "Parcel created");
        Ok(created)
    }

    pub async fn update(&self, id: u64, parcel: &Parcel) -> Result<Parcel, ApiError> {
        self.client
            .put(&format!("/parcelles/{id}"), parcel, RequestOptions::new())
            .await
    }

    pub async fn delete(&self, id: u64) -> Result<(), ApiError> {
        self.client
            .delete::<serde_json::Value>(&format!("/parcelles/{id}"), RequestOptions::new())
            .await?;
        tracing::info!(id = id, "Parcel deleted");
        Ok(())
    }

    pub async fn transition(&self, id: u64, to: ValidationState, comment: Option<String>) -> Result<Parcel, ApiError> {
        let endpoint = format!("/parcelles/{id}/{}", transition_action(to));
        self.client
            .post(&endpoint, &TransitionBody { commentaire: comment }, RequestOptions::new())
            .await
    }

    pub async fn validate(&self, id: u64, comment: Option<String>) -> Result<Parcel, ApiError> {
        self.transition(id, ValidationState::Validated, comment).await
    }

    pub async fn publish(&self, id: u64, comment: Option<String>) -> Result<Parcel, ApiError> {
        self.transition(id, ValidationState::Published, comment).await
    }

    pub async fn archive(&self, id: u64, comment: Option<String>) -> Result<Parcel, ApiError> {
        self.transition(id, ValidationState::Archived, comment).await
    }
}
