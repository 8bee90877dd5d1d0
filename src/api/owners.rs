use std::sync::Arc;

use super::client::{ApiClient, RequestOptions};
use super::errors::ApiError;
use super::types::{Owner, Page};

/// Handler for `/proprietaires`
#[derive(Debug, Clone)]
pub struct OwnerHandler {
    client: Arc<ApiClient>,
}

impl OwnerHandler {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    pub async fn list(&self, search: Option<&str>, page: u32, size: u32) -> Result<Page<Owner>, ApiError> {
        let mut options = RequestOptions::new().cached().query("page", page).query("size", size);
        if let Some(search) = search {
            options = options.query("search", search);
        }
        self.client.get("/proprietaires", options).await
    }

    pub async fn get(&self, id: u64) -> Result<Owner, ApiError> {
        self.client
            .get(&format!("/proprietaires/{id}"), RequestOptions::new().cached())
            .await
    }

    pub async fn create(&self, owner: &Owner) -> Result<Owner, ApiError> {
        self.client.post("/proprietaires", owner, RequestOptions::new()).await
    }

    pub async fn update(&self, id: u64, owner: &Owner) -> Result<Owner, ApiError> {
        self.client
            .put(&format!("/proprietaires/{id}"), owner, RequestOptions::new())
            .await
    }

    pub async fn delete(&self, id: u64) -> Result<(), ApiError> {
        self.client
            .delete::<serde_json::Value>(&format!("/proprietaires/{id}"), RequestOptions::new())
            .await
            .map(|_| ())
    }
}
