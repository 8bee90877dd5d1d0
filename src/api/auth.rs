use std::sync::Arc;

use super::client::{ApiClient, RequestOptions};
use super::errors::ApiError;
use super::token_store::StoredSession;
use super::types::{AuthResponse, LoginRequest, RefreshRequest};
use crate::domain::User;

/// Handler for `/auth/*`
#[derive(Debug, Clone)]
pub struct AuthHandler {
    client: Arc<ApiClient>,
}

impl AuthHandler {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Log in and persist the returned tokens and user.
    pub async fn login(&self, username: &str, password: &str) -> Result<AuthResponse, ApiError> {
        let body = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let response: AuthResponse = self.client.post("/auth/login", &body, RequestOptions::new()).await?;
        self.persist("/auth/login", &response, None)?;
        tracing::info!(
            user = %username,
            role = ?response.user.as_ref().map(|u| u.role),
            "Logged in"
        );
        Ok(response)
    }

    /// Exchange the stored refresh token for a new access token.
    pub async fn refresh(&self) -> Result<AuthResponse, ApiError> {
        let stored = self.client.tokens().load();
        let Some(refresh_token) = stored.as_ref().and_then(|s| s.refresh_token.clone()) else {
            return Err(ApiError::new(401, "/auth/refresh"));
        };
        let response: AuthResponse = self
            .client
            .post("/auth/refresh", &RefreshRequest { refresh_token }, RequestOptions::new())
            .await?;
        self.persist("/auth/refresh", &response, stored)?;
        tracing::debug!("Access token refreshed");
        Ok(response)
    }

    /// Tell the backend, then always drop the local session.
    pub async fn logout(&self) -> Result<(), ApiError> {
        let remote: Result<serde_json::Value, ApiError> = self
            .client
            .post("/auth/logout", &serde_json::json!({}), RequestOptions::new())
            .await;
        if let Err(e) = &remote {
            tracing::warn!(error = %e, "Backend logout failed, clearing local session anyway");
        }
        self.clear_local()?;
        self.client.clear_cache().await;
        tracing::info!("Logged out");
        Ok(())
    }

    pub fn clear_local(&self) -> Result<(), ApiError> {
        self.client
            .tokens()
            .clear()
            .map_err(|e| ApiError::storage("/auth/logout", &e))
    }

    pub fn current_user(&self) -> Option<User> {
        self.client.tokens().load().and_then(|s| s.current_user)
    }

    pub fn is_authenticated(&self) -> bool {
        self.client.tokens().access_token().is_some()
    }

    fn persist(&self, endpoint: &str, response: &AuthResponse, previous: Option<StoredSession>) -> Result<(), ApiError> {
        let previous = previous.unwrap_or(StoredSession {
            access_token: String::new(),
            refresh_token: None,
            current_user: None,
        });
        let session = StoredSession {
            access_token: response.access_token.clone(),
            refresh_token: response.refresh_token.clone().or(previous.refresh_token),
            current_user: response.user.clone().or(previous.current_user),
        };
        self.client
            .tokens()
            .save(&session)
            .map_err(|e| ApiError::storage(endpoint, &e))
    }
}
