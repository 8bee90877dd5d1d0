use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::Instrument;

use super::auth::AuthHandler;
use super::client::ApiClient;
use super::errors::ApiError;
use super::fiscal::{DashboardHandler, FicheFiscaleHandler, ImportHandler, JournalHandler};
use super::owners::OwnerHandler;
use super::parcels::ParcelHandler;
use super::token_store::TokenStore;
use crate::config::ApiConfig;
use crate::domain::{Parcel, User, ValidationState};
use crate::telemetry::create_workflow_span;
use crate::workflow::{ParcelWorkflow, TransitionError};

/// Parcel operations the workflow needs, so it can be driven by a mock in tests
#[async_trait]
pub trait ParcelGateway: Send + Sync {
    async fn fetch_parcel(&self, id: u64) -> Result<Parcel, ApiError>;
    async fn submit_transition(
        &self,
        id: u64,
        to: ValidationState,
        comment: Option<String>,
    ) -> Result<Parcel, ApiError>;
}

/// Facade over every GeoTNB endpoint group
#[derive(Debug, Clone)]
pub struct GeoTnbClient {
    client: Arc<ApiClient>,
    pub auth: AuthHandler,
    pub parcels: ParcelHandler,
    pub owners: OwnerHandler,
    pub fiches: FicheFiscaleHandler,
    pub dashboard: DashboardHandler,
    pub imports: ImportHandler,
    pub journal: JournalHandler,
}

impl GeoTnbClient {
    pub fn new(settings: &ApiConfig, tokens: Arc<dyn TokenStore>) -> Result<Self, ApiError> {
        Ok(Self::from_client(Arc::new(ApiClient::new(settings, tokens)?)))
    }

    pub fn from_client(client: Arc<ApiClient>) -> Self {
        Self {
            auth: AuthHandler::new(client.clone()),
            parcels: ParcelHandler::new(client.clone()),
            owners: OwnerHandler::new(client.clone()),
            fiches: FicheFiscaleHandler::new(client.clone()),
            dashboard: DashboardHandler::new(client.clone()),
            imports: ImportHandler::new(client.clone()),
            journal: JournalHandler::new(client.clone()),
            client,
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.client
    }
}

#[async_trait]
impl ParcelGateway for GeoTnbClient {
    async fn fetch_parcel(&self, id: u64) -> Result<Parcel, ApiError> {
        self.parcels.get(id).await
    }

    async fn submit_transition(
        &self,
        id: u64,
        to: ValidationState,
        comment: Option<String>,
    ) -> Result<Parcel, ApiError> {
        self.parcels.transition(id, to, comment).await
    }
}

#[derive(Debug, Error)]
pub enum TransitionRequestError {
    #[error(transparent)]
    Refused(#[from] TransitionError),
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Fetches the parcel, checks the transition locally and only then asks the
/// backend to persist it. A locally refused request never reaches the API.
pub async fn request_transition<G>(
    gateway: &G,
    user: &User,
    id: u64,
    to: ValidationState,
    comment: Option<String>,
) -> Result<Parcel, TransitionRequestError>
where
    G: ParcelGateway + ?Sized,
{
    let parcel = gateway.fetch_parcel(id).await?;
    let span = create_workflow_span("request_transition", &parcel.reference, Some(&user.username));

    async move {
        let mut workflow = ParcelWorkflow::new(parcel);
        workflow.request(to, user)?;

        let saved = gateway.submit_transition(id, to, comment).await?;
        tracing::info!(state = %saved.validation_state, "Transition persisted");
        Ok::<_, TransitionRequestError>(saved)
    }
    .instrument(span)
    .await
}
