// REST access to the GeoTNB backend

pub mod auth;
pub mod client;
pub mod errors;
pub mod fiscal;
pub mod owners;
pub mod parcels;
pub mod service;
pub mod token_store;
pub mod types;

pub use auth::AuthHandler;
pub use client::{is_auth_endpoint, ApiClient, RequestOptions, DEFAULT_TIMEOUT, FILE_TRANSFER_TIMEOUT};
pub use errors::{default_message, ApiError, ErrorKind, UiReaction};
pub use fiscal::{DashboardHandler, FicheFiscaleHandler, ImportHandler, JournalHandler};
pub use owners::OwnerHandler;
pub use parcels::{transition_action, ParcelHandler};
pub use service::{request_transition, GeoTnbClient, ParcelGateway, TransitionRequestError};
pub use token_store::{FileTokenStore, MemoryTokenStore, StoredSession, TokenStore, TokenStoreError};
pub use types::{
    AuthResponse, DashboardStats, FicheFiscale, ImportLineError, ImportReport, JournalEntry, Owner, OwnerKind, Page,
    ParcelFilter,
};
