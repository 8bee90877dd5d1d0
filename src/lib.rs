// GeoTNB Library - fiscal core for the Taxe sur les Terrains Non Bâtis
// This exposes the domain, workflow, tax and REST client components

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod export;
pub mod session;
pub mod tax;
pub mod telemetry;
pub mod workflow;

// Re-export key types for easy access
pub use api::{ApiClient, ApiError, ErrorKind, GeoTnbClient, ParcelGateway, TokenStore};
pub use crate::config::{config, init_config, GeoTnbConfig};
pub use domain::{has_capability, permissions, DomainError, Parcel, Permission, Role, User, ValidationState};
pub use session::{Session, SessionEvent};
pub use tax::{assess_parcel, compute_tnb, tariff_for_zone, TaxError, TnbComputation};
pub use telemetry::{generate_correlation_id, init_telemetry, shutdown_telemetry};
pub use workflow::{can_transition, check_transition, validate, ParcelWorkflow, TransitionError, ValidationReport};
