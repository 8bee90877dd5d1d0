// Domain model: roles and permissions, validation states, parcels

pub mod parcel;
pub mod role;
pub mod state;

use thiserror::Error;

pub use parcel::{quota_summary, Geometry, OwnerShare, Parcel, QuotaSummary, NO_EXEMPTION, QUOTA_TOLERANCE};
pub use role::{has_capability, permissions, permissions_for_name, require_capability, Permission, Role, User};
pub use state::ValidationState;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Unknown role: {0}")]
    UnknownRole(String),
    #[error("Unknown validation state: {0}")]
    UnknownState(String),
    #[error("Role {role} lacks permission {}", .permission.key())]
    Forbidden { role: Role, permission: Permission },
    #[error("Parcel {reference} is {state} and cannot be edited")]
    Locked { reference: String, state: ValidationState },
}
