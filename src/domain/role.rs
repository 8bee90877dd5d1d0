use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use super::DomainError;

/// User roles known to the portal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "ADMIN")]
    Admin,
    #[serde(rename = "AGENT_FISCAL")]
    TaxAgent,
    #[serde(rename = "TECHNICIEN_SIG")]
    GisTechnician,
    #[serde(rename = "LECTEUR")]
    Reader,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Admin, Role::TaxAgent, Role::GisTechnician, Role::Reader];

    pub fn wire_name(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::TaxAgent => "AGENT_FISCAL",
            Role::GisTechnician => "TECHNICIEN_SIG",
            Role::Reader => "LECTEUR",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Role::Admin => "Administrateur",
            Role::TaxAgent => "Agent fiscal",
            Role::GisTechnician => "Technicien SIG",
            Role::Reader => "Lecteur",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "admin" => Ok(Role::Admin),
            "agent_fiscal" | "taxagent" | "tax_agent" => Ok(Role::TaxAgent),
            "technicien_sig" | "gistechnician" | "gis_technician" => Ok(Role::GisTechnician),
            "lecteur" | "reader" => Ok(Role::Reader),
            _ => Err(DomainError::UnknownRole(s.to_string())),
        }
    }
}

/// Actions a role may be granted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Permission {
    ParcelRead,
    ParcelCreate,
    ParcelUpdate,
    ParcelDelete,
    GeometryEdit,
    ParcelValidate,
    ParcelPublish,
    ParcelArchive,
    OwnerRead,
    OwnerWrite,
    TaxCompute,
    FicheFiscaleGenerate,
    FicheFiscaleRead,
    ImportData,
    ExportData,
    DashboardRead,
    AuditRead,
    UserManage,
    AdminOverride,
}

impl Permission {
    pub const ALL: [Permission; 19] = [
        Permission::ParcelRead,
        Permission::ParcelCreate,
        Permission::ParcelUpdate,
        Permission::ParcelDelete,
        Permission::GeometryEdit,
        Permission::ParcelValidate,
        Permission::ParcelPublish,
        Permission::ParcelArchive,
        Permission::OwnerRead,
        Permission::OwnerWrite,
        Permission::TaxCompute,
        Permission::FicheFiscaleGenerate,
        Permission::FicheFiscaleRead,
        Permission::ImportData,
        Permission::ExportData,
        Permission::DashboardRead,
        Permission::AuditRead,
        Permission::UserManage,
        Permission::AdminOverride,
    ];

    /// Stable permission key, `resource:action`
    pub fn key(&self) -> &'static str {
        match self {
            Permission::ParcelRead => "parcelle:read",
            Permission::ParcelCreate => "parcelle:create",
            Permission::ParcelUpdate => "parcelle:update",
            Permission::ParcelDelete => "parcelle:delete",
            Permission::GeometryEdit => "parcelle:geometry",
            Permission::ParcelValidate => "parcelle:validate",
            Permission::ParcelPublish => "parcelle:publish",
            Permission::ParcelArchive => "parcelle:archive",
            Permission::OwnerRead => "proprietaire:read",
            Permission::OwnerWrite => "proprietaire:write",
            Permission::TaxCompute => "tnb:compute",
            Permission::FicheFiscaleGenerate => "fiche_fiscale:generate",
            Permission::FicheFiscaleRead => "fiche_fiscale:read",
            Permission::ImportData => "import:write",
            Permission::ExportData => "export:read",
            Permission::DashboardRead => "dashboard:read",
            Permission::AuditRead => "journal:read",
            Permission::UserManage => "utilisateur:manage",
            Permission::AdminOverride => "admin:override",
        }
    }
}

const TAX_AGENT: &[Permission] = &[
    Permission::ParcelRead,
    Permission::ParcelUpdate,
    Permission::ParcelValidate,
    Permission::ParcelPublish,
    Permission::OwnerRead,
    Permission::OwnerWrite,
    Permission::TaxCompute,
    Permission::FicheFiscaleGenerate,
    Permission::FicheFiscaleRead,
    Permission::ExportData,
    Permission::DashboardRead,
    Permission::AuditRead,
];

const GIS_TECHNICIAN: &[Permission] = &[
    Permission::ParcelRead,
    Permission::ParcelCreate,
    Permission::ParcelUpdate,
    Permission::GeometryEdit,
    Permission::ParcelValidate,
    Permission::OwnerRead,
    Permission::ImportData,
    Permission::ExportData,
    Permission::DashboardRead,
];

const READER: &[Permission] = &[
    Permission::ParcelRead,
    Permission::OwnerRead,
    Permission::FicheFiscaleRead,
    Permission::DashboardRead,
];

/// The permission table. Every capability check in the crate goes through here.
pub fn permissions(role: Role) -> BTreeSet<Permission> {
    match role {
        Role::Admin => Permission::ALL.iter().copied().collect(),
        Role::TaxAgent => TAX_AGENT.iter().copied().collect(),
        Role::GisTechnician => GIS_TECHNICIAN.iter().copied().collect(),
        Role::Reader => READER.iter().copied().collect(),
    }
}

/// Permissions for a role given by name; unknown names get nothing.
pub fn permissions_for_name(role: &str) -> BTreeSet<Permission> {
    role.parse::<Role>().map(permissions).unwrap_or_default()
}

pub fn role_has(role: Role, permission: Permission) -> bool {
    match role {
        Role::Admin => true,
        Role::TaxAgent => TAX_AGENT.contains(&permission),
        Role::GisTechnician => GIS_TECHNICIAN.contains(&permission),
        Role::Reader => READER.contains(&permission),
    }
}

/// Authenticated portal user, as returned by `/auth/login`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    pub role: Role,
    #[serde(default = "default_active")]
    pub actif: bool,
}

fn default_active() -> bool {
    true
}

impl User {
    pub fn new(id: u64, username: impl Into<String>, role: Role) -> Self {
        Self {
            id,
            username: username.into(),
            email: None,
            role,
            actif: true,
        }
    }

    /// Reassign the user's role. Only a user holding `UserManage` may do it.
    pub fn change_role(&mut self, by: &User, role: Role) -> Result<(), DomainError> {
        if !has_capability(by, Permission::UserManage) {
            return Err(DomainError::Forbidden {
                role: by.role,
                permission: Permission::UserManage,
            });
        }
        tracing::info!(
            user = %self.username,
            from = %self.role,
            to = %role,
            by = %by.username,
            "User role changed"
        );
        self.role = role;
        Ok(())
    }
}

/// Capability check used at every call site instead of role comparisons.
pub fn has_capability(user: &User, permission: Permission) -> bool {
    user.actif && role_has(user.role, permission)
}

pub fn require_capability(user: &User, permission: Permission) -> Result<(), DomainError> {
    if has_capability(user, permission) {
        Ok(())
    } else {
        Err(DomainError::Forbidden {
            role: user.role,
            permission,
        })
    }
}
