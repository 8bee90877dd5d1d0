use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::DomainError;

/// Publication lifecycle stage of a parcel's fiscal record.
///
/// This is the only state set the crate understands. The older
/// `En_attente` / `Rejete` members seen in some backend payloads are rejected
/// at parse time instead of being folded into one of these.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ValidationState {
    #[default]
    #[serde(rename = "Brouillon")]
    Draft,
    #[serde(rename = "Valide")]
    Validated,
    #[serde(rename = "Publie")]
    Published,
    #[serde(rename = "Archive")]
    Archived,
}

impl ValidationState {
    pub const ALL: [ValidationState; 4] = [
        ValidationState::Draft,
        ValidationState::Validated,
        ValidationState::Published,
        ValidationState::Archived,
    ];

    /// Name used by the backend.
    pub fn wire_name(&self) -> &'static str {
        match self {
            ValidationState::Draft => "Brouillon",
            ValidationState::Validated => "Valide",
            ValidationState::Published => "Publie",
            ValidationState::Archived => "Archive",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ValidationState::Draft => "Brouillon",
            ValidationState::Validated => "Validé",
            ValidationState::Published => "Publié",
            ValidationState::Archived => "Archivé",
        }
    }

    /// Published and archived records only change through an admin override.
    pub fn is_locked(&self) -> bool {
        matches!(self, ValidationState::Published | ValidationState::Archived)
    }
}

impl fmt::Display for ValidationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl FromStr for ValidationState {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "brouillon" | "draft" => Ok(ValidationState::Draft),
            "valide" | "validated" => Ok(ValidationState::Validated),
            "publie" | "published" => Ok(ValidationState::Published),
            "archive" | "archived" => Ok(ValidationState::Archived),
            _ => Err(DomainError::UnknownState(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_wire_and_english_names() {
        assert_eq!("Brouillon".parse::<ValidationState>().unwrap(), ValidationState::Draft);
        assert_eq!("published".parse::<ValidationState>().unwrap(), ValidationState::Published);
        assert_eq!(" ARCHIVE ".parse::<ValidationState>().unwrap(), ValidationState::Archived);
    }

    #[test]
    fn rejects_legacy_members() {
        assert!(matches!(
            "En_attente".parse::<ValidationState>(),
            Err(DomainError::UnknownState(s)) if s == "En_attente"
        ));
        assert!("Rejete".parse::<ValidationState>().is_err());
    }

    #[test]
    fn serializes_with_backend_names() {
        let json = serde_json::to_string(&ValidationState::Validated).unwrap();
        assert_eq!(json, "\"Valide\"");
        let back: ValidationState = serde_json::from_str("\"Publie\"").unwrap();
        assert_eq!(back, ValidationState::Published);
    }
}
