use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

/// Coarse classification of a failed API call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// No response: connection refused, DNS, TLS, timeout (status 0)
    Network,
    Unauthorized,
    Forbidden,
    NotFound,
    Validation,
    Server,
    /// Any other 4xx
    Client,
    /// Response received but the body could not be decoded
    Decode,
    /// Local session persistence failed
    Storage,
}

impl ErrorKind {
    pub fn from_status(status: u16) -> Self {
        match status {
            0 => ErrorKind::Network,
            401 => ErrorKind::Unauthorized,
            403 => ErrorKind::Forbidden,
            404 => ErrorKind::NotFound,
            422 => ErrorKind::Validation,
            500..=599 => ErrorKind::Server,
            _ => ErrorKind::Client,
        }
    }
}

/// Default user-facing message for a status code.
pub fn default_message(status: u16) -> String {
    match status {
        0 => "Impossible de joindre le serveur. Vérifiez votre connexion.".to_string(),
        401 => "Session expirée. Veuillez vous reconnecter.".to_string(),
        403 => "Vous n'avez pas les droits nécessaires pour effectuer cette action.".to_string(),
        404 => "La ressource demandée est introuvable.".to_string(),
        422 => "Les données saisies sont invalides.".to_string(),
        500 => "Erreur interne du serveur. Veuillez réessayer plus tard.".to_string(),
        s => format!("Une erreur inattendue est survenue (code {s})."),
    }
}

/// How the front end should react to an error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiReaction {
    /// Clear the session and go back to login
    ForceLogout,
    /// Go to the "unauthorized" page with a toast
    RedirectUnauthorized { message: String },
    /// Show per-field messages on the form
    ShowFieldErrors {
        message: String,
        fields: BTreeMap<String, Vec<String>>,
    },
    Toast { message: String },
}

/// Uniform error shape for every REST call
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message} (HTTP {status} on {endpoint})")]
pub struct ApiError {
    pub kind: ErrorKind,
    /// HTTP status, 0 when no response was received
    pub status: u16,
    pub message: String,
    pub field_errors: BTreeMap<String, Vec<String>>,
    pub endpoint: String,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    errors: Option<Value>,
}

impl ApiError {
    pub fn new(status: u16, endpoint: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::from_status(status),
            status,
            message: default_message(status),
            field_errors: BTreeMap::new(),
            endpoint: endpoint.into(),
        }
    }

    pub fn network(endpoint: impl Into<String>, detail: impl std::fmt::Display) -> Self {
        let err = Self::new(0, endpoint);
        tracing::debug!(endpoint = %err.endpoint, detail = %detail, "Network failure");
        err
    }

    pub fn timeout(endpoint: impl Into<String>, after: std::time::Duration) -> Self {
        let mut err = Self::new(0, endpoint);
        err.message = format!(
            "Le serveur n'a pas répondu dans le délai imparti ({}s).",
            after.as_secs()
        );
        err
    }

    pub fn decode(status: u16, endpoint: impl Into<String>, detail: impl std::fmt::Display) -> Self {
        let mut err = Self::new(status, endpoint);
        err.kind = ErrorKind::Decode;
        err.message = format!("Réponse du serveur illisible : {detail}");
        err
    }

    /// Builds the error from a non-success response body. A backend-supplied
    /// `message` replaces the default text; `errors` may be a map of field to
    /// message(s) or a list of messages.
    pub fn from_response(status: u16, endpoint: impl Into<String>, body: &[u8]) -> Self {
        let mut err = Self::new(status, endpoint);
        let parsed: ErrorBody = serde_json::from_slice(body).unwrap_or_default();

        if let Some(message) = parsed.message.or(parsed.error).filter(|m| !m.trim().is_empty()) {
            err.message = message;
        }

        match parsed.errors {
            Some(Value::Object(map)) => {
                for (field, value) in map {
                    let messages = match value {
                        Value::String(s) => vec![s],
                        Value::Array(items) => items
                            .into_iter()
                            .map(|v| match v {
                                Value::String(s) => s,
                                other => other.to_string(),
                            })
                            .collect(),
                        other => vec![other.to_string()],
                    };
                    err.field_errors.insert(field, messages);
                }
            }
            Some(Value::Array(items)) => {
                let messages = items
                    .into_iter()
                    .map(|v| match v {
                        Value::String(s) => s,
                        other => other.to_string(),
                    })
                    .collect();
                err.field_errors.insert("_global".to_string(), messages);
            }
            _ => {}
        }
        err
    }

    pub fn storage(endpoint: impl Into<String>, err: &super::token_store::TokenStoreError) -> Self {
        let mut e = Self::new(0, endpoint);
        e.kind = ErrorKind::Storage;
        e.message = format!("Impossible d'enregistrer la session locale : {err}");
        e
    }

    pub fn is_auth_failure(&self) -> bool {
        self.kind == ErrorKind::Unauthorized
    }

    pub fn ui_reaction(&self) -> UiReaction {
        match self.kind {
            ErrorKind::Unauthorized => UiReaction::ForceLogout,
            ErrorKind::Forbidden => UiReaction::RedirectUnauthorized {
                message: self.message.clone(),
            },
            ErrorKind::Validation => UiReaction::ShowFieldErrors {
                message: self.message.clone(),
                fields: self.field_errors.clone(),
            },
            _ => UiReaction::Toast {
                message: self.message.clone(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_to_kind() {
        assert_eq!(ErrorKind::from_status(0), ErrorKind::Network);
        assert_eq!(ErrorKind::from_status(401), ErrorKind::Unauthorized);
        assert_eq!(ErrorKind::from_status(403), ErrorKind::Forbidden);
        assert_eq!(ErrorKind::from_status(404), ErrorKind::NotFound);
        assert_eq!(ErrorKind::from_status(422), ErrorKind::Validation);
        assert_eq!(ErrorKind::from_status(503), ErrorKind::Server);
        assert_eq!(ErrorKind::from_status(409), ErrorKind::Client);
    }

    #[test]
    fn default_messages_are_french() {
        assert!(ApiError::new(401, "/parcelles").message.contains("reconnecter"));
        assert!(ApiError::new(404, "/parcelles/9").message.contains("introuvable"));
        assert!(ApiError::new(418, "/x").message.contains("418"));
    }

    #[test]
    fn backend_message_and_field_errors() {
        let body = r#"{"message": "Validation échouée", "errors": {"surface_imposable": ["doit être positive"], "zonage": "inconnu"}}"#;
        let err = ApiError::from_response(422, "/parcelles", body.as_bytes());
        assert_eq!(err.message, "Validation échouée");
        assert_eq!(err.field_errors["surface_imposable"], vec!["doit être positive"]);
        assert_eq!(err.field_errors["zonage"], vec!["inconnu"]);
        assert!(matches!(err.ui_reaction(), UiReaction::ShowFieldErrors { .. }));
    }

    #[test]
    fn unparseable_body_keeps_default() {
        let err = ApiError::from_response(500, "/dashboard/stats", b"<html>oops</html>");
        assert_eq!(err.message, default_message(500));
        assert!(err.field_errors.is_empty());
    }

    #[test]
    fn reactions() {
        assert_eq!(ApiError::new(401, "/a").ui_reaction(), UiReaction::ForceLogout);
        assert!(matches!(
            ApiError::new(403, "/a").ui_reaction(),
            UiReaction::RedirectUnauthorized { .. }
        ));
        assert!(matches!(ApiError::new(0, "/a").ui_reaction(), UiReaction::Toast { .. }));
    }
}
