use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use thiserror::Error;

use crate::domain::User;

/// Persisted authentication state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSession {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub current_user: Option<User>,
}

#[derive(Debug, Error)]
pub enum TokenStoreError {
    #[error("Session file error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Session file is corrupt: {0}")]
    Json(#[from] serde_json::Error),
}

/// Where access/refresh tokens and the current user live between calls
pub trait TokenStore: Send + Sync + std::fmt::Debug {
    fn load(&self) -> Option<StoredSession>;
    fn save(&self, session: &StoredSession) -> Result<(), TokenStoreError>;
    fn clear(&self) -> Result<(), TokenStoreError>;

    fn access_token(&self) -> Option<String> {
        self.load().map(|s| s.access_token)
    }
}

#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    session: RwLock<Option<StoredSession>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            session: RwLock::new(Some(StoredSession {
                access_token: token.into(),
                refresh_token: None,
                current_user: None,
            })),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Option<StoredSession> {
        self.session.read().ok().and_then(|s| s.clone())
    }

    fn save(&self, session: &StoredSession) -> Result<(), TokenStoreError> {
        if let Ok(mut slot) = self.session.write() {
            *slot = Some(session.clone());
        }
        Ok(())
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        if let Ok(mut slot) = self.session.write() {
            *slot = None;
        }
        Ok(())
    }
}

/// JSON file store, e.g. `.geotnb/session.json`
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Option<StoredSession> {
        let content = fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&content) {
            Ok(session) => Some(session),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Ignoring unreadable session file");
                None
            }
        }
    }

    fn save(&self, session: &StoredSession) -> Result<(), TokenStoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_string_pretty(session)?)?;
        tracing::debug!(path = %self.path.display(), "Session saved");
        Ok(())
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;

    fn session() -> StoredSession {
        StoredSession {
            access_token: "acc".to_string(),
            refresh_token: Some("ref".to_string()),
            current_user: Some(User::new(5, "nadia", Role::TaxAgent)),
        }
    }

    #[test]
    fn memory_store_roundtrip() {
        let store = MemoryTokenStore::new();
        assert!(store.load().is_none());
        store.save(&session()).unwrap();
        assert_eq!(store.access_token().as_deref(), Some("acc"));
        store.clear().unwrap();
        assert!(store.access_token().is_none());
    }

    #[test]
    fn file_store_persists_and_clears() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("nested/session.json"));
        store.save(&session()).unwrap();

        let reopened = FileTokenStore::new(store.path());
        let loaded = reopened.load().unwrap();
        assert_eq!(loaded.current_user.unwrap().username, "nadia");

        reopened.clear().unwrap();
        assert!(reopened.load().is_none());
        // clearing twice is fine
        reopened.clear().unwrap();
    }

    #[test]
    fn corrupt_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{not json").unwrap();
        assert!(FileTokenStore::new(&path).load().is_none());
    }
}
