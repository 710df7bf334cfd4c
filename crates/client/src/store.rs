//! Where the signed-in user is kept between calls.
//!
//! A stored [`UserRecord`] means "logged in"; no record means logged out.
//! [`MemoryUserStore`] lives as long as the client, [`FileUserStore`]
//! survives restarts.

use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use greengrocer_core::api::UserRecord;
use thiserror::Error;

/// A user store could not be read or written.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Stored user record is not valid JSON: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Persistence for the signed-in user record.
pub trait UserStore: fmt::Debug + Send + Sync {
    /// The stored record, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the store cannot be read.
    fn load(&self) -> Result<Option<UserRecord>, StoreError>;

    /// Replace the stored record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the store cannot be written.
    fn save(&self, user: &UserRecord) -> Result<(), StoreError>;

    /// Remove the stored record. Clearing an empty store succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the store cannot be written.
    fn clear(&self) -> Result<(), StoreError>;
}

/// In-process store.
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    user: Mutex<Option<UserRecord>>,
}

impl MemoryUserStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserStore for MemoryUserStore {
    fn load(&self) -> Result<Option<UserRecord>, StoreError> {
        Ok(self
            .user
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, user: &UserRecord) -> Result<(), StoreError> {
        *self.user.lock().unwrap_or_else(PoisonError::into_inner) = Some(user.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.user.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

/// Store backed by one JSON file.
#[derive(Debug, Clone)]
pub struct FileUserStore {
    path: PathBuf,
}

impl FileUserStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl UserStore for FileUserStore {
    fn load(&self) -> Result<Option<UserRecord>, StoreError> {
        match std::fs::read(&self.path) {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, user: &UserRecord) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_vec(user)?)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        match std::fs::remove_file(&self.path) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use greengrocer_core::{UserId, UserRole};

    use super::*;

    fn user() -> UserRecord {
        UserRecord {
            id: UserId::new(7),
            username: "asha".to_string(),
            email: "asha@example.com".to_string(),
            role: UserRole::Customer,
        }
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("greengrocer-client-{}", std::process::id()))
            .join(name)
    }

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryUserStore::new();
        assert_eq!(store.load().unwrap(), None);
        store.save(&user()).unwrap();
        assert_eq!(store.load().unwrap(), Some(user()));
        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_file_store_missing_file_is_logged_out() {
        let store = FileUserStore::new(temp_path("missing.json"));
        assert_eq!(store.load().unwrap(), None);
        store.clear().unwrap();
    }

    #[test]
    fn test_file_store_persists_between_instances() {
        let path = temp_path("persist.json");
        FileUserStore::new(&path).save(&user()).unwrap();

        let reopened = FileUserStore::new(&path);
        assert_eq!(reopened.load().unwrap(), Some(user()));
        reopened.clear().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_file_store_rejects_garbage() {
        let path = temp_path("garbage.json");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, b"not json").unwrap();
        let err = FileUserStore::new(&path).load().unwrap_err();
        assert!(matches!(err, StoreError::Corrupt(_)));
        std::fs::remove_file(&path).unwrap();
    }
}
