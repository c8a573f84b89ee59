//! Safe get/set/delete over a string key-value backend

use std::rc::Rc;

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Why a storage attempt failed. Only ever logged, never surfaced to the user.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("quota exceeded writing '{key}'")]
    QuotaExceeded { key: String },
    #[error("storage operation failed: {0}")]
    Backend(String),
    #[error("value could not be serialized: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Raw string storage (LocalStorage-shaped)
pub trait StorageBackend {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove_item(&self, key: &str) -> Result<(), StoreError>;
}

// Lets the page and the form controller share one backend
impl<B: StorageBackend + ?Sized> StorageBackend for Rc<B> {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove_item(key)
    }
}

/// JSON values over a [`StorageBackend`]; every failure is swallowed.
///
/// There are no retries: a failed attempt means persistence is unavailable
/// for that attempt only.
#[derive(Debug, Clone, Default)]
pub struct PersistentStore<B> {
    backend: B,
}

impl<B: StorageBackend> PersistentStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Stored value for `key`, or `fallback` when absent, corrupt or unreadable
    pub fn get<T: DeserializeOwned>(&self, key: &str, fallback: T) -> T {
        match self.backend.get_item(key) {
            Ok(Some(json)) => match serde_json::from_str(&json) {
                Ok(value) => value,
                Err(e) => {
                    log::debug!("Discarding unreadable value for '{}': {}", key, e);
                    fallback
                }
            },
            Ok(None) => fallback,
            Err(e) => {
                log::debug!("Read of '{}' skipped: {}", key, e);
                fallback
            }
        }
    }

    /// Serialize and write `value`; skipped silently on any failure
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        if let Err(e) = self.try_set(key, value) {
            log::warn!("Write of '{}' skipped: {}", key, e);
        }
    }

    /// Remove `key`; skipped silently on failure
    pub fn del(&self, key: &str) {
        if let Err(e) = self.backend.remove_item(key) {
            log::warn!("Delete of '{}' skipped: {}", key, e);
        }
    }

    fn try_set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        // Serialize fully before touching the backend so a failure never half-writes
        let json = serde_json::to_string(value)?;
        self.backend.set_item(key, &json)
    }
}
