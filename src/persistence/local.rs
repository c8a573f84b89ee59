//! `window.localStorage` backend

use wasm_bindgen::JsValue;
use web_sys::Storage;

use super::store::{StorageBackend, StoreError};

/// LocalStorage, resolved on every call so a store disabled mid-session
/// only fails the attempts made while it is disabled
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorage;

impl LocalStorage {
    fn storage() -> Result<Storage, StoreError> {
        web_sys::window()
            .ok_or_else(|| StoreError::Unavailable("no window".to_string()))?
            .local_storage()
            .map_err(|e| StoreError::Unavailable(describe(&e)))?
            .ok_or_else(|| StoreError::Unavailable("localStorage disabled".to_string()))
    }
}

impl StorageBackend for LocalStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        Self::storage()?
            .get_item(key)
            .map_err(|e| StoreError::Backend(describe(&e)))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        Self::storage()?.set_item(key, value).map_err(|e| {
            // Browsers report a full store as a DOMException named QuotaExceededError
            let detail = describe(&e);
            if detail.contains("Quota") {
                StoreError::QuotaExceeded {
                    key: key.to_string(),
                }
            } else {
                StoreError::Backend(detail)
            }
        })
    }

    fn remove_item(&self, key: &str) -> Result<(), StoreError> {
        Self::storage()?
            .remove_item(key)
            .map_err(|e| StoreError::Backend(describe(&e)))
    }
}

fn describe(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| {
            js_sys::Reflect::get(value, &JsValue::from_str("name"))
                .ok()
                .and_then(|name| name.as_string())
        })
        .unwrap_or_else(|| format!("{:?}", value))
}
