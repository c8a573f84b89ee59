//! Key-value persistence that never fails loudly
//!
//! Features:
//! - JSON values over any string key-value backend
//! - LocalStorage backend on web, in-memory backend natively and in tests
//! - Storage faults (disabled store, quota, corrupt data) degrade to "no persistence"

mod memory;
mod store;

#[cfg(target_arch = "wasm32")]
mod local;

pub use memory::MemoryStorage;
pub use store::{PersistentStore, StorageBackend, StoreError};

#[cfg(target_arch = "wasm32")]
pub use local::LocalStorage;
