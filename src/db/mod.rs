//! Checkpoint persistence.
//!
//! A tiny key-value layer ([`KeyValueStore`]) with a JSON-file backend for
//! production and an in-memory backend for tests, wrapped by [`StateStore`]
//! which knows the two keys the relay uses.

pub mod file;
pub mod memory;
pub mod state;

pub use file::JsonFileStore;
pub use memory::MemoryStore;
pub use state::StateStore;

use async_trait::async_trait;

use crate::error::Result;

/// Key names as constants.
pub mod keys {
    pub const LAST_SYNC_TIMESTAMP: &str = "lastSyncTimestamp";
    pub const REFRESH_TOKEN: &str = "refreshToken";
}

/// Durable string key-value storage.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Read a key, falling back to `default` when it was never written.
    async fn get_or(&self, key: &str, default: &str) -> Result<String> {
        Ok(self
            .get(key)
            .await?
            .unwrap_or_else(|| default.to_string()))
    }
}
