//! Typed access to the checkpoint and refresh token.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::{keys, KeyValueStore};
use crate::error::Result;
use crate::models::Checkpoint;
use crate::time_utils;

/// Shared handle to persisted relay state.
///
/// This is the only writer of the checkpoint; every component that needs
/// persisted state receives a clone of it.
#[derive(Clone)]
pub struct StateStore {
    backend: Arc<dyn KeyValueStore>,
}

impl StateStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    /// Last checkpoint, or `None` when never written or unparseable.
    pub async fn last_sync(&self) -> Result<Option<DateTime<Utc>>> {
        let raw = self.backend.get_or(keys::LAST_SYNC_TIMESTAMP, "").await?;
        if raw.is_empty() {
            return Ok(None);
        }

        let parsed = time_utils::parse_utc_rfc3339(&raw);
        if parsed.is_none() {
            tracing::warn!(value = %raw, "Ignoring unreadable checkpoint");
        }
        Ok(parsed)
    }

    pub async fn set_last_sync(&self, at: DateTime<Utc>) -> Result<()> {
        self.backend
            .set(keys::LAST_SYNC_TIMESTAMP, &time_utils::format_utc_rfc3339_exact(at))
            .await
    }

    pub async fn refresh_token(&self) -> Result<String> {
        self.backend.get_or(keys::REFRESH_TOKEN, "").await
    }

    pub async fn set_refresh_token(&self, token: &str) -> Result<()> {
        self.backend.set(keys::REFRESH_TOKEN, token).await
    }

    /// Forget the refresh token so the next start runs the consent flow.
    pub async fn clear_refresh_token(&self) -> Result<()> {
        self.backend.set(keys::REFRESH_TOKEN, "").await
    }

    pub async fn snapshot(&self) -> Result<Checkpoint> {
        Ok(Checkpoint {
            last_sync: self.last_sync().await?,
            refresh_token: self.refresh_token().await?,
        })
    }
}
