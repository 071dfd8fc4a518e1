//! Persisted sync progress.

use chrono::{DateTime, Utc};

/// Snapshot of everything the checkpoint store holds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Checkpoint {
    /// Start of the last cycle that reached the checkpoint-advance step.
    /// `None` on first run or when the stored value is unreadable.
    pub last_sync: Option<DateTime<Utc>>,
    /// Google refresh token; empty means "consent required".
    pub refresh_token: String,
}

impl Checkpoint {
    pub fn has_refresh_token(&self) -> bool {
        !self.refresh_token.is_empty()
    }
}
