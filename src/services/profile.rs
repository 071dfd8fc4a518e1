//! Best-effort author lookup.

use crate::error::AppError;
use crate::models::ProfileLookup;
use crate::services::ClassroomApi;

/// Resolves content authors without ever failing a sync.
pub struct ProfileResolver<'a> {
    api: &'a dyn ClassroomApi,
}

impl<'a> ProfileResolver<'a> {
    pub fn new(api: &'a dyn ClassroomApi) -> Self {
        Self { api }
    }

    /// Look up `user_id`. Every failure becomes [`ProfileLookup::NotFound`].
    pub async fn resolve(&self, user_id: &str) -> ProfileLookup {
        match self.api.get_user_profile(user_id).await {
            Ok(profile) => ProfileLookup::Found(profile),
            Err(AppError::NotFound(_)) => {
                tracing::debug!(user_id, "Author profile not found");
                ProfileLookup::NotFound
            }
            Err(e) => {
                tracing::warn!(user_id, error = %e, "Author profile lookup failed, using default identity");
                ProfileLookup::NotFound
            }
        }
    }
}
