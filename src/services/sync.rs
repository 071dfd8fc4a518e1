// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Sync cycle driver.
//!
//! Handles the per-cycle workflow:
//! 1. Read the checkpoint
//! 2. Compute the cutoff from course creation, checkpoint and lookback window
//! 3. Advance the checkpoint to "now" (before anything is delivered)
//! 4. Walk the three content streams concurrently and normalize them
//! 5. Merge into one chronological sequence and deliver it in chunks
//!
//! An insufficient-permission failure anywhere in the cycle clears the stored
//! refresh token and sends a single alert; the caller must then stop.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use futures_util::{stream, StreamExt};

use crate::config::SyncSettings;
use crate::db::StateStore;
use crate::error::{AppError, Result};
use crate::models::{ContentKind, NormalizedMessage};
use crate::services::backfill::{BackfillLimits, BackfillWalker};
use crate::services::delivery::{DeliveryBatcher, DeliveryReport};
use crate::services::normalize::normalize;
use crate::services::profile::ProfileResolver;
use crate::services::ClassroomApi;

/// Profile lookups in flight per content stream.
const MAX_CONCURRENT_PROFILE_LOOKUPS: usize = 8;

/// Summary of one completed cycle.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub started_at: DateTime<Utc>,
    pub cutoff: DateTime<Utc>,
    pub announcements: usize,
    pub coursework: usize,
    pub materials: usize,
    pub delivery: DeliveryReport,
}

impl CycleReport {
    pub fn total_messages(&self) -> usize {
        self.announcements + self.coursework + self.materials
    }
}

/// What the scheduler should do after a cycle.
#[derive(Debug)]
pub enum CycleOutcome {
    Completed(CycleReport),
    /// Cycle failed; retry on the next tick.
    Abandoned(AppError),
    /// Credentials are unusable; stop the relay.
    Fatal(AppError),
}

/// Runs sync cycles for one course.
pub struct SyncDriver {
    api: Arc<dyn ClassroomApi>,
    state: StateStore,
    batcher: DeliveryBatcher,
    course_id: String,
    settings: SyncSettings,
}

impl SyncDriver {
    pub fn new(
        api: Arc<dyn ClassroomApi>,
        state: StateStore,
        batcher: DeliveryBatcher,
        course_id: impl Into<String>,
        settings: SyncSettings,
    ) -> Self {
        Self {
            api,
            state,
            batcher,
            course_id: course_id.into(),
            settings,
        }
    }

    pub fn settings(&self) -> &SyncSettings {
        &self.settings
    }

    /// Run one cycle and classify its failure, if any.
    pub async fn tick(&self) -> CycleOutcome {
        tracing::info!(course_id = %self.course_id, "fetching");

        match self.run_cycle().await {
            Ok(report) => CycleOutcome::Completed(report),
            Err(e) if e.is_permission_error() => {
                self.handle_revoked_permission(&e).await;
                CycleOutcome::Fatal(e)
            }
            Err(e) => {
                tracing::error!(course_id = %self.course_id, error = %e, "Sync cycle failed");
                CycleOutcome::Abandoned(e)
            }
        }
    }

    pub async fn run_cycle(&self) -> Result<CycleReport> {
        self.run_cycle_at(Utc::now()).await
    }

    /// Run one cycle as if the current time were `now`.
    pub async fn run_cycle_at(&self, now: DateTime<Utc>) -> Result<CycleReport> {
        let last_sync = self.state.last_sync().await?;
        let course = self.api.get_course(&self.course_id).await?;
        let cutoff = compute_cutoff(
            course.creation_time,
            last_sync,
            now,
            self.settings.lookback_window(),
        );

        tracing::debug!(
            course_id = %self.course_id,
            cutoff = %cutoff,
            last_sync = ?last_sync,
            "Computed cutoff"
        );

        // Advance before delivery: a crash past this point skips the window
        // rather than re-sending it.
        self.state.set_last_sync(now).await?;

        // All three finish before an error is chosen, so a permission error in
        // one stream is never masked by a transient failure in another.
        let (announcements, coursework, materials) = match tokio::join!(
            self.fetch_messages(ContentKind::Announcement, cutoff),
            self.fetch_messages(ContentKind::CourseWork, cutoff),
            self.fetch_messages(ContentKind::CourseWorkMaterial, cutoff),
        ) {
            (Ok(a), Ok(w), Ok(m)) => (a, w, m),
            (a, w, m) => return Err(most_severe([a.err(), w.err(), m.err()])),
        };

        let counts = (announcements.len(), coursework.len(), materials.len());
        let messages = merge_and_order([announcements, coursework, materials]);

        tracing::info!(count = messages.len(), "sending");
        let delivery = self.batcher.deliver_all(&messages).await;
        tracing::info!(
            chunks = delivery.chunks,
            failed = delivery.failed,
            "done sending"
        );

        Ok(CycleReport {
            started_at: now,
            cutoff,
            announcements: counts.0,
            coursework: counts.1,
            materials: counts.2,
            delivery,
        })
    }

    /// Walk one stream and turn its items into messages, oldest first.
    async fn fetch_messages(
        &self,
        kind: ContentKind,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<NormalizedMessage>> {
        let limits = BackfillLimits {
            max_depth: self.settings.max_depth,
            max_day_gap: self.settings.max_day_gap,
        };
        let items = BackfillWalker::new(self.api.as_ref(), &self.course_id, limits)
            .fetch(kind, cutoff)
            .await?;

        let resolver = ProfileResolver::new(self.api.as_ref());
        let resolver = &resolver;

        let messages = stream::iter(items)
            .map(move |item| async move {
                let author = resolver.resolve(item.creator_user_id()).await;
                normalize(&item, &author)
            })
            .buffered(MAX_CONCURRENT_PROFILE_LOOKUPS)
            .collect::<Vec<_>>()
            .await;

        tracing::debug!(kind = kind.label(), count = messages.len(), "Fetched stream");
        Ok(messages)
    }

    async fn handle_revoked_permission(&self, err: &AppError) {
        tracing::error!(error = %err, "Permission revoked, clearing credentials");

        if let Err(e) = self.state.clear_refresh_token().await {
            tracing::error!(error = %e, "Failed to clear refresh token");
        }
        if let Err(e) = self.batcher.send_alert().await {
            tracing::error!(error = %e, "Failed to send permission alert");
        }
    }
}

/// Oldest creation time a cycle may deliver.
///
/// Never earlier than the course creation, the last checkpoint, or
/// `now - lookback`.
pub fn compute_cutoff(
    course_created: DateTime<Utc>,
    last_sync: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    lookback: Duration,
) -> DateTime<Utc> {
    let checkpointed = match last_sync {
        Some(last) => course_created.max(last),
        None => course_created,
    };
    checkpointed.max(now - lookback)
}

/// The error a failed cycle reports: a permission error wins over the rest.
fn most_severe(errors: [Option<AppError>; 3]) -> AppError {
    let mut errors: Vec<AppError> = errors.into_iter().flatten().collect();
    match errors.iter().position(AppError::is_permission_error) {
        Some(i) => errors.swap_remove(i),
        None => errors
            .into_iter()
            .next()
            .unwrap_or_else(|| AppError::Internal(anyhow::anyhow!("fetch failed without an error"))),
    }
}

/// Concatenate the streams and sort ascending by timestamp.
pub fn merge_and_order<I>(streams: I) -> Vec<NormalizedMessage>
where
    I: IntoIterator<Item = Vec<NormalizedMessage>>,
{
    let mut merged: Vec<NormalizedMessage> = streams.into_iter().flatten().collect();
    merged.sort_by_key(|m| m.timestamp);
    merged
}
