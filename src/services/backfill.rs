// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Backward pagination walk over one content stream.
//!
//! The walk starts with a one-item page to learn the date of the newest item.
//! While the oldest item of the current page is still newer than the cutoff,
//! the next page is sized to the day gap between that item and the cutoff
//! (capped), and the walk continues with the continuation token. The page on
//! which the cutoff is reached is the terminal page: it is the only one
//! trimmed to the cutoff. Result order is ascending by creation time.

use chrono::{DateTime, Utc};

use crate::config::{DEFAULT_MAX_DAY_GAP, DEFAULT_MAX_PAGE_DEPTH};
use crate::error::Result;
use crate::models::{ContentItem, ContentKind};
use crate::services::ClassroomApi;
use crate::time_utils;

/// Size of the probe page that opens every walk.
pub const FIRST_PAGE_SIZE: u32 = 1;

/// Bounds on a single walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackfillLimits {
    /// Pages that may follow the probe page before the walk gives up.
    pub max_depth: u32,
    /// Largest page size the day-gap estimate may ask for.
    pub max_day_gap: u32,
}

impl Default for BackfillLimits {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_PAGE_DEPTH,
            max_day_gap: DEFAULT_MAX_DAY_GAP,
        }
    }
}

/// Walks one content stream of one course back to a cutoff.
pub struct BackfillWalker<'a> {
    api: &'a dyn ClassroomApi,
    course_id: &'a str,
    limits: BackfillLimits,
}

impl<'a> BackfillWalker<'a> {
    pub fn new(api: &'a dyn ClassroomApi, course_id: &'a str, limits: BackfillLimits) -> Self {
        Self {
            api,
            course_id,
            limits,
        }
    }

    /// Every item of `kind` created at or after `cutoff`, oldest first.
    ///
    /// Upstream errors propagate unchanged; there is no retry here.
    ///
    /// The page fetched at `max_depth` is kept whole even if it crosses the
    /// cutoff, so hitting the limit can re-deliver items older than the cutoff.
    pub async fn fetch(&self, kind: ContentKind, cutoff: DateTime<Utc>) -> Result<Vec<ContentItem>> {
        let mut newest_first: Vec<ContentItem> = Vec::new();
        let mut page_size = FIRST_PAGE_SIZE;
        let mut page_token: Option<String> = None;
        let mut depth: u32 = 0;

        loop {
            let page = self
                .api
                .list_page(self.course_id, kind, page_size, page_token.as_deref())
                .await?;

            let Some(oldest) = page.items.last().map(ContentItem::creation_time) else {
                break;
            };

            if depth >= self.limits.max_depth {
                tracing::warn!(
                    kind = kind.label(),
                    depth,
                    "Backfill depth limit reached, stopping walk"
                );
                newest_first.extend(page.items);
                break;
            }

            if oldest > cutoff {
                let Some(token) = page.next_page_token else {
                    // Upstream has no older history.
                    newest_first.extend(page.items);
                    break;
                };

                page_size = next_page_size(oldest, cutoff, self.limits.max_day_gap);
                page_token = Some(token);
                depth += 1;
                newest_first.extend(page.items);
                continue;
            }

            // Terminal page: the only one trimmed to the cutoff.
            newest_first.extend(
                page.items
                    .into_iter()
                    .filter(|item| item.creation_time() >= cutoff),
            );
            break;
        }

        newest_first.reverse();

        tracing::debug!(
            kind = kind.label(),
            count = newest_first.len(),
            pages = depth + 1,
            "Backfill walk finished"
        );

        Ok(newest_first)
    }
}

/// Page size for the next request: the day gap to the cutoff, in `1..=max_day_gap`.
pub fn next_page_size(oldest: DateTime<Utc>, cutoff: DateTime<Utc>, max_day_gap: u32) -> u32 {
    let days = time_utils::days_between_ceil(cutoff, oldest);
    days.clamp(1, i64::from(max_day_gap.max(1))) as u32
}
