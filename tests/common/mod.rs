// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared fakes for integration tests. Not every test binary uses all of them.
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use classroom_relay::config::SyncSettings;
use classroom_relay::db::{MemoryStore, StateStore};
use classroom_relay::error::{AppError, Result};
use classroom_relay::models::{
    Announcement, AuthorProfile, ContentItem, ContentKind, Course, CourseWork, Page,
    WebhookPayload,
};
use classroom_relay::services::{ClassroomApi, DeliveryBatcher, DeliverySink, SyncDriver};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const COURSE_ID: &str = "42";

/// Midnight UTC, `n` days after 2024-01-01.
pub fn day(n: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::days(n)
}

pub fn announcement(id: &str, at: DateTime<Utc>) -> ContentItem {
    ContentItem::Announcement(Announcement {
        id: id.to_string(),
        text: format!("Announcement {}", id),
        creator_user_id: "1001".to_string(),
        creation_time: at,
        alternate_link: format!("https://classroom.google.com/c/42/p/{}", id),
    })
}

pub fn coursework(id: &str, at: DateTime<Utc>) -> ContentItem {
    ContentItem::CourseWork(CourseWork {
        id: id.to_string(),
        title: format!("Assignment {}", id),
        description: Some("Read chapter 4".to_string()),
        creator_user_id: "1001".to_string(),
        creation_time: at,
        alternate_link: format!("https://classroom.google.com/c/42/a/{}", id),
    })
}

pub fn material(id: &str, at: DateTime<Utc>) -> ContentItem {
    ContentItem::CourseWorkMaterial(CourseWork {
        id: id.to_string(),
        title: format!("Material {}", id),
        description: None,
        creator_user_id: "1002".to_string(),
        creation_time: at,
        alternate_link: format!("https://classroom.google.com/c/42/m/{}", id),
    })
}

/// One recorded `list_page` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListCall {
    pub kind: ContentKind,
    pub page_size: u32,
    pub page_token: Option<String>,
}

/// Scripted Classroom upstream.
///
/// Each stream is a newest-first list of items; page tokens are offsets into
/// that list.
pub struct FakeClassroom {
    course_created: DateTime<Utc>,
    streams: Mutex<HashMap<ContentKind, Vec<ContentItem>>>,
    profiles: Mutex<HashMap<String, AuthorProfile>>,
    calls: Mutex<Vec<ListCall>>,
    course_calls: AtomicUsize,
    course_delay: Mutex<Option<std::time::Duration>>,
    permission_revoked: AtomicBool,
    profile_outage: AtomicBool,
    failing_kinds: Mutex<HashSet<ContentKind>>,
}

impl FakeClassroom {
    pub fn new(course_created: DateTime<Utc>) -> Self {
        Self {
            course_created,
            streams: Mutex::new(HashMap::new()),
            profiles: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            course_calls: AtomicUsize::new(0),
            course_delay: Mutex::new(None),
            permission_revoked: AtomicBool::new(false),
            profile_outage: AtomicBool::new(false),
            failing_kinds: Mutex::new(HashSet::new()),
        }
    }

    /// Replace the items of `kind`; must be newest first.
    pub fn with_stream(self, kind: ContentKind, items: Vec<ContentItem>) -> Self {
        self.streams.lock().unwrap().insert(kind, items);
        self
    }

    pub fn with_profile(self, user_id: &str, name: &str, photo_url: &str) -> Self {
        self.profiles.lock().unwrap().insert(
            user_id.to_string(),
            AuthorProfile {
                full_name: Some(name.to_string()),
                photo_url: Some(photo_url.to_string()),
            },
        );
        self
    }

    pub fn with_course_delay(self, delay: std::time::Duration) -> Self {
        *self.course_delay.lock().unwrap() = Some(delay);
        self
    }

    /// Publish a new item at the head of `kind`.
    pub fn post(&self, kind: ContentKind, item: ContentItem) {
        self.streams
            .lock()
            .unwrap()
            .entry(kind)
            .or_default()
            .insert(0, item);
    }

    pub fn revoke_permission(&self) {
        self.permission_revoked.store(true, Ordering::SeqCst);
    }

    pub fn break_profiles(&self) {
        self.profile_outage.store(true, Ordering::SeqCst);
    }

    pub fn fail_kind(&self, kind: ContentKind) {
        self.failing_kinds.lock().unwrap().insert(kind);
    }

    pub fn calls(&self) -> Vec<ListCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, kind: ContentKind) -> Vec<ListCall> {
        self.calls().into_iter().filter(|c| c.kind == kind).collect()
    }

    pub fn course_calls(&self) -> usize {
        self.course_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ClassroomApi for FakeClassroom {
    async fn list_page(
        &self,
        _course_id: &str,
        kind: ContentKind,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<Page> {
        self.calls.lock().unwrap().push(ListCall {
            kind,
            page_size,
            page_token: page_token.map(str::to_string),
        });

        // A kind marked failing fails with 503 even when permission is revoked.
        if self.failing_kinds.lock().unwrap().contains(&kind) {
            return Err(AppError::Upstream("HTTP 503 Service Unavailable".to_string()));
        }
        if self.permission_revoked.load(Ordering::SeqCst) {
            return Err(AppError::PermissionDenied(
                "Request had insufficient authentication scopes.".to_string(),
            ));
        }

        let streams = self.streams.lock().unwrap();
        let items = streams.get(&kind).cloned().unwrap_or_default();
        let start: usize = page_token.map(|t| t.parse().unwrap()).unwrap_or(0);
        let end = (start + page_size as usize).min(items.len());
        let start = start.min(end);

        Ok(Page {
            items: items[start..end].to_vec(),
            next_page_token: (end < items.len()).then(|| end.to_string()),
        })
    }

    async fn get_course(&self, course_id: &str) -> Result<Course> {
        self.course_calls.fetch_add(1, Ordering::SeqCst);

        let delay = *self.course_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        Ok(Course {
            id: course_id.to_string(),
            name: Some("Physics".to_string()),
            creation_time: self.course_created,
        })
    }

    async fn get_user_profile(&self, user_id: &str) -> Result<AuthorProfile> {
        if self.profile_outage.load(Ordering::SeqCst) {
            return Err(AppError::Upstream("HTTP 500 backend error".to_string()));
        }
        self.profiles
            .lock()
            .unwrap()
            .get(user_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("profile {}", user_id)))
    }
}

/// Upstream that hands out pre-built pages in order, whatever is asked for.
pub struct ScriptedPages {
    pages: Mutex<std::collections::VecDeque<Page>>,
    calls: Mutex<Vec<ListCall>>,
}

impl ScriptedPages {
    pub fn new(pages: Vec<Page>) -> Self {
        Self {
            pages: Mutex::new(pages.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<ListCall> {
        self.calls.lock().unwrap().clone()
    }
}

/// A page of `items` with an optional continuation token.
pub fn page(items: Vec<ContentItem>, next_page_token: Option<&str>) -> Page {
    Page {
        items,
        next_page_token: next_page_token.map(str::to_string),
    }
}

#[async_trait]
impl ClassroomApi for ScriptedPages {
    async fn list_page(
        &self,
        _course_id: &str,
        kind: ContentKind,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<Page> {
        self.calls.lock().unwrap().push(ListCall {
            kind,
            page_size,
            page_token: page_token.map(str::to_string),
        });
        Ok(self.pages.lock().unwrap().pop_front().unwrap_or_default())
    }

    async fn get_course(&self, course_id: &str) -> Result<Course> {
        Err(AppError::NotFound(format!("course {}", course_id)))
    }

    async fn get_user_profile(&self, user_id: &str) -> Result<AuthorProfile> {
        Err(AppError::NotFound(format!("profile {}", user_id)))
    }
}

/// Sink that records every payload and fails the chosen calls.
#[derive(Default)]
pub struct RecordingSink {
    payloads: Mutex<Vec<WebhookPayload>>,
    failing_calls: Mutex<HashSet<usize>>,
    fail_all: AtomicBool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the `index`-th call (0-based).
    pub fn fail_call(&self, index: usize) {
        self.failing_calls.lock().unwrap().insert(index);
    }

    pub fn fail_everything(&self) {
        self.fail_all.store(true, Ordering::SeqCst);
    }

    pub fn payloads(&self) -> Vec<WebhookPayload> {
        self.payloads.lock().unwrap().clone()
    }

    /// Payloads carrying embeds, i.e. not alerts.
    pub fn content_payloads(&self) -> Vec<WebhookPayload> {
        self.payloads()
            .into_iter()
            .filter(|p| !p.embeds.is_empty())
            .collect()
    }

    pub fn alerts(&self) -> Vec<WebhookPayload> {
        self.payloads()
            .into_iter()
            .filter(|p| p.content.contains("Permission Issue"))
            .collect()
    }

    /// Footer ids of every delivered embed, in delivery order.
    pub fn delivered_ids(&self) -> Vec<String> {
        self.content_payloads()
            .iter()
            .flat_map(|p| p.embeds.iter().map(|e| e.footer.text.clone()))
            .collect()
    }
}

#[async_trait]
impl DeliverySink for RecordingSink {
    async fn deliver(&self, payload: &WebhookPayload) -> Result<()> {
        let index = {
            let mut payloads = self.payloads.lock().unwrap();
            payloads.push(payload.clone());
            payloads.len() - 1
        };

        if self.fail_all.load(Ordering::SeqCst)
            || self.failing_calls.lock().unwrap().contains(&index)
        {
            return Err(AppError::Delivery("HTTP 500 Internal Server Error".to_string()));
        }
        Ok(())
    }
}

/// A driver over in-memory state, wired to the given fakes.
pub struct TestRelay {
    pub api: Arc<FakeClassroom>,
    pub sink: Arc<RecordingSink>,
    pub state: StateStore,
    pub driver: Arc<SyncDriver>,
}

pub async fn test_relay(api: FakeClassroom, settings: SyncSettings) -> TestRelay {
    let api = Arc::new(api);
    let sink = Arc::new(RecordingSink::new());
    let state = StateStore::new(Arc::new(MemoryStore::new()));
    state.set_refresh_token("1//stored-refresh").await.unwrap();

    let batcher = DeliveryBatcher::new(sink.clone())
        .with_chunking(settings.chunk_size, settings.chunk_delay())
        .with_mentions("", "<@&1>");
    let driver = Arc::new(SyncDriver::new(
        api.clone(),
        state.clone(),
        batcher,
        COURSE_ID,
        settings,
    ));

    TestRelay {
        api,
        sink,
        state,
        driver,
    }
}

/// Default tunables without the inter-chunk pause.
pub fn fast_settings() -> SyncSettings {
    SyncSettings {
        chunk_delay_ms: 0,
        ..SyncSettings::default()
    }
}
