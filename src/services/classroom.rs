// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Google Classroom REST client.
//!
//! Handles:
//! - Paged listing of announcements, coursework and materials
//! - Course metadata (creation time)
//! - User profile lookups
//! - Mapping Google error bodies onto [`AppError`], in particular the
//!   "Insufficient Permission" condition that stops the relay

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::models::{
    Announcement, AuthorProfile, ContentItem, ContentKind, Course, CourseWork, Page, UserProfile,
};
use crate::services::google_oauth::AccessTokenSource;

/// The upstream calls the sync engine depends on.
#[async_trait]
pub trait ClassroomApi: Send + Sync {
    /// One page of `kind`, newest first. `page_token` is `None` for the first page.
    async fn list_page(
        &self,
        course_id: &str,
        kind: ContentKind,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<Page>;

    async fn get_course(&self, course_id: &str) -> Result<Course>;

    async fn get_user_profile(&self, user_id: &str) -> Result<AuthorProfile>;
}

/// Classroom API client.
#[derive(Clone)]
pub struct ClassroomClient {
    http: reqwest::Client,
    base_url: String,
    tokens: Arc<dyn AccessTokenSource>,
}

impl ClassroomClient {
    pub fn new(base_url: impl Into<String>, tokens: Arc<dyn AccessTokenSource>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            tokens,
        }
    }

    /// Generic GET request with JSON response.
    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let access_token = self.tokens.access_token().await?;

        let response = self
            .http
            .get(url)
            .bearer_auth(access_token)
            .query(query)
            .send()
            .await
            .map_err(|e| AppError::Upstream(e.to_string()))?;

        check_response_json(response).await
    }
}

#[async_trait]
impl ClassroomApi for ClassroomClient {
    async fn list_page(
        &self,
        course_id: &str,
        kind: ContentKind,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<Page> {
        let url = format!(
            "{}/v1/courses/{}/{}",
            self.base_url,
            urlencoding::encode(course_id),
            kind.collection()
        );

        let mut query = vec![("pageSize", page_size.to_string())];
        if let Some(token) = page_token.filter(|t| !t.is_empty()) {
            query.push(("pageToken", token.to_string()));
        }

        tracing::debug!(kind = kind.label(), page_size, "Listing page");

        let page = match kind {
            ContentKind::Announcement => {
                let raw: AnnouncementPage = self.get_json(&url, &query).await?;
                Page {
                    items: raw
                        .announcements
                        .into_iter()
                        .map(ContentItem::Announcement)
                        .collect(),
                    next_page_token: raw.next_page_token,
                }
            }
            ContentKind::CourseWork => {
                let raw: CourseWorkPage = self.get_json(&url, &query).await?;
                Page {
                    items: raw
                        .course_work
                        .into_iter()
                        .map(ContentItem::CourseWork)
                        .collect(),
                    next_page_token: raw.next_page_token,
                }
            }
            ContentKind::CourseWorkMaterial => {
                let raw: MaterialPage = self.get_json(&url, &query).await?;
                Page {
                    items: raw
                        .course_work_material
                        .into_iter()
                        .map(ContentItem::CourseWorkMaterial)
                        .collect(),
                    next_page_token: raw.next_page_token,
                }
            }
        };

        Ok(Page {
            next_page_token: page.next_page_token.filter(|t| !t.is_empty()),
            ..page
        })
    }

    async fn get_course(&self, course_id: &str) -> Result<Course> {
        let url = format!(
            "{}/v1/courses/{}",
            self.base_url,
            urlencoding::encode(course_id)
        );
        self.get_json(&url, &[]).await
    }

    async fn get_user_profile(&self, user_id: &str) -> Result<AuthorProfile> {
        let url = format!(
            "{}/v1/userProfiles/{}",
            self.base_url,
            urlencoding::encode(user_id)
        );
        let profile: UserProfile = self.get_json(&url, &[]).await?;
        Ok(profile.into())
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnnouncementPage {
    #[serde(default)]
    announcements: Vec<Announcement>,
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CourseWorkPage {
    #[serde(default)]
    course_work: Vec<CourseWork>,
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MaterialPage {
    #[serde(default)]
    course_work_material: Vec<CourseWork>,
    next_page_token: Option<String>,
}

/// Google JSON error envelope.
#[derive(Debug, Default, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    error: GoogleError,
}

#[derive(Debug, Default, Deserialize)]
struct GoogleError {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    errors: Vec<GoogleErrorDetail>,
}

#[derive(Debug, Default, Deserialize)]
struct GoogleErrorDetail {
    #[serde(default)]
    message: String,
}

impl GoogleError {
    fn is_insufficient_permission(&self) -> bool {
        let first_detail = self.errors.first().map(|d| d.message.as_str());
        first_detail == Some(AppError::INSUFFICIENT_PERMISSION)
            || (self.status == "PERMISSION_DENIED"
                && self.message.to_ascii_lowercase().contains("insufficient"))
    }
}

/// Map a non-success response onto an error, or parse the JSON body.
async fn check_response_json<T: for<'de> Deserialize<'de>>(
    response: reqwest::Response,
) -> Result<T> {
    let status = response.status();
    if status.is_success() {
        return response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("JSON parse error: {}", e)));
    }

    let body = response.text().await.unwrap_or_default();
    let envelope: ErrorEnvelope = serde_json::from_str(&body).unwrap_or_default();

    if envelope.error.is_insufficient_permission() {
        tracing::warn!(status = %status, "Classroom API reports insufficient permission");
        return Err(AppError::PermissionDenied(envelope.error.message));
    }

    if status.as_u16() == 404 {
        return Err(AppError::NotFound(envelope.error.message));
    }

    if status.as_u16() == 429 {
        tracing::warn!("Classroom rate limit hit (429)");
    }

    Err(AppError::Upstream(format!("HTTP {}: {}", status, body)))
}
