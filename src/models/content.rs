// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Classroom content items as returned by the list endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The three independently paginated content streams of a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    Announcement,
    CourseWork,
    CourseWorkMaterial,
}

impl ContentKind {
    /// Path segment of the list endpoint under `courses/{id}/`.
    pub fn collection(self) -> &'static str {
        match self {
            ContentKind::Announcement => "announcements",
            ContentKind::CourseWork => "courseWork",
            ContentKind::CourseWorkMaterial => "courseWorkMaterials",
        }
    }

    /// Short name used in log fields.
    pub fn label(self) -> &'static str {
        match self {
            ContentKind::Announcement => "announcements",
            ContentKind::CourseWork => "coursework",
            ContentKind::CourseWorkMaterial => "materials",
        }
    }
}

/// A posted announcement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    pub id: String,
    #[serde(default)]
    pub text: String,
    pub creator_user_id: String,
    pub creation_time: DateTime<Utc>,
    #[serde(default)]
    pub alternate_link: String,
}

/// An assignment or question. Materials share the same shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseWork {
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
    pub creator_user_id: String,
    pub creation_time: DateTime<Utc>,
    #[serde(default)]
    pub alternate_link: String,
}

/// One item from any of the three streams.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentItem {
    Announcement(Announcement),
    CourseWork(CourseWork),
    CourseWorkMaterial(CourseWork),
}

impl ContentItem {
    pub fn kind(&self) -> ContentKind {
        match self {
            ContentItem::Announcement(_) => ContentKind::Announcement,
            ContentItem::CourseWork(_) => ContentKind::CourseWork,
            ContentItem::CourseWorkMaterial(_) => ContentKind::CourseWorkMaterial,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            ContentItem::Announcement(a) => &a.id,
            ContentItem::CourseWork(w) | ContentItem::CourseWorkMaterial(w) => &w.id,
        }
    }

    pub fn creator_user_id(&self) -> &str {
        match self {
            ContentItem::Announcement(a) => &a.creator_user_id,
            ContentItem::CourseWork(w) | ContentItem::CourseWorkMaterial(w) => &w.creator_user_id,
        }
    }

    pub fn creation_time(&self) -> DateTime<Utc> {
        match self {
            ContentItem::Announcement(a) => a.creation_time,
            ContentItem::CourseWork(w) | ContentItem::CourseWorkMaterial(w) => w.creation_time,
        }
    }

    pub fn alternate_link(&self) -> &str {
        match self {
            ContentItem::Announcement(a) => &a.alternate_link,
            ContentItem::CourseWork(w) | ContentItem::CourseWorkMaterial(w) => &w.alternate_link,
        }
    }
}

/// One page of a list endpoint, newest item first.
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub items: Vec<ContentItem>,
    pub next_page_token: Option<String>,
}

/// Course metadata; only the creation time matters for the cutoff.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub creation_time: DateTime<Utc>,
}
