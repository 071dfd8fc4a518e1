// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod checkpoint;
pub mod content;
pub mod message;
pub mod profile;

pub use checkpoint::Checkpoint;
pub use content::{Announcement, ContentItem, ContentKind, Course, CourseWork, Page};
pub use message::{EmbedAuthor, EmbedFooter, EmbedImage, NormalizedMessage, WebhookPayload};
pub use profile::{AuthorProfile, ProfileLookup, UserProfile};
