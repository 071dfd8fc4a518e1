// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Outbound webhook payloads.
//!
//! A [`NormalizedMessage`] serializes directly as a Discord embed object.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Uniform display message built from any content kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedMessage {
    pub title: String,
    /// Embed side-bar colour (0xRRGGBB)
    pub color: u32,
    pub thumbnail: EmbedImage,
    pub description: String,
    pub timestamp: DateTime<Utc>,
    pub author: EmbedAuthor,
    /// Footer text carries the upstream item id
    pub footer: EmbedFooter,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbedImage {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbedAuthor {
    pub name: String,
    pub url: String,
    pub icon_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbedFooter {
    pub text: String,
    pub icon_url: String,
}

/// Body of one webhook call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WebhookPayload {
    pub username: String,
    pub avatar_url: String,
    pub content: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub embeds: Vec<NormalizedMessage>,
}
