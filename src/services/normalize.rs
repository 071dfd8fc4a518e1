// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Mapping of content items onto webhook embeds.

use crate::models::{
    ContentItem, EmbedAuthor, EmbedFooter, EmbedImage, NormalizedMessage, ProfileLookup,
};

/// Display name used when the author could not be resolved.
pub const DEFAULT_AUTHOR_NAME: &str = "Announcement Bot";

/// Avatar used when the author has no resolvable photo.
pub const FALLBACK_AVATAR_URL: &str =
    "https://lh3.googleusercontent.com/a-/AOh14Gj-cdUSUVoEge7rD5a063tQkyTDT3mripEuDZ0v=s100";

/// Side-bar colour of announcements.
pub const ANNOUNCEMENT_COLOR: u32 = 0x03DAC5;

/// Side-bar colour of coursework and materials.
pub const CLASSWORK_COLOR: u32 = 0x3700B3;

/// Build the display message for `item` written by `author`.
pub fn normalize(item: &ContentItem, author: &ProfileLookup) -> NormalizedMessage {
    let image_url = author
        .photo_url()
        .filter(|url| !url.is_empty())
        .map(absolute_url)
        .unwrap_or_else(|| FALLBACK_AVATAR_URL.to_string());
    let author_name = author
        .full_name()
        .filter(|name| !name.is_empty())
        .unwrap_or(DEFAULT_AUTHOR_NAME)
        .to_string();

    let (title, color, description) = match item {
        ContentItem::Announcement(a) => (author_name.clone(), ANNOUNCEMENT_COLOR, a.text.trim()),
        ContentItem::CourseWork(w) | ContentItem::CourseWorkMaterial(w) => (
            w.title.clone(),
            CLASSWORK_COLOR,
            w.description.as_deref().unwrap_or_default().trim(),
        ),
    };

    NormalizedMessage {
        title,
        color,
        thumbnail: EmbedImage {
            url: image_url.clone(),
        },
        description: description.to_string(),
        timestamp: item.creation_time(),
        author: EmbedAuthor {
            name: author_name,
            url: image_url.clone(),
            icon_url: image_url.clone(),
        },
        footer: EmbedFooter {
            text: item.id().to_string(),
            icon_url: image_url,
        },
        url: item.alternate_link().to_string(),
    }
}

/// Classroom hands out protocol-relative photo URLs (`//lh3...`).
fn absolute_url(url: &str) -> String {
    if url.starts_with("//") {
        format!("https:{}", url)
    } else {
        url.to_string()
    }
}
