// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Webhook delivery.
//!
//! Messages go out in fixed-size chunks, strictly one after another, with a
//! fixed pause after every call so the webhook's rate limit is respected. A
//! failed chunk is logged and the remaining chunks are still sent.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::{DEFAULT_CHUNK_DELAY_MS, DEFAULT_CHUNK_SIZE};
use crate::error::{AppError, Result};
use crate::models::{NormalizedMessage, WebhookPayload};

/// Username shown for every webhook post.
pub const BOT_USERNAME: &str = "Announcement Bot";

/// Avatar shown for every webhook post.
pub const BOT_AVATAR_URL: &str = "https://ssl.gstatic.com/classroom/favicon.png";

/// Downstream notification sink.
#[async_trait]
pub trait DeliverySink: Send + Sync {
    /// Send one payload. Any non-2xx response is an error.
    async fn deliver(&self, payload: &WebhookPayload) -> Result<()>;
}

/// Discord webhook sink.
#[derive(Clone)]
pub struct DiscordWebhook {
    http: reqwest::Client,
    url: String,
}

impl DiscordWebhook {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl DeliverySink for DiscordWebhook {
    async fn deliver(&self, payload: &WebhookPayload) -> Result<()> {
        let response = self
            .http
            .post(&self.url)
            .json(payload)
            .send()
            .await
            .map_err(|e| AppError::Delivery(e.to_string()))?;

        if response.status().is_success() {
            return Ok(());
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(AppError::Delivery(format!("HTTP {}: {}", status, body)))
    }
}

/// Outcome of delivering one cycle's messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Chunks attempted.
    pub chunks: usize,
    /// Chunks the sink accepted.
    pub delivered: usize,
    /// Chunks the sink rejected or that never reached it.
    pub failed: usize,
}

impl DeliveryReport {
    pub fn is_complete_success(&self) -> bool {
        self.failed == 0
    }
}

/// Splits messages into chunks and sends them with a fixed pause.
#[derive(Clone)]
pub struct DeliveryBatcher {
    sink: Arc<dyn DeliverySink>,
    chunk_size: usize,
    delay: Duration,
    announce_mention: String,
    alert_mention: String,
}

impl DeliveryBatcher {
    pub fn new(sink: Arc<dyn DeliverySink>) -> Self {
        Self {
            sink,
            chunk_size: DEFAULT_CHUNK_SIZE,
            delay: Duration::from_millis(DEFAULT_CHUNK_DELAY_MS),
            announce_mention: String::new(),
            alert_mention: String::new(),
        }
    }

    pub fn with_chunking(mut self, chunk_size: usize, delay: Duration) -> Self {
        self.chunk_size = chunk_size.max(1);
        self.delay = delay;
        self
    }

    pub fn with_mentions(mut self, announce: impl Into<String>, alert: impl Into<String>) -> Self {
        self.announce_mention = announce.into();
        self.alert_mention = alert.into();
        self
    }

    /// Deliver `messages` in order. Never fails; failures are counted.
    pub async fn deliver_all(&self, messages: &[NormalizedMessage]) -> DeliveryReport {
        let mut report = DeliveryReport::default();

        for chunk in chunk_messages(messages, self.chunk_size) {
            let payload = WebhookPayload {
                username: BOT_USERNAME.to_string(),
                avatar_url: BOT_AVATAR_URL.to_string(),
                content: with_mention(&self.announce_mention, "New Announcement"),
                embeds: chunk.to_vec(),
            };

            report.chunks += 1;
            match self.send(&payload).await {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    tracing::error!(
                        chunk = report.chunks,
                        embeds = chunk.len(),
                        error = %e,
                        "Webhook delivery failed"
                    );
                    report.failed += 1;
                }
            }
        }

        report
    }

    /// Send the one-off permission alert.
    pub async fn send_alert(&self) -> Result<()> {
        let payload = WebhookPayload {
            username: BOT_USERNAME.to_string(),
            avatar_url: BOT_AVATAR_URL.to_string(),
            content: with_mention(&self.alert_mention, "Permission Issue"),
            embeds: Vec::new(),
        };
        self.send(&payload).await
    }

    /// One sink call followed by the fixed pause, whatever the outcome.
    async fn send(&self, payload: &WebhookPayload) -> Result<()> {
        let result = self.sink.deliver(payload).await;
        tokio::time::sleep(self.delay).await;
        result
    }
}

/// Order-preserving split into chunks of at most `size` (a zero size is treated as 1).
pub fn chunk_messages<T>(items: &[T], size: usize) -> Vec<&[T]> {
    items.chunks(size.max(1)).collect()
}

fn with_mention(mention: &str, text: &str) -> String {
    if mention.is_empty() {
        text.to_string()
    } else {
        format!("{} {}", mention, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_counts() {
        let items: Vec<u32> = (0..23).collect();
        let chunks = chunk_messages(&items, 10);

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), 10);
        assert_eq!(chunks[2].len(), 3);
        assert_eq!(chunks.concat(), items);
    }

    #[test]
    fn test_chunk_exact_multiple() {
        let items: Vec<u32> = (0..20).collect();
        assert_eq!(chunk_messages(&items, 10).len(), 2);
    }

    #[test]
    fn test_chunk_empty() {
        let items: Vec<u32> = Vec::new();
        assert!(chunk_messages(&items, 10).is_empty());
    }

    #[test]
    fn test_chunk_property_over_lengths() {
        for len in 0..35usize {
            for size in 1..12usize {
                let items: Vec<usize> = (0..len).collect();
                let chunks = chunk_messages(&items, size);

                assert_eq!(chunks.len(), len.div_ceil(size));
                assert!(chunks.iter().all(|c| !c.is_empty() && c.len() <= size));
                assert_eq!(chunks.concat(), items);
            }
        }
    }

    #[test]
    fn test_mention_prefix() {
        assert_eq!(with_mention("", "New Announcement"), "New Announcement");
        assert_eq!(
            with_mention("<@&1027417122055401532>", "New Announcement"),
            "<@&1027417122055401532> New Announcement"
        );
    }

    #[test]
    fn test_alert_payload_has_no_embeds_key() {
        let payload = WebhookPayload {
            username: BOT_USERNAME.to_string(),
            avatar_url: BOT_AVATAR_URL.to_string(),
            content: "Permission Issue".to_string(),
            embeds: Vec::new(),
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("embeds").is_none());
        assert_eq!(json["avatar_url"], BOT_AVATAR_URL);
    }
}
