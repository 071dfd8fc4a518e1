//! Application configuration loaded from environment variables.
//!
//! Everything is read once at startup. A `.env` file in the working
//! directory is honoured for local runs.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use validator::Validate;

use crate::time_utils;

/// Seconds between two sync cycles.
pub const DEFAULT_FETCH_INTERVAL_SECS: u64 = 60;
/// How far back (in months) a cycle may ever reach.
pub const DEFAULT_LOOKBACK_MONTHS: f64 = 0.5;
/// Embeds per webhook message (Discord caps this at 10).
pub const DEFAULT_CHUNK_SIZE: usize = 10;
/// Pause after every webhook call.
pub const DEFAULT_CHUNK_DELAY_MS: u64 = 500;
/// Pages a single backfill walk may request beyond the first one.
pub const DEFAULT_MAX_PAGE_DEPTH: u32 = 20;
/// Upper bound for the adaptive page size.
pub const DEFAULT_MAX_DAY_GAP: u32 = 100;

pub const DEFAULT_CLASSROOM_API_URL: &str = "https://classroom.googleapis.com";
pub const DEFAULT_STATE_PATH: &str = "storage/state.json";

/// Tunables of the sync engine.
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct SyncSettings {
    #[validate(range(min = 1))]
    pub interval_secs: u64,
    #[validate(range(exclusive_min = 0.0, max = 24.0))]
    pub lookback_months: f64,
    #[validate(range(min = 1, max = 10))]
    pub chunk_size: usize,
    pub chunk_delay_ms: u64,
    #[validate(range(min = 1))]
    pub max_depth: u32,
    #[validate(range(min = 1, max = 1000))]
    pub max_day_gap: u32,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            interval_secs: DEFAULT_FETCH_INTERVAL_SECS,
            lookback_months: DEFAULT_LOOKBACK_MONTHS,
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_delay_ms: DEFAULT_CHUNK_DELAY_MS,
            max_depth: DEFAULT_MAX_PAGE_DEPTH,
            max_day_gap: DEFAULT_MAX_DAY_GAP,
        }
    }
}

impl SyncSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn chunk_delay(&self) -> Duration {
        Duration::from_millis(self.chunk_delay_ms)
    }

    /// Width of the rolling window no delivered item may predate.
    pub fn lookback_window(&self) -> chrono::Duration {
        time_utils::months_to_duration(self.lookback_months)
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Google OAuth client ID
    pub client_id: String,
    /// Google OAuth client secret
    pub client_secret: String,
    /// Classroom course to watch
    pub class_id: String,
    /// Discord webhook URL
    pub webhook_url: String,
    /// Scheme and host the consent callback is reachable on
    pub redirect_host: String,
    /// Port of the local consent callback server
    pub port: u16,
    /// JSON file holding the checkpoint and refresh token
    pub state_path: PathBuf,
    /// Mention prepended to regular deliveries (e.g. `<@&role>`)
    pub announce_mention: String,
    /// Mention used for the permission alert (e.g. `<@!user>`)
    pub alert_mention: String,
    /// Base URL of the Classroom REST API
    pub classroom_api_url: String,
    pub sync: SyncSettings,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            client_id: "test_client_id".to_string(),
            client_secret: "test_secret".to_string(),
            class_id: "test_class".to_string(),
            webhook_url: "http://localhost:9999/webhook".to_string(),
            redirect_host: "http://localhost".to_string(),
            port: 8080,
            state_path: PathBuf::from(DEFAULT_STATE_PATH),
            announce_mention: String::new(),
            alert_mention: String::new(),
            classroom_api_url: DEFAULT_CLASSROOM_API_URL.to_string(),
            sync: SyncSettings::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let sync = SyncSettings {
            interval_secs: parse_or("FETCH_INTERVAL_SECS", DEFAULT_FETCH_INTERVAL_SECS)?,
            lookback_months: parse_or("LOOKBACK_MONTHS", DEFAULT_LOOKBACK_MONTHS)?,
            chunk_size: parse_or("CHUNK_SIZE", DEFAULT_CHUNK_SIZE)?,
            chunk_delay_ms: parse_or("CHUNK_DELAY_MS", DEFAULT_CHUNK_DELAY_MS)?,
            max_depth: parse_or("MAX_PAGE_DEPTH", DEFAULT_MAX_PAGE_DEPTH)?,
            max_day_gap: parse_or("MAX_DAY_GAP", DEFAULT_MAX_DAY_GAP)?,
        };
        sync.validate()?;

        Ok(Self {
            client_id: required("CLIENT_ID")?,
            client_secret: required("CLIENT_SECRET")?,
            class_id: required("CLASS_ID")?,
            webhook_url: required("WEBHOOK")?,
            redirect_host: env::var("REDIRECT_HOST")
                .unwrap_or_else(|_| "http://localhost".to_string()),
            port: parse_or("PORT", 8080)?,
            state_path: env::var("STATE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_STATE_PATH)),
            announce_mention: env::var("ANNOUNCE_MENTION").unwrap_or_default(),
            alert_mention: env::var("ALERT_MENTION").unwrap_or_default(),
            classroom_api_url: env::var("CLASSROOM_API_URL")
                .unwrap_or_else(|_| DEFAULT_CLASSROOM_API_URL.to_string()),
            sync,
        })
    }

    /// Redirect URI registered with Google for the consent flow.
    pub fn redirect_uri(&self) -> String {
        format!("{}:{}", self.redirect_host.trim_end_matches('/'), self.port)
    }
}

fn required(key: &'static str) -> Result<String, ConfigError> {
    env::var(key)
        .map(|v| v.trim().to_string())
        .map_err(|_| ConfigError::Missing(key))
}

fn parse_or<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },

    #[error("Invalid sync settings: {0}")]
    Validation(#[from] validator::ValidationErrors),
}
