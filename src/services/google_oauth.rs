// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Google OAuth2 client and access-token management.
//!
//! Handles:
//! - Building the consent URL (offline access, classroom scopes)
//! - Exchanging an authorization code for tokens
//! - Refreshing access tokens from the stored refresh token
//! - Persisting rotated refresh tokens through the state store

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::db::StateStore;
use crate::error::{AppError, Result};

pub const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Scopes requested during consent.
pub const SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/classroom.announcements",
    "https://www.googleapis.com/auth/classroom.courses",
    "https://www.googleapis.com/auth/classroom.coursework.me",
    "https://www.googleapis.com/auth/classroom.coursework.students",
    "https://www.googleapis.com/auth/classroom.courseworkmaterials",
    "https://www.googleapis.com/auth/classroom.topics",
    "https://www.googleapis.com/auth/classroom.profile.emails",
    "https://www.googleapis.com/auth/classroom.profile.photos",
    "https://www.googleapis.com/auth/classroom.rosters",
    "https://www.googleapis.com/auth/classroom.rosters.readonly",
    "https://www.googleapis.com/auth/user.emails.read",
    "profile",
];

/// Margin before token expiration when we proactively refresh (5 minutes).
const TOKEN_REFRESH_MARGIN_SECS: i64 = 5 * 60;

/// Anything that can hand out a bearer token for the Classroom API.
#[async_trait]
pub trait AccessTokenSource: Send + Sync {
    async fn access_token(&self) -> Result<String>;
}

/// Low-level Google OAuth client.
#[derive(Clone)]
pub struct GoogleOAuthClient {
    http: reqwest::Client,
    auth_url: String,
    token_url: String,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
}

impl GoogleOAuthClient {
    pub fn new(client_id: String, client_secret: String, redirect_uri: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            auth_url: GOOGLE_AUTH_URL.to_string(),
            token_url: GOOGLE_TOKEN_URL.to_string(),
            client_id,
            client_secret,
            redirect_uri,
        }
    }

    /// Point token requests somewhere else (used by tests).
    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }

    /// URL the user opens to grant offline access.
    pub fn authorization_url(&self) -> String {
        format!(
            "{}?access_type=offline&prompt=consent&response_type=code&\
             client_id={}&redirect_uri={}&scope={}",
            self.auth_url,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.redirect_uri),
            urlencoding::encode(&SCOPES.join(" ")),
        )
    }

    /// Exchange an authorization code for tokens.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenResponse> {
        self.token_request(&[
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("code", code),
            ("redirect_uri", self.redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
        ])
        .await
    }

    /// Mint a new access token from a refresh token.
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<TokenResponse> {
        self.token_request(&[
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ])
        .await
    }

    async fn token_request(&self, form: &[(&str, &str)]) -> Result<TokenResponse> {
        let response = self
            .http
            .post(&self.token_url)
            .form(form)
            .send()
            .await
            .map_err(|e| AppError::Auth(format!("Token request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let error = serde_json::from_str::<TokenErrorResponse>(&body)
                .map(|e| e.error)
                .unwrap_or_default();
            tracing::error!(status = %status, error = %error, "Google token request failed");
            return Err(AppError::Auth(format!("HTTP {} {}: {}", status, error, body)));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Auth(format!("Failed to parse token response: {}", e)))
    }
}

/// Token endpoint response.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: i64,
    /// Only present on code exchange or when Google rotates the token.
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct TokenErrorResponse {
    #[serde(default)]
    error: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// CredentialManager - token lifecycle on top of the state store
// ─────────────────────────────────────────────────────────────────────────────

/// Cached access token with expiry information.
#[derive(Clone)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

/// Keeps a valid access token around and the refresh token persisted.
///
/// The cache mutex is held across a refresh, so concurrent callers wait for
/// one refresh instead of each issuing their own.
pub struct CredentialManager {
    client: GoogleOAuthClient,
    state: StateStore,
    cache: Mutex<Option<CachedToken>>,
}

impl CredentialManager {
    pub fn new(client: GoogleOAuthClient, state: StateStore) -> Self {
        Self {
            client,
            state,
            cache: Mutex::new(None),
        }
    }

    pub fn client(&self) -> &GoogleOAuthClient {
        &self.client
    }

    /// Whether a refresh token is stored (consent already granted).
    pub async fn has_refresh_token(&self) -> Result<bool> {
        Ok(self.state.snapshot().await?.has_refresh_token())
    }

    /// Complete the consent flow with the code Google redirected back with.
    pub async fn complete_consent(&self, code: &str) -> Result<()> {
        let tokens = self.client.exchange_code(code).await?;

        match tokens.refresh_token.as_deref() {
            Some(refresh) if !refresh.is_empty() => self.state.set_refresh_token(refresh).await?,
            _ => tracing::warn!("Consent granted without a refresh token"),
        }

        self.cache_tokens(&tokens).await;
        tracing::info!("Consent completed, credentials stored");
        Ok(())
    }

    /// Force a refresh now; used at startup to fail fast on a revoked token.
    pub async fn refresh(&self) -> Result<String> {
        let mut cache = self.cache.lock().await;
        let token = self.refresh_locked().await?;
        let access = token.access_token.clone();
        *cache = Some(token);
        Ok(access)
    }

    async fn refresh_locked(&self) -> Result<CachedToken> {
        let refresh_token = self.state.refresh_token().await?;
        if refresh_token.is_empty() {
            return Err(AppError::Auth("No refresh token stored".to_string()));
        }

        let tokens = self.client.refresh_token(&refresh_token).await?;

        if let Some(rotated) = tokens.refresh_token.as_deref().filter(|t| !t.is_empty()) {
            self.state.set_refresh_token(rotated).await?;
            tracing::info!("Refresh token rotated");
        }

        tracing::debug!(expires_in = tokens.expires_in, "Access token refreshed");
        Ok(CachedToken {
            access_token: tokens.access_token,
            expires_at: Utc::now() + Duration::seconds(tokens.expires_in),
        })
    }

    async fn cache_tokens(&self, tokens: &TokenResponse) {
        *self.cache.lock().await = Some(CachedToken {
            access_token: tokens.access_token.clone(),
            expires_at: Utc::now() + Duration::seconds(tokens.expires_in),
        });
    }
}

#[async_trait]
impl AccessTokenSource for CredentialManager {
    async fn access_token(&self) -> Result<String> {
        let margin = Duration::seconds(TOKEN_REFRESH_MARGIN_SECS);
        let mut cache = self.cache.lock().await;

        if let Some(cached) = cache.as_ref() {
            if Utc::now() + margin < cached.expires_at {
                return Ok(cached.access_token.clone());
            }
        }

        let token = self.refresh_locked().await?;
        let access = token.access_token.clone();
        *cache = Some(token);
        Ok(access)
    }
}

/// Fixed token, for tests and local tooling.
pub struct StaticToken(pub String);

#[async_trait]
impl AccessTokenSource for StaticToken {
    async fn access_token(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}
