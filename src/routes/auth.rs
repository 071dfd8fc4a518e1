// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! One-shot OAuth consent callback.
//!
//! When no refresh token is stored the relay serves a tiny page on the
//! redirect URI: without a `code` it shows a login link, with one it
//! completes the exchange, stores the refresh token and shuts itself down.

use axum::{
    extract::{Query, State},
    response::Html,
    routing::get,
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::{oneshot, Mutex};

use crate::error::{AppError, Result};
use crate::services::CredentialManager;

/// Shared state of the consent server.
pub struct ConsentState {
    credentials: Arc<CredentialManager>,
    done: Mutex<Option<oneshot::Sender<()>>>,
}

impl ConsentState {
    pub fn new(credentials: Arc<CredentialManager>, done: oneshot::Sender<()>) -> Self {
        Self {
            credentials,
            done: Mutex::new(Some(done)),
        }
    }
}

pub fn routes() -> Router<Arc<ConsentState>> {
    Router::new().route("/", get(consent_callback))
}

#[derive(Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Login link, or code exchange when Google redirected back.
async fn consent_callback(
    State(state): State<Arc<ConsentState>>,
    Query(params): Query<CallbackParams>,
) -> Result<Html<String>> {
    if let Some(error) = params.error {
        tracing::warn!(error = %error, "Consent denied by user");
        return Err(AppError::BadRequest(format!("Consent denied: {}", error)));
    }

    let Some(code) = params.code.filter(|c| !c.is_empty()) else {
        let login_url = state.credentials.client().authorization_url();
        return Ok(Html(format!(r#"<a href="{}">Login</a>"#, login_url)));
    };

    tracing::info!("Exchanging authorization code for tokens");
    state.credentials.complete_consent(&code).await?;

    if let Some(done) = state.done.lock().await.take() {
        let _ = done.send(());
    }

    Ok(Html(
        "Authentication successful! Please return to the console.".to_string(),
    ))
}

/// Serve the consent page on `port` until a code has been exchanged.
pub async fn run_consent_flow(credentials: Arc<CredentialManager>, port: u16) -> Result<()> {
    let (done_tx, done_rx) = oneshot::channel();
    let login_url = credentials.client().authorization_url();
    let app = super::create_router(Arc::new(ConsentState::new(credentials, done_tx)));

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!(address = %addr, login_url = %login_url, "Authenticating User...");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = done_rx.await;
        })
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Consent server failed: {}", e)))?;

    tracing::info!("Consent server stopped");
    Ok(())
}
