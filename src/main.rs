// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Classroom Relay
//!
//! Polls a Google Classroom course and posts new announcements, coursework
//! and materials to a Discord webhook.

use classroom_relay::{
    config::Config,
    db::{JsonFileStore, StateStore},
    routes::run_consent_flow,
    services::{
        ClassroomClient, CredentialManager, DeliveryBatcher, DiscordWebhook, GoogleOAuthClient,
        Scheduler, SchedulerExit, SyncDriver,
    },
};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize structured JSON logging
    init_logging();

    match run().await {
        Ok(SchedulerExit::Shutdown) => ExitCode::SUCCESS,
        Ok(SchedulerExit::Fatal(e)) => {
            tracing::error!(error = %e, "Stopped: re-authentication required");
            ExitCode::FAILURE
        }
        Err(e) => {
            tracing::error!(error = %e, "Startup failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<SchedulerExit> {
    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(
        class_id = %config.class_id,
        interval_secs = config.sync.interval_secs,
        "Starting Classroom Relay"
    );

    // Open persisted state
    let store = JsonFileStore::open(&config.state_path).await?;
    let state = StateStore::new(Arc::new(store));

    let batcher = DeliveryBatcher::new(Arc::new(DiscordWebhook::new(config.webhook_url.clone())))
        .with_chunking(config.sync.chunk_size, config.sync.chunk_delay())
        .with_mentions(config.announce_mention.clone(), config.alert_mention.clone());

    // Credentials: interactive consent on first run, refresh otherwise
    let oauth = GoogleOAuthClient::new(
        config.client_id.clone(),
        config.client_secret.clone(),
        config.redirect_uri(),
    );
    let credentials = Arc::new(CredentialManager::new(oauth, state.clone()));

    if credentials.has_refresh_token().await? {
        match credentials.refresh().await {
            Ok(_) => tracing::info!("Refreshed stored credentials"),
            Err(e) if e.is_permission_error() => {
                tracing::error!(error = %e, "Stored refresh token rejected, clearing it");
                state.clear_refresh_token().await?;
                if let Err(alert_err) = batcher.send_alert().await {
                    tracing::error!(error = %alert_err, "Failed to send permission alert");
                }
                return Ok(SchedulerExit::Fatal(e));
            }
            Err(e) => return Err(e.into()),
        }
    } else {
        run_consent_flow(credentials.clone(), config.port).await?;
    }

    // Wire the pipeline
    let api = Arc::new(ClassroomClient::new(
        config.classroom_api_url.clone(),
        credentials,
    ));
    let driver = Arc::new(SyncDriver::new(
        api,
        state,
        batcher,
        config.class_id.clone(),
        config.sync.clone(),
    ));

    let exit = Scheduler::new(driver)
        .run(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await;

    Ok(exit)
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("classroom_relay=debug,info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(format)
        .init();
}
