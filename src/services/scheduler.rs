// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Fixed-interval scheduler for sync cycles.
//!
//! Every tick starts a cycle on its own task, unless the previous cycle is
//! still running, in which case the tick is skipped. The loop ends on the
//! shutdown signal or after a cycle reports a fatal authorization failure.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use crate::error::AppError;
use crate::services::sync::{CycleOutcome, SyncDriver};

/// Allows at most one cycle in flight.
#[derive(Debug, Default)]
pub struct CycleGate {
    busy: AtomicBool,
}

impl CycleGate {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Claim the gate; `None` while another pass is alive.
    pub fn try_enter(self: &Arc<Self>) -> Option<CyclePass> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| CyclePass { gate: self.clone() })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Held for the duration of a cycle; releases the gate on drop.
#[derive(Debug)]
pub struct CyclePass {
    gate: Arc<CycleGate>,
}

impl Drop for CyclePass {
    fn drop(&mut self) {
        self.gate.busy.store(false, Ordering::Release);
    }
}

/// Why the scheduler stopped.
#[derive(Debug)]
pub enum SchedulerExit {
    Shutdown,
    Fatal(AppError),
}

pub struct Scheduler {
    driver: Arc<SyncDriver>,
    period: Duration,
    gate: Arc<CycleGate>,
}

impl Scheduler {
    pub fn new(driver: Arc<SyncDriver>) -> Self {
        let period = driver.settings().interval();
        Self {
            driver,
            period,
            gate: CycleGate::new(),
        }
    }

    /// Run until `shutdown` resolves or a cycle fails fatally.
    ///
    /// The first cycle starts immediately.
    pub async fn run<F>(self, shutdown: F) -> SchedulerExit
    where
        F: Future<Output = ()>,
    {
        let mut ticker = tokio::time::interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let (fatal_tx, mut fatal_rx) = mpsc::channel::<AppError>(1);
        tokio::pin!(shutdown);

        tracing::info!(interval_secs = self.period.as_secs(), "Scheduler started");

        loop {
            tokio::select! {
                biased;

                _ = &mut shutdown => {
                    tracing::info!("Shutdown requested, stopping scheduler");
                    return SchedulerExit::Shutdown;
                }
                Some(err) = fatal_rx.recv() => {
                    tracing::error!(error = %err, "Fatal sync failure, stopping scheduler");
                    return SchedulerExit::Fatal(err);
                }
                _ = ticker.tick() => {
                    let Some(pass) = self.gate.try_enter() else {
                        tracing::warn!("Previous sync cycle still running, skipping tick");
                        continue;
                    };

                    let driver = self.driver.clone();
                    let fatal_tx = fatal_tx.clone();
                    tokio::spawn(async move {
                        // Released only after a fatal error has been reported.
                        let _pass = pass;
                        if let CycleOutcome::Fatal(err) = driver.tick().await {
                            let _ = fatal_tx.send(err).await;
                        }
                    });
                }
            }
        }
    }
}
