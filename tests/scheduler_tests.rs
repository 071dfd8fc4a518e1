// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Scheduler behaviour under paused time.

use std::time::Duration;

use classroom_relay::error::AppError;
use classroom_relay::services::{Scheduler, SchedulerExit};

mod common;
use common::{day, fast_settings, test_relay, FakeClassroom};

#[tokio::test(start_paused = true)]
async fn test_cycles_run_every_interval() {
    let relay = test_relay(FakeClassroom::new(day(0)), fast_settings()).await;

    let exit = Scheduler::new(relay.driver.clone())
        .run(tokio::time::sleep(Duration::from_secs(170)))
        .await;

    assert!(matches!(exit, SchedulerExit::Shutdown));
    // Ticks at 0s, 60s and 120s.
    assert_eq!(relay.api.course_calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_slow_cycle_blocks_overlapping_ticks() {
    let api = FakeClassroom::new(day(0)).with_course_delay(Duration::from_secs(150));
    let relay = test_relay(api, fast_settings()).await;

    let exit = Scheduler::new(relay.driver.clone())
        .run(tokio::time::sleep(Duration::from_secs(170)))
        .await;

    assert!(matches!(exit, SchedulerExit::Shutdown));
    // The 60s and 120s ticks land while the first cycle is still running.
    assert_eq!(relay.api.course_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_before_first_tick() {
    let relay = test_relay(FakeClassroom::new(day(0)), fast_settings()).await;

    let exit = Scheduler::new(relay.driver.clone()).run(async {}).await;

    assert!(matches!(exit, SchedulerExit::Shutdown));
    assert_eq!(relay.api.course_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_revoked_permission_stops_scheduler() {
    let api = FakeClassroom::new(day(0));
    api.revoke_permission();
    let relay = test_relay(api, fast_settings()).await;

    let exit = Scheduler::new(relay.driver.clone())
        .run(tokio::time::sleep(Duration::from_secs(600)))
        .await;

    assert!(matches!(
        exit,
        SchedulerExit::Fatal(AppError::PermissionDenied(_))
    ));
    assert_eq!(relay.api.course_calls(), 1);
    assert_eq!(relay.sink.alerts().len(), 1);
    assert_eq!(relay.state.refresh_token().await.unwrap(), "");
}
