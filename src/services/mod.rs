// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod backfill;
pub mod classroom;
pub mod delivery;
pub mod google_oauth;
pub mod normalize;
pub mod profile;
pub mod scheduler;
pub mod sync;

pub use backfill::{BackfillLimits, BackfillWalker};
pub use classroom::{ClassroomApi, ClassroomClient};
pub use delivery::{DeliveryBatcher, DeliveryReport, DeliverySink, DiscordWebhook};
pub use google_oauth::{AccessTokenSource, CredentialManager, GoogleOAuthClient, StaticToken};
pub use profile::ProfileResolver;
pub use scheduler::{Scheduler, SchedulerExit};
pub use sync::{CycleOutcome, CycleReport, SyncDriver};
