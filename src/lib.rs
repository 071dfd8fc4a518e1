// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Classroom Relay: forward new Google Classroom posts to Discord
//!
//! This crate polls a course's announcements, coursework and materials,
//! walks each stream back to a persisted checkpoint, and delivers the new
//! items to a Discord webhook in chronological order.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;
