// SPDX-FileCopyrightText: 2026 Recobra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Exposes the provider webhooks (WhatsApp inbound, payment reconciliation),
//! the bearer-protected cron trigger for the daily cadence run, and the
//! operator-facing debt CRUD API.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod server;
pub mod webhooks;

pub use server::{build_router, start_server, AppState};
