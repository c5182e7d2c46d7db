// SPDX-FileCopyrightText: 2026 Recobra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the Recobra collection service.
//!
//! Provides WAL-mode SQLite storage with embedded migrations, a single-writer
//! concurrency model via `tokio-rusqlite`, and typed CRUD operations for
//! debts, messages, renegotiations, cadence executions, charges, and operators.
//!
//! Status columns are only ever written through the validated update helpers
//! in the query modules, which consult the transition tables in
//! `recobra_core::types` before touching a row.

pub mod database;
pub mod migrations;
pub mod models;
pub mod queries;
pub mod writer;

pub use database::Database;
pub use models::*;
