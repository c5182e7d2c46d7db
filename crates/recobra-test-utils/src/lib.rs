// SPDX-FileCopyrightText: 2026 Recobra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Recobra integration tests.
//!
//! Provides mock adapters and seed helpers for fast, deterministic,
//! CI-runnable tests without external services.
//!
//! # Components
//!
//! - [`MockChannel`] - captures outbound sends, scriptable failures
//! - [`MockPaymentProvider`] - canned Pix charge responses
//! - [`MockNotifier`] - captures renegotiation notices
//! - [`harness`] - temp-database setup and entity seed helpers

pub mod harness;
pub mod mock_channel;
pub mod mock_notifier;
pub mod mock_payment;

pub use harness::{seed_debt, seed_operator, temp_db};
pub use mock_channel::MockChannel;
pub use mock_notifier::MockNotifier;
pub use mock_payment::MockPaymentProvider;
