// SPDX-FileCopyrightText: 2026 Recobra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Recobra debt-collection engine.
//!
//! This crate provides the foundational trait definitions, error types, and
//! domain types used throughout the Recobra workspace. All adapter crates
//! implement traits defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::RecobraError;
pub use types::{
    AdapterType, CadenceStep, ChargeStatus, DebtStatus, DeliveryStatus, HealthStatus, Intent,
    MessageDirection, MessageKind, RenegotiationStatus,
};

// Re-export all adapter traits at crate root.
pub use traits::{MessagingChannel, OwnerNotifier, PaymentProvider, PluginAdapter};
