// SPDX-FileCopyrightText: 2026 Recobra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain model types for storage entities.
//!
//! The canonical types are defined in `recobra_core::types` for use across
//! adapter trait boundaries. This module re-exports them for convenience
//! within the storage crate.

pub use recobra_core::types::{
    CadenceExecution, CadenceStep, Charge, ChargeStatus, Debt, DebtStatus, DeliveryStatus,
    Message, MessageDirection, MessageKind, Operator, Renegotiation, RenegotiationStatus,
};
