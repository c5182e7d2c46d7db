// SPDX-FileCopyrightText: 2026 Recobra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capability trait definitions for the Recobra adapter architecture.
//!
//! All adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod channel;
pub mod notifier;
pub mod payment;

pub use adapter::PluginAdapter;
pub use channel::MessagingChannel;
pub use notifier::OwnerNotifier;
pub use payment::PaymentProvider;
