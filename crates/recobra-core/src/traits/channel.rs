// SPDX-FileCopyrightText: 2026 Recobra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Messaging channel trait for chat-provider integrations.

use async_trait::async_trait;

use crate::error::RecobraError;
use crate::traits::adapter::PluginAdapter;

/// Adapter for outbound text delivery through a chat-channel provider.
///
/// Inbound traffic arrives over the provider's webhook, not through this
/// trait; the channel only needs to push text at a normalized phone number
/// and surface the provider-assigned message id.
#[async_trait]
pub trait MessagingChannel: PluginAdapter {
    /// Sends a text message and returns the provider message id.
    ///
    /// Callers at batch boundaries catch and count failures; this method
    /// itself must be bounded by a transport timeout and never retry.
    async fn send_text(&self, to: &str, body: &str) -> Result<String, RecobraError>;
}
