// SPDX-FileCopyrightText: 2026 Recobra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inbound webhook payload types for the Cloud API.
//!
//! The provider delivers both debtor messages and delivery-status callbacks
//! through one endpoint; a single change may carry either or both lists.
//! Unknown fields are ignored so the provider can grow the payload freely.

use recobra_core::types::DeliveryStatus;
use serde::Deserialize;

/// Object value the provider sends for account-level webhooks. Payloads
/// with any other value are acknowledged and dropped.
pub const EXPECTED_OBJECT: &str = "whatsapp_business_account";

/// Top-level webhook payload.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookPayload {
    pub object: String,
    #[serde(default)]
    pub entry: Vec<Entry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Entry {
    #[serde(default)]
    pub changes: Vec<Change>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Change {
    pub value: ChangeValue,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChangeValue {
    #[serde(default)]
    pub messages: Vec<InboundMessage>,
    #[serde(default)]
    pub statuses: Vec<StatusUpdate>,
    #[serde(default)]
    pub contacts: Vec<Contact>,
}

/// A debtor message. Only `type = "text"` entries are processed.
#[derive(Debug, Clone, Deserialize)]
pub struct InboundMessage {
    /// Sender phone, digits only, country-prefixed.
    pub from: String,
    /// Provider message id, unique per message and stable across redeliveries.
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub text: Option<TextBody>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TextBody {
    pub body: String,
}

/// Delivery-status callback for a previously sent message.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusUpdate {
    /// Provider message id of the outbound message this status refers to.
    pub id: String,
    pub status: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Contact {
    pub profile: Profile,
    pub wa_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
    pub name: String,
}

impl WebhookPayload {
    /// Whether this payload is an account webhook worth walking at all.
    pub fn is_account_event(&self) -> bool {
        self.object == EXPECTED_OBJECT
    }
}

impl ChangeValue {
    /// Profile name of the first contact, when the provider included one.
    pub fn contact_name(&self) -> Option<&str> {
        self.contacts.first().map(|c| c.profile.name.as_str())
    }
}

/// Map a provider status string onto the stored delivery status.
/// Unknown strings degrade to `sent` rather than failing the callback.
pub fn map_delivery_status(raw: &str) -> DeliveryStatus {
    match raw {
        "delivered" => DeliveryStatus::Delivered,
        "read" => DeliveryStatus::Read,
        "failed" => DeliveryStatus::Failed,
        _ => DeliveryStatus::Sent,
    }
}

/// Query parameters of the webhook verification handshake (GET).
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyParams {
    #[serde(rename = "hub.mode")]
    pub mode: Option<String>,
    #[serde(rename = "hub.verify_token")]
    pub verify_token: Option<String>,
    #[serde(rename = "hub.challenge")]
    pub challenge: Option<String>,
}

/// Run the verification handshake: on a matching subscribe request, returns
/// the challenge to echo back; otherwise `None` (the caller responds 403).
pub fn verify_handshake(params: &VerifyParams, expected_token: &str) -> Option<String> {
    if params.mode.as_deref() == Some("subscribe")
        && params.verify_token.as_deref() == Some(expected_token)
    {
        params.challenge.clone()
    } else {
        None
    }
}
