// SPDX-FileCopyrightText: 2026 Recobra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common domain types shared across the Recobra workspace.
//!
//! Status enums carry the transition tables for the debt and renegotiation
//! state machines. All writes to a status column go through the storage
//! layer, which validates an edge here before touching the row.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Identifies the type of adapter in the plugin registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
pub enum AdapterType {
    Channel,
    Payment,
    Storage,
    Notifier,
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Lifecycle status of a debt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DebtStatus {
    Pending,
    Paid,
    Renegotiating,
    Cancelled,
}

impl DebtStatus {
    /// Whether the edge `self -> to` is in the debt transition table.
    ///
    /// A transition to the current status is permitted and treated as a
    /// no-op by callers (idempotency short-circuit, not an error). Paid and
    /// cancelled debts can only be manually reopened to pending, which rules
    /// out e.g. `paid -> renegotiating` creeping in from a late webhook.
    pub fn can_transition(self, to: DebtStatus) -> bool {
        use DebtStatus::*;
        if self == to {
            return true;
        }
        matches!(
            (self, to),
            (Pending, Renegotiating)
                | (Pending, Paid)
                | (Pending, Cancelled)
                | (Renegotiating, Paid)
                | (Renegotiating, Cancelled)
                | (Renegotiating, Pending)
                | (Paid, Pending)
                | (Cancelled, Pending)
        )
    }
}

/// Lifecycle status of a renegotiation thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RenegotiationStatus {
    New,
    InContact,
    Resolved,
    Lost,
}

impl RenegotiationStatus {
    /// Resolved and lost are terminal; the record persists for history.
    pub fn is_open(self) -> bool {
        matches!(self, RenegotiationStatus::New | RenegotiationStatus::InContact)
    }

    /// Whether the edge `self -> to` is in the renegotiation transition table.
    pub fn can_transition(self, to: RenegotiationStatus) -> bool {
        use RenegotiationStatus::*;
        if self == to {
            return true;
        }
        matches!(
            (self, to),
            (New, InContact) | (New, Resolved) | (New, Lost) | (InContact, Resolved) | (InContact, Lost)
        )
    }
}

/// Lifecycle status of a Pix charge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ChargeStatus {
    Pending,
    Paid,
    Expired,
}

/// Direction of a stored chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MessageDirection {
    Outbound,
    Inbound,
}

/// Kind of a stored chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Plain,
    Templated,
    PaymentLink,
}

/// Delivery state of a stored chat message.
///
/// Outbound messages start as `sent` and are advanced only by provider
/// status callbacks matched on the provider message id. Inbound messages
/// are stored as `received`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    Sent,
    Delivered,
    Read,
    Failed,
    Received,
}

/// One named point in the fixed day-offset outreach schedule, relative to a
/// debt's due date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
pub enum CadenceStep {
    #[strum(serialize = "D-2")]
    #[serde(rename = "D-2")]
    DMinus2,
    #[strum(serialize = "D0")]
    #[serde(rename = "D0")]
    DueDay,
    #[strum(serialize = "D+5")]
    #[serde(rename = "D+5")]
    DPlus5,
    #[strum(serialize = "D+15")]
    #[serde(rename = "D+15")]
    DPlus15,
    #[strum(serialize = "D+30")]
    #[serde(rename = "D+30")]
    DPlus30,
}

impl CadenceStep {
    /// Map a day offset from the due date to a cadence step.
    ///
    /// Exact-day matching: any offset not in the table means no step is due,
    /// even if the debt is conceptually "past" an earlier step. A debt never
    /// checked on exactly day 5 permanently misses D+5. Do not widen to `>=`
    /// semantics; that changes how many messages a delayed run sends.
    pub fn from_offset(diff_days: i64) -> Option<CadenceStep> {
        match diff_days {
            -2 => Some(CadenceStep::DMinus2),
            0 => Some(CadenceStep::DueDay),
            5 => Some(CadenceStep::DPlus5),
            15 => Some(CadenceStep::DPlus15),
            30 => Some(CadenceStep::DPlus30),
            _ => None,
        }
    }
}

/// Classified purpose of an inbound free-text reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Pay,
    Negotiate,
    Question,
    Complaint,
    Other,
}

// --- Entities ---

/// One amount owed by one debtor to one store operator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Debt {
    pub id: String,
    pub owner_id: String,
    pub debtor_name: String,
    /// Normalized phone: digits only, country-prefixed.
    pub phone: String,
    pub amount: f64,
    pub due_date: NaiveDate,
    pub status: DebtStatus,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// One chat-channel message, inbound or outbound, tied to a debt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub debt_id: String,
    pub direction: MessageDirection,
    pub content: String,
    pub kind: MessageKind,
    pub status: DeliveryStatus,
    /// Unique across all messages when present; the join key for async
    /// delivery-status updates.
    pub provider_message_id: Option<String>,
    pub created_at: String,
}

/// An open negotiation thread opened by a debtor's reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Renegotiation {
    pub id: String,
    pub debt_id: String,
    pub interest_message: Option<String>,
    pub status: RenegotiationStatus,
    pub owner_notified: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Fact record: step S of the cadence has fired for debt D. Immutable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CadenceExecution {
    pub id: i64,
    pub debt_id: String,
    pub step: CadenceStep,
    pub message_id: Option<String>,
    pub executed_at: String,
}

/// One payment-provider Pix charge tied to a debt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Charge {
    pub id: String,
    pub debt_id: String,
    pub provider: String,
    /// The reconciliation join key, unique per provider once set.
    pub provider_charge_id: Option<String>,
    pub amount: f64,
    /// The copy-and-paste Pix payload shown to the payer.
    pub payment_code: Option<String>,
    pub qr_code_url: Option<String>,
    pub status: ChargeStatus,
    pub paid_at: Option<String>,
    pub created_at: String,
}

/// Per-operator display configuration. Outbound credentials are
/// platform-level; operators only contribute the store name shown inside
/// templates and the renegotiation notification address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operator {
    pub id: String,
    pub store_name: Option<String>,
    pub email: Option<String>,
    pub notify_email: bool,
    pub created_at: String,
}

// --- Capability payloads ---

/// Request to create a Pix charge with a payment provider.
#[derive(Debug, Clone)]
pub struct PixChargeRequest {
    pub amount: f64,
    pub description: String,
    pub debtor_name: String,
    pub debtor_phone: String,
    /// Charge expiry in seconds.
    pub expiry_secs: u64,
}

/// Normalized response from a provider's charge creation.
#[derive(Debug, Clone)]
pub struct PixChargeResponse {
    pub provider_charge_id: String,
    pub payment_code: String,
    pub qr_code_url: Option<String>,
    pub amount: f64,
}

/// Normalized response from a provider's charge status query.
#[derive(Debug, Clone)]
pub struct ChargeStatusInfo {
    pub paid: bool,
    pub paid_at: Option<String>,
}

/// Payload handed to the owner notifier when a renegotiation opens or is
/// refreshed by a new debtor reply.
#[derive(Debug, Clone)]
pub struct RenegotiationNotice {
    /// Operator notification address.
    pub recipient: String,
    pub debtor_name: String,
    /// Profile name reported by the chat provider, when available.
    pub contact_name: Option<String>,
    pub phone: String,
    /// Pre-formatted currency amount.
    pub amount_formatted: String,
    pub interest_message: String,
}

/// Current UTC timestamp in the millisecond RFC 3339 form used for all
/// stored timestamps.
pub fn now_iso() -> String {
    chrono::Utc::now()
        .to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
