// SPDX-FileCopyrightText: 2026 Recobra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Payment webhook reconciliation.
//!
//! Normalizes provider-specific webhook bodies to one fact ("charge X is
//! paid"), then settles the charge, the debt, and any open renegotiation,
//! and sends the debtor a confirmation message. The confirmation send is
//! best-effort; the state updates stand even if it fails.
//!
//! Duplicate webhook deliveries short-circuit on the charge's paid flag:
//! the second delivery finds the charge already paid and does nothing,
//! including not sending a second confirmation.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use recobra_core::error::RecobraError;
use recobra_core::traits::MessagingChannel;
use recobra_core::types::{
    now_iso, Charge, DeliveryStatus, Message, MessageDirection, MessageKind,
};
use recobra_payments::webhook::{parse_webhook, PaymentEvent};
use recobra_storage::database::Database;
use recobra_storage::queries;

/// Outcome of one webhook delivery, echoed to the gateway as
/// `{"status": "..."}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconcileOutcome {
    /// Not a completed-payment event for this gateway's schema.
    Ignored,
    /// No charge matches the extracted provider charge id.
    NotFound,
    /// Charge, debt, and renegotiation are settled.
    Processed,
}

/// Settles payments reported by gateway webhooks.
pub struct Reconciler {
    db: Database,
    channel: Arc<dyn MessagingChannel>,
}

impl Reconciler {
    pub fn new(db: Database, channel: Arc<dyn MessagingChannel>) -> Self {
        Self { db, channel }
    }

    /// Handle one webhook body for the named gateway.
    ///
    /// Always returns an outcome for anything short of a storage failure;
    /// the HTTP layer answers 200 in every outcome so the gateway stops
    /// retrying.
    pub async fn handle_webhook(
        &self,
        gateway: &str,
        body: &Value,
    ) -> Result<ReconcileOutcome, RecobraError> {
        let PaymentEvent::Paid { provider_charge_id } = parse_webhook(gateway, body) else {
            return Ok(ReconcileOutcome::Ignored);
        };

        let charge =
            queries::charges::find_by_provider_charge_id(&self.db, gateway, &provider_charge_id)
                .await?;
        let Some(charge) = charge else {
            info!(gateway, provider_charge_id, "paid webhook matches no charge");
            return Ok(ReconcileOutcome::NotFound);
        };

        let Some(debt) =
            queries::charges::settle_paid_charge(&self.db, &charge.id, &now_iso()).await?
        else {
            info!(charge_id = %charge.id, "charge already settled, duplicate delivery");
            return Ok(ReconcileOutcome::Processed);
        };

        info!(charge_id = %charge.id, debt_id = %charge.debt_id, "payment reconciled");
        self.send_confirmation(&charge, &debt.debtor_name, &debt.owner_id, &debt.phone)
            .await;

        Ok(ReconcileOutcome::Processed)
    }

    /// Best-effort confirmation message to the debtor.
    async fn send_confirmation(&self, charge: &Charge, debtor_name: &str, owner_id: &str, phone: &str) {
        let store = match queries::operators::get_operator(&self.db, owner_id).await {
            Ok(Some(op)) => op.store_name,
            Ok(None) => None,
            Err(e) => {
                warn!(owner_id, error = %e, "operator lookup failed for confirmation");
                None
            }
        };
        let store = store.as_deref().unwrap_or(recobra_templates::DEFAULT_STORE_NAME);
        let body = recobra_templates::payment_confirmed(debtor_name, store, charge.amount);

        let provider_message_id = match self.channel.send_text(phone, &body).await {
            Ok(id) => Some(id),
            Err(e) => {
                warn!(debt_id = %charge.debt_id, error = %e, "confirmation send failed");
                return;
            }
        };

        let message = Message {
            id: Uuid::new_v4().to_string(),
            debt_id: charge.debt_id.clone(),
            direction: MessageDirection::Outbound,
            content: body,
            kind: MessageKind::Templated,
            status: DeliveryStatus::Sent,
            provider_message_id,
            created_at: now_iso(),
        };
        if let Err(e) = queries::messages::insert_message(&self.db, &message).await {
            warn!(debt_id = %charge.debt_id, error = %e, "failed to store confirmation message");
        }
    }
}
