// SPDX-FileCopyrightText: 2026 Recobra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inbound message processing.
//!
//! Resolves each debtor reply to its open debt, persists it, classifies
//! intent, and for pay/negotiate intents opens or refreshes the debt's
//! renegotiation thread and notifies the store owner. Delivery-status
//! callbacks are handled separately and touch only the matched message row.

use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use recobra_core::error::RecobraError;
use recobra_core::traits::OwnerNotifier;
use recobra_core::types::{
    now_iso, Debt, DeliveryStatus, Intent, Message, MessageDirection, MessageKind, Renegotiation,
    RenegotiationNotice,
};
use recobra_storage::database::Database;
use recobra_storage::queries;

/// One inbound text as handed over by the channel webhook.
#[derive(Debug, Clone)]
pub struct InboundText {
    /// Sender phone as reported by the provider.
    pub from: String,
    pub body: String,
    pub provider_message_id: String,
    /// Profile name reported by the provider, when available.
    pub contact_name: Option<String>,
}

/// What happened to one inbound text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundOutcome {
    /// Provider redelivered a message we already stored. No side effects.
    Duplicate,
    /// No pending debt matches the sender. Logged and dropped.
    Unroutable,
    /// Message persisted against a debt.
    Processed {
        debt_id: String,
        intent: Intent,
        /// Set when the intent opened or refreshed a renegotiation.
        renegotiation_id: Option<String>,
    },
}

/// Processes inbound texts and delivery-status callbacks.
pub struct InboundProcessor {
    db: Database,
    notifier: Arc<dyn OwnerNotifier>,
}

impl InboundProcessor {
    pub fn new(db: Database, notifier: Arc<dyn OwnerNotifier>) -> Self {
        Self { db, notifier }
    }

    /// Full pipeline for one inbound text.
    ///
    /// Never returns an error for unroutable or duplicate messages; chat
    /// providers expect a 200 regardless, so only infrastructure failures
    /// propagate.
    pub async fn process_text(&self, inbound: &InboundText) -> Result<InboundOutcome, RecobraError> {
        if queries::messages::provider_message_seen(&self.db, &inbound.provider_message_id).await? {
            debug!(
                provider_message_id = %inbound.provider_message_id,
                "duplicate webhook delivery, dropping"
            );
            return Ok(InboundOutcome::Duplicate);
        }

        let normalized = recobra_phone::normalize(&inbound.from);
        let Some(debt) = queries::debts::find_open_debt_by_phone(&self.db, &normalized).await?
        else {
            info!(from = %normalized, "inbound message matches no pending debt");
            return Ok(InboundOutcome::Unroutable);
        };

        let message = Message {
            id: Uuid::new_v4().to_string(),
            debt_id: debt.id.clone(),
            direction: MessageDirection::Inbound,
            content: inbound.body.clone(),
            kind: MessageKind::Plain,
            status: DeliveryStatus::Received,
            provider_message_id: Some(inbound.provider_message_id.clone()),
            created_at: now_iso(),
        };
        queries::messages::insert_message(&self.db, &message).await?;

        let intent = recobra_intent::classify(&inbound.body);
        info!(debt_id = %debt.id, intent = %intent, "inbound message classified");

        let renegotiation_id = match intent {
            Intent::Pay | Intent::Negotiate => {
                Some(self.open_or_refresh_renegotiation(&debt, inbound).await?)
            }
            Intent::Question | Intent::Complaint | Intent::Other => None,
        };

        Ok(InboundOutcome::Processed {
            debt_id: debt.id,
            intent,
            renegotiation_id,
        })
    }

    /// Apply a provider delivery-status callback. Unmatched provider ids
    /// are dropped silently; returns whether a message was updated.
    pub async fn apply_delivery_status(
        &self,
        provider_message_id: &str,
        status: DeliveryStatus,
    ) -> Result<bool, RecobraError> {
        let updated =
            queries::messages::update_delivery_status(&self.db, provider_message_id, status)
                .await?;
        if !updated {
            debug!(provider_message_id, "status callback matches no stored message");
        }
        Ok(updated)
    }

    async fn open_or_refresh_renegotiation(
        &self,
        debt: &Debt,
        inbound: &InboundText,
    ) -> Result<String, RecobraError> {
        let existed = queries::renegotiations::get_for_debt(&self.db, &debt.id)
            .await?
            .is_some();

        let reneg = queries::renegotiations::upsert_for_debt(
            &self.db,
            &Uuid::new_v4().to_string(),
            &debt.id,
            Some(&inbound.body),
        )
        .await?;

        // Only a fresh thread moves the debt; a refresh finds it already
        // renegotiating.
        if !existed {
            queries::debts::update_debt_status(
                &self.db,
                &debt.id,
                recobra_core::types::DebtStatus::Renegotiating,
            )
            .await?;
        }

        self.notify_owner(debt, &reneg, inbound).await;
        Ok(reneg.id)
    }

    /// Best-effort owner notification. A failure leaves `owner_notified`
    /// unset so the next qualifying reply re-triggers it.
    async fn notify_owner(&self, debt: &Debt, reneg: &Renegotiation, inbound: &InboundText) {
        let operator = match queries::operators::get_operator(&self.db, &debt.owner_id).await {
            Ok(op) => op,
            Err(e) => {
                warn!(owner_id = %debt.owner_id, error = %e, "operator lookup failed");
                return;
            }
        };
        let Some(operator) = operator else {
            debug!(owner_id = %debt.owner_id, "no operator record, skipping notification");
            return;
        };
        if !operator.notify_email {
            return;
        }
        let Some(email) = operator.email else {
            debug!(owner_id = %debt.owner_id, "operator has no email, skipping notification");
            return;
        };

        let notice = RenegotiationNotice {
            recipient: email,
            debtor_name: debt.debtor_name.clone(),
            contact_name: inbound.contact_name.clone(),
            phone: debt.phone.clone(),
            amount_formatted: recobra_templates::format_brl(debt.amount),
            interest_message: inbound.body.clone(),
        };

        match self.notifier.notify_renegotiation(&notice).await {
            Ok(()) => {
                if let Err(e) = queries::renegotiations::mark_owner_notified(&self.db, &reneg.id).await
                {
                    warn!(renegotiation_id = %reneg.id, error = %e, "failed to record notification");
                }
            }
            Err(e) => {
                warn!(renegotiation_id = %reneg.id, error = %e, "owner notification failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use recobra_core::types::DebtStatus;
    use recobra_test_utils::{seed_debt, seed_operator, temp_db, MockNotifier};

    fn due() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
    }

    fn text(body: &str, pmid: &str) -> InboundText {
        InboundText {
            from: "5511987654321".to_string(),
            body: body.to_string(),
            provider_message_id: pmid.to_string(),
            contact_name: Some("Maria".to_string()),
        }
    }

    async fn processor(db: &Database, notifier: Arc<MockNotifier>) -> InboundProcessor {
        InboundProcessor::new(db.clone(), notifier)
    }

    #[tokio::test]
    async fn pay_intent_opens_renegotiation_and_notifies_owner() {
        let (db, _dir) = temp_db().await;
        seed_operator(&db, "op-1", "Loja do Ze").await;
        seed_debt(&db, "debt-1", "5511987654321", due()).await;

        let notifier = Arc::new(MockNotifier::new());
        let proc = processor(&db, notifier.clone()).await;

        let outcome = proc.process_text(&text("quero pagar", "wamid.1")).await.unwrap();
        let InboundOutcome::Processed { debt_id, intent, renegotiation_id } = outcome else {
            panic!("expected processed outcome");
        };
        assert_eq!(debt_id, "debt-1");
        assert_eq!(intent, Intent::Pay);
        let reneg_id = renegotiation_id.unwrap();

        let debt = queries::debts::get_debt(&db, "debt-1").await.unwrap().unwrap();
        assert_eq!(debt.status, DebtStatus::Renegotiating);

        let reneg = queries::renegotiations::get_for_debt(&db, "debt-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reneg.id, reneg_id);
        assert_eq!(reneg.interest_message.as_deref(), Some("quero pagar"));
        assert!(reneg.owner_notified);

        let notices = notifier.notices().await;
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].recipient, "lojista@example.com");
        assert_eq!(notices[0].amount_formatted, "R$ 150,00");

        let messages = queries::messages::list_messages_for_debt(&db, "debt-1").await.unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].direction, MessageDirection::Inbound);
        assert_eq!(messages[0].status, DeliveryStatus::Received);
    }

    #[tokio::test]
    async fn second_reply_refreshes_thread_instead_of_duplicating() {
        let (db, _dir) = temp_db().await;
        seed_operator(&db, "op-1", "Loja do Ze").await;
        seed_debt(&db, "debt-1", "5511987654321", due()).await;

        let notifier = Arc::new(MockNotifier::new());
        let proc = processor(&db, notifier.clone()).await;

        proc.process_text(&text("quero pagar", "wamid.1")).await.unwrap();
        proc.process_text(&text("pode parcelar em 3x?", "wamid.2")).await.unwrap();

        let all = queries::renegotiations::list(&db, false).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].interest_message.as_deref(), Some("pode parcelar em 3x?"));
        // Re-notified for the fresh reply.
        assert!(all[0].owner_notified);
        assert_eq!(notifier.notice_count().await, 2);
    }

    #[tokio::test]
    async fn duplicate_delivery_has_no_side_effects() {
        let (db, _dir) = temp_db().await;
        seed_operator(&db, "op-1", "Loja do Ze").await;
        seed_debt(&db, "debt-1", "5511987654321", due()).await;

        let notifier = Arc::new(MockNotifier::new());
        let proc = processor(&db, notifier.clone()).await;

        proc.process_text(&text("quero pagar", "wamid.1")).await.unwrap();
        let second = proc.process_text(&text("quero pagar", "wamid.1")).await.unwrap();
        assert_eq!(second, InboundOutcome::Duplicate);

        let messages = queries::messages::list_messages_for_debt(&db, "debt-1").await.unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(notifier.notice_count().await, 1);
    }

    #[tokio::test]
    async fn unroutable_sender_is_dropped_without_error() {
        let (db, _dir) = temp_db().await;
        let notifier = Arc::new(MockNotifier::new());
        let proc = processor(&db, notifier.clone()).await;

        let outcome = proc.process_text(&text("oi", "wamid.1")).await.unwrap();
        assert_eq!(outcome, InboundOutcome::Unroutable);
    }

    #[tokio::test]
    async fn question_intent_persists_but_opens_nothing() {
        let (db, _dir) = temp_db().await;
        seed_operator(&db, "op-1", "Loja do Ze").await;
        seed_debt(&db, "debt-1", "5511987654321", due()).await;

        let notifier = Arc::new(MockNotifier::new());
        let proc = processor(&db, notifier.clone()).await;

        let outcome = proc
            .process_text(&text("qual o valor mesmo?", "wamid.1"))
            .await
            .unwrap();
        let InboundOutcome::Processed { intent, renegotiation_id, .. } = outcome else {
            panic!("expected processed outcome");
        };
        assert_eq!(intent, Intent::Question);
        assert!(renegotiation_id.is_none());

        let debt = queries::debts::get_debt(&db, "debt-1").await.unwrap().unwrap();
        assert_eq!(debt.status, DebtStatus::Pending);
        assert_eq!(notifier.notice_count().await, 0);
    }

    #[tokio::test]
    async fn notify_failure_leaves_flag_unset_and_does_not_roll_back() {
        let (db, _dir) = temp_db().await;
        seed_operator(&db, "op-1", "Loja do Ze").await;
        seed_debt(&db, "debt-1", "5511987654321", due()).await;

        let notifier = Arc::new(MockNotifier::new());
        notifier.set_failing(true);
        let proc = processor(&db, notifier.clone()).await;

        let outcome = proc.process_text(&text("quero negociar", "wamid.1")).await.unwrap();
        assert!(matches!(outcome, InboundOutcome::Processed { .. }));

        let reneg = queries::renegotiations::get_for_debt(&db, "debt-1")
            .await
            .unwrap()
            .unwrap();
        assert!(!reneg.owner_notified);

        let debt = queries::debts::get_debt(&db, "debt-1").await.unwrap().unwrap();
        assert_eq!(debt.status, DebtStatus::Renegotiating);
    }

    #[tokio::test]
    async fn bare_national_number_still_resolves_the_debt() {
        let (db, _dir) = temp_db().await;
        seed_operator(&db, "op-1", "Loja do Ze").await;
        // Stored without the country prefix, as imported rows often are.
        seed_debt(&db, "debt-1", "11987654321", due()).await;

        let notifier = Arc::new(MockNotifier::new());
        let proc = processor(&db, notifier.clone()).await;

        let outcome = proc.process_text(&text("quero pagar", "wamid.1")).await.unwrap();
        assert!(matches!(outcome, InboundOutcome::Processed { .. }));
    }

    #[tokio::test]
    async fn delivery_status_updates_only_the_matched_message() {
        let (db, _dir) = temp_db().await;
        seed_debt(&db, "debt-1", "5511987654321", due()).await;

        let message = Message {
            id: "msg-1".to_string(),
            debt_id: "debt-1".to_string(),
            direction: MessageDirection::Outbound,
            content: "lembrete".to_string(),
            kind: MessageKind::Templated,
            status: DeliveryStatus::Sent,
            provider_message_id: Some("wamid.out".to_string()),
            created_at: now_iso(),
        };
        queries::messages::insert_message(&db, &message).await.unwrap();

        let notifier = Arc::new(MockNotifier::new());
        let proc = processor(&db, notifier).await;

        assert!(proc
            .apply_delivery_status("wamid.out", DeliveryStatus::Read)
            .await
            .unwrap());
        let stored = queries::messages::list_messages_for_debt(&db, "debt-1").await.unwrap();
        assert_eq!(stored[0].status, DeliveryStatus::Read);

        assert!(!proc
            .apply_delivery_status("wamid.unknown", DeliveryStatus::Delivered)
            .await
            .unwrap());
    }
}
