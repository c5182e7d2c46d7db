// SPDX-FileCopyrightText: 2026 Recobra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Daily outreach scheduler.
//!
//! Maps each pending debt's offset from its due date to a cadence step
//! (D-2, D0, D+5, D+15, D+30) and sends the step's message exactly once.
//! Matching is exact-day: an offset not in the table means nothing is due
//! for that debt today, even when the debt is conceptually "past" an
//! earlier step. A debt never scanned on exactly day 5 permanently misses
//! D+5. Do not widen to `>=` semantics; that changes how many messages a
//! delayed run sends in one pass.
//!
//! Idempotency rests on the unique `(debt_id, step)` row in
//! `cadence_executions`: the check-then-send race loses to the insert's
//! conflict clause, so concurrent runs cannot double-send a step.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use recobra_core::error::RecobraError;
use recobra_core::traits::MessagingChannel;
use recobra_core::types::{
    now_iso, CadenceStep, Debt, DeliveryStatus, Message, MessageDirection, MessageKind,
};
use recobra_storage::database::Database;
use recobra_storage::queries;

/// Aggregate counters for one scheduler run.
///
/// Wire field names are kept in Portuguese for compatibility with the
/// operator-facing cron response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchResults {
    /// Pending debts scanned.
    #[serde(rename = "processadas")]
    pub processed: u64,
    /// Step messages sent and recorded.
    #[serde(rename = "enviadas")]
    pub sent: u64,
    /// Debts whose processing failed (send or persistence).
    #[serde(rename = "erros")]
    pub errors: u64,
}

/// Runs the outreach cadence over all pending debts.
pub struct CadenceScheduler {
    db: Database,
    channel: Arc<dyn MessagingChannel>,
}

impl CadenceScheduler {
    pub fn new(db: Database, channel: Arc<dyn MessagingChannel>) -> Self {
        Self { db, channel }
    }

    /// One full pass over pending debts for the given calendar date.
    ///
    /// A failure in one debt's processing is counted and logged, never
    /// propagated; the batch always completes.
    pub async fn run(&self, today: NaiveDate) -> Result<BatchResults, RecobraError> {
        let debts = queries::debts::list_pending_debts(&self.db).await?;
        let store_names = self.load_store_names().await?;

        let mut results = BatchResults::default();
        for debt in debts {
            results.processed += 1;
            match self.process_debt(&debt, today, &store_names).await {
                Ok(true) => results.sent += 1,
                Ok(false) => {}
                Err(e) => {
                    warn!(debt_id = %debt.id, error = %e, "cadence step failed");
                    results.errors += 1;
                }
            }
        }

        info!(
            processed = results.processed,
            sent = results.sent,
            errors = results.errors,
            "cadence run complete"
        );
        Ok(results)
    }

    /// Returns `Ok(true)` when a step message was sent for this debt.
    async fn process_debt(
        &self,
        debt: &Debt,
        today: NaiveDate,
        store_names: &HashMap<String, String>,
    ) -> Result<bool, RecobraError> {
        let diff_days = (today - debt.due_date).num_days();
        let Some(step) = CadenceStep::from_offset(diff_days) else {
            return Ok(false);
        };

        if queries::cadence::has_executed(&self.db, &debt.id, step).await? {
            debug!(debt_id = %debt.id, step = %step, "step already executed, skipping");
            return Ok(false);
        }

        let store = store_names
            .get(&debt.owner_id)
            .map(String::as_str)
            .unwrap_or(recobra_templates::DEFAULT_STORE_NAME);
        let body = recobra_templates::render_step(
            step,
            &debt.debtor_name,
            store,
            debt.amount,
            debt.due_date,
            today,
        );

        let provider_message_id = self.channel.send_text(&debt.phone, &body).await?;

        let message = Message {
            id: Uuid::new_v4().to_string(),
            debt_id: debt.id.clone(),
            direction: MessageDirection::Outbound,
            content: body,
            kind: MessageKind::Templated,
            status: DeliveryStatus::Sent,
            provider_message_id: Some(provider_message_id),
            created_at: now_iso(),
        };
        queries::messages::insert_message(&self.db, &message).await?;

        let recorded =
            queries::cadence::record_execution(&self.db, &debt.id, step, Some(&message.id))
                .await?;
        if !recorded {
            // Lost the race to a concurrent run after our send. The message
            // row stays for history; the step is not counted twice.
            warn!(debt_id = %debt.id, step = %step, "execution already recorded");
            return Ok(false);
        }

        info!(debt_id = %debt.id, step = %step, "cadence message sent");
        Ok(true)
    }

    async fn load_store_names(&self) -> Result<HashMap<String, String>, RecobraError> {
        let operators = queries::operators::list_operators(&self.db).await?;
        Ok(operators
            .into_iter()
            .filter_map(|op| op.store_name.map(|name| (op.id, name)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recobra_test_utils::{seed_debt, seed_operator, temp_db, MockChannel};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn sends_reminder_two_days_before_due() {
        let (db, _dir) = temp_db().await;
        seed_operator(&db, "op-1", "Loja do Ze").await;
        seed_debt(&db, "debt-1", "5511987654321", date(2025, 1, 15)).await;

        let channel = Arc::new(MockChannel::new());
        let scheduler = CadenceScheduler::new(db.clone(), channel.clone());

        let results = scheduler.run(date(2025, 1, 13)).await.unwrap();
        assert_eq!(results, BatchResults { processed: 1, sent: 1, errors: 0 });

        let sent = channel.sent_messages().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "5511987654321");
        assert!(sent[0].body.contains("Maria Silva"));
        assert!(sent[0].body.contains("Loja do Ze"));
        assert!(sent[0].body.contains("R$ 150,00"));
        assert!(sent[0].body.contains("15/01/2025"));

        let messages = queries::messages::list_messages_for_debt(&db, "debt-1").await.unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].direction, MessageDirection::Outbound);
        assert_eq!(messages[0].kind, MessageKind::Templated);
        assert_eq!(messages[0].status, DeliveryStatus::Sent);
        assert_eq!(messages[0].provider_message_id.as_deref(), Some("wamid.mock-0"));

        let executions = queries::cadence::list_for_debt(&db, "debt-1").await.unwrap();
        assert_eq!(executions.len(), 1);
        assert_eq!(executions[0].step, CadenceStep::DMinus2);
        assert_eq!(executions[0].message_id.as_deref(), Some(messages[0].id.as_str()));
    }

    #[tokio::test]
    async fn off_schedule_offsets_send_nothing() {
        let (db, _dir) = temp_db().await;
        seed_debt(&db, "debt-1", "5511987654321", date(2025, 1, 15)).await;

        let channel = Arc::new(MockChannel::new());
        let scheduler = CadenceScheduler::new(db.clone(), channel.clone());

        // Day 6 past due: not a step, even though day 5 was.
        let results = scheduler.run(date(2025, 1, 21)).await.unwrap();
        assert_eq!(results, BatchResults { processed: 1, sent: 0, errors: 0 });
        assert_eq!(channel.sent_count().await, 0);
    }

    #[tokio::test]
    async fn second_run_on_same_day_is_a_no_op() {
        let (db, _dir) = temp_db().await;
        seed_debt(&db, "debt-1", "5511987654321", date(2025, 1, 15)).await;

        let channel = Arc::new(MockChannel::new());
        let scheduler = CadenceScheduler::new(db.clone(), channel.clone());

        let first = scheduler.run(date(2025, 1, 15)).await.unwrap();
        assert_eq!(first.sent, 1);
        let second = scheduler.run(date(2025, 1, 15)).await.unwrap();
        assert_eq!(second, BatchResults { processed: 1, sent: 0, errors: 0 });
        assert_eq!(channel.sent_count().await, 1);
    }

    #[tokio::test]
    async fn uses_generic_store_name_when_operator_has_none() {
        let (db, _dir) = temp_db().await;
        seed_debt(&db, "debt-1", "5511987654321", date(2025, 1, 15)).await;

        let channel = Arc::new(MockChannel::new());
        let scheduler = CadenceScheduler::new(db.clone(), channel.clone());
        scheduler.run(date(2025, 1, 15)).await.unwrap();

        let sent = channel.sent_messages().await;
        assert!(sent[0].body.contains("nossa loja"));
    }

    #[tokio::test]
    async fn send_failure_is_counted_and_does_not_abort_the_batch() {
        let (db, _dir) = temp_db().await;
        seed_debt(&db, "debt-1", "5511987654321", date(2025, 1, 15)).await;
        seed_debt(&db, "debt-2", "5521998765432", date(2025, 1, 15)).await;

        let channel = Arc::new(MockChannel::new());
        channel.set_failing(true);
        let scheduler = CadenceScheduler::new(db.clone(), channel.clone());

        let results = scheduler.run(date(2025, 1, 15)).await.unwrap();
        assert_eq!(results, BatchResults { processed: 2, sent: 0, errors: 2 });

        // Nothing recorded; the steps remain due for the next run.
        assert!(!queries::cadence::has_executed(&db, "debt-1", CadenceStep::DueDay).await.unwrap());

        channel.set_failing(false);
        let retry = scheduler.run(date(2025, 1, 15)).await.unwrap();
        assert_eq!(retry, BatchResults { processed: 2, sent: 2, errors: 0 });
    }

    #[tokio::test]
    async fn overdue_step_reports_days_late() {
        let (db, _dir) = temp_db().await;
        seed_debt(&db, "debt-1", "5511987654321", date(2025, 1, 15)).await;

        let channel = Arc::new(MockChannel::new());
        let scheduler = CadenceScheduler::new(db.clone(), channel.clone());
        let results = scheduler.run(date(2025, 1, 20)).await.unwrap();
        assert_eq!(results.sent, 1);

        let sent = channel.sent_messages().await;
        assert!(sent[0].body.contains("5 dias"));
    }
}
