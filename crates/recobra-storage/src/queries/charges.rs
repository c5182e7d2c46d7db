// SPDX-FileCopyrightText: 2026 Recobra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pix charge persistence and the reconciliation lookup.

use recobra_core::types::{now_iso, Charge, ChargeStatus, Debt, DebtStatus, RenegotiationStatus};
use recobra_core::RecobraError;
use rusqlite::params;

use crate::database::Database;

const CHARGE_COLUMNS: &str =
    "id, debt_id, provider, provider_charge_id, amount, payment_code, qr_code_url, status, paid_at, created_at";

fn charge_from_row(row: &rusqlite::Row<'_>) -> Result<Charge, rusqlite::Error> {
    Ok(Charge {
        id: row.get(0)?,
        debt_id: row.get(1)?,
        provider: row.get(2)?,
        provider_charge_id: row.get(3)?,
        amount: row.get(4)?,
        payment_code: row.get(5)?,
        qr_code_url: row.get(6)?,
        status: super::column_enum(7, row.get(7)?)?,
        paid_at: row.get(8)?,
        created_at: row.get(9)?,
    })
}

/// Persist a charge.
pub async fn insert_charge(db: &Database, charge: &Charge) -> Result<(), RecobraError> {
    let charge = charge.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO charges (id, debt_id, provider, provider_charge_id, amount, payment_code, qr_code_url, status, paid_at, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    charge.id,
                    charge.debt_id,
                    charge.provider,
                    charge.provider_charge_id,
                    charge.amount,
                    charge.payment_code,
                    charge.qr_code_url,
                    charge.status.to_string(),
                    charge.paid_at,
                    charge.created_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a charge by ID.
pub async fn get_charge(db: &Database, id: &str) -> Result<Option<Charge>, RecobraError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {CHARGE_COLUMNS} FROM charges WHERE id = ?1"
            ))?;
            match stmt.query_row(params![id], charge_from_row) {
                Ok(charge) => Ok(Some(charge)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Reconciliation lookup: the charge a gateway webhook refers to.
pub async fn find_by_provider_charge_id(
    db: &Database,
    provider: &str,
    provider_charge_id: &str,
) -> Result<Option<Charge>, RecobraError> {
    let provider = provider.to_string();
    let pcid = provider_charge_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {CHARGE_COLUMNS} FROM charges WHERE provider = ?1 AND provider_charge_id = ?2"
            ))?;
            match stmt.query_row(params![provider, pcid], charge_from_row) {
                Ok(charge) => Ok(Some(charge)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Latest pending charge for a debt, used to re-send an existing Pix code
/// instead of creating a fresh charge per "quero pagar" reply.
pub async fn latest_pending_for_debt(
    db: &Database,
    debt_id: &str,
) -> Result<Option<Charge>, RecobraError> {
    let debt_id = debt_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {CHARGE_COLUMNS} FROM charges
                 WHERE debt_id = ?1 AND status = 'pending'
                 ORDER BY created_at DESC LIMIT 1"
            ))?;
            match stmt.query_row(params![debt_id], charge_from_row) {
                Ok(charge) => Ok(Some(charge)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Mark a charge paid without touching the debt. Manual settlement path;
/// webhook reconciliation goes through [`settle_paid_charge`].
///
/// Returns `false` when the charge was already paid.
pub async fn mark_paid(db: &Database, id: &str, paid_at: &str) -> Result<bool, RecobraError> {
    let id = id.to_string();
    let paid_at = paid_at.to_string();
    db.connection()
        .call(move |conn| {
            let n = conn.execute(
                "UPDATE charges SET status = ?1, paid_at = ?2 WHERE id = ?3 AND status != ?1",
                params![ChargeStatus::Paid.to_string(), paid_at, id],
            )?;
            Ok(n > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Mark a charge expired. Pending charges only; paid charges are left alone.
pub async fn mark_expired(db: &Database, id: &str) -> Result<bool, RecobraError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let n = conn.execute(
                "UPDATE charges SET status = 'expired' WHERE id = ?1 AND status = 'pending'",
                params![id],
            )?;
            Ok(n > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Settle a paid charge: charge -> paid, debt -> paid, open renegotiation
/// -> resolved, in one transaction.
///
/// Returns the updated debt, or `None` when the charge was already paid.
/// The `None` path is the duplicate-webhook short-circuit; nothing is
/// written and the caller must not send a second confirmation.
pub async fn settle_paid_charge(
    db: &Database,
    charge_id: &str,
    paid_at: &str,
) -> Result<Option<Debt>, RecobraError> {
    let charge_id = charge_id.to_string();
    let paid_at = paid_at.to_string();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;

            let n = tx.execute(
                "UPDATE charges SET status = ?1, paid_at = ?2 WHERE id = ?3 AND status != ?1",
                params![ChargeStatus::Paid.to_string(), paid_at, charge_id],
            )?;
            if n == 0 {
                return Ok(None);
            }

            let debt_id: String = tx.query_row(
                "SELECT debt_id FROM charges WHERE id = ?1",
                params![charge_id],
                |row| row.get(0),
            )?;

            let mut debt = {
                let mut stmt = tx.prepare(&format!(
                    "SELECT {} FROM debts WHERE id = ?1",
                    super::debts::DEBT_COLUMNS
                ))?;
                stmt.query_row(params![debt_id], super::debts::debt_from_row)?
            };
            if debt.status.can_transition(DebtStatus::Paid) && debt.status != DebtStatus::Paid {
                debt.status = DebtStatus::Paid;
                debt.updated_at = now_iso();
                tx.execute(
                    "UPDATE debts SET status = ?1, updated_at = ?2 WHERE id = ?3",
                    params![debt.status.to_string(), debt.updated_at, debt.id],
                )?;
            }

            let reneg = {
                let mut stmt = tx.prepare(&format!(
                    "SELECT {} FROM renegotiations WHERE debt_id = ?1",
                    super::renegotiations::RENEG_COLUMNS
                ))?;
                match stmt.query_row(params![debt_id], super::renegotiations::reneg_from_row) {
                    Ok(reneg) => Some(reneg),
                    Err(rusqlite::Error::QueryReturnedNoRows) => None,
                    Err(e) => return Err(e.into()),
                }
            };
            if let Some(reneg) = reneg
                && reneg.status.can_transition(RenegotiationStatus::Resolved)
                && reneg.status != RenegotiationStatus::Resolved
            {
                tx.execute(
                    "UPDATE renegotiations SET status = ?1, updated_at = ?2 WHERE id = ?3",
                    params![RenegotiationStatus::Resolved.to_string(), now_iso(), reneg.id],
                )?;
            }

            tx.commit()?;
            Ok(Some(debt))
        })
        .await
        .map_err(crate::database::map_tr_err)
}
