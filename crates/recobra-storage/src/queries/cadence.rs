// SPDX-FileCopyrightText: 2026 Recobra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cadence execution ledger.
//!
//! Rows here are immutable facts: step S fired for debt D. The
//! `UNIQUE(debt_id, step)` constraint is the idempotency backstop for
//! concurrent or replayed scheduler runs.

use recobra_core::types::{now_iso, CadenceExecution, CadenceStep};
use recobra_core::RecobraError;
use rusqlite::params;

use crate::database::Database;

fn execution_from_row(row: &rusqlite::Row<'_>) -> Result<CadenceExecution, rusqlite::Error> {
    Ok(CadenceExecution {
        id: row.get(0)?,
        debt_id: row.get(1)?,
        step: super::column_enum(2, row.get(2)?)?,
        message_id: row.get(3)?,
        executed_at: row.get(4)?,
    })
}

/// Record that a step fired for a debt.
///
/// Returns `false` when the step was already recorded; the caller treats
/// that as "someone else got there first" and skips the send.
pub async fn record_execution(
    db: &Database,
    debt_id: &str,
    step: CadenceStep,
    message_id: Option<&str>,
) -> Result<bool, RecobraError> {
    let debt_id = debt_id.to_string();
    let message_id = message_id.map(|s| s.to_string());
    db.connection()
        .call(move |conn| {
            let n = conn.execute(
                "INSERT OR IGNORE INTO cadence_executions (debt_id, step, message_id, executed_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![debt_id, step.to_string(), message_id, now_iso()],
            )?;
            Ok(n > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Whether a step has already fired for a debt.
pub async fn has_executed(
    db: &Database,
    debt_id: &str,
    step: CadenceStep,
) -> Result<bool, RecobraError> {
    let debt_id = debt_id.to_string();
    db.connection()
        .call(move |conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM cadence_executions WHERE debt_id = ?1 AND step = ?2",
                params![debt_id, step.to_string()],
                |row| row.get(0),
            )?;
            Ok(count > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// List all executions recorded for a debt, oldest first.
pub async fn list_for_debt(
    db: &Database,
    debt_id: &str,
) -> Result<Vec<CadenceExecution>, RecobraError> {
    let debt_id = debt_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, debt_id, step, message_id, executed_at
                 FROM cadence_executions WHERE debt_id = ?1 ORDER BY id ASC",
            )?;
            let rows = stmt.query_map(params![debt_id], execution_from_row)?;
            let mut executions = Vec::new();
            for row in rows {
                executions.push(row?);
            }
            Ok(executions)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
