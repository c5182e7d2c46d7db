// SPDX-FileCopyrightText: 2026 Recobra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Operator (store owner) profile persistence.

use recobra_core::types::Operator;
use recobra_core::RecobraError;
use rusqlite::params;

use crate::database::Database;

fn operator_from_row(row: &rusqlite::Row<'_>) -> Result<Operator, rusqlite::Error> {
    Ok(Operator {
        id: row.get(0)?,
        store_name: row.get(1)?,
        email: row.get(2)?,
        notify_email: row.get(3)?,
        created_at: row.get(4)?,
    })
}

/// Create or replace an operator profile.
pub async fn upsert_operator(db: &Database, operator: &Operator) -> Result<(), RecobraError> {
    let operator = operator.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO operators (id, store_name, email, notify_email, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(id) DO UPDATE SET
                     store_name = excluded.store_name,
                     email = excluded.email,
                     notify_email = excluded.notify_email",
                params![
                    operator.id,
                    operator.store_name,
                    operator.email,
                    operator.notify_email,
                    operator.created_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get an operator by ID.
pub async fn get_operator(db: &Database, id: &str) -> Result<Option<Operator>, RecobraError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, store_name, email, notify_email, created_at FROM operators WHERE id = ?1",
            )?;
            match stmt.query_row(params![id], operator_from_row) {
                Ok(operator) => Ok(Some(operator)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// List all operators.
pub async fn list_operators(db: &Database) -> Result<Vec<Operator>, RecobraError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, store_name, email, notify_email, created_at FROM operators ORDER BY id",
            )?;
            let rows = stmt.query_map([], operator_from_row)?;
            let mut operators = Vec::new();
            for row in rows {
                operators.push(row?);
            }
            Ok(operators)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
