// SPDX-FileCopyrightText: 2026 Recobra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message persistence and delivery-status updates.

use recobra_core::types::{DeliveryStatus, Message};
use recobra_core::RecobraError;
use rusqlite::params;

use crate::database::Database;

const MESSAGE_COLUMNS: &str =
    "id, debt_id, direction, content, kind, status, provider_message_id, created_at";

fn message_from_row(row: &rusqlite::Row<'_>) -> Result<Message, rusqlite::Error> {
    Ok(Message {
        id: row.get(0)?,
        debt_id: row.get(1)?,
        direction: super::column_enum(2, row.get(2)?)?,
        content: row.get(3)?,
        kind: super::column_enum(4, row.get(4)?)?,
        status: super::column_enum(5, row.get(5)?)?,
        provider_message_id: row.get(6)?,
        created_at: row.get(7)?,
    })
}

/// Persist a message. Fails on a duplicate provider message id.
pub async fn insert_message(db: &Database, message: &Message) -> Result<(), RecobraError> {
    let message = message.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO messages (id, debt_id, direction, content, kind, status, provider_message_id, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    message.id,
                    message.debt_id,
                    message.direction.to_string(),
                    message.content,
                    message.kind.to_string(),
                    message.status.to_string(),
                    message.provider_message_id,
                    message.created_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Whether a provider message id has already been stored. Used to drop
/// webhook redeliveries before any side effects run.
pub async fn provider_message_seen(
    db: &Database,
    provider_message_id: &str,
) -> Result<bool, RecobraError> {
    let pmid = provider_message_id.to_string();
    db.connection()
        .call(move |conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM messages WHERE provider_message_id = ?1",
                params![pmid],
                |row| row.get(0),
            )?;
            Ok(count > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// List messages for a debt, oldest first.
pub async fn list_messages_for_debt(
    db: &Database,
    debt_id: &str,
) -> Result<Vec<Message>, RecobraError> {
    let debt_id = debt_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages WHERE debt_id = ?1 ORDER BY created_at ASC"
            ))?;
            let rows = stmt.query_map(params![debt_id], message_from_row)?;
            let mut messages = Vec::new();
            for row in rows {
                messages.push(row?);
            }
            Ok(messages)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Advance the delivery status of the message with the given provider id.
///
/// Returns `false` when no stored message carries that id; callers drop
/// such callbacks silently, since status events for messages sent before
/// this system existed are expected.
pub async fn update_delivery_status(
    db: &Database,
    provider_message_id: &str,
    status: DeliveryStatus,
) -> Result<bool, RecobraError> {
    let pmid = provider_message_id.to_string();
    db.connection()
        .call(move |conn| {
            let n = conn.execute(
                "UPDATE messages SET status = ?1 WHERE provider_message_id = ?2",
                params![status.to_string(), pmid],
            )?;
            Ok(n > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
