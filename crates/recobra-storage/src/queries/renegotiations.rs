// SPDX-FileCopyrightText: 2026 Recobra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Renegotiation thread persistence.
//!
//! A debt has at most one renegotiation row. Repeated debtor interest
//! refreshes the existing row instead of stacking new ones.

use recobra_core::types::{now_iso, Renegotiation, RenegotiationStatus};
use recobra_core::RecobraError;
use rusqlite::params;

use crate::database::Database;

pub(super) const RENEG_COLUMNS: &str =
    "id, debt_id, interest_message, status, owner_notified, created_at, updated_at";

pub(super) fn reneg_from_row(row: &rusqlite::Row<'_>) -> Result<Renegotiation, rusqlite::Error> {
    Ok(Renegotiation {
        id: row.get(0)?,
        debt_id: row.get(1)?,
        interest_message: row.get(2)?,
        status: super::column_enum(3, row.get(3)?)?,
        owner_notified: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

/// Create the renegotiation thread for a debt, or refresh the existing one
/// with the latest interest message. Returns the row as stored.
///
/// A refresh keeps the original id and status but clears `owner_notified`
/// so a new debtor reply re-triggers the owner notification.
pub async fn upsert_for_debt(
    db: &Database,
    id: &str,
    debt_id: &str,
    interest_message: Option<&str>,
) -> Result<Renegotiation, RecobraError> {
    let id = id.to_string();
    let debt_id = debt_id.to_string();
    let interest_message = interest_message.map(|s| s.to_string());
    db.connection()
        .call(move |conn| {
            let now = now_iso();
            let mut stmt = conn.prepare(&format!(
                "INSERT INTO renegotiations (id, debt_id, interest_message, status, owner_notified, created_at, updated_at)
                 VALUES (?1, ?2, ?3, 'new', 0, ?4, ?4)
                 ON CONFLICT(debt_id) DO UPDATE SET
                     interest_message = excluded.interest_message,
                     owner_notified = 0,
                     updated_at = excluded.updated_at
                 RETURNING {RENEG_COLUMNS}"
            ))?;
            let reneg = stmt.query_row(params![id, debt_id, interest_message, now], reneg_from_row)?;
            Ok(reneg)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get the renegotiation thread for a debt, if one exists.
pub async fn get_for_debt(
    db: &Database,
    debt_id: &str,
) -> Result<Option<Renegotiation>, RecobraError> {
    let debt_id = debt_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {RENEG_COLUMNS} FROM renegotiations WHERE debt_id = ?1"
            ))?;
            match stmt.query_row(params![debt_id], reneg_from_row) {
                Ok(reneg) => Ok(Some(reneg)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// List renegotiations, optionally restricted to open threads, newest first.
pub async fn list(db: &Database, only_open: bool) -> Result<Vec<Renegotiation>, RecobraError> {
    db.connection()
        .call(move |conn| {
            let sql = if only_open {
                format!(
                    "SELECT {RENEG_COLUMNS} FROM renegotiations
                     WHERE status IN ('new', 'in_contact') ORDER BY updated_at DESC"
                )
            } else {
                format!("SELECT {RENEG_COLUMNS} FROM renegotiations ORDER BY updated_at DESC")
            };
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map([], reneg_from_row)?;
            let mut renegs = Vec::new();
            for row in rows {
                renegs.push(row?);
            }
            Ok(renegs)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Record that the owner has been notified about this thread.
pub async fn mark_owner_notified(db: &Database, id: &str) -> Result<(), RecobraError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE renegotiations SET owner_notified = 1, updated_at = ?1 WHERE id = ?2",
                params![now_iso(), id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Transition a renegotiation's status, validating the edge against the
/// transition table. A same-status write is an idempotent no-op.
pub async fn update_status(
    db: &Database,
    id: &str,
    to: RenegotiationStatus,
) -> Result<Renegotiation, RecobraError> {
    enum Outcome {
        NotFound,
        Invalid(RenegotiationStatus),
        Updated(Renegotiation),
    }

    let id_owned = id.to_string();
    let outcome = db
        .connection()
        .call(move |conn| {
            let tx = conn.transaction()?;

            let mut current = {
                let mut stmt = tx.prepare(&format!(
                    "SELECT {RENEG_COLUMNS} FROM renegotiations WHERE id = ?1"
                ))?;
                match stmt.query_row(params![id_owned], reneg_from_row) {
                    Ok(reneg) => reneg,
                    Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(Outcome::NotFound),
                    Err(e) => return Err(e.into()),
                }
            };

            if !current.status.can_transition(to) {
                return Ok(Outcome::Invalid(current.status));
            }
            if current.status == to {
                return Ok(Outcome::Updated(current));
            }

            current.status = to;
            current.updated_at = now_iso();
            tx.execute(
                "UPDATE renegotiations SET status = ?1, updated_at = ?2 WHERE id = ?3",
                params![current.status.to_string(), current.updated_at, current.id],
            )?;
            tx.commit()?;
            Ok(Outcome::Updated(current))
        })
        .await
        .map_err(crate::database::map_tr_err)?;

    match outcome {
        Outcome::NotFound => Err(RecobraError::NotFound {
            entity: "renegotiation",
            id: id.to_string(),
        }),
        Outcome::Invalid(from) => Err(RecobraError::InvalidTransition {
            entity: "renegotiation",
            from: from.to_string(),
            to: to.to_string(),
        }),
        Outcome::Updated(reneg) => Ok(reneg),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::debts;
    use crate::queries::test_support::{make_debt, setup_db};
    use chrono::NaiveDate;

    async fn seed_debt(db: &crate::Database, id: &str) {
        let due = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        debts::create_debt(db, &make_debt(id, "5511987654321", due))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn upsert_creates_then_refreshes() {
        let (db, _dir) = setup_db().await;
        seed_debt(&db, "d-1").await;

        let first = upsert_for_debt(&db, "r-1", "d-1", Some("quero parcelar"))
            .await
            .unwrap();
        assert_eq!(first.id, "r-1");
        assert_eq!(first.status, RenegotiationStatus::New);
        assert!(!first.owner_notified);

        mark_owner_notified(&db, "r-1").await.unwrap();

        // Second interest refreshes the message, keeps id and status, and
        // clears the notified flag so the owner hears about the new reply.
        let second = upsert_for_debt(&db, "r-2", "d-1", Some("pode dividir em 3x?"))
            .await
            .unwrap();
        assert_eq!(second.id, "r-1");
        assert_eq!(second.status, RenegotiationStatus::New);
        assert_eq!(second.interest_message.as_deref(), Some("pode dividir em 3x?"));
        assert!(!second.owner_notified);

        let all = list(&db, false).await.unwrap();
        assert_eq!(all.len(), 1);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn status_transitions_validate_edges() {
        let (db, _dir) = setup_db().await;
        seed_debt(&db, "d-1").await;
        upsert_for_debt(&db, "r-1", "d-1", None).await.unwrap();

        let reneg = update_status(&db, "r-1", RenegotiationStatus::InContact)
            .await
            .unwrap();
        assert_eq!(reneg.status, RenegotiationStatus::InContact);

        let reneg = update_status(&db, "r-1", RenegotiationStatus::Resolved)
            .await
            .unwrap();
        assert_eq!(reneg.status, RenegotiationStatus::Resolved);

        // Terminal states stay terminal.
        let err = update_status(&db, "r-1", RenegotiationStatus::InContact)
            .await
            .unwrap_err();
        assert!(matches!(err, RecobraError::InvalidTransition { .. }));

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn open_filter_excludes_terminal_threads() {
        let (db, _dir) = setup_db().await;
        seed_debt(&db, "d-1").await;
        seed_debt(&db, "d-2").await;
        upsert_for_debt(&db, "r-1", "d-1", None).await.unwrap();
        upsert_for_debt(&db, "r-2", "d-2", None).await.unwrap();
        update_status(&db, "r-2", RenegotiationStatus::Lost)
            .await
            .unwrap();

        let open = list(&db, true).await.unwrap();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].id, "r-1");

        db.close().await.unwrap();
    }
}
