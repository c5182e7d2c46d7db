// SPDX-FileCopyrightText: 2026 Recobra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Debt CRUD operations and the phone-based routing lookup.

use chrono::NaiveDate;
use recobra_core::types::{now_iso, Debt, DebtStatus};
use recobra_core::RecobraError;
use rusqlite::params;

use crate::database::Database;

pub(super) const DEBT_COLUMNS: &str =
    "id, owner_id, debtor_name, phone, amount, due_date, status, notes, created_at, updated_at";

pub(super) fn debt_from_row(row: &rusqlite::Row<'_>) -> Result<Debt, rusqlite::Error> {
    Ok(Debt {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        debtor_name: row.get(2)?,
        phone: row.get(3)?,
        amount: row.get(4)?,
        due_date: super::column_date(5, row.get(5)?)?,
        status: super::column_enum(6, row.get(6)?)?,
        notes: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

/// Create a new debt.
pub async fn create_debt(db: &Database, debt: &Debt) -> Result<(), RecobraError> {
    let debt = debt.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO debts (id, owner_id, debtor_name, phone, amount, due_date, status, notes, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    debt.id,
                    debt.owner_id,
                    debt.debtor_name,
                    debt.phone,
                    debt.amount,
                    debt.due_date.format("%Y-%m-%d").to_string(),
                    debt.status.to_string(),
                    debt.notes,
                    debt.created_at,
                    debt.updated_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Insert a batch of debts in one transaction. Returns the number inserted.
pub async fn create_debts(db: &Database, debts: Vec<Debt>) -> Result<usize, RecobraError> {
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let mut count = 0;
            for debt in &debts {
                tx.execute(
                    "INSERT INTO debts (id, owner_id, debtor_name, phone, amount, due_date, status, notes, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                    params![
                        debt.id,
                        debt.owner_id,
                        debt.debtor_name,
                        debt.phone,
                        debt.amount,
                        debt.due_date.format("%Y-%m-%d").to_string(),
                        debt.status.to_string(),
                        debt.notes,
                        debt.created_at,
                        debt.updated_at,
                    ],
                )?;
                count += 1;
            }
            tx.commit()?;
            Ok(count)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a debt by ID.
pub async fn get_debt(db: &Database, id: &str) -> Result<Option<Debt>, RecobraError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {DEBT_COLUMNS} FROM debts WHERE id = ?1"
            ))?;
            let result = stmt.query_row(params![id], debt_from_row);
            match result {
                Ok(debt) => Ok(Some(debt)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// List debts, optionally filtered by status, most recently created first.
pub async fn list_debts(
    db: &Database,
    status: Option<DebtStatus>,
) -> Result<Vec<Debt>, RecobraError> {
    db.connection()
        .call(move |conn| {
            let mut debts = Vec::new();
            match status {
                Some(status) => {
                    let mut stmt = conn.prepare(&format!(
                        "SELECT {DEBT_COLUMNS} FROM debts WHERE status = ?1 ORDER BY created_at DESC"
                    ))?;
                    let rows = stmt.query_map(params![status.to_string()], debt_from_row)?;
                    for row in rows {
                        debts.push(row?);
                    }
                }
                None => {
                    let mut stmt = conn.prepare(&format!(
                        "SELECT {DEBT_COLUMNS} FROM debts ORDER BY created_at DESC"
                    ))?;
                    let rows = stmt.query_map([], debt_from_row)?;
                    for row in rows {
                        debts.push(row?);
                    }
                }
            }
            Ok(debts)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// List pending debts due on a specific calendar day offset window.
///
/// Returns every pending debt; the cadence scheduler computes the per-debt
/// day offset itself, so no date filtering happens here.
pub async fn list_pending_debts(db: &Database) -> Result<Vec<Debt>, RecobraError> {
    list_debts(db, Some(DebtStatus::Pending)).await
}

/// Resolve an inbound sender to their open debt.
///
/// Matches the stored phone against both the country-prefixed form and the
/// bare national form, takes only pending debts, and prefers the earliest
/// due date when the debtor has several.
pub async fn find_open_debt_by_phone(
    db: &Database,
    normalized_phone: &str,
) -> Result<Option<Debt>, RecobraError> {
    let prefixed = normalized_phone.to_string();
    let bare = recobra_phone::strip_country_code(normalized_phone).to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {DEBT_COLUMNS} FROM debts
                 WHERE phone IN (?1, ?2) AND status = 'pending'
                 ORDER BY due_date ASC LIMIT 1"
            ))?;
            let result = stmt.query_row(params![prefixed, bare], debt_from_row);
            match result {
                Ok(debt) => Ok(Some(debt)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Field-level patch for [`update_debt`]. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct DebtPatch {
    pub debtor_name: Option<String>,
    pub phone: Option<String>,
    pub amount: Option<f64>,
    pub due_date: Option<NaiveDate>,
    /// `Some(None)` clears the notes.
    pub notes: Option<Option<String>>,
}

/// Update a debt's editable fields.
///
/// The due date is frozen once any cadence step has fired for the debt:
/// moving it would re-arm steps that already ran.
pub async fn update_debt(
    db: &Database,
    id: &str,
    patch: DebtPatch,
) -> Result<Debt, RecobraError> {
    enum Outcome {
        NotFound,
        DueDateFrozen,
        Updated(Debt),
    }

    let id_owned = id.to_string();
    let outcome = db
        .connection()
        .call(move |conn| {
            let tx = conn.transaction()?;

            let current = {
                let mut stmt = tx.prepare(&format!(
                    "SELECT {DEBT_COLUMNS} FROM debts WHERE id = ?1"
                ))?;
                match stmt.query_row(params![id_owned], debt_from_row) {
                    Ok(debt) => debt,
                    Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(Outcome::NotFound),
                    Err(e) => return Err(e.into()),
                }
            };

            if let Some(new_due) = patch.due_date
                && new_due != current.due_date
            {
                let executed: i64 = tx.query_row(
                    "SELECT COUNT(*) FROM cadence_executions WHERE debt_id = ?1",
                    params![current.id],
                    |row| row.get(0),
                )?;
                if executed > 0 {
                    return Ok(Outcome::DueDateFrozen);
                }
            }

            let updated = Debt {
                debtor_name: patch.debtor_name.unwrap_or(current.debtor_name),
                phone: patch.phone.unwrap_or(current.phone),
                amount: patch.amount.unwrap_or(current.amount),
                due_date: patch.due_date.unwrap_or(current.due_date),
                notes: patch.notes.unwrap_or(current.notes),
                updated_at: now_iso(),
                ..current
            };

            tx.execute(
                "UPDATE debts SET debtor_name = ?1, phone = ?2, amount = ?3, due_date = ?4,
                 notes = ?5, updated_at = ?6 WHERE id = ?7",
                params![
                    updated.debtor_name,
                    updated.phone,
                    updated.amount,
                    updated.due_date.format("%Y-%m-%d").to_string(),
                    updated.notes,
                    updated.updated_at,
                    updated.id,
                ],
            )?;
            tx.commit()?;
            Ok(Outcome::Updated(updated))
        })
        .await
        .map_err(crate::database::map_tr_err)?;

    match outcome {
        Outcome::NotFound => Err(RecobraError::NotFound {
            entity: "debt",
            id: id.to_string(),
        }),
        Outcome::DueDateFrozen => Err(RecobraError::Validation(
            "due date cannot change after a cadence step has run for this debt".to_string(),
        )),
        Outcome::Updated(debt) => Ok(debt),
    }
}

/// Transition a debt's status, validating the edge against the transition
/// table. A same-status write is an idempotent no-op returning the row.
pub async fn update_debt_status(
    db: &Database,
    id: &str,
    to: DebtStatus,
) -> Result<Debt, RecobraError> {
    enum Outcome {
        NotFound,
        Invalid(DebtStatus),
        Updated(Debt),
    }

    let id_owned = id.to_string();
    let outcome = db
        .connection()
        .call(move |conn| {
            let tx = conn.transaction()?;

            let mut current = {
                let mut stmt = tx.prepare(&format!(
                    "SELECT {DEBT_COLUMNS} FROM debts WHERE id = ?1"
                ))?;
                match stmt.query_row(params![id_owned], debt_from_row) {
                    Ok(debt) => debt,
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
                "UPDATE debts SET status = ?1, updated_at = ?2 WHERE id = ?3",
                params![current.status.to_string(), current.updated_at, current.id],
            )?;
            tx.commit()?;
            Ok(Outcome::Updated(current))
        })
        .await
        .map_err(crate::database::map_tr_err)?;

    match outcome {
        Outcome::NotFound => Err(RecobraError::NotFound {
            entity: "debt",
            id: id.to_string(),
        }),
        Outcome::Invalid(from) => Err(RecobraError::InvalidTransition {
            entity: "debt",
            from: from.to_string(),
            to: to.to_string(),
        }),
        Outcome::Updated(debt) => Ok(debt),
    }
}

/// Delete a debt by ID.
pub async fn delete_debt(db: &Database, id: &str) -> Result<(), RecobraError> {
    let id_owned = id.to_string();
    let deleted = db
        .connection()
        .call(move |conn| {
            let n = conn.execute("DELETE FROM debts WHERE id = ?1", params![id_owned])?;
            Ok(n)
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    if deleted == 0 {
        return Err(RecobraError::NotFound {
            entity: "debt",
            id: id.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::test_support::{make_debt, setup_db};
    use chrono::NaiveDate;

    fn jan(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, day).unwrap()
    }

    #[tokio::test]
    async fn create_and_get_debt_roundtrips() {
        let (db, _dir) = setup_db().await;
        let debt = make_debt("d-1", "5511987654321", jan(15));
        create_debt(&db, &debt).await.unwrap();

        let retrieved = get_debt(&db, "d-1").await.unwrap().unwrap();
        assert_eq!(retrieved.debtor_name, "Maria Silva");
        assert_eq!(retrieved.amount, 150.0);
        assert_eq!(retrieved.due_date, jan(15));
        assert_eq!(retrieved.status, DebtStatus::Pending);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn get_nonexistent_debt_returns_none() {
        let (db, _dir) = setup_db().await;
        assert!(get_debt(&db, "no-such-debt").await.unwrap().is_none());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn list_debts_filters_by_status() {
        let (db, _dir) = setup_db().await;
        create_debt(&db, &make_debt("d-1", "5511987654321", jan(15)))
            .await
            .unwrap();
        create_debt(&db, &make_debt("d-2", "5511987654322", jan(20)))
            .await
            .unwrap();
        update_debt_status(&db, "d-2", DebtStatus::Paid).await.unwrap();

        let all = list_debts(&db, None).await.unwrap();
        assert_eq!(all.len(), 2);
        let pending = list_debts(&db, Some(DebtStatus::Pending)).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, "d-1");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn find_open_debt_matches_prefixed_and_bare_phone() {
        let (db, _dir) = setup_db().await;
        // Stored bare-national, looked up country-prefixed.
        create_debt(&db, &make_debt("d-bare", "11987654321", jan(15)))
            .await
            .unwrap();
        let hit = find_open_debt_by_phone(&db, "5511987654321")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(hit.id, "d-bare");

        // Stored prefixed, same lookup.
        create_debt(&db, &make_debt("d-pref", "5521912345678", jan(10)))
            .await
            .unwrap();
        let hit = find_open_debt_by_phone(&db, "5521912345678")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(hit.id, "d-pref");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn find_open_debt_prefers_earliest_due_date() {
        let (db, _dir) = setup_db().await;
        create_debt(&db, &make_debt("d-late", "5511987654321", jan(25)))
            .await
            .unwrap();
        create_debt(&db, &make_debt("d-early", "5511987654321", jan(5)))
            .await
            .unwrap();

        let hit = find_open_debt_by_phone(&db, "5511987654321")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(hit.id, "d-early");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn find_open_debt_skips_non_pending() {
        let (db, _dir) = setup_db().await;
        create_debt(&db, &make_debt("d-1", "5511987654321", jan(15)))
            .await
            .unwrap();
        update_debt_status(&db, "d-1", DebtStatus::Paid).await.unwrap();

        assert!(find_open_debt_by_phone(&db, "5511987654321")
            .await
            .unwrap()
            .is_none());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn status_transition_validates_edges() {
        let (db, _dir) = setup_db().await;
        create_debt(&db, &make_debt("d-1", "5511987654321", jan(15)))
            .await
            .unwrap();

        let debt = update_debt_status(&db, "d-1", DebtStatus::Paid).await.unwrap();
        assert_eq!(debt.status, DebtStatus::Paid);

        // Settled debts never slide back into renegotiation.
        let err = update_debt_status(&db, "d-1", DebtStatus::Renegotiating)
            .await
            .unwrap_err();
        assert!(matches!(err, RecobraError::InvalidTransition { .. }));

        // Same-status write is a no-op, not an error.
        let debt = update_debt_status(&db, "d-1", DebtStatus::Paid).await.unwrap();
        assert_eq!(debt.status, DebtStatus::Paid);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn update_debt_patches_fields() {
        let (db, _dir) = setup_db().await;
        create_debt(&db, &make_debt("d-1", "5511987654321", jan(15)))
            .await
            .unwrap();

        let patch = DebtPatch {
            amount: Some(200.0),
            notes: Some(Some("parcelou".to_string())),
            ..Default::default()
        };
        let updated = update_debt(&db, "d-1", patch).await.unwrap();
        assert_eq!(updated.amount, 200.0);
        assert_eq!(updated.notes.as_deref(), Some("parcelou"));
        assert_eq!(updated.debtor_name, "Maria Silva");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn due_date_frozen_after_cadence_execution() {
        let (db, _dir) = setup_db().await;
        create_debt(&db, &make_debt("d-1", "5511987654321", jan(15)))
            .await
            .unwrap();
        crate::queries::cadence::record_execution(
            &db,
            "d-1",
            recobra_core::types::CadenceStep::DMinus2,
            None,
        )
        .await
        .unwrap();

        let patch = DebtPatch {
            due_date: Some(jan(20)),
            ..Default::default()
        };
        let err = update_debt(&db, "d-1", patch).await.unwrap_err();
        assert!(matches!(err, RecobraError::Validation(_)));

        // Other fields stay editable.
        let patch = DebtPatch {
            amount: Some(300.0),
            ..Default::default()
        };
        assert!(update_debt(&db, "d-1", patch).await.is_ok());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn delete_debt_removes_row() {
        let (db, _dir) = setup_db().await;
        create_debt(&db, &make_debt("d-1", "5511987654321", jan(15)))
            .await
            .unwrap();
        delete_debt(&db, "d-1").await.unwrap();
        assert!(get_debt(&db, "d-1").await.unwrap().is_none());

        let err = delete_debt(&db, "d-1").await.unwrap_err();
        assert!(matches!(err, RecobraError::NotFound { .. }));

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn bulk_create_is_transactional() {
        let (db, _dir) = setup_db().await;
        let batch = vec![
            make_debt("b-1", "5511987654321", jan(10)),
            make_debt("b-2", "5511987654322", jan(11)),
            make_debt("b-3", "5511987654323", jan(12)),
        ];
        let n = create_debts(&db, batch).await.unwrap();
        assert_eq!(n, 3);
        assert_eq!(list_debts(&db, None).await.unwrap().len(), 3);

        // Duplicate id in the batch rolls the whole batch back.
        let bad = vec![
            make_debt("b-4", "5511987654324", jan(13)),
            make_debt("b-1", "5511987654321", jan(10)),
        ];
        assert!(create_debts(&db, bad).await.is_err());
        assert_eq!(list_debts(&db, None).await.unwrap().len(), 3);

        db.close().await.unwrap();
    }
}
