// SPDX-FileCopyrightText: 2026 Recobra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared database fixtures for integration tests.

use chrono::NaiveDate;
use tempfile::TempDir;

use recobra_core::types::{now_iso, Debt, DebtStatus, Operator};
use recobra_storage::database::Database;
use recobra_storage::queries;

/// Opens a fresh migrated database backed by a temp directory.
///
/// The `TempDir` must be kept alive for the lifetime of the database.
pub async fn temp_db() -> (Database, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("test.db");
    let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
    (db, dir)
}

/// Inserts a pending debt owned by `op-1` and returns it.
pub async fn seed_debt(db: &Database, id: &str, phone: &str, due: NaiveDate) -> Debt {
    seed_debt_with_amount(db, id, phone, due, 150.0).await
}

pub async fn seed_debt_with_amount(
    db: &Database,
    id: &str,
    phone: &str,
    due: NaiveDate,
    amount: f64,
) -> Debt {
    let debt = Debt {
        id: id.to_string(),
        owner_id: "op-1".to_string(),
        debtor_name: "Maria Silva".to_string(),
        phone: phone.to_string(),
        amount,
        due_date: due,
        status: DebtStatus::Pending,
        notes: None,
        created_at: now_iso(),
        updated_at: now_iso(),
    };
    queries::debts::create_debt(db, &debt).await.unwrap();
    debt
}

/// Inserts an operator with a store name and notification email.
pub async fn seed_operator(db: &Database, id: &str, store_name: &str) -> Operator {
    let operator = Operator {
        id: id.to_string(),
        store_name: Some(store_name.to_string()),
        email: Some("lojista@example.com".to_string()),
        notify_email: true,
        created_at: now_iso(),
    };
    queries::operators::upsert_operator(db, &operator).await.unwrap();
    operator
}
