// SPDX-FileCopyrightText: 2026 Recobra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query modules for CRUD operations on storage entities.

pub mod cadence;
pub mod charges;
pub mod debts;
pub mod messages;
pub mod operators;
pub mod renegotiations;

use std::str::FromStr;

use chrono::NaiveDate;

/// Parse a TEXT column holding one of the strum-backed status enums.
pub(crate) fn column_enum<T>(idx: usize, raw: String) -> Result<T, rusqlite::Error>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.parse().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// Parse a TEXT column holding an ISO calendar date (YYYY-MM-DD).
pub(crate) fn column_date(idx: usize, raw: String) -> Result<NaiveDate, rusqlite::Error> {
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}
