// SPDX-FileCopyrightText: 2026 Recobra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background thread.
//! Do NOT create additional Connection instances for writes.

use std::path::Path;

use recobra_core::RecobraError;
use tracing::info;

/// Handle to the SQLite database. Cloneable; all clones share the single
/// background connection thread.
#[derive(Clone)]
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open (creating if necessary) the database at `path`, apply PRAGMAs,
    /// and run any pending migrations. WAL mode is enabled.
    pub async fn open(path: &str) -> Result<Self, RecobraError> {
        Self::open_with(path, true).await
    }

    /// Open with explicit control over WAL mode.
    pub async fn open_with(path: &str, wal_mode: bool) -> Result<Self, RecobraError> {
        if let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| RecobraError::Storage {
                source: Box::new(e),
            })?;
        }

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(|e| map_tr_err(tokio_rusqlite::Error::from(e)))?;

        conn.call(move |conn| -> Result<(), RecobraError> {
            if wal_mode {
                conn.pragma_update(None, "journal_mode", "WAL")
                    .map_err(map_sqlite_err)?;
            }
            conn.pragma_update(None, "synchronous", "NORMAL")
                .map_err(map_sqlite_err)?;
            conn.pragma_update(None, "foreign_keys", "ON")
                .map_err(map_sqlite_err)?;
            conn.pragma_update(None, "busy_timeout", 5000)
                .map_err(map_sqlite_err)?;
            crate::migrations::run_migrations(conn)?;
            Ok(())
        })
        .await
        .map_err(|e| RecobraError::Storage {
            source: Box::new(e),
        })?;

        info!(path, wal_mode, "database opened");
        Ok(Self { conn })
    }

    /// Access the underlying tokio-rusqlite connection for queries.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Flush and close the connection.
    pub async fn close(self) -> Result<(), RecobraError> {
        self.conn.close().await.map_err(map_tr_err)
    }
}

/// Map a tokio-rusqlite error into the crate error type.
pub fn map_tr_err(e: tokio_rusqlite::Error) -> RecobraError {
    RecobraError::Storage {
        source: Box::new(e),
    }
}

/// Map a raw rusqlite error into the crate error type.
fn map_sqlite_err(e: rusqlite::Error) -> RecobraError {
    RecobraError::Storage {
        source: Box::new(e),
    }
}
