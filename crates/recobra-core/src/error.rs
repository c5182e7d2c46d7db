// SPDX-FileCopyrightText: 2026 Recobra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Recobra collection engine.

use thiserror::Error;

/// The primary error type used across all Recobra adapter traits and core operations.
#[derive(Debug, Error)]
pub enum RecobraError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, constraint violation).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Messaging channel errors (provider API failure, malformed response, auth).
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Payment provider errors (charge creation failure, status query failure).
    #[error("payment error: {message}")]
    Payment {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Owner notification errors (SMTP transport, message build).
    #[error("notification error: {message}")]
    Notification {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Malformed input at an API/CRUD boundary, surfaced to the caller as 4xx.
    #[error("validation error: {0}")]
    Validation(String),

    /// A referenced entity does not exist, surfaced as 404.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A status transition outside the defined edges was attempted.
    #[error("invalid {entity} transition: {from} -> {to}")]
    InvalidTransition {
        entity: &'static str,
        from: String,
        to: String,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl RecobraError {
    /// Convenience constructor for channel errors without an underlying source.
    pub fn channel(message: impl Into<String>) -> Self {
        RecobraError::Channel {
            message: message.into(),
            source: None,
        }
    }

    /// Convenience constructor for payment errors without an underlying source.
    pub fn payment(message: impl Into<String>) -> Self {
        RecobraError::Payment {
            message: message.into(),
            source: None,
        }
    }

    /// Convenience constructor for notification errors without an underlying source.
    pub fn notification(message: impl Into<String>) -> Self {
        RecobraError::Notification {
            message: message.into(),
            source: None,
        }
    }
}
