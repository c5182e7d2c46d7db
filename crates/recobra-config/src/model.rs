// SPDX-FileCopyrightText: 2026 Recobra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Recobra collection service.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Recobra configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values; sections whose
/// credentials are absent leave the corresponding integration disabled.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RecobraConfig {
    /// Service identity and logging settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// WhatsApp Cloud API settings.
    #[serde(default)]
    pub whatsapp: WhatsappConfig,

    /// Scheduled cadence run settings.
    #[serde(default)]
    pub cron: CronConfig,

    /// Pix payment gateway settings.
    #[serde(default)]
    pub payments: PaymentsConfig,

    /// SMTP settings for operator notifications.
    #[serde(default)]
    pub smtp: SmtpConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// HTTP gateway settings.
    #[serde(default)]
    pub gateway: GatewayConfig,
}

/// Service identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the service instance.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_agent_name() -> String {
    "recobra".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// WhatsApp Cloud API configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WhatsappConfig {
    /// Cloud API phone number id. `None` disables outbound WhatsApp sends.
    #[serde(default)]
    pub phone_number_id: Option<String>,

    /// Cloud API bearer token.
    #[serde(default)]
    pub access_token: Option<String>,

    /// Token echoed back during the webhook verification handshake.
    #[serde(default)]
    pub verify_token: Option<String>,
}

/// Scheduled cadence run configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CronConfig {
    /// Shared secret required as a bearer token on the cadence trigger endpoint.
    #[serde(default)]
    pub shared_secret: Option<String>,
}

/// Pix payment gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PaymentsConfig {
    /// Active gateway: `asaas`, `efi`, or `mercadopago`.
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Asaas API key.
    #[serde(default)]
    pub asaas_api_key: Option<String>,

    /// Efi client credentials, `client_id:client_secret`.
    #[serde(default)]
    pub efi_credentials: Option<String>,

    /// Pix key registered with Efi, required when `provider = "efi"`.
    #[serde(default)]
    pub efi_pix_key: Option<String>,

    /// Mercado Pago access token.
    #[serde(default)]
    pub mercadopago_access_token: Option<String>,

    /// Optional per-gateway webhook token, checked against `X-Webhook-Token`.
    #[serde(default)]
    pub webhook_token: Option<String>,

    /// Pix charge expiry in seconds.
    #[serde(default = "default_charge_expiry_secs")]
    pub charge_expiry_secs: u32,
}

impl Default for PaymentsConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            asaas_api_key: None,
            efi_credentials: None,
            efi_pix_key: None,
            mercadopago_access_token: None,
            webhook_token: None,
            charge_expiry_secs: default_charge_expiry_secs(),
        }
    }
}

fn default_provider() -> String {
    "mercadopago".to_string()
}

fn default_charge_expiry_secs() -> u32 {
    86_400 // 24h
}

/// SMTP configuration for operator email notifications.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SmtpConfig {
    /// SMTP relay hostname. `None` disables email notifications.
    #[serde(default)]
    pub host: Option<String>,

    /// SMTP relay port.
    #[serde(default = "default_smtp_port")]
    pub port: u16,

    /// SMTP username.
    #[serde(default)]
    pub username: Option<String>,

    /// SMTP password.
    #[serde(default)]
    pub password: Option<String>,

    /// From address for outgoing notifications.
    #[serde(default = "default_smtp_from")]
    pub from: String,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: None,
            port: default_smtp_port(),
            username: None,
            password: None,
            from: default_smtp_from(),
        }
    }
}

fn default_smtp_port() -> u16 {
    587
}

fn default_smtp_from() -> String {
    "recobra@localhost".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("recobra").join("recobra.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("recobra.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// HTTP gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Address to bind the server to.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
        }
    }
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}
