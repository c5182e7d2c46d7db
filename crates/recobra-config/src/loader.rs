// SPDX-FileCopyrightText: 2026 Recobra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./recobra.toml` > `~/.config/recobra/recobra.toml` > `/etc/recobra/recobra.toml`
//! with environment variable overrides via `RECOBRA_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::RecobraConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/recobra/recobra.toml` (system-wide)
/// 3. `~/.config/recobra/recobra.toml` (user XDG config)
/// 4. `./recobra.toml` (local directory)
/// 5. `RECOBRA_*` environment variables
pub fn load_config() -> Result<RecobraConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RecobraConfig::default()))
        .merge(Toml::file("/etc/recobra/recobra.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("recobra/recobra.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("recobra.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit config file specification.
pub fn load_config_from_str(toml_content: &str) -> Result<RecobraConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RecobraConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<RecobraConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RecobraConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// CRITICAL: Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names. For example, `RECOBRA_WHATSAPP_ACCESS_TOKEN`
/// must map to `whatsapp.access_token`, not `whatsapp.access.token`.
fn env_provider() -> Env {
    Env::prefixed("RECOBRA_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: RECOBRA_WHATSAPP_ACCESS_TOKEN -> "whatsapp_access_token"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("agent_", "agent.", 1)
            .replacen("whatsapp_", "whatsapp.", 1)
            .replacen("cron_", "cron.", 1)
            .replacen("payments_", "payments.", 1)
            .replacen("smtp_", "smtp.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("gateway_", "gateway.", 1);
        mapped.into()
    })
}
