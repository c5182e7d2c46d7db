// SPDX-FileCopyrightText: 2026 Recobra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as valid bind addresses, known gateway names, and credential pairing.

use crate::diagnostic::ConfigError;
use crate::model::RecobraConfig;

const KNOWN_PROVIDERS: &[&str] = &["asaas", "efi", "mercadopago"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &RecobraConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    // Validate bind_address is a plausible IP or hostname
    let addr = config.gateway.bind_address.trim();
    if addr.is_empty() {
        errors.push(ConfigError::Validation {
            message: "gateway.bind_address must not be empty".to_string(),
        });
    } else {
        let is_valid_ip = addr.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = addr
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            errors.push(ConfigError::Validation {
                message: format!(
                    "gateway.bind_address `{addr}` is not a valid IP address or hostname"
                ),
            });
        }
    }

    // Validate database_path is not empty
    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    // Validate payment provider is one we know how to talk to
    let provider = config.payments.provider.as_str();
    if !KNOWN_PROVIDERS.contains(&provider) {
        errors.push(ConfigError::Validation {
            message: format!(
                "payments.provider must be one of {}, got `{provider}`",
                KNOWN_PROVIDERS.join(", ")
            ),
        });
    }

    // Efi needs both credentials and a pix key
    if provider == "efi" && config.payments.efi_credentials.is_some()
        && config.payments.efi_pix_key.is_none()
    {
        errors.push(ConfigError::Validation {
            message: "payments.efi_pix_key is required when efi credentials are set".to_string(),
        });
    }

    if config.payments.charge_expiry_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "payments.charge_expiry_secs must be greater than zero".to_string(),
        });
    }

    // WhatsApp credentials come as a pair
    let has_phone_id = config.whatsapp.phone_number_id.is_some();
    let has_token = config.whatsapp.access_token.is_some();
    if has_phone_id != has_token {
        errors.push(ConfigError::Validation {
            message:
                "whatsapp.phone_number_id and whatsapp.access_token must be set together"
                    .to_string(),
        });
    }

    if let Some(secret) = &config.cron.shared_secret
        && secret.trim().is_empty()
    {
        errors.push(ConfigError::Validation {
            message: "cron.shared_secret must not be empty when set".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
