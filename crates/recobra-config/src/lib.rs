// SPDX-FileCopyrightText: 2026 Recobra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Recobra collection service.
//!
//! Provides TOML configuration parsing with strict validation (`deny_unknown_fields`),
//! XDG file hierarchy lookup, environment variable overrides, and diagnostic
//! error rendering with typo suggestions.
//!
//! # Usage
//!
//! ```no_run
//! use recobra_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("Listening on {}:{}", config.gateway.bind_address, config.gateway.port);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

pub use diagnostic::{render_errors, ConfigError};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::RecobraConfig;

/// Load configuration from the XDG hierarchy and validate it.
///
/// This is the high-level entry point that:
/// 1. Loads config from TOML files + env vars via Figment
/// 2. On success: runs post-deserialization validation
/// 3. On Figment error: converts to miette diagnostics with typo suggestions
///
/// Returns either a valid `RecobraConfig` or a list of diagnostic errors.
pub fn load_and_validate() -> Result<RecobraConfig, Vec<ConfigError>> {
    match loader::load_config() {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(err)),
    }
}

/// Load configuration from a TOML string and validate it.
///
/// Useful for testing and explicit configuration.
pub fn load_and_validate_str(toml_content: &str) -> Result<RecobraConfig, Vec<ConfigError>> {
    match loader::load_config_from_str(toml_content) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_from_str_applies_defaults() {
        let config = load_and_validate_str("").unwrap();
        assert_eq!(config.agent.name, "recobra");
        assert_eq!(config.payments.provider, "mercadopago");
        assert!(config.storage.wal_mode);
    }

    #[test]
    fn load_from_str_rejects_bad_provider() {
        let errors = load_and_validate_str("[payments]\nprovider = \"stripe\"\n").unwrap_err();
        assert!(!errors.is_empty());
    }

    #[test]
    fn load_from_str_overrides_defaults() {
        let config = load_and_validate_str(
            "[gateway]\nbind_address = \"0.0.0.0\"\nport = 3000\n",
        )
        .unwrap();
        assert_eq!(config.gateway.bind_address, "0.0.0.0");
        assert_eq!(config.gateway.port, 3000);
    }
}
