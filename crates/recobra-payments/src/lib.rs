// SPDX-FileCopyrightText: 2026 Recobra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pix payment gateway adapters for the Recobra collection service.
//!
//! One [`PaymentProvider`] implementation per gateway, each carrying only
//! its own credential shape. [`create_provider`] is the configuration-driven
//! factory; everything downstream of it works against the trait.

pub mod asaas;
pub mod efi;
pub mod mercadopago;
pub mod webhook;

use std::sync::Arc;

use recobra_config::model::PaymentsConfig;
use recobra_core::error::RecobraError;
use recobra_core::traits::PaymentProvider;

pub use asaas::AsaasProvider;
pub use efi::EfiProvider;
pub use mercadopago::MercadoPagoProvider;
pub use webhook::{parse_webhook, PaymentEvent};

/// Build the configured payment provider.
pub fn create_provider(
    config: &PaymentsConfig,
) -> Result<Arc<dyn PaymentProvider>, RecobraError> {
    match config.provider.as_str() {
        "asaas" => {
            let api_key = config.asaas_api_key.as_deref().ok_or_else(|| {
                RecobraError::Config("payments.asaas_api_key is required for asaas".into())
            })?;
            Ok(Arc::new(AsaasProvider::new(api_key)?))
        }
        "efi" => {
            let credentials = config.efi_credentials.as_deref().ok_or_else(|| {
                RecobraError::Config("payments.efi_credentials is required for efi".into())
            })?;
            let pix_key = config.efi_pix_key.as_deref().ok_or_else(|| {
                RecobraError::Config("payments.efi_pix_key is required for efi".into())
            })?;
            Ok(Arc::new(EfiProvider::new(credentials, pix_key)?))
        }
        "mercadopago" => {
            let access_token = config.mercadopago_access_token.as_deref().ok_or_else(|| {
                RecobraError::Config(
                    "payments.mercadopago_access_token is required for mercadopago".into(),
                )
            })?;
            Ok(Arc::new(MercadoPagoProvider::new(access_token)?))
        }
        other => Err(RecobraError::Config(format!(
            "unsupported payment gateway `{other}`"
        ))),
    }
}

pub(crate) fn http_client() -> Result<reqwest::Client, RecobraError> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .build()
        .map_err(|e| RecobraError::Payment {
            message: format!("failed to build HTTP client: {e}"),
            source: Some(Box::new(e)),
        })
}

pub(crate) fn payment_err(context: &str) -> impl Fn(reqwest::Error) -> RecobraError + '_ {
    move |e| RecobraError::Payment {
        message: format!("{context}: {e}"),
        source: Some(Box::new(e)),
    }
}
