// SPDX-FileCopyrightText: 2026 Recobra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Asaas Pix gateway adapter.
//!
//! Charge creation is a three-call flow: register the customer, create the
//! PIX billing, then fetch its copy-and-paste payload and QR image.

use async_trait::async_trait;
use recobra_core::error::RecobraError;
use recobra_core::traits::{PaymentProvider, PluginAdapter};
use recobra_core::types::{
    AdapterType, ChargeStatusInfo, HealthStatus, PixChargeRequest, PixChargeResponse,
};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::{http_client, payment_err};

const DEFAULT_API_BASE: &str = "https://api.asaas.com/v3";

/// CPF placeholder Asaas accepts when the debtor's document is unknown.
const GENERIC_CPF: &str = "00000000000";

pub struct AsaasProvider {
    http: reqwest::Client,
    api_base: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct Customer {
    id: String,
}

#[derive(Debug, Deserialize)]
struct Billing {
    id: String,
    status: Option<String>,
    value: Option<f64>,
    #[serde(rename = "paymentDate")]
    payment_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PixQrCode {
    payload: String,
    #[serde(rename = "encodedImage")]
    encoded_image: Option<String>,
}

impl AsaasProvider {
    pub fn new(api_key: &str) -> Result<Self, RecobraError> {
        Self::with_base_url(api_key, DEFAULT_API_BASE)
    }

    pub fn with_base_url(api_key: &str, api_base: &str) -> Result<Self, RecobraError> {
        Ok(Self {
            http: http_client()?,
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    async fn parse_or_fail<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
        context: &str,
    ) -> Result<T, RecobraError> {
        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(RecobraError::payment(format!(
                "{context}: asaas API error {status}: {detail}"
            )));
        }
        response.json().await.map_err(payment_err(context))
    }
}

#[async_trait]
impl PluginAdapter for AsaasProvider {
    fn name(&self) -> &str {
        "asaas"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Payment
    }

    async fn health_check(&self) -> Result<HealthStatus, RecobraError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), RecobraError> {
        Ok(())
    }
}

#[async_trait]
impl PaymentProvider for AsaasProvider {
    async fn create_pix_charge(
        &self,
        request: &PixChargeRequest,
    ) -> Result<PixChargeResponse, RecobraError> {
        let response = self
            .http
            .post(format!("{}/customers", self.api_base))
            .header("access_token", &self.api_key)
            .json(&json!({
                "name": request.debtor_name,
                "phone": request.debtor_phone,
                "cpfCnpj": GENERIC_CPF,
            }))
            .send()
            .await
            .map_err(payment_err("asaas customer creation failed"))?;
        let customer: Customer =
            Self::parse_or_fail(response, "asaas customer creation").await?;

        let due_date = (chrono::Utc::now()
            + chrono::Duration::seconds(request.expiry_secs as i64))
        .format("%Y-%m-%d")
        .to_string();

        let response = self
            .http
            .post(format!("{}/payments", self.api_base))
            .header("access_token", &self.api_key)
            .json(&json!({
                "customer": customer.id,
                "billingType": "PIX",
                "value": request.amount,
                "description": request.description,
                "dueDate": due_date,
            }))
            .send()
            .await
            .map_err(payment_err("asaas charge creation failed"))?;
        let billing: Billing = Self::parse_or_fail(response, "asaas charge creation").await?;

        let response = self
            .http
            .get(format!("{}/payments/{}/pixQrCode", self.api_base, billing.id))
            .header("access_token", &self.api_key)
            .send()
            .await
            .map_err(payment_err("asaas QR code fetch failed"))?;
        let qr: PixQrCode = Self::parse_or_fail(response, "asaas QR code fetch").await?;

        debug!(charge_id = %billing.id, "asaas charge created");

        Ok(PixChargeResponse {
            provider_charge_id: billing.id,
            payment_code: qr.payload,
            qr_code_url: qr
                .encoded_image
                .map(|b64| format!("data:image/png;base64,{b64}")),
            amount: billing.value.unwrap_or(request.amount),
        })
    }

    async fn get_charge_status(&self, charge_id: &str) -> Result<ChargeStatusInfo, RecobraError> {
        let response = self
            .http
            .get(format!("{}/payments/{charge_id}", self.api_base))
            .header("access_token", &self.api_key)
            .send()
            .await
            .map_err(payment_err("asaas status query failed"))?;
        let billing: Billing = Self::parse_or_fail(response, "asaas status query").await?;

        let paid = matches!(billing.status.as_deref(), Some("RECEIVED") | Some("CONFIRMED"));
        Ok(ChargeStatusInfo {
            paid,
            paid_at: billing.payment_date,
        })
    }
}
