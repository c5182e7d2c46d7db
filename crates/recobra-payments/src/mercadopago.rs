// SPDX-FileCopyrightText: 2026 Recobra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mercado Pago Pix gateway adapter.

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

const DEFAULT_API_BASE: &str = "https://api.mercadopago.com";

pub struct MercadoPagoProvider {
    http: reqwest::Client,
    api_base: String,
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct Payment {
    id: serde_json::Value,
    status: Option<String>,
    transaction_amount: Option<f64>,
    date_approved: Option<String>,
    point_of_interaction: Option<PointOfInteraction>,
}

#[derive(Debug, Deserialize)]
struct PointOfInteraction {
    transaction_data: Option<TransactionData>,
}

#[derive(Debug, Deserialize)]
struct TransactionData {
    qr_code: Option<String>,
    qr_code_base64: Option<String>,
}

impl MercadoPagoProvider {
    pub fn new(access_token: &str) -> Result<Self, RecobraError> {
        Self::with_base_url(access_token, DEFAULT_API_BASE)
    }

    pub fn with_base_url(access_token: &str, api_base: &str) -> Result<Self, RecobraError> {
        Ok(Self {
            http: http_client()?,
            api_base: api_base.trim_end_matches('/').to_string(),
            access_token: access_token.to_string(),
        })
    }
}

#[async_trait]
impl PluginAdapter for MercadoPagoProvider {
    fn name(&self) -> &str {
        "mercadopago"
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
impl PaymentProvider for MercadoPagoProvider {
    async fn create_pix_charge(
        &self,
        request: &PixChargeRequest,
    ) -> Result<PixChargeResponse, RecobraError> {
        let mut names = request.debtor_name.split_whitespace();
        let first_name = names.next().unwrap_or("Cliente").to_string();
        let last_name = {
            let rest = names.collect::<Vec<_>>().join(" ");
            if rest.is_empty() { "Cliente".to_string() } else { rest }
        };
        let idempotency_key = format!("REC{}", chrono::Utc::now().timestamp_millis());

        let response = self
            .http
            .post(format!("{}/v1/payments", self.api_base))
            .bearer_auth(&self.access_token)
            .header("X-Idempotency-Key", idempotency_key)
            .json(&json!({
                "transaction_amount": request.amount,
                "description": request.description,
                "payment_method_id": "pix",
                "payer": {
                    "first_name": first_name,
                    "last_name": last_name,
                    "email": "cliente@email.com",
                },
            }))
            .send()
            .await
            .map_err(payment_err("mercadopago charge creation failed"))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(RecobraError::payment(format!(
                "mercadopago API error {status}: {detail}"
            )));
        }

        let payment: Payment = response
            .json()
            .await
            .map_err(payment_err("malformed mercadopago response"))?;

        let transaction_data = payment
            .point_of_interaction
            .and_then(|p| p.transaction_data);
        let payment_code = transaction_data
            .as_ref()
            .and_then(|t| t.qr_code.clone())
            .ok_or_else(|| RecobraError::payment("mercadopago response carried no qr_code"))?;
        let qr_code_url = transaction_data
            .and_then(|t| t.qr_code_base64)
            .map(|b64| format!("data:image/png;base64,{b64}"));

        let provider_charge_id = json_id_to_string(&payment.id);
        debug!(charge_id = %provider_charge_id, "mercadopago charge created");

        Ok(PixChargeResponse {
            provider_charge_id,
            payment_code,
            qr_code_url,
            amount: payment.transaction_amount.unwrap_or(request.amount),
        })
    }

    async fn get_charge_status(&self, charge_id: &str) -> Result<ChargeStatusInfo, RecobraError> {
        let response = self
            .http
            .get(format!("{}/v1/payments/{charge_id}", self.api_base))
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(payment_err("mercadopago status query failed"))?;

        if !response.status().is_success() {
            return Err(RecobraError::payment(format!(
                "mercadopago status query returned {}",
                response.status()
            )));
        }

        let payment: Payment = response
            .json()
            .await
            .map_err(payment_err("malformed mercadopago response"))?;

        Ok(ChargeStatusInfo {
            paid: payment.status.as_deref() == Some("approved"),
            paid_at: payment.date_approved,
        })
    }
}

/// Mercado Pago returns payment ids as JSON numbers; webhooks sometimes
/// carry them as strings. Normalize both to the string form we store.
pub(crate) fn json_id_to_string(id: &serde_json::Value) -> String {
    match id {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn charge_request() -> PixChargeRequest {
        PixChargeRequest {
            amount: 150.0,
            description: "Pagamento divida - Maria Silva".to_string(),
            debtor_name: "Maria Silva".to_string(),
            debtor_phone: "5511987654321".to_string(),
            expiry_secs: 86_400,
        }
    }

    #[tokio::test]
    async fn create_charge_parses_pix_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/payments"))
            .and(header_exists("x-idempotency-key"))
            .and(body_partial_json(serde_json::json!({
                "payment_method_id": "pix",
                "transaction_amount": 150.0,
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "id": 12345678901i64,
                "status": "pending",
                "transaction_amount": 150.0,
                "point_of_interaction": {
                    "transaction_data": {
                        "qr_code": "00020126pix-code",
                        "qr_code_base64": "aGVsbG8=",
                    }
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = MercadoPagoProvider::with_base_url("token", &server.uri()).unwrap();
        let resp = provider.create_pix_charge(&charge_request()).await.unwrap();
        assert_eq!(resp.provider_charge_id, "12345678901");
        assert_eq!(resp.payment_code, "00020126pix-code");
        assert!(resp.qr_code_url.unwrap().starts_with("data:image/png;base64,"));
        assert_eq!(resp.amount, 150.0);
    }

    #[tokio::test]
    async fn status_query_maps_approved_to_paid() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/payments/12345"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": 12345,
                "status": "approved",
                "date_approved": "2025-01-16T12:00:00.000-03:00",
            })))
            .mount(&server)
            .await;

        let provider = MercadoPagoProvider::with_base_url("token", &server.uri()).unwrap();
        let info = provider.get_charge_status("12345").await.unwrap();
        assert!(info.paid);
        assert!(info.paid_at.is_some());
    }

    #[test]
    fn json_ids_normalize_to_strings() {
        assert_eq!(json_id_to_string(&serde_json::json!(42)), "42");
        assert_eq!(json_id_to_string(&serde_json::json!("42")), "42");
    }
}
