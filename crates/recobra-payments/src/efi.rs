// SPDX-FileCopyrightText: 2026 Recobra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Efi (Gerencianet) Pix gateway adapter.
//!
//! Efi's API is OAuth-fronted: every operation first exchanges the client
//! credentials for a short-lived bearer token. The charge id (txid) is
//! generated locally and sent on the PUT.

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

const DEFAULT_API_BASE: &str = "https://pix.api.efipay.com.br";
const GENERIC_CPF: &str = "00000000000";

pub struct EfiProvider {
    http: reqwest::Client,
    api_base: String,
    client_id: String,
    client_secret: String,
    pix_key: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct Cob {
    status: Option<String>,
    loc: Option<Loc>,
    #[serde(default)]
    pix: Vec<PixReceipt>,
}

#[derive(Debug, Deserialize)]
struct Loc {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct PixReceipt {
    horario: Option<String>,
}

#[derive(Debug, Deserialize)]
struct QrCode {
    qrcode: String,
    #[serde(rename = "imagemQrcode")]
    imagem_qrcode: Option<String>,
}

impl EfiProvider {
    /// `credentials` is `client_id:client_secret`.
    pub fn new(credentials: &str, pix_key: &str) -> Result<Self, RecobraError> {
        Self::with_base_url(credentials, pix_key, DEFAULT_API_BASE)
    }

    pub fn with_base_url(
        credentials: &str,
        pix_key: &str,
        api_base: &str,
    ) -> Result<Self, RecobraError> {
        let (client_id, client_secret) = credentials.split_once(':').ok_or_else(|| {
            RecobraError::Config(
                "payments.efi_credentials must be `client_id:client_secret`".into(),
            )
        })?;
        Ok(Self {
            http: http_client()?,
            api_base: api_base.trim_end_matches('/').to_string(),
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            pix_key: pix_key.to_string(),
        })
    }

    async fn access_token(&self) -> Result<String, RecobraError> {
        let response = self
            .http
            .post(format!("{}/oauth/token", self.api_base))
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .json(&json!({"grant_type": "client_credentials"}))
            .send()
            .await
            .map_err(payment_err("efi token exchange failed"))?;

        if !response.status().is_success() {
            return Err(RecobraError::payment(format!(
                "efi token exchange returned {}",
                response.status()
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(payment_err("malformed efi token response"))?;
        Ok(token.access_token)
    }
}

#[async_trait]
impl PluginAdapter for EfiProvider {
    fn name(&self) -> &str {
        "efi"
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
impl PaymentProvider for EfiProvider {
    async fn create_pix_charge(
        &self,
        request: &PixChargeRequest,
    ) -> Result<PixChargeResponse, RecobraError> {
        let token = self.access_token().await?;
        let txid = format!("REC{}", chrono::Utc::now().timestamp_millis());

        let response = self
            .http
            .put(format!("{}/v2/cob/{txid}", self.api_base))
            .bearer_auth(&token)
            .json(&json!({
                "calendario": {"expiracao": request.expiry_secs},
                "devedor": {
                    "nome": request.debtor_name,
                    "cpf": GENERIC_CPF,
                },
                "valor": {"original": format!("{:.2}", request.amount)},
                "chave": self.pix_key,
                "solicitacaoPagador": request.description,
            }))
            .send()
            .await
            .map_err(payment_err("efi charge creation failed"))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(RecobraError::payment(format!(
                "efi API error {status}: {detail}"
            )));
        }

        let cob: Cob = response
            .json()
            .await
            .map_err(payment_err("malformed efi charge response"))?;
        let loc_id = cob
            .loc
            .map(|l| l.id)
            .ok_or_else(|| RecobraError::payment("efi charge response carried no loc"))?;

        let response = self
            .http
            .get(format!("{}/v2/loc/{loc_id}/qrcode", self.api_base))
            .bearer_auth(&token)
            .send()
            .await
            .map_err(payment_err("efi QR code fetch failed"))?;

        if !response.status().is_success() {
            return Err(RecobraError::payment(format!(
                "efi QR code fetch returned {}",
                response.status()
            )));
        }

        let qr: QrCode = response
            .json()
            .await
            .map_err(payment_err("malformed efi QR code response"))?;

        debug!(charge_id = %txid, "efi charge created");

        Ok(PixChargeResponse {
            provider_charge_id: txid,
            payment_code: qr.qrcode,
            qr_code_url: qr.imagem_qrcode,
            amount: request.amount,
        })
    }

    async fn get_charge_status(&self, charge_id: &str) -> Result<ChargeStatusInfo, RecobraError> {
        let token = self.access_token().await?;
        let response = self
            .http
            .get(format!("{}/v2/cob/{charge_id}", self.api_base))
            .bearer_auth(&token)
            .send()
            .await
            .map_err(payment_err("efi status query failed"))?;

        if !response.status().is_success() {
            return Err(RecobraError::payment(format!(
                "efi status query returned {}",
                response.status()
            )));
        }

        let cob: Cob = response
            .json()
            .await
            .map_err(payment_err("malformed efi status response"))?;

        Ok(ChargeStatusInfo {
            paid: cob.status.as_deref() == Some("CONCLUIDA"),
            paid_at: cob.pix.into_iter().next().and_then(|p| p.horario),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn credentials_must_be_colon_separated() {
        assert!(EfiProvider::new("no-separator", "pix@loja.com.br").is_err());
        assert!(EfiProvider::new("id:secret", "pix@loja.com.br").is_ok());
    }

    #[tokio::test]
    async fn create_charge_exchanges_token_then_puts_cob() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "efi-token",
                "token_type": "Bearer",
                "expires_in": 3600,
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path_regex(r"^/v2/cob/REC\d+$"))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "status": "ATIVA",
                "loc": {"id": 789},
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v2/loc/789/qrcode"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "qrcode": "00020126efi-pix",
                "imagemQrcode": "https://efi.example/qr.png",
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider =
            EfiProvider::with_base_url("id:secret", "pix@loja.com.br", &server.uri()).unwrap();
        let request = PixChargeRequest {
            amount: 99.9,
            description: "Pagamento divida".to_string(),
            debtor_name: "Maria Silva".to_string(),
            debtor_phone: "5511987654321".to_string(),
            expiry_secs: 86_400,
        };
        let resp = provider.create_pix_charge(&request).await.unwrap();
        assert!(resp.provider_charge_id.starts_with("REC"));
        assert_eq!(resp.payment_code, "00020126efi-pix");
        assert_eq!(resp.qr_code_url.as_deref(), Some("https://efi.example/qr.png"));
    }

    #[tokio::test]
    async fn status_query_maps_concluida_to_paid() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "efi-token",
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v2/cob/REC123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "CONCLUIDA",
                "pix": [{"horario": "2025-01-16T12:00:00.000Z"}],
            })))
            .mount(&server)
            .await;

        let provider =
            EfiProvider::with_base_url("id:secret", "pix@loja.com.br", &server.uri()).unwrap();
        let info = provider.get_charge_status("REC123").await.unwrap();
        assert!(info.paid);
        assert_eq!(info.paid_at.as_deref(), Some("2025-01-16T12:00:00.000Z"));
    }
}
