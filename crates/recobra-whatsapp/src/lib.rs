// SPDX-FileCopyrightText: 2026 Recobra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WhatsApp Cloud API channel adapter for the Recobra collection service.
//!
//! Implements [`MessagingChannel`] against the Meta graph API. Outbound
//! sends go through [`CloudApiChannel::send_text`]; inbound traffic arrives
//! over the webhook and is parsed by the types in [`webhook`].

pub mod webhook;

use std::time::Duration;

use async_trait::async_trait;
use recobra_config::model::WhatsappConfig;
use recobra_core::error::RecobraError;
use recobra_core::traits::{MessagingChannel, PluginAdapter};
use recobra_core::types::{AdapterType, HealthStatus};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

const DEFAULT_API_BASE: &str = "https://graph.facebook.com/v18.0";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// WhatsApp Cloud API channel implementing [`MessagingChannel`].
pub struct CloudApiChannel {
    http: reqwest::Client,
    api_base: String,
    phone_number_id: String,
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    #[serde(default)]
    messages: Vec<SentMessage>,
}

#[derive(Debug, Deserialize)]
struct SentMessage {
    id: String,
}

impl CloudApiChannel {
    /// Creates a new Cloud API channel.
    ///
    /// Requires `whatsapp.phone_number_id` and `whatsapp.access_token`.
    pub fn new(config: &WhatsappConfig) -> Result<Self, RecobraError> {
        Self::with_base_url(config, DEFAULT_API_BASE)
    }

    /// Creates a channel pointed at an explicit API base URL (for tests).
    pub fn with_base_url(config: &WhatsappConfig, api_base: &str) -> Result<Self, RecobraError> {
        let phone_number_id = config
            .phone_number_id
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                RecobraError::Config(
                    "whatsapp.phone_number_id is required for the Cloud API channel".into(),
                )
            })?;
        let access_token = config
            .access_token
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                RecobraError::Config(
                    "whatsapp.access_token is required for the Cloud API channel".into(),
                )
            })?;

        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| RecobraError::Channel {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            phone_number_id: phone_number_id.to_string(),
            access_token: access_token.to_string(),
        })
    }
}

#[async_trait]
impl PluginAdapter for CloudApiChannel {
    fn name(&self) -> &str {
        "whatsapp-cloud-api"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, RecobraError> {
        let url = format!("{}/{}", self.api_base, self.phone_number_id);
        match self
            .http
            .get(&url)
            .bearer_auth(&self.access_token)
            .send()
            .await
        {
            Ok(resp) if resp.status().is_success() => Ok(HealthStatus::Healthy),
            Ok(resp) => Ok(HealthStatus::Unhealthy(format!(
                "Cloud API returned {}",
                resp.status()
            ))),
            Err(e) => Ok(HealthStatus::Unhealthy(format!(
                "Cloud API unreachable: {e}"
            ))),
        }
    }

    async fn shutdown(&self) -> Result<(), RecobraError> {
        debug!("WhatsApp channel shutting down");
        Ok(())
    }
}

#[async_trait]
impl MessagingChannel for CloudApiChannel {
    async fn send_text(&self, to: &str, body: &str) -> Result<String, RecobraError> {
        let recipient = recobra_phone::normalize(to);
        let url = format!("{}/{}/messages", self.api_base, self.phone_number_id);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&json!({
                "messaging_product": "whatsapp",
                "recipient_type": "individual",
                "to": recipient,
                "type": "text",
                "text": {
                    "preview_url": false,
                    "body": body,
                },
            }))
            .send()
            .await
            .map_err(|e| RecobraError::Channel {
                message: format!("WhatsApp send failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(RecobraError::channel(format!(
                "WhatsApp API error {status}: {detail}"
            )));
        }

        let parsed: SendResponse = response.json().await.map_err(|e| RecobraError::Channel {
            message: format!("malformed WhatsApp API response: {e}"),
            source: Some(Box::new(e)),
        })?;

        let id = parsed
            .messages
            .into_iter()
            .next()
            .map(|m| m.id)
            .ok_or_else(|| RecobraError::channel("WhatsApp API response carried no message id"))?;

        debug!(to = %recipient, message_id = %id, "WhatsApp message sent");
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(phone_id: Option<&str>, token: Option<&str>) -> WhatsappConfig {
        WhatsappConfig {
            phone_number_id: phone_id.map(|s| s.to_string()),
            access_token: token.map(|s| s.to_string()),
            verify_token: Some("verify-me".to_string()),
        }
    }

    #[test]
    fn new_requires_credentials() {
        assert!(CloudApiChannel::new(&config(None, Some("t"))).is_err());
        assert!(CloudApiChannel::new(&config(Some("123"), None)).is_err());
        assert!(CloudApiChannel::new(&config(Some(""), Some("t"))).is_err());
        assert!(CloudApiChannel::new(&config(Some("123"), Some("t"))).is_ok());
    }

    #[test]
    fn plugin_adapter_metadata() {
        let channel = CloudApiChannel::new(&config(Some("123"), Some("t"))).unwrap();
        assert_eq!(channel.name(), "whatsapp-cloud-api");
        assert_eq!(channel.adapter_type(), AdapterType::Channel);
    }

    #[tokio::test]
    async fn send_text_posts_cloud_api_shape() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/123/messages"))
            .and(header("authorization", "Bearer secret-token"))
            .and(body_partial_json(json!({
                "messaging_product": "whatsapp",
                "to": "5511987654321",
                "type": "text",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "messaging_product": "whatsapp",
                "contacts": [{"input": "5511987654321", "wa_id": "5511987654321"}],
                "messages": [{"id": "wamid.ABC123"}],
            })))
            .expect(1)
            .mount(&server)
            .await;

        let channel =
            CloudApiChannel::with_base_url(&config(Some("123"), Some("secret-token")), &server.uri())
                .unwrap();

        // The raw national number is normalized before hitting the API.
        let id = channel.send_text("(11) 98765-4321", "Ola!").await.unwrap();
        assert_eq!(id, "wamid.ABC123");
    }

    #[tokio::test]
    async fn send_text_surfaces_api_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/123/messages"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": {"code": 131030, "message": "number not on WhatsApp"},
            })))
            .mount(&server)
            .await;

        let channel =
            CloudApiChannel::with_base_url(&config(Some("123"), Some("t")), &server.uri()).unwrap();
        let err = channel.send_text("5511987654321", "Ola!").await.unwrap_err();
        assert!(matches!(err, RecobraError::Channel { .. }));
    }
}
