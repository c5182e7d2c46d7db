// SPDX-FileCopyrightText: 2026 Recobra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SMTP owner notifications.
//!
//! Sends the store operator a short HTML email whenever a debtor signals
//! interest in paying or negotiating. Delivery is best-effort by contract;
//! callers log failures and move on.

use async_trait::async_trait;
use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use tracing::{debug, info};

use recobra_config::model::SmtpConfig;
use recobra_core::error::RecobraError;
use recobra_core::traits::{OwnerNotifier, PluginAdapter};
use recobra_core::types::{AdapterType, HealthStatus, RenegotiationNotice};

/// Owner notifier backed by an SMTP relay.
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpNotifier {
    /// Build from the `[smtp]` config section. Fails when no host is
    /// configured or the from address does not parse.
    pub fn from_config(config: &SmtpConfig) -> Result<Self, RecobraError> {
        let host = config.host.as_deref().ok_or_else(|| {
            RecobraError::Config("smtp.host is required for email notifications".to_string())
        })?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
            .map_err(|e| RecobraError::Config(format!("invalid smtp relay {host}: {e}")))?
            .port(config.port);
        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        let from = config
            .from
            .parse::<Mailbox>()
            .map_err(|e| RecobraError::Config(format!("invalid smtp.from address: {e}")))?;

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }

    fn build_message(
        &self,
        notice: &RenegotiationNotice,
    ) -> Result<lettre::Message, RecobraError> {
        let to = notice
            .recipient
            .parse::<Mailbox>()
            .map_err(|e| {
                RecobraError::notification(format!(
                    "invalid recipient address {}: {e}",
                    notice.recipient
                ))
            })?;

        lettre::Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(format!("Nova renegociacao - {}", notice.debtor_name))
            .header(ContentType::TEXT_HTML)
            .body(render_body(notice))
            .map_err(|e| {
                RecobraError::notification(format!("failed to build notification email: {e}"))
            })
    }
}

fn render_body(notice: &RenegotiationNotice) -> String {
    let contact = notice.contact_name.as_deref().unwrap_or("-");
    format!(
        "<h2>Novo interesse de pagamento!</h2>\n\
         <p><strong>Cliente:</strong> {debtor} ({contact})</p>\n\
         <p><strong>Telefone:</strong> {phone}</p>\n\
         <p><strong>Valor:</strong> {amount}</p>\n\
         <p><strong>Mensagem:</strong> {message}</p>\n\
         <p>Acesse o sistema para dar andamento a renegociacao.</p>",
        debtor = notice.debtor_name,
        phone = notice.phone,
        amount = notice.amount_formatted,
        message = notice.interest_message,
    )
}

#[async_trait]
impl PluginAdapter for SmtpNotifier {
    fn name(&self) -> &str {
        "smtp"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Notifier
    }

    async fn health_check(&self) -> Result<HealthStatus, RecobraError> {
        match self.transport.test_connection().await {
            Ok(true) => Ok(HealthStatus::Healthy),
            Ok(false) => Ok(HealthStatus::Unhealthy("smtp relay refused NOOP".to_string())),
            Err(e) => Ok(HealthStatus::Unhealthy(e.to_string())),
        }
    }

    async fn shutdown(&self) -> Result<(), RecobraError> {
        Ok(())
    }
}

#[async_trait]
impl OwnerNotifier for SmtpNotifier {
    async fn notify_renegotiation(
        &self,
        notice: &RenegotiationNotice,
    ) -> Result<(), RecobraError> {
        let message = self.build_message(notice)?;
        self.transport
            .send(message)
            .await
            .map_err(|e| RecobraError::notification(format!("smtp send failed: {e}")))?;
        info!(recipient = %notice.recipient, "renegotiation notice delivered");
        Ok(())
    }
}

/// Notifier used when no `[smtp]` host is configured. Drops every notice
/// with a debug log so the inbound pipeline keeps working without email.
#[derive(Debug, Default)]
pub struct DisabledNotifier;

#[async_trait]
impl PluginAdapter for DisabledNotifier {
    fn name(&self) -> &str {
        "disabled"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Notifier
    }

    async fn health_check(&self) -> Result<HealthStatus, RecobraError> {
        Ok(HealthStatus::Degraded(
            "email notifications disabled".to_string(),
        ))
    }

    async fn shutdown(&self) -> Result<(), RecobraError> {
        Ok(())
    }
}

#[async_trait]
impl OwnerNotifier for DisabledNotifier {
    async fn notify_renegotiation(
        &self,
        notice: &RenegotiationNotice,
    ) -> Result<(), RecobraError> {
        debug!(recipient = %notice.recipient, "email notifications disabled, dropping notice");
        Ok(())
    }
}
