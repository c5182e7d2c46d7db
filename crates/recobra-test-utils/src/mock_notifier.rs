// SPDX-FileCopyrightText: 2026 Recobra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock owner notifier capturing renegotiation notices.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use recobra_core::error::RecobraError;
use recobra_core::traits::{OwnerNotifier, PluginAdapter};
use recobra_core::types::{AdapterType, HealthStatus, RenegotiationNotice};

/// A mock owner notifier for testing.
pub struct MockNotifier {
    notices: Mutex<Vec<RenegotiationNotice>>,
    fail_notifies: AtomicBool,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self {
            notices: Mutex::new(Vec::new()),
            fail_notifies: AtomicBool::new(false),
        }
    }

    /// When set, every subsequent notification fails.
    pub fn set_failing(&self, failing: bool) {
        self.fail_notifies.store(failing, Ordering::SeqCst);
    }

    /// All notices captured so far.
    pub async fn notices(&self) -> Vec<RenegotiationNotice> {
        self.notices.lock().await.clone()
    }

    pub async fn notice_count(&self) -> usize {
        self.notices.lock().await.len()
    }
}

impl Default for MockNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockNotifier {
    fn name(&self) -> &str {
        "mock-notifier"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Notifier
    }

    async fn health_check(&self) -> Result<HealthStatus, RecobraError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), RecobraError> {
        Ok(())
    }
}

#[async_trait]
impl OwnerNotifier for MockNotifier {
    async fn notify_renegotiation(
        &self,
        notice: &RenegotiationNotice,
    ) -> Result<(), RecobraError> {
        if self.fail_notifies.load(Ordering::SeqCst) {
            return Err(RecobraError::notification("mock notifier scripted to fail"));
        }
        self.notices.lock().await.push(notice.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn captures_notices_and_scripts_failures() {
        let notifier = MockNotifier::new();
        let notice = RenegotiationNotice {
            recipient: "lojista@example.com".to_string(),
            debtor_name: "Maria Silva".to_string(),
            contact_name: None,
            phone: "5511987654321".to_string(),
            amount_formatted: "R$ 150,00".to_string(),
            interest_message: "quero pagar".to_string(),
        };
        notifier.notify_renegotiation(&notice).await.unwrap();
        assert_eq!(notifier.notice_count().await, 1);

        notifier.set_failing(true);
        assert!(notifier.notify_renegotiation(&notice).await.is_err());
        assert_eq!(notifier.notice_count().await, 1);
    }
}
