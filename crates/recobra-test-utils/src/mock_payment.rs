// SPDX-FileCopyrightText: 2026 Recobra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock payment provider returning canned Pix charges.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use recobra_core::error::RecobraError;
use recobra_core::traits::{PaymentProvider, PluginAdapter};
use recobra_core::types::{
    AdapterType, ChargeStatusInfo, HealthStatus, PixChargeRequest, PixChargeResponse,
};

/// A mock payment provider for testing.
///
/// Charges get sequential ids (`mock-charge-0`, ...) and a predictable
/// payment code. Status queries answer from a scriptable map and default
/// to unpaid.
pub struct MockPaymentProvider {
    counter: AtomicU64,
    fail_charges: AtomicBool,
    statuses: Mutex<HashMap<String, ChargeStatusInfo>>,
    created: Mutex<Vec<PixChargeRequest>>,
}

impl MockPaymentProvider {
    pub fn new() -> Self {
        Self {
            counter: AtomicU64::new(0),
            fail_charges: AtomicBool::new(false),
            statuses: Mutex::new(HashMap::new()),
            created: Mutex::new(Vec::new()),
        }
    }

    /// When set, every subsequent charge creation fails.
    pub fn set_failing(&self, failing: bool) {
        self.fail_charges.store(failing, Ordering::SeqCst);
    }

    /// Scripts the answer for a later `get_charge_status` call.
    pub async fn set_status(&self, charge_id: &str, info: ChargeStatusInfo) {
        self.statuses.lock().await.insert(charge_id.to_string(), info);
    }

    /// Charge requests captured so far.
    pub async fn created_charges(&self) -> Vec<PixChargeRequest> {
        self.created.lock().await.clone()
    }
}

impl Default for MockPaymentProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockPaymentProvider {
    fn name(&self) -> &str {
        "mock-payment"
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
impl PaymentProvider for MockPaymentProvider {
    async fn create_pix_charge(
        &self,
        request: &PixChargeRequest,
    ) -> Result<PixChargeResponse, RecobraError> {
        if self.fail_charges.load(Ordering::SeqCst) {
            return Err(RecobraError::payment("mock provider scripted to fail"));
        }
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        self.created.lock().await.push(request.clone());
        Ok(PixChargeResponse {
            provider_charge_id: format!("mock-charge-{n}"),
            payment_code: format!("00020126mockpix{n}6304ABCD"),
            qr_code_url: None,
            amount: request.amount,
        })
    }

    async fn get_charge_status(
        &self,
        charge_id: &str,
    ) -> Result<ChargeStatusInfo, RecobraError> {
        let statuses = self.statuses.lock().await;
        Ok(statuses.get(charge_id).cloned().unwrap_or(ChargeStatusInfo {
            paid: false,
            paid_at: None,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sequential_ids_and_scripted_status() {
        let provider = MockPaymentProvider::new();
        let request = PixChargeRequest {
            amount: 150.0,
            description: "Divida".to_string(),
            debtor_name: "Maria Silva".to_string(),
            debtor_phone: "5511987654321".to_string(),
            expiry_secs: 86400,
        };
        let first = provider.create_pix_charge(&request).await.unwrap();
        assert_eq!(first.provider_charge_id, "mock-charge-0");

        let status = provider.get_charge_status("mock-charge-0").await.unwrap();
        assert!(!status.paid);

        provider
            .set_status(
                "mock-charge-0",
                ChargeStatusInfo { paid: true, paid_at: Some("2025-01-15T12:00:00Z".into()) },
            )
            .await;
        let status = provider.get_charge_status("mock-charge-0").await.unwrap();
        assert!(status.paid);
    }
}
