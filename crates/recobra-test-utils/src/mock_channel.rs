// SPDX-FileCopyrightText: 2026 Recobra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock messaging channel for deterministic testing.
//!
//! Captures every outbound send for assertion and can be scripted to fail,
//! which is how cadence error-counting paths get exercised.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use recobra_core::error::RecobraError;
use recobra_core::traits::{MessagingChannel, PluginAdapter};
use recobra_core::types::{AdapterType, HealthStatus};

/// One captured outbound send.
#[derive(Debug, Clone)]
pub struct SentText {
    pub to: String,
    pub body: String,
    pub provider_message_id: String,
}

/// A mock messaging channel for testing.
pub struct MockChannel {
    sent: Arc<Mutex<Vec<SentText>>>,
    fail_sends: AtomicBool,
    counter: AtomicU64,
}

impl MockChannel {
    pub fn new() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            fail_sends: AtomicBool::new(false),
            counter: AtomicU64::new(0),
        }
    }

    /// When set, every subsequent send fails with a channel error.
    pub fn set_failing(&self, failing: bool) {
        self.fail_sends.store(failing, Ordering::SeqCst);
    }

    /// All sends captured so far.
    pub async fn sent_messages(&self) -> Vec<SentText> {
        self.sent.lock().await.clone()
    }

    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }

    pub async fn clear_sent(&self) {
        self.sent.lock().await.clear();
    }
}

impl Default for MockChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockChannel {
    fn name(&self) -> &str {
        "mock-channel"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, RecobraError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), RecobraError> {
        Ok(())
    }
}

#[async_trait]
impl MessagingChannel for MockChannel {
    async fn send_text(&self, to: &str, body: &str) -> Result<String, RecobraError> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(RecobraError::channel("mock channel scripted to fail"));
        }
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        let id = format!("wamid.mock-{n}");
        self.sent.lock().await.push(SentText {
            to: to.to_string(),
            body: body.to_string(),
            provider_message_id: id.clone(),
        });
        Ok(id)
    }
}
