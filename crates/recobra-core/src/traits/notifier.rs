// SPDX-FileCopyrightText: 2026 Recobra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Owner notification trait.

use async_trait::async_trait;

use crate::error::RecobraError;
use crate::traits::adapter::PluginAdapter;
use crate::types::RenegotiationNotice;

/// Adapter that alerts the store operator when a debtor signals intent to
/// pay or negotiate.
///
/// Notification is best-effort: the inbound pipeline logs failures and
/// moves on. A failed notification leaves the renegotiation's notified
/// flag unset so a later reply re-triggers it.
#[async_trait]
pub trait OwnerNotifier: PluginAdapter {
    /// Delivers a renegotiation notice to the operator.
    async fn notify_renegotiation(
        &self,
        notice: &RenegotiationNotice,
    ) -> Result<(), RecobraError>;
}
