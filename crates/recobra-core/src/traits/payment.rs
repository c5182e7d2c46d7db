// SPDX-FileCopyrightText: 2026 Recobra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Payment provider trait for Pix-style charge integrations.

use async_trait::async_trait;

use crate::error::RecobraError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{ChargeStatusInfo, PixChargeRequest, PixChargeResponse};

/// Adapter for Pix charge creation and status queries.
///
/// One implementation per provider; each carries only its own credential
/// shape. The core never depends on provider-specific fields beyond this
/// normalized contract.
#[async_trait]
pub trait PaymentProvider: PluginAdapter {
    /// Creates a Pix charge and returns the provider charge id plus the
    /// copy-and-paste payment code.
    async fn create_pix_charge(
        &self,
        request: &PixChargeRequest,
    ) -> Result<PixChargeResponse, RecobraError>;

    /// Queries the current status of an existing charge.
    async fn get_charge_status(
        &self,
        charge_id: &str,
    ) -> Result<ChargeStatusInfo, RecobraError>;
}
