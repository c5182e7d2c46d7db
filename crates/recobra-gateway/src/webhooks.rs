// SPDX-FileCopyrightText: 2026 Recobra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider webhook endpoints.
//!
//! Both webhooks acknowledge with 200 whenever processing ran, even when
//! individual events failed internally: providers retry on non-2xx, and a
//! retry of an event we already stored would only be dropped again by the
//! idempotency checks.

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use recobra_inbound::InboundText;
use recobra_whatsapp::webhook::{
    map_delivery_status, verify_handshake, VerifyParams, WebhookPayload,
};

use crate::server::AppState;

/// GET /webhooks/whatsapp
///
/// Cloud API verification handshake: echoes the challenge when the mode and
/// token match, 403 otherwise. No configured token means no handshake ever
/// succeeds.
pub async fn verify_whatsapp(
    State(state): State<AppState>,
    Query(params): Query<VerifyParams>,
) -> Response {
    let Some(expected) = state.verify_token.as_deref() else {
        return StatusCode::FORBIDDEN.into_response();
    };
    match verify_handshake(&params, expected) {
        Some(challenge) => (StatusCode::OK, challenge).into_response(),
        None => StatusCode::FORBIDDEN.into_response(),
    }
}

/// POST /webhooks/whatsapp
///
/// Walks every entry/change in the batch: inbound texts go through the
/// inbound pipeline, status callbacks update the matched message. Always
/// answers 200 `{"status":"ok"}`.
pub async fn post_whatsapp(
    State(state): State<AppState>,
    Json(payload): Json<WebhookPayload>,
) -> Json<Value> {
    if !payload.is_account_event() {
        debug!(object = %payload.object, "ignoring non-account webhook");
        return Json(json!({ "status": "ok" }));
    }

    for entry in &payload.entry {
        for change in &entry.changes {
            let value = &change.value;
            let contact_name = value.contact_name().map(str::to_string);

            for message in &value.messages {
                if message.kind != "text" {
                    debug!(kind = %message.kind, "skipping non-text inbound message");
                    continue;
                }
                let Some(text) = &message.text else { continue };
                let inbound = InboundText {
                    from: message.from.clone(),
                    body: text.body.clone(),
                    provider_message_id: message.id.clone(),
                    contact_name: contact_name.clone(),
                };
                if let Err(e) = state.inbound.process_text(&inbound).await {
                    warn!(provider_message_id = %message.id, error = %e, "inbound processing failed");
                }
            }

            for status in &value.statuses {
                let mapped = map_delivery_status(&status.status);
                if let Err(e) = state.inbound.apply_delivery_status(&status.id, mapped).await {
                    warn!(provider_message_id = %status.id, error = %e, "status update failed");
                }
            }
        }
    }

    Json(json!({ "status": "ok" }))
}

/// Query parameters for POST /webhooks/payments.
#[derive(Debug, Deserialize)]
pub struct PaymentsParams {
    pub gateway: String,
}

/// POST /webhooks/payments?gateway={asaas|efi|mercadopago}
///
/// Optional shared-secret check via `X-Webhook-Token`, then reconciliation.
/// Responds 200 with `{"status": ignored|not_found|processed}`.
pub async fn post_payments(
    State(state): State<AppState>,
    Query(params): Query<PaymentsParams>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Some(expected) = state.payment_webhook_token.as_deref() {
        let provided = headers
            .get("x-webhook-token")
            .and_then(|v| v.to_str().ok());
        if provided != Some(expected) {
            return StatusCode::UNAUTHORIZED.into_response();
        }
    }

    match state.reconciler.handle_webhook(&params.gateway, &body).await {
        Ok(outcome) => Json(json!({ "status": outcome })).into_response(),
        Err(e) => {
            warn!(gateway = %params.gateway, error = %e, "reconciliation failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
