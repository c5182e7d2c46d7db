// SPDX-FileCopyrightText: 2026 Recobra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway payment-webhook parsing.
//!
//! Each gateway posts its own payload shape to the shared payments webhook.
//! Parsing extracts exactly one fact: "charge X is paid". Anything else,
//! including malformed bodies, is an ignorable event, never an error: the
//! webhook must always acknowledge so the gateway stops retrying.

use serde_json::Value;

use crate::mercadopago::json_id_to_string;

/// Outcome of parsing a gateway webhook body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentEvent {
    /// Not a payment-confirmed event for this gateway.
    Ignored,
    /// The referenced charge is paid.
    Paid { provider_charge_id: String },
}

/// Parse a webhook body for the named gateway.
pub fn parse_webhook(gateway: &str, body: &Value) -> PaymentEvent {
    match gateway {
        "asaas" => parse_asaas(body),
        "efi" => parse_efi(body),
        "mercadopago" => parse_mercadopago(body),
        _ => PaymentEvent::Ignored,
    }
}

fn parse_asaas(body: &Value) -> PaymentEvent {
    let event = body.get("event").and_then(Value::as_str);
    if !matches!(event, Some("PAYMENT_RECEIVED") | Some("PAYMENT_CONFIRMED")) {
        return PaymentEvent::Ignored;
    }
    match body.pointer("/payment/id").and_then(Value::as_str) {
        Some(id) => PaymentEvent::Paid {
            provider_charge_id: id.to_string(),
        },
        None => PaymentEvent::Ignored,
    }
}

fn parse_efi(body: &Value) -> PaymentEvent {
    match body.pointer("/pix/0/txid").and_then(Value::as_str) {
        Some(txid) => PaymentEvent::Paid {
            provider_charge_id: txid.to_string(),
        },
        None => PaymentEvent::Ignored,
    }
}

fn parse_mercadopago(body: &Value) -> PaymentEvent {
    if body.get("type").and_then(Value::as_str) != Some("payment")
        || body.get("action").and_then(Value::as_str) != Some("payment.updated")
    {
        return PaymentEvent::Ignored;
    }
    let Some(id) = body.pointer("/data/id") else {
        return PaymentEvent::Ignored;
    };
    if body.pointer("/data/status").and_then(Value::as_str) != Some("approved") {
        return PaymentEvent::Ignored;
    }
    PaymentEvent::Paid {
        provider_charge_id: json_id_to_string(id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn asaas_confirmed_and_received_are_paid() {
        for event in ["PAYMENT_RECEIVED", "PAYMENT_CONFIRMED"] {
            let body = json!({"event": event, "payment": {"id": "pay_001"}});
            assert_eq!(
                parse_webhook("asaas", &body),
                PaymentEvent::Paid {
                    provider_charge_id: "pay_001".to_string()
                }
            );
        }

        let other = json!({"event": "PAYMENT_OVERDUE", "payment": {"id": "pay_001"}});
        assert_eq!(parse_webhook("asaas", &other), PaymentEvent::Ignored);
    }

    #[test]
    fn efi_first_pix_txid_wins() {
        let body = json!({"pix": [{"txid": "REC123", "valor": "150.00"}, {"txid": "REC456"}]});
        assert_eq!(
            parse_webhook("efi", &body),
            PaymentEvent::Paid {
                provider_charge_id: "REC123".to_string()
            }
        );

        assert_eq!(parse_webhook("efi", &json!({"pix": []})), PaymentEvent::Ignored);
        assert_eq!(parse_webhook("efi", &json!({})), PaymentEvent::Ignored);
    }

    #[test]
    fn mercadopago_requires_approved_update() {
        let paid = json!({
            "type": "payment",
            "action": "payment.updated",
            "data": {"id": 12345, "status": "approved"},
        });
        assert_eq!(
            parse_webhook("mercadopago", &paid),
            PaymentEvent::Paid {
                provider_charge_id: "12345".to_string()
            }
        );

        let pending = json!({
            "type": "payment",
            "action": "payment.updated",
            "data": {"id": 12345, "status": "pending"},
        });
        assert_eq!(parse_webhook("mercadopago", &pending), PaymentEvent::Ignored);

        let created = json!({
            "type": "payment",
            "action": "payment.created",
            "data": {"id": 12345, "status": "approved"},
        });
        assert_eq!(parse_webhook("mercadopago", &created), PaymentEvent::Ignored);
    }

    #[test]
    fn unknown_gateway_is_ignored() {
        assert_eq!(
            parse_webhook("stripe", &json!({"anything": true})),
            PaymentEvent::Ignored
        );
    }
}
