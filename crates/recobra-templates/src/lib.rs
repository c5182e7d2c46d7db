// SPDX-FileCopyrightText: 2026 Recobra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound message templates for the collection cadence.
//!
//! All copy is pt-BR. Amounts and dates are pre-formatted via [`format_brl`]
//! and [`format_date`] before substitution.

mod format;

pub use format::{format_brl, format_date};

use chrono::NaiveDate;
use recobra_core::CadenceStep;

/// Store name used when the operator never configured one.
pub const DEFAULT_STORE_NAME: &str = "nossa loja";

/// Reminder sent two days before the due date.
pub fn reminder_two_days_before(name: &str, store: &str, amount: f64, due: NaiveDate) -> String {
    format!(
        "Oi, {name}! Tudo bem? Passando para lembrar que sua parcela na {store} vence em 2 dias ({due}). O valor e de {amount}. Posso te mandar o Pix para facilitar? Responda SIM para receber.",
        due = format_date(due),
        amount = format_brl(amount),
    )
}

/// Notice sent on the due date itself.
pub fn due_today(name: &str, store: &str, amount: f64) -> String {
    format!(
        "Ola {name}! Sua parcela na {store} vence hoje no valor de {amount}. Evite juros e pague agora! Responda QUERO PIX para receber o codigo.",
        amount = format_brl(amount),
    )
}

/// First overdue nudge, sent five days past due.
pub fn overdue_five_days(name: &str, store: &str, amount: f64, days_late: i64) -> String {
    format!(
        "Oi {name}, notamos que sua parcela na {store} esta em atraso ha {days_late} dias. O valor atual e {amount}. Se estiver com dificuldades, responda esta mensagem para negociarmos!",
        amount = format_brl(amount),
    )
}

/// Follow-up sent fifteen days past due.
pub fn overdue_fifteen_days(name: &str, store: &str, amount: f64) -> String {
    format!(
        "{name}, sua divida com a {store} continua pendente. Valor: {amount}. Queremos ajudar voce a regularizar! Responda para conversarmos sobre opcoes de pagamento.",
        amount = format_brl(amount),
    )
}

/// Final notice, sent thirty days past due.
pub fn final_notice(name: &str, store: &str, amount: f64) -> String {
    format!(
        "Ultimo aviso, {name}. Sua divida com a {store} no valor de {amount} precisa ser regularizada. Estamos dispostos a negociar. Responda NEGOCIAR para falarmos.",
        amount = format_brl(amount),
    )
}

/// Confirmation sent after a payment reconciles.
pub fn payment_confirmed(name: &str, store: &str, amount: f64) -> String {
    format!(
        "{name}, seu pagamento de {amount} foi confirmado! Obrigado por regularizar com a {store}. Ficamos a disposicao!",
        amount = format_brl(amount),
    )
}

/// Pix charge delivery with the copy-and-paste payment code.
pub fn pix_delivery(name: &str, amount: f64, payment_code: &str) -> String {
    format!(
        "{name}, aqui esta o Pix para pagamento:\n\nValor: {amount}\n\nPix Copia e Cola:\n{payment_code}\n\nApos o pagamento, voce recebera a confirmacao automaticamente.",
        amount = format_brl(amount),
    )
}

/// Renders the cadence message for a given step.
pub fn render_step(
    step: CadenceStep,
    name: &str,
    store: &str,
    amount: f64,
    due: NaiveDate,
    today: NaiveDate,
) -> String {
    match step {
        CadenceStep::DMinus2 => reminder_two_days_before(name, store, amount, due),
        CadenceStep::DueDay => due_today(name, store, amount),
        CadenceStep::DPlus5 => {
            overdue_five_days(name, store, amount, (today - due).num_days())
        }
        CadenceStep::DPlus15 => overdue_fifteen_days(name, store, amount),
        CadenceStep::DPlus30 => final_notice(name, store, amount),
    }
}
