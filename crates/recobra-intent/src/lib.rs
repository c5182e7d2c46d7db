// SPDX-FileCopyrightText: 2026 Recobra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic intent classification for inbound debtor replies.
//!
//! Case-insensitive substring matching against four fixed, ordered keyword
//! sets. No scoring, no network, no latency. The precedence order is part
//! of the contract: pay beats negotiate beats question beats complaint, so
//! a reply mixing a "yes" keyword with a "cannot pay" keyword classifies as
//! pay-intent.

use recobra_core::Intent;

/// Pay-intent keywords, checked first.
const PAY_KEYWORDS: &[&str] = &[
    "sim", "quero", "pix", "pagar", "quero pagar", "vou pagar",
    "pode mandar", "manda", "envie", "envia", "quero pix",
    "ok", "blz", "beleza", "pode ser", "manda o pix",
    "quero receber", "aceito",
];

/// Negotiate-intent keywords.
const NEGOTIATE_KEYWORDS: &[&str] = &[
    "negociar", "parcelar", "dividir", "desconto", "dificuldade",
    "nao tenho", "sem dinheiro", "apertado", "complicado",
    "pode parcelar", "tem como", "consegue",
];

/// Question keywords.
const QUESTION_KEYWORDS: &[&str] = &[
    "qual", "quanto", "quando", "como", "onde", "porque",
    "?", "nao entendi", "explica", "duvida",
];

/// Complaint keywords.
const COMPLAINT_KEYWORDS: &[&str] = &[
    "absurdo", "cobranca indevida", "ja paguei", "errado",
    "nao devo", "engano", "processo", "procon",
];

/// Classify a free-text inbound message into one of the closed intents.
///
/// First matching keyword set wins; no match yields [`Intent::Other`].
pub fn classify(text: &str) -> Intent {
    let lower = text.to_lowercase();
    let lower = lower.trim();

    if PAY_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
        return Intent::Pay;
    }
    if NEGOTIATE_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
        return Intent::Negotiate;
    }
    if QUESTION_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
        return Intent::Question;
    }
    if COMPLAINT_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
        return Intent::Complaint;
    }
    Intent::Other
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_pay_intent() {
        assert_eq!(classify("quero pagar"), Intent::Pay);
        assert_eq!(classify("SIM"), Intent::Pay);
        assert_eq!(classify("manda o pix"), Intent::Pay);
        assert_eq!(classify("pode ser"), Intent::Pay);
    }

    #[test]
    fn classify_negotiate_intent() {
        assert_eq!(classify("da pra parcelar?"), Intent::Negotiate);
        assert_eq!(classify("to sem dinheiro esse mes"), Intent::Negotiate);
        assert_eq!(classify("tem desconto?"), Intent::Negotiate);
    }

    #[test]
    fn classify_question_intent() {
        assert_eq!(classify("qual o valor mesmo"), Intent::Question);
        assert_eq!(classify("nao entendi"), Intent::Question);
    }

    #[test]
    fn classify_complaint_intent() {
        assert_eq!(classify("isso e um absurdo"), Intent::Complaint);
        assert_eq!(classify("vou no procon"), Intent::Complaint);
    }

    #[test]
    fn classify_other_on_no_match() {
        assert_eq!(classify("bom dia"), Intent::Other);
        assert_eq!(classify(""), Intent::Other);
    }

    #[test]
    fn pay_precedence_beats_negotiate() {
        // "ok" is a pay keyword and "nao tenho" a negotiate keyword; the
        // pay set is checked first, so pay wins.
        assert_eq!(classify("ok mas nao tenho dinheiro"), Intent::Pay);
    }

    #[test]
    fn negotiate_precedence_beats_question() {
        // Contains "?" (question) and "parcelar" (negotiate).
        assert_eq!(classify("parcelar em quantas vezes?"), Intent::Negotiate);
    }

    #[test]
    fn classification_is_case_insensitive() {
        assert_eq!(classify("QUERO PAGAR AGORA"), Intent::Pay);
        assert_eq!(classify("Parcelar"), Intent::Negotiate);
    }

    #[test]
    fn already_paid_is_a_complaint() {
        assert_eq!(classify("ja paguei essa conta"), Intent::Complaint);
    }
}
