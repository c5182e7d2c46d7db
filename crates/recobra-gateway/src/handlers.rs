// SPDX-FileCopyrightText: 2026 Recobra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! REST handlers: debt CRUD, bulk import, charge creation, cron trigger.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use recobra_cadence::BatchResults;
use recobra_core::error::RecobraError;
use recobra_core::types::{
    now_iso, Charge, ChargeStatus, Debt, DebtStatus, DeliveryStatus, Message, MessageDirection,
    MessageKind, PixChargeRequest, Renegotiation,
};
use recobra_storage::queries;
use recobra_storage::queries::debts::DebtPatch;

use crate::error::ApiError;
use crate::server::AppState;

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// GET /health
pub async fn get_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Response body for GET /cron/cadence.
#[derive(Debug, Serialize)]
pub struct CadenceRunResponse {
    pub success: bool,
    pub results: BatchResults,
}

/// GET /cron/cadence
///
/// Runs one cadence pass for today in the deployment's local timezone.
/// Per-debt failures are already folded into the counters; only a storage
/// failure surfaces as an error here.
pub async fn run_cadence(
    State(state): State<AppState>,
) -> Result<Json<CadenceRunResponse>, ApiError> {
    let today = chrono::Local::now().date_naive();
    let results = state.scheduler.run(today).await?;
    Ok(Json(CadenceRunResponse {
        success: true,
        results,
    }))
}

/// Request body for POST /v1/debts and rows of POST /v1/debts/import.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDebtRequest {
    pub owner_id: String,
    pub debtor_name: String,
    pub phone: String,
    pub amount: f64,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub notes: Option<String>,
}

fn build_debt(req: &CreateDebtRequest) -> Result<Debt, RecobraError> {
    if req.debtor_name.trim().is_empty() {
        return Err(RecobraError::Validation("debtor_name is required".to_string()));
    }
    if req.amount <= 0.0 {
        return Err(RecobraError::Validation("amount must be positive".to_string()));
    }
    let phone = recobra_phone::normalize(&req.phone);
    if !recobra_phone::is_valid_mobile(&phone) {
        return Err(RecobraError::Validation(format!(
            "invalid mobile number: {}",
            req.phone
        )));
    }
    Ok(Debt {
        id: Uuid::new_v4().to_string(),
        owner_id: req.owner_id.clone(),
        debtor_name: req.debtor_name.trim().to_string(),
        phone,
        amount: req.amount,
        due_date: req.due_date,
        status: DebtStatus::Pending,
        notes: req.notes.clone(),
        created_at: now_iso(),
        updated_at: now_iso(),
    })
}

/// POST /v1/debts
pub async fn create_debt(
    State(state): State<AppState>,
    Json(body): Json<CreateDebtRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let debt = build_debt(&body)?;
    queries::debts::create_debt(&state.db, &debt).await?;
    Ok((StatusCode::CREATED, Json(debt)))
}

/// One rejected row of a bulk import.
#[derive(Debug, Serialize)]
pub struct RejectedRow {
    pub index: usize,
    pub error: String,
}

/// Response body for POST /v1/debts/import.
#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub imported: usize,
    pub rejected: Vec<RejectedRow>,
}

/// POST /v1/debts/import
///
/// Validates every row up front; valid rows are inserted in one
/// transaction, invalid ones are reported back with their index.
pub async fn import_debts(
    State(state): State<AppState>,
    Json(rows): Json<Vec<CreateDebtRequest>>,
) -> Result<Json<ImportResponse>, ApiError> {
    let mut accepted = Vec::new();
    let mut rejected = Vec::new();
    for (index, row) in rows.iter().enumerate() {
        match build_debt(row) {
            Ok(debt) => accepted.push(debt),
            Err(e) => rejected.push(RejectedRow {
                index,
                error: e.to_string(),
            }),
        }
    }

    let imported = if accepted.is_empty() {
        0
    } else {
        queries::debts::create_debts(&state.db, accepted).await?
    };

    Ok(Json(ImportResponse { imported, rejected }))
}

/// Query parameters for GET /v1/debts.
#[derive(Debug, Deserialize)]
pub struct ListDebtsParams {
    #[serde(default)]
    pub status: Option<DebtStatus>,
}

/// GET /v1/debts
pub async fn list_debts(
    State(state): State<AppState>,
    Query(params): Query<ListDebtsParams>,
) -> Result<Json<Vec<Debt>>, ApiError> {
    let debts = queries::debts::list_debts(&state.db, params.status).await?;
    Ok(Json(debts))
}

/// GET /v1/debts/{id}
pub async fn get_debt(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Debt>, ApiError> {
    let debt = queries::debts::get_debt(&state.db, &id)
        .await?
        .ok_or(RecobraError::NotFound {
            entity: "debt",
            id,
        })?;
    Ok(Json(debt))
}

/// Request body for PATCH /v1/debts/{id}. Absent fields are untouched.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateDebtRequest {
    pub debtor_name: Option<String>,
    pub phone: Option<String>,
    pub amount: Option<f64>,
    pub due_date: Option<NaiveDate>,
    /// `null` clears the notes; absent leaves them.
    #[serde(default, with = "double_option")]
    pub notes: Option<Option<String>>,
    /// Manual status transition, validated against the transition table.
    pub status: Option<DebtStatus>,
}

/// Distinguishes an absent field from an explicit `null`.
mod double_option {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(de: D) -> Result<Option<Option<String>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(de).map(Some)
    }
}

/// PATCH /v1/debts/{id}
pub async fn update_debt(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateDebtRequest>,
) -> Result<Json<Debt>, ApiError> {
    if let Some(amount) = body.amount
        && amount <= 0.0
    {
        return Err(RecobraError::Validation("amount must be positive".to_string()).into());
    }
    let phone = match &body.phone {
        Some(raw) => {
            let normalized = recobra_phone::normalize(raw);
            if !recobra_phone::is_valid_mobile(&normalized) {
                return Err(
                    RecobraError::Validation(format!("invalid mobile number: {raw}")).into(),
                );
            }
            Some(normalized)
        }
        None => None,
    };

    let patch = DebtPatch {
        debtor_name: body.debtor_name,
        phone,
        amount: body.amount,
        due_date: body.due_date,
        notes: body.notes,
    };
    let mut debt = queries::debts::update_debt(&state.db, &id, patch).await?;

    if let Some(status) = body.status {
        debt = queries::debts::update_debt_status(&state.db, &id, status).await?;
    }
    Ok(Json(debt))
}

/// DELETE /v1/debts/{id}
pub async fn delete_debt(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    queries::debts::delete_debt(&state.db, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /v1/debts/{id}/messages
pub async fn list_debt_messages(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Message>>, ApiError> {
    queries::debts::get_debt(&state.db, &id)
        .await?
        .ok_or(RecobraError::NotFound {
            entity: "debt",
            id: id.clone(),
        })?;
    let messages = queries::messages::list_messages_for_debt(&state.db, &id).await?;
    Ok(Json(messages))
}

/// Request body for POST /v1/debts/{id}/messages.
#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub content: String,
}

/// POST /v1/debts/{id}/messages
///
/// Manual one-off send to the debtor, recorded like any outbound message.
pub async fn send_debt_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<SendMessageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let content = body.content.trim();
    if content.is_empty() {
        return Err(RecobraError::Validation("content is required".to_string()).into());
    }
    let debt = queries::debts::get_debt(&state.db, &id)
        .await?
        .ok_or(RecobraError::NotFound { entity: "debt", id })?;

    let provider_message_id = state.channel.send_text(&debt.phone, content).await?;

    let message = Message {
        id: Uuid::new_v4().to_string(),
        debt_id: debt.id.clone(),
        direction: MessageDirection::Outbound,
        content: content.to_string(),
        kind: MessageKind::Plain,
        status: DeliveryStatus::Sent,
        provider_message_id: Some(provider_message_id),
        created_at: now_iso(),
    };
    queries::messages::insert_message(&state.db, &message).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

/// Query parameters for GET /v1/renegotiations.
#[derive(Debug, Deserialize)]
pub struct ListRenegotiationsParams {
    /// When true, only threads in `new` or `in_contact`.
    #[serde(default)]
    pub open: bool,
}

/// GET /v1/renegotiations
pub async fn list_renegotiations(
    State(state): State<AppState>,
    Query(params): Query<ListRenegotiationsParams>,
) -> Result<Json<Vec<Renegotiation>>, ApiError> {
    let renegotiations = queries::renegotiations::list(&state.db, params.open).await?;
    Ok(Json(renegotiations))
}

/// Request body for POST /v1/charges.
#[derive(Debug, Deserialize)]
pub struct CreateChargeRequest {
    pub debt_id: String,
}

/// Response body for POST /v1/charges.
#[derive(Debug, Serialize)]
pub struct ChargeResponse {
    pub charge: Charge,
    /// True when an existing pending charge was re-sent instead of a new
    /// one being created with the provider.
    pub reused: bool,
}

/// POST /v1/charges
///
/// The "gerar pix" flow: resolve the debt, reuse its latest pending charge
/// or create a fresh one with the provider, and message the payment code
/// to the debtor.
pub async fn create_charge(
    State(state): State<AppState>,
    Json(body): Json<CreateChargeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let debt = queries::debts::get_debt(&state.db, &body.debt_id)
        .await?
        .ok_or(RecobraError::NotFound {
            entity: "debt",
            id: body.debt_id.clone(),
        })?;
    if matches!(debt.status, DebtStatus::Paid | DebtStatus::Cancelled) {
        return Err(RecobraError::Validation(format!(
            "cannot create a charge for a {} debt",
            debt.status
        ))
        .into());
    }

    if let Some(existing) = queries::charges::latest_pending_for_debt(&state.db, &debt.id).await?
        && let Some(code) = existing.payment_code.clone()
    {
        send_pix_message(&state, &debt, &existing, &code).await?;
        return Ok((
            StatusCode::OK,
            Json(ChargeResponse {
                charge: existing,
                reused: true,
            }),
        ));
    }

    let request = PixChargeRequest {
        amount: debt.amount,
        description: format!("Cobranca - {}", debt.debtor_name),
        debtor_name: debt.debtor_name.clone(),
        debtor_phone: debt.phone.clone(),
        expiry_secs: state.charge_expiry_secs,
    };
    let created = state.payments.create_pix_charge(&request).await?;

    let charge = Charge {
        id: Uuid::new_v4().to_string(),
        debt_id: debt.id.clone(),
        provider: state.payments.name().to_string(),
        provider_charge_id: Some(created.provider_charge_id),
        amount: created.amount,
        payment_code: Some(created.payment_code.clone()),
        qr_code_url: created.qr_code_url,
        status: ChargeStatus::Pending,
        paid_at: None,
        created_at: now_iso(),
    };
    queries::charges::insert_charge(&state.db, &charge).await?;

    send_pix_message(&state, &debt, &charge, &created.payment_code).await?;

    Ok((
        StatusCode::CREATED,
        Json(ChargeResponse {
            charge,
            reused: false,
        }),
    ))
}

async fn send_pix_message(
    state: &AppState,
    debt: &Debt,
    charge: &Charge,
    payment_code: &str,
) -> Result<(), RecobraError> {
    let body = recobra_templates::pix_delivery(&debt.debtor_name, charge.amount, payment_code);
    let provider_message_id = state.channel.send_text(&debt.phone, &body).await?;

    let message = Message {
        id: Uuid::new_v4().to_string(),
        debt_id: debt.id.clone(),
        direction: MessageDirection::Outbound,
        content: body,
        kind: MessageKind::PaymentLink,
        status: DeliveryStatus::Sent,
        provider_message_id: Some(provider_message_id),
        created_at: now_iso(),
    };
    queries::messages::insert_message(&state.db, &message).await
}
