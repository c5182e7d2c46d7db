// SPDX-FileCopyrightText: 2026 Recobra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error-to-response mapping for the REST surface.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use recobra_core::error::RecobraError;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Wrapper giving [`RecobraError`] an HTTP status per the error taxonomy:
/// validation -> 400, not-found -> 404, invalid transition -> 409, upstream
/// provider failures -> 502, everything else -> 500.
pub struct ApiError(pub RecobraError);

impl From<RecobraError> for ApiError {
    fn from(e: RecobraError) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            RecobraError::Validation(_) | RecobraError::Config(_) => StatusCode::BAD_REQUEST,
            RecobraError::NotFound { .. } => StatusCode::NOT_FOUND,
            RecobraError::InvalidTransition { .. } => StatusCode::CONFLICT,
            RecobraError::Channel { .. }
            | RecobraError::Payment { .. }
            | RecobraError::Notification { .. } => StatusCode::BAD_GATEWAY,
            RecobraError::Storage { .. }
            | RecobraError::Timeout { .. }
            | RecobraError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }
        (
            status,
            Json(ErrorResponse {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}
