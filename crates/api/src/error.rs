//! Maps core error enums to HTTP status codes at the edge, per spec §7:
//! "the core never encodes transport concerns; the binary converts these
//! into HTTP status codes... never inside the core logic."

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use trustgate_breakglass::BreakGlassError;
use trustgate_ledger::LedgerError;
use trustgate_vault::VaultError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Vault(#[from] VaultError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    BreakGlass(#[from] BreakGlassError),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("unauthenticated")]
    Unauthenticated,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind) = match &self {
            ApiError::Vault(VaultError::PoaNotFound(_)) => (StatusCode::NOT_FOUND, "not_found"),
            ApiError::Vault(VaultError::TokenNotFound(_)) => (StatusCode::NOT_FOUND, "not_found"),
            ApiError::Vault(VaultError::PresentationNotFound(_)) => (StatusCode::NOT_FOUND, "not_found"),
            ApiError::Vault(VaultError::LedgerUnavailable(_)) => (StatusCode::SERVICE_UNAVAILABLE, "storage_failure"),
            ApiError::Ledger(LedgerError::EntryNotFound(_)) => (StatusCode::NOT_FOUND, "not_found"),
            ApiError::Ledger(LedgerError::StorageUnavailable(_)) => (StatusCode::SERVICE_UNAVAILABLE, "storage_failure"),
            ApiError::BreakGlass(BreakGlassError::EventNotFound(_)) => (StatusCode::NOT_FOUND, "not_found"),
            ApiError::BreakGlass(BreakGlassError::NotPending { .. }) => (StatusCode::CONFLICT, "conflict_state"),
            ApiError::BreakGlass(BreakGlassError::LivenessNotEligible { .. }) => (StatusCode::CONFLICT, "conflict_state"),
            ApiError::BreakGlass(BreakGlassError::InvalidOtp(_)) => (StatusCode::UNPROCESSABLE_ENTITY, "invalid_otp"),
            ApiError::BreakGlass(BreakGlassError::Expired(_)) => (StatusCode::GONE, "expired"),
            ApiError::InvalidArgument(_) => (StatusCode::BAD_REQUEST, "invalid_argument"),
            ApiError::Unauthenticated => (StatusCode::UNAUTHORIZED, "unauthenticated"),
        };
        (status, Json(json!({ "error": kind, "message": self.to_string() }))).into_response()
    }
}
