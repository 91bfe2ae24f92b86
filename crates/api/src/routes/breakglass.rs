use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use trustgate_breakglass::{BreakGlassEvent, LivenessMethod};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/breakglass/pending", get(pending))
        .route("/breakglass/{id}/verify-otp", post(verify_otp))
        .route("/breakglass/{id}/verify-liveness", post(verify_liveness))
        .route("/breakglass/{id}/deny", post(deny))
}

#[derive(Debug, Deserialize)]
struct VerifyOtpRequest {
    code: String,
}

async fn verify_otp(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<VerifyOtpRequest>,
) -> Result<Json<BreakGlassEvent>, ApiError> {
    let event = state.break_glass.verify_otp(id, &req.code)?;
    Ok(Json(event))
}

#[derive(Debug, Deserialize)]
struct VerifyLivenessRequest {
    method: LivenessMethod,
    /// Base64-encoded liveness artifact (selfie frame, voice sample).
    artifact_base64: String,
}

async fn verify_liveness(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<VerifyLivenessRequest>,
) -> Result<Json<BreakGlassEvent>, ApiError> {
    use base64::Engine;
    let artifact = base64::engine::general_purpose::STANDARD
        .decode(&req.artifact_base64)
        .map_err(|e| ApiError::InvalidArgument(format!("artifact_base64 is not valid base64: {e}")))?;
    let event = state.break_glass.verify_liveness(id, req.method, &artifact)?;
    Ok(Json(event))
}

#[derive(Debug, Deserialize)]
struct DenyRequest {
    denier: String,
    reason: String,
}

async fn deny(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<DenyRequest>,
) -> Result<Json<BreakGlassEvent>, ApiError> {
    let event = state.break_glass.deny(id, req.denier, req.reason)?;
    Ok(Json(event))
}

#[derive(Debug, Deserialize)]
struct PendingQuery {
    advocate_id: Option<String>,
}

async fn pending(State(state): State<AppState>, Query(query): Query<PendingQuery>) -> Json<Vec<BreakGlassEvent>> {
    Json(state.break_glass.pending(query.advocate_id.as_deref()))
}
