use axum::extract::{Query, State};
use axum::routing::post;
use axum::{Json, Router};
use base64::Engine;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use trustgate_vault::{TokenKind, VaultError};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/token", post(store)).route("/token/reveal", post(reveal))
}

#[derive(Debug, Deserialize)]
struct StoreTokenRequest {
    poa_id: Uuid,
    service_name: String,
    /// Base64-encoded plaintext: never logged, never echoed back.
    plaintext_base64: String,
    kind: TokenKind,
    ttl_seconds: Option<i64>,
}

#[derive(Debug, Serialize)]
struct StoredTokenResponse {
    id: Uuid,
    poa_id: Uuid,
    service_name: String,
    kind: TokenKind,
    expires_at: Option<chrono::DateTime<chrono::Utc>>,
}

async fn store(State(state): State<AppState>, Json(req): Json<StoreTokenRequest>) -> Result<Json<StoredTokenResponse>, ApiError> {
    let plaintext = base64::engine::general_purpose::STANDARD
        .decode(&req.plaintext_base64)
        .map_err(|e| ApiError::InvalidArgument(format!("plaintext_base64 is not valid base64: {e}")))?;
    let ttl = req.ttl_seconds.map(Duration::seconds);

    let record = state
        .vault
        .store_token(req.poa_id, req.service_name, &plaintext, req.kind, ttl)
        .await
        .map_err(|e| ApiError::InvalidArgument(format!("token encryption failed: {e}")))?;

    Ok(Json(StoredTokenResponse {
        id: record.id,
        poa_id: record.poa_id,
        service_name: record.service_name,
        kind: record.kind,
        expires_at: record.expires_at,
    }))
}

#[derive(Debug, Deserialize)]
struct RevealQuery {
    token_id: Uuid,
    poa_id: Uuid,
}

#[derive(Debug, Serialize)]
struct RevealedTokenResponse {
    plaintext_base64: String,
}

async fn reveal(State(state): State<AppState>, Query(query): Query<RevealQuery>) -> Result<Json<RevealedTokenResponse>, ApiError> {
    let plaintext = state
        .vault
        .reveal_token(query.token_id, query.poa_id)
        .await?
        .ok_or(VaultError::TokenNotFound(query.token_id))?;
    Ok(Json(RevealedTokenResponse { plaintext_base64: base64::engine::general_purpose::STANDARD.encode(plaintext) }))
}
