use std::collections::HashSet;

use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/poa", post(create).get(list))
        .route("/poa/{id}", get(get_one))
        .route("/poa/{id}/revoke", post(revoke))
}

#[derive(Debug, Deserialize)]
struct CreatePoaRequest {
    principal: String,
    agent: String,
    scope: String,
    spend_limit: Decimal,
    expiry_days: i64,
    allowed_services: Option<HashSet<String>>,
    creator: Option<String>,
}

#[derive(Debug, Serialize)]
struct PoaSummary {
    id: Uuid,
    principal_id: String,
    agent_id: String,
    scope: String,
    allowed_services: Option<HashSet<String>>,
    spend_limit: Decimal,
    created_at: chrono::DateTime<chrono::Utc>,
    expires_at: chrono::DateTime<chrono::Utc>,
    active: bool,
    valid: bool,
    revoked_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<trustgate_vault::Poa> for PoaSummary {
    fn from(poa: trustgate_vault::Poa) -> Self {
        let valid = poa.is_valid();
        Self {
            id: poa.id,
            principal_id: poa.principal_id,
            agent_id: poa.agent_id,
            scope: poa.scope,
            allowed_services: poa.allowed_services,
            spend_limit: poa.spend_limit,
            created_at: poa.created_at,
            expires_at: poa.expires_at,
            active: poa.active,
            valid,
            revoked_at: poa.revoked_at,
        }
    }
}

async fn create(State(state): State<AppState>, Json(req): Json<CreatePoaRequest>) -> Result<Json<PoaSummary>, ApiError> {
    let poa = state
        .vault
        .create_poa(req.principal, req.agent, req.scope, req.spend_limit, req.expiry_days, req.allowed_services, req.creator)
        .await?;
    Ok(Json(poa.into()))
}

async fn get_one(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<PoaSummary>, ApiError> {
    let poa = state.vault.registry.get(id).await.ok_or(trustgate_vault::VaultError::PoaNotFound(id))?;
    Ok(Json(poa.into()))
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    principal: String,
    #[serde(default)]
    active_only: bool,
}

async fn list(State(state): State<AppState>, Query(query): Query<ListQuery>) -> Json<Vec<PoaSummary>> {
    let poas = state.vault.registry.list_by_principal(&query.principal, query.active_only).await;
    Json(poas.into_iter().map(PoaSummary::from).collect())
}

#[derive(Debug, Deserialize)]
struct RevokeRequest {
    reason: String,
    revoker: String,
}

async fn revoke(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<RevokeRequest>,
) -> Result<Json<bool>, ApiError> {
    let revoked = state.vault.revoke_poa(id, req.reason, req.revoker).await?;
    Ok(Json(revoked))
}
