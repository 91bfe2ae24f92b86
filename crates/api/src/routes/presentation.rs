use axum::extract::{Path, Query, State};
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use trustgate_vault::{CredentialPresentation, PresentationMethod};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/presentation", post(record).get(list))
        .route("/presentation/{id}/verify", post(verify))
}

#[derive(Debug, Deserialize)]
struct RecordPresentationRequest {
    poa_id: Uuid,
    presented_to: String,
    presentation_method: PresentationMethod,
    document_hash: Option<String>,
}

async fn record(State(state): State<AppState>, Json(req): Json<RecordPresentationRequest>) -> Json<CredentialPresentation> {
    let presentation = state
        .vault
        .record_presentation(req.poa_id, req.presented_to, req.presentation_method, req.document_hash)
        .await;
    Json(presentation)
}

async fn verify(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<CredentialPresentation>, ApiError> {
    let presentation = state.vault.presentations.mark_verified(id).await?;
    Ok(Json(presentation))
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    poa_id: Uuid,
}

async fn list(State(state): State<AppState>, Query(query): Query<ListQuery>) -> Json<Vec<CredentialPresentation>> {
    Json(state.vault.presentations.list_for_poa(query.poa_id).await)
}
