use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use trustgate_ledger::{AuditEntry, Decision, ExportFormat, LedgerFilter};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/audit", get(list))
        .route("/audit/{id}/verify", get(verify))
        .route("/audit/export/{poa_id}", get(export))
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    poa_id: Option<Uuid>,
    action_type: Option<String>,
    decision: Option<Decision>,
    since: Option<DateTime<Utc>>,
    until: Option<DateTime<Utc>>,
}

async fn list(State(state): State<AppState>, Query(query): Query<ListQuery>) -> Json<Vec<AuditEntry>> {
    let filter = LedgerFilter {
        poa_id: query.poa_id,
        action_type: query.action_type,
        decision: query.decision,
        since: query.since,
        until: query.until,
    };
    Json(state.ledger.list(&filter).await)
}

async fn verify(State(state): State<AppState>, Path(id): Path<u64>) -> Result<Json<bool>, ApiError> {
    Ok(Json(state.ledger.verify(id).await?))
}

#[derive(Debug, Deserialize)]
struct ExportQuery {
    #[serde(default)]
    format: ExportQueryFormat,
}

#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
enum ExportQueryFormat {
    #[default]
    Structured,
    Human,
}

async fn export(
    State(state): State<AppState>,
    Path(poa_id): Path<Uuid>,
    Query(query): Query<ExportQuery>,
) -> Result<Response, ApiError> {
    let format = match query.format {
        ExportQueryFormat::Structured => ExportFormat::Structured,
        ExportQueryFormat::Human => ExportFormat::Human,
    };
    let bytes = state.ledger.export(poa_id, format).await?;
    let content_type = match format {
        ExportFormat::Structured => "application/json",
        ExportFormat::Human => "text/plain; charset=utf-8",
    };
    Ok(([(header::CONTENT_TYPE, content_type)], bytes).into_response())
}
