use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use trustgate_interceptor::ScamAnalysis;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/scam/analyze", post(analyze))
}

#[derive(Debug, Deserialize)]
struct AnalyzeRequest {
    transcript: String,
}

async fn analyze(State(state): State<AppState>, Json(req): Json<AnalyzeRequest>) -> Json<ScamAnalysis> {
    Json(state.interceptor.analyze(&req.transcript))
}
