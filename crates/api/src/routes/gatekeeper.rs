use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use rust_decimal::Decimal;
use serde::Deserialize;
use trustgate_gatekeeper::{GatekeeperDecision, GatekeeperRequest};
use uuid::Uuid;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/gatekeeper/validate", post(validate))
}

#[derive(Debug, Deserialize)]
struct ValidateRequest {
    poa_id: Uuid,
    service_name: String,
    action: String,
    amount: Option<Decimal>,
    advocate_id: Option<String>,
}

async fn validate(State(state): State<AppState>, Json(req): Json<ValidateRequest>) -> Json<GatekeeperDecision> {
    let mut request = GatekeeperRequest::new(req.poa_id, req.service_name, req.action);
    if let Some(amount) = req.amount {
        request = request.with_amount(amount);
    }
    if let Some(advocate_id) = req.advocate_id {
        request = request.with_advocate(advocate_id);
    }
    Json(state.gatekeeper.validate(request).await)
}
