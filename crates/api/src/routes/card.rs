use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use trustgate_card::CardAuthEnvelope;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/card/authorize", post(authorize))
}

const SIGNATURE_HEADER: &str = "x-trustgate-signature";

/// Authenticated by the provider's HMAC signature over the raw body rather
/// than the bearer-token middleware every other route requires, per
/// spec §4.9 step 1: this is the one entry point reached before a session
/// exists.
async fn authorize(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    let Some(signature) = headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok()) else {
        return (StatusCode::UNAUTHORIZED, "missing signature header").into_response();
    };
    if state.card.authenticate(&body, signature).is_err() {
        return (StatusCode::UNAUTHORIZED, "invalid signature").into_response();
    }

    let envelope: CardAuthEnvelope = match serde_json::from_slice(&body) {
        Ok(envelope) => envelope,
        Err(err) => return (StatusCode::BAD_REQUEST, format!("malformed envelope: {err}")).into_response(),
    };

    Json(state.card.authorize(envelope).await).into_response()
}
