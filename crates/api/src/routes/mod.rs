mod audit;
mod breakglass;
mod card;
mod gatekeeper;
mod poa;
mod presentation;
mod scam;
mod token;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .merge(poa::router())
        .merge(presentation::router())
        .merge(token::router())
        .merge(gatekeeper::router())
        .merge(breakglass::router())
        .merge(audit::router())
        .merge(scam::router())
        .merge(card::router())
}

async fn health() -> &'static str {
    "ok"
}
