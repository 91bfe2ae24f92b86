//! TrustGate HTTP entry point: thin axum binary wiring the fiduciary core's
//! pillars behind a rate-limited, bearer-authenticated surface.
//!
//! Modeled on `packages/gate/src/bin/server.rs`'s tower stack (trace layer,
//! `HandleErrorLayer`/`BufferLayer`/`RateLimitLayer`, then an auth
//! middleware) with one deviation: `/card/authorize` is excluded from
//! bearer auth because it is authenticated by the card network's HMAC
//! signature instead (spec §4.9 step 1).

mod config;
mod error;
mod routes;
mod state;

use std::sync::Arc;
use std::time::Duration;

use axum::error_handling::HandleErrorLayer;
use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::Response;
use tower::buffer::BufferLayer;
use tower::limit::RateLimitLayer;
use tower::{BoxError, ServiceBuilder};
use tower_http::trace::TraceLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use trustgate_breakglass::BreakGlassMonitor;
use trustgate_card::{CardAuthService, CardBindingRegistry, WebhookVerifier};
use trustgate_crypto::CryptoProvider;
use trustgate_gatekeeper::Gatekeeper;
use trustgate_interceptor::ScamInterceptor;
use trustgate_ledger::AuditLedger;
use trustgate_notifier::{FanoutNotifier, LoggingNotifier};
use trustgate_vault::Vault;

use crate::config::Config;
use crate::state::AppState;

const RATE_LIMIT_REQUESTS: u64 = 100;
const RATE_LIMIT_WINDOW: Duration = Duration::from_secs(60);
const UNAUTHENTICATED_PATHS: &[&str] = &["/health", "/card/authorize"];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry().with(tracing_subscriber::fmt::layer()).with(tracing_subscriber::EnvFilter::from_default_env()).init();

    let config = Config::from_env()?;
    let state = build_state(&config)?;

    let app = routes::router()
        .layer(TraceLayer::new_for_http())
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(|err: BoxError| async move {
                    (StatusCode::INTERNAL_SERVER_ERROR, format!("unhandled internal error: {err}"))
                }))
                .layer(BufferLayer::new(1024))
                .layer(RateLimitLayer::new(RATE_LIMIT_REQUESTS, RATE_LIMIT_WINDOW)),
        )
        .layer(middleware::from_fn(auth_middleware))
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!(%addr, "trustgate-api listening");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_state(config: &Config) -> anyhow::Result<AppState> {
    let crypto = Arc::new(if config.ephemeral {
        CryptoProvider::ephemeral()
    } else {
        CryptoProvider::from_hex(&config.encryption_key_hex, &config.mac_key_hex)?
    });

    let ledger = Arc::new(AuditLedger::new(crypto.clone()));
    let vault = Arc::new(Vault::new(crypto.clone(), ledger.clone()));

    let notifier = Arc::new(build_notifier());
    let break_glass = Arc::new(BreakGlassMonitor::new(crypto.clone(), notifier));

    let gatekeeper =
        Arc::new(Gatekeeper::new(vault.clone(), ledger.clone(), break_glass.clone()).with_default_advocate(config.default_advocate_id.clone()));

    let interceptor = Arc::new(ScamInterceptor::new(trustgate_interceptor::ScamTable::default_table()));

    let card_bindings = Arc::new(CardBindingRegistry::new());
    let card = Arc::new(CardAuthService::new(
        WebhookVerifier::new(config.card_webhook_secret.clone().into_bytes()),
        card_bindings,
        ledger.clone(),
    ));

    Ok(AppState { vault, ledger, gatekeeper, break_glass, interceptor, card, crypto })
}

/// Builds the advocate notification fan-out. Live push/SMS/email transports
/// are a deployment concern (spec §6's `TRUSTGATE_ADVOCATE_*` env vars);
/// absent them, every sink logs only, matching the teacher's demo-mode
/// default.
fn build_notifier() -> FanoutNotifier {
    let mut fanout = FanoutNotifier::new().with_sink(Arc::new(LoggingNotifier));
    if let Ok(sms) = std::env::var("TRUSTGATE_ADVOCATE_SMS") {
        fanout = fanout.with_sms_target(sms);
    }
    if let Ok(email) = std::env::var("TRUSTGATE_ADVOCATE_EMAIL") {
        fanout = fanout.with_email_target(email);
    }
    fanout
}

async fn auth_middleware(req: Request, next: Next) -> Result<Response, StatusCode> {
    if UNAUTHENTICATED_PATHS.contains(&req.uri().path()) {
        return Ok(next.run(req).await);
    }

    let auth_header = req.headers().get(axum::http::header::AUTHORIZATION).and_then(|h| h.to_str().ok());
    match auth_header {
        Some(auth) if auth.strip_prefix("Bearer ").is_some_and(|token| !token.is_empty()) => Ok(next.run(req).await),
        _ => {
            tracing::warn!(path = %req.uri().path(), "unauthenticated request rejected");
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}
