//! Shared application state: explicit dependency container passed into each
//! handler rather than read from a process-global, per spec §9's
//! "global state" design note.

use std::sync::Arc;

use trustgate_breakglass::BreakGlassMonitor;
use trustgate_card::CardAuthService;
use trustgate_crypto::CryptoProvider;
use trustgate_gatekeeper::Gatekeeper;
use trustgate_interceptor::ScamInterceptor;
use trustgate_ledger::AuditLedger;
use trustgate_vault::Vault;

#[derive(Clone)]
pub struct AppState {
    pub vault: Arc<Vault>,
    pub ledger: Arc<AuditLedger>,
    pub gatekeeper: Arc<Gatekeeper>,
    pub break_glass: Arc<BreakGlassMonitor>,
    pub interceptor: Arc<ScamInterceptor>,
    pub card: Arc<CardAuthService>,
    #[allow(dead_code)]
    pub crypto: Arc<CryptoProvider>,
}
