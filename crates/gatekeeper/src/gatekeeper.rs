//! The central authorization decision: composes the POA registry's validity
//! predicates with the audit ledger and break-glass escalation, in that
//! order, per the algorithm in spec §4.7.
//!
//! Modeled on `packages/arbiter/src/coordinator.rs::Coordinator`: a thin
//! struct holding references to the lower-level managers it composes,
//! translating their outcomes into one typed decision rather than owning
//! any state of its own.

use std::sync::Arc;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::json;
use tracing::error;
use trustgate_breakglass::{BreakGlassMonitor, BreakGlassTrigger};
use trustgate_ledger::{AuditLedger, Decision};
use trustgate_vault::Vault;

use crate::types::{GatekeeperDecision, GatekeeperRequest, ViolationType};

/// Above this amount a break-glass escalation additionally requires a
/// liveness check, not just an OTP (spec §4.7 step 4).
const LIVENESS_REQUIRED_ABOVE: Decimal = dec!(500);

pub struct Gatekeeper {
    vault: Arc<Vault>,
    ledger: Arc<AuditLedger>,
    break_glass: Arc<BreakGlassMonitor>,
    default_advocate_id: String,
}

impl Gatekeeper {
    pub fn new(vault: Arc<Vault>, ledger: Arc<AuditLedger>, break_glass: Arc<BreakGlassMonitor>) -> Self {
        Self { vault, ledger, break_glass, default_advocate_id: "default-advocate".to_string() }
    }

    pub fn with_default_advocate(mut self, advocate_id: impl Into<String>) -> Self {
        self.default_advocate_id = advocate_id.into();
        self
    }

    /// Authorize a single delegated action. Never returns an error: storage
    /// and crypto failures are converted into a fail-closed `BLOCKED`
    /// decision per spec §7, with the underlying failure retained only in
    /// logs, not surfaced to the caller as an exception.
    pub async fn validate(&self, request: GatekeeperRequest) -> GatekeeperDecision {
        let Some(poa) = self.vault.registry.get(request.poa_id).await else {
            return GatekeeperDecision::blocked(format!("POA {} not found", request.poa_id), None, None);
        };

        if !poa.is_valid() {
            return self
                .append_or_block(
                    request.poa_id,
                    "POA_INVALID",
                    Decision::Blocked,
                    "POA is expired or revoked".to_string(),
                    json!({ "service": request.service_name, "action": request.action }),
                    None,
                    None,
                    |entry_id| GatekeeperDecision::blocked("POA is expired or revoked", Some(entry_id), None),
                )
                .await;
        }

        if !poa.is_within_scope(&request.service_name) {
            return self
                .append_or_block(
                    request.poa_id,
                    "SCOPE_VIOLATION",
                    Decision::Blocked,
                    format!("service '{}' is outside the POA's scope '{}'", request.service_name, poa.scope),
                    json!({ "service": request.service_name, "scope": poa.scope, "action": request.action }),
                    Some(request.service_name.clone()),
                    None,
                    |entry_id| {
                        GatekeeperDecision::blocked(
                            format!("service '{}' is outside the POA's scope '{}'", request.service_name, poa.scope),
                            Some(entry_id),
                            Some(ViolationType::Scope),
                        )
                    },
                )
                .await;
        }

        if let Some(amount) = request.amount {
            if !poa.is_within_limit(amount) {
                let reasoning = format!(
                    "requested amount {amount} exceeds the POA's spend limit {}",
                    poa.spend_limit
                );
                let append_result = self
                    .ledger
                    .append(
                        request.poa_id,
                        "SPEND_LIMIT_EXCEEDED",
                        Decision::BreakGlass,
                        reasoning.clone(),
                        json!({ "service": request.service_name, "amount": amount.to_string(), "limit": poa.spend_limit.to_string() }),
                        Some(request.service_name.clone()),
                        Some(amount),
                    )
                    .await;

                let Ok(entry) = append_result else {
                    error!(poa_id = %request.poa_id, "ledger append failed while recording spend-limit violation");
                    return GatekeeperDecision::blocked("ledger unavailable", None, None);
                };

                let liveness_required = amount > LIVENESS_REQUIRED_ABOVE;
                let advocate_id = request.advocate_id.clone().unwrap_or_else(|| self.default_advocate_id.clone());
                let event = self
                    .break_glass
                    .trigger_break_glass(
                        entry.id,
                        BreakGlassTrigger::SpendLimitExceeded,
                        json!({ "poa_id": request.poa_id, "amount": amount.to_string(), "limit": poa.spend_limit.to_string() }),
                        advocate_id,
                        liveness_required,
                    )
                    .await;

                return GatekeeperDecision::break_glass(reasoning, entry.id, event.id, liveness_required);
            }
        }

        self.append_or_block(
            request.poa_id,
            format!("REQUEST_{}", request.action.to_uppercase()),
            Decision::Allowed,
            format!("authorized {} on service '{}'", request.action, request.service_name),
            json!({ "service": request.service_name, "action": request.action, "amount": request.amount.map(|a| a.to_string()) }),
            Some(request.service_name.clone()),
            request.amount,
            |entry_id| GatekeeperDecision::allowed(format!("authorized {} on service '{}'", request.action, request.service_name), entry_id),
        )
        .await
    }

    /// Appends the entry the caller already decided on, then maps success to
    /// `on_success` and failure to a synthetic `BLOCKED` per spec §4.7's
    /// ordering guarantee: a non-error decision is never returned before its
    /// ledger write completes.
    #[allow(clippy::too_many_arguments)]
    async fn append_or_block(
        &self,
        poa_id: uuid::Uuid,
        action_type: impl Into<String>,
        decision: Decision,
        reasoning: String,
        details: serde_json::Value,
        service_name: Option<String>,
        amount: Option<Decimal>,
        on_success: impl FnOnce(u64) -> GatekeeperDecision,
    ) -> GatekeeperDecision {
        match self.ledger.append(poa_id, action_type, decision, reasoning, details, service_name, amount).await {
            Ok(entry) => on_success(entry.id),
            Err(err) => {
                error!(poa_id = %poa_id, error = %err, "audit ledger append failed; failing closed");
                GatekeeperDecision::blocked("ledger unavailable", None, None)
            }
        }
    }
}
