use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use trustgate_ledger::Decision;
use uuid::Uuid;

/// A request to authorize a single delegated action against a POA.
#[derive(Debug, Clone)]
pub struct GatekeeperRequest {
    pub poa_id: Uuid,
    pub service_name: String,
    pub amount: Option<Decimal>,
    pub action: String,
    /// Advocate to notify if this request escalates to break-glass. Falls
    /// back to the gatekeeper's configured default advocate when absent.
    pub advocate_id: Option<String>,
}

impl GatekeeperRequest {
    pub fn new(poa_id: Uuid, service_name: impl Into<String>, action: impl Into<String>) -> Self {
        Self { poa_id, service_name: service_name.into(), amount: None, action: action.into(), advocate_id: None }
    }

    pub fn with_amount(mut self, amount: Decimal) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn with_advocate(mut self, advocate_id: impl Into<String>) -> Self {
        self.advocate_id = Some(advocate_id.into());
        self
    }
}

/// Why a request was blocked, beyond the human-readable `reasoning`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViolationType {
    Scope,
    SpendLimit,
}

/// Outcome of [`crate::gatekeeper::Gatekeeper::validate`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatekeeperDecision {
    pub authorized: bool,
    pub decision: Decision,
    pub reasoning: String,
    pub violation_type: Option<ViolationType>,
    /// The audit entry this decision was recorded under, if any was written
    /// (a missing POA produces no entry: there is nothing to attribute it to).
    pub audit_entry_id: Option<u64>,
    /// Set when `decision == BreakGlass`: the caller resumes at the
    /// break-glass verification endpoints with this id.
    pub break_glass_event_id: Option<Uuid>,
    pub liveness_required: Option<bool>,
}

impl GatekeeperDecision {
    pub(crate) fn allowed(reasoning: impl Into<String>, audit_entry_id: u64) -> Self {
        Self {
            authorized: true,
            decision: Decision::Allowed,
            reasoning: reasoning.into(),
            violation_type: None,
            audit_entry_id: Some(audit_entry_id),
            break_glass_event_id: None,
            liveness_required: None,
        }
    }

    pub(crate) fn blocked(reasoning: impl Into<String>, audit_entry_id: Option<u64>, violation_type: Option<ViolationType>) -> Self {
        Self {
            authorized: false,
            decision: Decision::Blocked,
            reasoning: reasoning.into(),
            violation_type,
            audit_entry_id,
            break_glass_event_id: None,
            liveness_required: None,
        }
    }

    pub(crate) fn break_glass(
        reasoning: impl Into<String>,
        audit_entry_id: u64,
        event_id: Uuid,
        liveness_required: bool,
    ) -> Self {
        Self {
            authorized: false,
            decision: Decision::BreakGlass,
            reasoning: reasoning.into(),
            violation_type: Some(ViolationType::SpendLimit),
            audit_entry_id: Some(audit_entry_id),
            break_glass_event_id: Some(event_id),
            liveness_required: Some(liveness_required),
        }
    }
}
