//! Ledger entry types and canonicalization.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Outcome of a gatekeeper (or card-auth) decision, as recorded in the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    Allowed,
    Blocked,
    BreakGlass,
}

impl Decision {
    fn as_str(&self) -> &'static str {
        match self {
            Decision::Allowed => "ALLOWED",
            Decision::Blocked => "BLOCKED",
            Decision::BreakGlass => "BREAK_GLASS",
        }
    }
}

/// A single append-only audit record. Once appended, only the
/// `advocate_notified` observation is ever layered on top, and that is done
/// by appending a successor entry rather than mutating this one — the
/// signature always covers the record exactly as it was written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: u64,
    pub poa_id: Uuid,
    pub action_type: String,
    pub timestamp: DateTime<Utc>,
    pub request_details: Value,
    pub service_name: Option<String>,
    pub amount: Option<Decimal>,
    pub decision: Decision,
    pub reasoning: String,
    pub signature: String,
    pub advocate_notified: bool,
}

impl AuditEntry {
    /// Deterministic byte view used for signing and verification: fixed sort
    /// order, UTC ISO-8601 timestamps, no trailing whitespace.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        canonicalize(
            self.id,
            self.poa_id,
            &self.action_type,
            self.timestamp,
            &self.request_details,
            self.service_name.as_deref(),
            self.amount,
            self.decision,
            &self.reasoning,
        )
    }
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn canonicalize(
    id: u64,
    poa_id: Uuid,
    action_type: &str,
    timestamp: DateTime<Utc>,
    request_details: &Value,
    service_name: Option<&str>,
    amount: Option<Decimal>,
    decision: Decision,
    reasoning: &str,
) -> Vec<u8> {
    let mut fields: BTreeMap<&'static str, Value> = BTreeMap::new();
    fields.insert("id", Value::from(id));
    fields.insert("poa_id", Value::from(poa_id.to_string()));
    fields.insert("action_type", Value::from(action_type));
    fields.insert(
        "timestamp",
        Value::from(timestamp.to_rfc3339_opts(chrono::SecondsFormat::Micros, true)),
    );
    fields.insert("request_details", request_details.clone());
    fields.insert(
        "service_name",
        service_name.map(Value::from).unwrap_or(Value::Null),
    );
    fields.insert(
        "amount",
        amount.map(|a| Value::from(a.to_string())).unwrap_or(Value::Null),
    );
    fields.insert("decision", Value::from(decision.as_str()));
    fields.insert("reasoning", Value::from(reasoning));
    serde_json::to_vec(&fields).expect("BTreeMap of JSON values always serializes")
}

/// Filter applied to [`crate::ledger::AuditLedger::list`].
#[derive(Debug, Clone, Default)]
pub struct LedgerFilter {
    pub poa_id: Option<Uuid>,
    pub action_type: Option<String>,
    pub decision: Option<Decision>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

/// Export format for [`crate::ledger::AuditLedger::export`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Structured,
    Human,
}
