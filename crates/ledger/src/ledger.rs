//! In-memory append-only ledger, signed with a keyed MAC.
//!
//! Modeled on `packages/arbiter/src/audit.rs::AuditLedger`: a bounded
//! `VecDeque` behind an async lock, with query helpers layered on top.
//! Per-POA ordering is enforced by a sharded mutex keyed by `poa_id`
//! (`packages/arbiter/src/locks.rs::LockManager`), rather than locking the
//! whole ledger for every append.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::Value;
use tokio::sync::{Mutex as AsyncMutex, RwLock};
use tracing::warn;
use trustgate_crypto::CryptoProvider;
use uuid::Uuid;

use crate::error::LedgerError;
use crate::types::{AuditEntry, Decision, ExportFormat, LedgerFilter};

const DEFAULT_MAX_RECORDS: usize = 100_000;

/// Append-only, HMAC-signed audit ledger.
pub struct AuditLedger {
    crypto: Arc<CryptoProvider>,
    entries: RwLock<VecDeque<AuditEntry>>,
    poa_locks: std::sync::Mutex<HashMap<Uuid, Arc<AsyncMutex<()>>>>,
    next_id: AtomicU64,
    max_records: usize,
}

impl AuditLedger {
    pub fn new(crypto: Arc<CryptoProvider>) -> Self {
        Self {
            crypto,
            entries: RwLock::new(VecDeque::new()),
            poa_locks: std::sync::Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            max_records: DEFAULT_MAX_RECORDS,
        }
    }

    fn poa_lock(&self, poa_id: Uuid) -> Arc<AsyncMutex<()>> {
        let mut locks = self.poa_locks.lock().expect("poa_locks mutex poisoned");
        locks.entry(poa_id).or_insert_with(|| Arc::new(AsyncMutex::new(()))).clone()
    }

    /// Append a new entry. Serialized per `poa_id`: concurrent appends for
    /// different POAs proceed independently, appends for the same POA are
    /// totally ordered.
    #[allow(clippy::too_many_arguments)]
    pub async fn append(
        &self,
        poa_id: Uuid,
        action_type: impl Into<String>,
        decision: Decision,
        reasoning: impl Into<String>,
        request_details: Value,
        service_name: Option<String>,
        amount: Option<Decimal>,
    ) -> Result<AuditEntry, LedgerError> {
        let guard = self.poa_lock(poa_id);
        let _permit = guard.lock().await;

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let timestamp = Utc::now();
        let action_type = action_type.into();
        let reasoning = reasoning.into();

        let canonical = crate::types::canonicalize(
            id,
            poa_id,
            &action_type,
            timestamp,
            &request_details,
            service_name.as_deref(),
            amount,
            decision,
            &reasoning,
        );
        let signature = self.crypto.sign(&canonical);

        let entry = AuditEntry {
            id,
            poa_id,
            action_type,
            timestamp,
            request_details,
            service_name,
            amount,
            decision,
            reasoning,
            signature,
            advocate_notified: false,
        };

        let mut entries = self.entries.write().await;
        entries.push_back(entry.clone());
        if entries.len() > self.max_records {
            let dropped = entries.pop_front();
            if let Some(dropped) = dropped {
                warn!(entry_id = dropped.id, "audit ledger at capacity, evicting oldest entry");
            }
        }
        Ok(entry)
    }

    /// Recompute and compare the signature of a persisted entry.
    pub async fn verify(&self, entry_id: u64) -> Result<bool, LedgerError> {
        let entries = self.entries.read().await;
        let entry = entries
            .iter()
            .find(|e| e.id == entry_id)
            .ok_or(LedgerError::EntryNotFound(entry_id))?;
        Ok(self.crypto.verify(&entry.canonical_bytes(), &entry.signature))
    }

    pub async fn list(&self, filter: &LedgerFilter) -> Vec<AuditEntry> {
        let entries = self.entries.read().await;
        entries
            .iter()
            .filter(|e| filter.poa_id.is_none_or(|poa_id| e.poa_id == poa_id))
            .filter(|e| {
                filter
                    .action_type
                    .as_deref()
                    .is_none_or(|action_type| e.action_type == action_type)
            })
            .filter(|e| filter.decision.is_none_or(|decision| e.decision == decision))
            .filter(|e| filter.since.is_none_or(|since| e.timestamp >= since))
            .filter(|e| filter.until.is_none_or(|until| e.timestamp <= until))
            .cloned()
            .collect()
    }

    /// Append an `ADVOCATE_NOTIFIED` successor entry and flip the flag on the
    /// original record. The original's signature is untouched: it still
    /// covers exactly what was signed at append time.
    pub async fn mark_advocate_notified(&self, entry_id: u64) -> Result<AuditEntry, LedgerError> {
        let poa_id = {
            let entries = self.entries.read().await;
            entries
                .iter()
                .find(|e| e.id == entry_id)
                .map(|e| e.poa_id)
                .ok_or(LedgerError::EntryNotFound(entry_id))?
        };

        let successor = self
            .append(
                poa_id,
                "ADVOCATE_NOTIFIED",
                Decision::Allowed,
                format!("advocate notified for audit entry {entry_id}"),
                Value::Null,
                None,
                None,
            )
            .await?;

        let mut entries = self.entries.write().await;
        if let Some(entry) = entries.iter_mut().find(|e| e.id == entry_id) {
            entry.advocate_notified = true;
        }
        Ok(successor)
    }

    pub async fn export(&self, poa_id: Uuid, format: ExportFormat) -> Result<Vec<u8>, LedgerError> {
        let filter = LedgerFilter { poa_id: Some(poa_id), ..Default::default() };
        let entries = self.list(&filter).await;
        match format {
            ExportFormat::Structured => serde_json::to_vec_pretty(&entries)
                .map_err(|e| LedgerError::StorageUnavailable(e.to_string())),
            ExportFormat::Human => {
                let mut out = String::new();
                out.push_str(&format!("Audit trail for POA {poa_id}\n"));
                out.push_str(&"=".repeat(40));
                out.push('\n');
                for entry in &entries {
                    out.push_str(&format!(
                        "[{}] #{} {} -> {:?} :: {}\n",
                        entry.timestamp.to_rfc3339(),
                        entry.id,
                        entry.action_type,
                        entry.decision,
                        entry.reasoning
                    ));
                }
                Ok(out.into_bytes())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn ledger() -> AuditLedger {
        AuditLedger::new(Arc::new(CryptoProvider::ephemeral()))
    }

    #[tokio::test]
    async fn append_assigns_monotonic_ids_and_verifiable_signature() {
        let ledger = ledger();
        let poa_id = Uuid::new_v4();
        let e1 = ledger
            .append(poa_id, "POA_CREATED", Decision::Allowed, "created", Value::Null, None, None)
            .await
            .unwrap();
        let e2 = ledger
            .append(poa_id, "REQUEST_READ", Decision::Allowed, "ok", Value::Null, None, None)
            .await
            .unwrap();
        assert!(e2.id > e1.id);
        assert!(ledger.verify(e1.id).await.unwrap());
        assert!(ledger.verify(e2.id).await.unwrap());
    }

    #[tokio::test]
    async fn list_filters_by_poa_and_decision() {
        let ledger = ledger();
        let poa_a = Uuid::new_v4();
        let poa_b = Uuid::new_v4();
        ledger
            .append(poa_a, "REQUEST_PAY", Decision::Allowed, "ok", Value::Null, None, Some(dec!(10)))
            .await
            .unwrap();
        ledger
            .append(poa_b, "SCOPE_VIOLATION", Decision::Blocked, "no", Value::Null, None, None)
            .await
            .unwrap();

        let only_a = ledger.list(&LedgerFilter { poa_id: Some(poa_a), ..Default::default() }).await;
        assert_eq!(only_a.len(), 1);
        assert_eq!(only_a[0].poa_id, poa_a);

        let only_blocked =
            ledger.list(&LedgerFilter { decision: Some(Decision::Blocked), ..Default::default() }).await;
        assert_eq!(only_blocked.len(), 1);
        assert_eq!(only_blocked[0].poa_id, poa_b);
    }

    #[tokio::test]
    async fn mark_advocate_notified_appends_successor_without_touching_signature() {
        let ledger = ledger();
        let poa_id = Uuid::new_v4();
        let entry = ledger
            .append(poa_id, "SPEND_LIMIT_EXCEEDED", Decision::BreakGlass, "over limit", Value::Null, None, None)
            .await
            .unwrap();
        let original_signature = entry.signature.clone();

        let successor = ledger.mark_advocate_notified(entry.id).await.unwrap();
        assert_eq!(successor.action_type, "ADVOCATE_NOTIFIED");

        let entries = ledger.list(&LedgerFilter { poa_id: Some(poa_id), ..Default::default() }).await;
        let refreshed = entries.iter().find(|e| e.id == entry.id).unwrap();
        assert!(refreshed.advocate_notified);
        assert_eq!(refreshed.signature, original_signature);
        assert!(ledger.verify(entry.id).await.unwrap());
    }

    #[tokio::test]
    async fn verify_rejects_unknown_entry() {
        let ledger = ledger();
        assert!(matches!(ledger.verify(9999).await, Err(LedgerError::EntryNotFound(9999))));
    }

    #[tokio::test]
    async fn export_structured_round_trips_through_json() {
        let ledger = ledger();
        let poa_id = Uuid::new_v4();
        ledger
            .append(poa_id, "POA_CREATED", Decision::Allowed, "created", Value::Null, None, None)
            .await
            .unwrap();
        let bytes = ledger.export(poa_id, ExportFormat::Structured).await.unwrap();
        let parsed: Vec<AuditEntry> = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(parsed.len(), 1);
    }
}
