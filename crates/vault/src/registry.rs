//! POA lifecycle: creation, lookup, and revocation.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use serde_json::json;
use tokio::sync::RwLock;
use trustgate_ledger::{AuditLedger, Decision};
use uuid::Uuid;

use crate::error::VaultError;
use crate::poa::Poa;

/// Registry of Smart Powers-of-Attorney, backed by an in-memory store.
/// Every mutation is mirrored to the audit ledger before this call returns.
pub struct PoaRegistry {
    ledger: Arc<AuditLedger>,
    poas: RwLock<HashMap<Uuid, Poa>>,
}

impl PoaRegistry {
    pub fn new(ledger: Arc<AuditLedger>) -> Self {
        Self { ledger, poas: RwLock::new(HashMap::new()) }
    }

    /// `expiry_days` may be negative to construct an already-expired POA for
    /// testing; the validity predicate handles that transparently.
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        principal_id: impl Into<String>,
        agent_id: impl Into<String>,
        scope: impl Into<String>,
        spend_limit: Decimal,
        expiry_days: i64,
        allowed_services: Option<HashSet<String>>,
        creator_id: Option<String>,
    ) -> Result<Poa, VaultError> {
        let now = Utc::now();
        let poa = Poa {
            id: Uuid::new_v4(),
            principal_id: principal_id.into(),
            agent_id: agent_id.into(),
            scope: scope.into(),
            allowed_services,
            spend_limit,
            created_at: now,
            expires_at: now + Duration::days(expiry_days),
            active: true,
            revoked_at: None,
            revocation_reason: None,
            creator_id,
        };

        self.ledger
            .append(
                poa.id,
                "POA_CREATED",
                Decision::Allowed,
                format!("POA created for principal {} granting agent {} scope {}", poa.principal_id, poa.agent_id, poa.scope),
                json!({
                    "principal_id": poa.principal_id,
                    "agent_id": poa.agent_id,
                    "scope": poa.scope,
                    "spend_limit": poa.spend_limit.to_string(),
                }),
                None,
                None,
            )
            .await?;

        let mut poas = self.poas.write().await;
        poas.insert(poa.id, poa.clone());
        Ok(poa)
    }

    pub async fn get(&self, id: Uuid) -> Option<Poa> {
        self.poas.read().await.get(&id).cloned()
    }

    pub async fn list_by_principal(&self, principal_id: &str, active_only: bool) -> Vec<Poa> {
        self.poas
            .read()
            .await
            .values()
            .filter(|p| p.principal_id == principal_id)
            .filter(|p| !active_only || p.is_valid())
            .cloned()
            .collect()
    }

    /// Idempotent: revoking an already-revoked POA returns `false` with no
    /// duplicate audit entry.
    pub async fn revoke(&self, id: Uuid, reason: impl Into<String>, revoker: impl Into<String>) -> Result<bool, VaultError> {
        let reason = reason.into();
        let revoker = revoker.into();

        let already_revoked = {
            let poas = self.poas.read().await;
            match poas.get(&id) {
                Some(poa) => poa.revoked_at.is_some(),
                None => return Err(VaultError::PoaNotFound(id)),
            }
        };
        if already_revoked {
            return Ok(false);
        }

        self.ledger
            .append(
                id,
                "POA_REVOKED",
                Decision::Allowed,
                format!("POA revoked by {revoker}: {reason}"),
                json!({ "revoker": revoker, "reason": reason }),
                None,
                None,
            )
            .await?;

        let mut poas = self.poas.write().await;
        if let Some(poa) = poas.get_mut(&id) {
            poa.active = false;
            poa.revoked_at = Some(Utc::now());
            poa.revocation_reason = Some(reason);
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use trustgate_crypto::CryptoProvider;

    fn registry() -> PoaRegistry {
        PoaRegistry::new(Arc::new(AuditLedger::new(Arc::new(CryptoProvider::ephemeral()))))
    }

    #[tokio::test]
    async fn create_emits_audit_entry_and_is_valid() {
        let registry = registry();
        let poa = registry.create("senior-1", "agent-1", "utilities", dec!(100), 30, None, None).await.unwrap();
        assert!(poa.is_valid());
        let entries = registry.ledger.list(&Default::default()).await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action_type, "POA_CREATED");
    }

    #[tokio::test]
    async fn negative_expiry_creates_already_expired_poa() {
        let registry = registry();
        let poa = registry.create("senior-1", "agent-1", "utilities", dec!(100), -1, None, None).await.unwrap();
        assert!(!poa.is_valid());
    }

    #[tokio::test]
    async fn revoke_is_idempotent() {
        let registry = registry();
        let poa = registry.create("senior-1", "agent-1", "banking", dec!(500), 30, None, None).await.unwrap();
        assert!(registry.revoke(poa.id, "lost device", "senior-1").await.unwrap());
        assert!(!registry.revoke(poa.id, "lost device again", "senior-1").await.unwrap());

        let revoke_entries: Vec<_> =
            registry.ledger.list(&Default::default()).await.into_iter().filter(|e| e.action_type == "POA_REVOKED").collect();
        assert_eq!(revoke_entries.len(), 1);
    }

    #[tokio::test]
    async fn list_by_principal_filters_inactive_when_requested() {
        let registry = registry();
        let active = registry.create("senior-1", "agent-1", "utilities", dec!(100), 30, None, None).await.unwrap();
        let revoked = registry.create("senior-1", "agent-1", "banking", dec!(100), 30, None, None).await.unwrap();
        registry.revoke(revoked.id, "done", "senior-1").await.unwrap();

        let active_only = registry.list_by_principal("senior-1", true).await;
        assert_eq!(active_only.len(), 1);
        assert_eq!(active_only[0].id, active.id);

        let all = registry.list_by_principal("senior-1", false).await;
        assert_eq!(all.len(), 2);
    }
}
