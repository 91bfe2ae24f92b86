//! Facade wiring the POA registry to the token vault so that revocation
//! cascades to the tokens it owns, per the ownership rule in the data model:
//! a POA exclusively owns its tokens, and they are deleted on revocation.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Duration;
use rust_decimal::Decimal;
use trustgate_crypto::CryptoProvider;
use trustgate_ledger::AuditLedger;
use uuid::Uuid;

use crate::error::VaultError;
use crate::poa::Poa;
use crate::presentation::{CredentialPresentation, CredentialPresenter, PresentationMethod};
use crate::registry::PoaRegistry;
use crate::token::{EncryptedToken, TokenKind, TokenVault};

pub struct Vault {
    pub registry: PoaRegistry,
    pub tokens: TokenVault,
    pub presentations: CredentialPresenter,
}

impl Vault {
    pub fn new(crypto: Arc<CryptoProvider>, ledger: Arc<AuditLedger>) -> Self {
        Self {
            registry: PoaRegistry::new(ledger),
            tokens: TokenVault::new(crypto.clone()),
            presentations: CredentialPresenter::new(crypto),
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create_poa(
        &self,
        principal_id: impl Into<String>,
        agent_id: impl Into<String>,
        scope: impl Into<String>,
        spend_limit: Decimal,
        expiry_days: i64,
        allowed_services: Option<HashSet<String>>,
        creator_id: Option<String>,
    ) -> Result<Poa, VaultError> {
        self.registry
            .create(principal_id, agent_id, scope, spend_limit, expiry_days, allowed_services, creator_id)
            .await
    }

    /// Revokes the POA and cascades deletion of every token it owns.
    pub async fn revoke_poa(&self, id: Uuid, reason: impl Into<String>, revoker: impl Into<String>) -> Result<bool, VaultError> {
        let revoked = self.registry.revoke(id, reason, revoker).await?;
        if revoked {
            self.tokens.delete_for_poa(id).await;
        }
        Ok(revoked)
    }

    pub async fn store_token(
        &self,
        poa_id: Uuid,
        service_name: impl Into<String>,
        plaintext: &[u8],
        kind: TokenKind,
        ttl: Option<Duration>,
    ) -> Result<EncryptedToken, trustgate_crypto::CryptoError> {
        self.tokens.store(poa_id, service_name, plaintext, kind, ttl).await
    }

    pub async fn reveal_token(&self, token_id: Uuid, poa_id: Uuid) -> Result<Option<Vec<u8>>, VaultError> {
        let poa = self.registry.get(poa_id).await.ok_or(VaultError::PoaNotFound(poa_id))?;
        Ok(self.tokens.reveal(token_id, &poa).await)
    }

    pub async fn record_presentation(
        &self,
        poa_id: Uuid,
        presented_to: impl Into<String>,
        method: PresentationMethod,
        document_hash: Option<String>,
    ) -> CredentialPresentation {
        self.presentations.record_presentation(poa_id, presented_to, method, document_hash).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn vault() -> Vault {
        let crypto = Arc::new(CryptoProvider::ephemeral());
        let ledger = Arc::new(AuditLedger::new(crypto.clone()));
        Vault::new(crypto, ledger)
    }

    #[tokio::test]
    async fn revoking_a_poa_cascades_token_deletion() {
        let vault = vault();
        let poa = vault.create_poa("senior-1", "agent-1", "subscriptions", dec!(50), 30, None, None).await.unwrap();
        let token = vault.store_token(poa.id, "netflix", b"secret-token", TokenKind::Access, None).await.unwrap();

        assert!(vault.reveal_token(token.id, poa.id).await.unwrap().is_some());
        vault.revoke_poa(poa.id, "no longer needed", "senior-1").await.unwrap();
        assert!(vault.reveal_token(token.id, poa.id).await.unwrap().is_none());
    }
}
