//! Encrypted OAuth token storage.
//!
//! Ciphertext only ever touches the store; plaintext is never logged,
//! matching `original_source/backend/proxy_vault.py::SmartPOAManager`'s
//! `store_oauth_token` / `get_decrypted_token` pair.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use trustgate_crypto::CryptoProvider;
use uuid::Uuid;

use crate::poa::Poa;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncryptedToken {
    pub id: Uuid,
    pub poa_id: Uuid,
    pub service_name: String,
    pub kind: TokenKind,
    pub ciphertext: Vec<u8>,
    pub expires_at: Option<DateTime<Utc>>,
    pub last_used_at: Option<DateTime<Utc>>,
}

/// Encrypts plaintext tokens at rest and releases plaintext only to callers
/// holding a still-valid, unexpired claim.
pub struct TokenVault {
    crypto: Arc<CryptoProvider>,
    tokens: RwLock<HashMap<Uuid, EncryptedToken>>,
}

impl TokenVault {
    pub fn new(crypto: Arc<CryptoProvider>) -> Self {
        Self { crypto, tokens: RwLock::new(HashMap::new()) }
    }

    pub async fn store(
        &self,
        poa_id: Uuid,
        service_name: impl Into<String>,
        plaintext: &[u8],
        kind: TokenKind,
        ttl: Option<Duration>,
    ) -> Result<EncryptedToken, trustgate_crypto::CryptoError> {
        let ciphertext = self.crypto.encrypt(plaintext)?;
        let record = EncryptedToken {
            id: Uuid::new_v4(),
            poa_id,
            service_name: service_name.into(),
            kind,
            ciphertext,
            expires_at: ttl.map(|ttl| Utc::now() + ttl),
            last_used_at: None,
        };
        self.tokens.write().await.insert(record.id, record.clone());
        Ok(record)
    }

    /// Returns `None` if the token is absent, expired, or the owning POA is
    /// no longer valid. Updates `last_used_at` on a successful reveal.
    pub async fn reveal(&self, token_id: Uuid, owning_poa: &Poa) -> Option<Vec<u8>> {
        if !owning_poa.is_valid() {
            return None;
        }

        let ciphertext = {
            let tokens = self.tokens.read().await;
            let record = tokens.get(&token_id)?;
            if record.poa_id != owning_poa.id {
                return None;
            }
            if let Some(expires_at) = record.expires_at {
                if Utc::now() >= expires_at {
                    return None;
                }
            }
            record.ciphertext.clone()
        };

        let plaintext = self.crypto.decrypt(&ciphertext).ok()?;

        let mut tokens = self.tokens.write().await;
        if let Some(record) = tokens.get_mut(&token_id) {
            record.last_used_at = Some(Utc::now());
        }
        Some(plaintext)
    }

    /// Cascade-delete every token owned by a revoked POA.
    pub async fn delete_for_poa(&self, poa_id: Uuid) {
        let mut tokens = self.tokens.write().await;
        tokens.retain(|_, record| record.poa_id != poa_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn valid_poa() -> Poa {
        Poa {
            id: Uuid::new_v4(),
            principal_id: "senior-1".into(),
            agent_id: "agent-1".into(),
            scope: "subscriptions".into(),
            allowed_services: None::<HashSet<String>>,
            spend_limit: rust_decimal::Decimal::ZERO,
            created_at: Utc::now(),
            expires_at: Utc::now() + Duration::days(30),
            active: true,
            revoked_at: None,
            revocation_reason: None,
            creator_id: None,
        }
    }

    #[tokio::test]
    async fn store_and_reveal_round_trips_plaintext() {
        let vault = TokenVault::new(Arc::new(CryptoProvider::ephemeral()));
        let poa = valid_poa();
        let record = vault.store(poa.id, "netflix", b"access-token-123", TokenKind::Access, None).await.unwrap();
        let revealed = vault.reveal(record.id, &poa).await;
        assert_eq!(revealed.as_deref(), Some(&b"access-token-123"[..]));
    }

    #[tokio::test]
    async fn reveal_fails_for_invalid_poa() {
        let vault = TokenVault::new(Arc::new(CryptoProvider::ephemeral()));
        let mut poa = valid_poa();
        let record = vault.store(poa.id, "netflix", b"access-token-123", TokenKind::Access, None).await.unwrap();
        poa.active = false;
        assert!(vault.reveal(record.id, &poa).await.is_none());
    }

    #[tokio::test]
    async fn reveal_fails_for_expired_token() {
        let vault = TokenVault::new(Arc::new(CryptoProvider::ephemeral()));
        let poa = valid_poa();
        let record = vault
            .store(poa.id, "netflix", b"access-token-123", TokenKind::Access, Some(Duration::seconds(-1)))
            .await
            .unwrap();
        assert!(vault.reveal(record.id, &poa).await.is_none());
    }

    #[tokio::test]
    async fn cascade_delete_removes_all_poa_tokens() {
        let vault = TokenVault::new(Arc::new(CryptoProvider::ephemeral()));
        let poa = valid_poa();
        let record = vault.store(poa.id, "netflix", b"token", TokenKind::Access, None).await.unwrap();
        vault.delete_for_poa(poa.id).await;
        assert!(vault.reveal(record.id, &poa).await.is_none());
    }
}
