//! Card-token to principal/POA binding.
//!
//! `original_source/backend/virtual_card_manager.py::_get_senior_from_card`
//! is a hardcoded mock returning a single senior id; this registry replaces
//! it with a real (if in-memory) lookup table, since the spec requires a
//! "configured binding" rather than a stub.

use std::collections::HashMap;

use tokio::sync::RwLock;
use uuid::Uuid;

/// What a card token authorizes spend under: the principal it belongs to,
/// and the POA whose ledger the resulting audit entry is attributed to.
#[derive(Debug, Clone)]
pub struct CardBinding {
    pub principal_id: String,
    pub poa_id: Uuid,
}

/// In-memory card-token bindings. The real binding source (the card
/// issuer's provisioning records) is an external collaborator per spec §1;
/// this registry is the injectable seam it populates through.
#[derive(Default)]
pub struct CardBindingRegistry {
    bindings: RwLock<HashMap<String, CardBinding>>,
}

impl CardBindingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn bind(&self, card_token: impl Into<String>, binding: CardBinding) {
        self.bindings.write().await.insert(card_token.into(), binding);
    }

    pub async fn resolve(&self, card_token: &str) -> Option<CardBinding> {
        self.bindings.read().await.get(card_token).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn resolves_a_bound_token() {
        let registry = CardBindingRegistry::new();
        let poa_id = Uuid::new_v4();
        registry.bind("card_tok_123", CardBinding { principal_id: "senior-1".into(), poa_id }).await;

        let resolved = registry.resolve("card_tok_123").await.unwrap();
        assert_eq!(resolved.principal_id, "senior-1");
        assert_eq!(resolved.poa_id, poa_id);
    }

    #[tokio::test]
    async fn unbound_token_resolves_to_none() {
        let registry = CardBindingRegistry::new();
        assert!(registry.resolve("unknown").await.is_none());
    }
}
