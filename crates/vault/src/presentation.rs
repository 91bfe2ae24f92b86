//! Records of when a POA's credentials were presented to a third party.
//!
//! Grounded in `original_source/backend/proxy_vault.py::CredentialPresenter`,
//! minus PDF/QR rendering (out of scope): the presentation record is audit
//! surface, the document itself is an external collaborator's concern.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use trustgate_crypto::CryptoProvider;
use uuid::Uuid;

use crate::error::VaultError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresentationMethod {
    Api,
    Email,
    Manual,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialPresentation {
    pub id: Uuid,
    pub poa_id: Uuid,
    pub presented_to: String,
    pub presentation_method: PresentationMethod,
    pub presented_at: DateTime<Utc>,
    pub verification_code: String,
    pub verified_by_recipient: bool,
    pub verified_at: Option<DateTime<Utc>>,
    pub document_hash: Option<String>,
}

/// Tracks credential presentations per POA. `document_hash` is an opaque
/// SHA-256 hex string supplied by the rendering collaborator; this registry
/// never generates the underlying document itself.
pub struct CredentialPresenter {
    crypto: Arc<CryptoProvider>,
    presentations: RwLock<HashMap<Uuid, CredentialPresentation>>,
}

impl CredentialPresenter {
    pub fn new(crypto: Arc<CryptoProvider>) -> Self {
        Self { crypto, presentations: RwLock::new(HashMap::new()) }
    }

    /// First 16 hex characters of an HMAC over the POA id and timestamp,
    /// matching the reference implementation's truncated-signature scheme.
    fn generate_verification_code(&self, poa_id: Uuid, at: DateTime<Utc>) -> String {
        let canonical = format!("poa_id={poa_id};timestamp={}", at.to_rfc3339());
        let signature = self.crypto.sign(canonical.as_bytes());
        signature.chars().take(16).collect()
    }

    pub async fn record_presentation(
        &self,
        poa_id: Uuid,
        presented_to: impl Into<String>,
        presentation_method: PresentationMethod,
        document_hash: Option<String>,
    ) -> CredentialPresentation {
        let now = Utc::now();
        let presentation = CredentialPresentation {
            id: Uuid::new_v4(),
            poa_id,
            presented_to: presented_to.into(),
            presentation_method,
            presented_at: now,
            verification_code: self.generate_verification_code(poa_id, now),
            verified_by_recipient: false,
            verified_at: None,
            document_hash,
        };
        self.presentations.write().await.insert(presentation.id, presentation.clone());
        presentation
    }

    pub async fn mark_verified(&self, presentation_id: Uuid) -> Result<CredentialPresentation, VaultError> {
        let mut presentations = self.presentations.write().await;
        let presentation = presentations
            .get_mut(&presentation_id)
            .ok_or(VaultError::PresentationNotFound(presentation_id))?;
        presentation.verified_by_recipient = true;
        presentation.verified_at = Some(Utc::now());
        Ok(presentation.clone())
    }

    pub async fn list_for_poa(&self, poa_id: Uuid) -> Vec<CredentialPresentation> {
        self.presentations.read().await.values().filter(|p| p.poa_id == poa_id).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn record_and_verify_presentation() {
        let presenter = CredentialPresenter::new(Arc::new(CryptoProvider::ephemeral()));
        let poa_id = Uuid::new_v4();
        let presentation = presenter
            .record_presentation(poa_id, "att-billing@example.com", PresentationMethod::Email, Some("deadbeef".into()))
            .await;
        assert!(!presentation.verified_by_recipient);
        assert_eq!(presentation.verification_code.len(), 16);

        let verified = presenter.mark_verified(presentation.id).await.unwrap();
        assert!(verified.verified_by_recipient);
        assert!(verified.verified_at.is_some());
    }

    #[tokio::test]
    async fn list_for_poa_only_returns_matching_records() {
        let presenter = CredentialPresenter::new(Arc::new(CryptoProvider::ephemeral()));
        let poa_a = Uuid::new_v4();
        let poa_b = Uuid::new_v4();
        presenter.record_presentation(poa_a, "x", PresentationMethod::Api, None).await;
        presenter.record_presentation(poa_b, "y", PresentationMethod::Manual, None).await;
        let for_a = presenter.list_for_poa(poa_a).await;
        assert_eq!(for_a.len(), 1);
        assert_eq!(for_a[0].poa_id, poa_a);
    }
}
