//! Inbound webhook HMAC verification.
//!
//! Grounded in `original_source/backend/virtual_card_manager.py::
//! verify_webhook_signature`: HMAC-SHA-256 of the raw request body,
//! hex-encoded, compared in constant time. Kept separate from
//! `trustgate-crypto`'s ledger-signing MAC since the provider webhook secret
//! is operationally distinct key material from the ledger's.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

pub struct WebhookVerifier {
    secret: Vec<u8>,
}

impl WebhookVerifier {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self { secret: secret.into() }
    }

    /// `signature_hex` is the hex-encoded HMAC-SHA-256 of `body` under the
    /// configured secret, as sent in the provider's signature header.
    pub fn verify(&self, body: &[u8], signature_hex: &str) -> bool {
        let Ok(expected) = hex::decode(signature_hex) else {
            return false;
        };
        let mut mac = HmacSha256::new_from_slice(&self.secret).expect("HMAC accepts keys of any length");
        mac.update(body);
        let computed = mac.finalize().into_bytes();
        computed.ct_eq(&expected[..]).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign(secret: &[u8], body: &[u8]) -> String {
        let mut mac = HmacSha256::new_from_slice(secret).unwrap();
        mac.update(body);
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn accepts_correctly_signed_body() {
        let verifier = WebhookVerifier::new(b"webhook-secret".to_vec());
        let body = br#"{"amount": 8750}"#;
        let signature = sign(b"webhook-secret", body);
        assert!(verifier.verify(body, &signature));
    }

    #[test]
    fn rejects_tampered_body() {
        let verifier = WebhookVerifier::new(b"webhook-secret".to_vec());
        let body = br#"{"amount": 8750}"#;
        let signature = sign(b"webhook-secret", body);
        assert!(!verifier.verify(br#"{"amount": 999999}"#, &signature));
    }

    #[test]
    fn rejects_wrong_secret() {
        let verifier = WebhookVerifier::new(b"webhook-secret".to_vec());
        let body = br#"{"amount": 8750}"#;
        let signature = sign(b"a-different-secret", body);
        assert!(!verifier.verify(body, &signature));
    }

    #[test]
    fn rejects_malformed_hex_signature() {
        let verifier = WebhookVerifier::new(b"webhook-secret".to_vec());
        assert!(!verifier.verify(b"body", "not-hex!"));
    }
}
