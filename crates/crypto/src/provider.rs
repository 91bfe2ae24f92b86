//! Symmetric encryption (AES-256-GCM) and keyed MAC (HMAC-SHA-256).
//!
//! Key material is process-wide immutable configuration: it is loaded once
//! at startup and never read from a process-global afterward (the provider
//! instance itself is the only carrier).

use hmac::{Hmac, Mac};
use ring::aead::{self, BoundKey, Nonce, NonceSequence, UnboundKey, AES_256_GCM, NONCE_LEN};
use ring::rand::{SecureRandom, SystemRandom};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Cryptographic errors. All are fatal to the calling decision; callers must
/// not retry with a weaker mode.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("encryption key must be exactly 32 bytes, got {0}")]
    InvalidKeyLength(usize),
    #[error("failed to generate nonce: {0}")]
    NonceGeneration(String),
    #[error("encryption failed")]
    EncryptionFailed,
    #[error("decryption failed: ciphertext too short or authentication failed")]
    DecryptionFailed,
    #[error("invalid hex key material: {0}")]
    InvalidHex(#[from] hex::FromHexError),
    #[error("signature verification failed")]
    VerificationFailed,
}

/// A single-use nonce sequence: AES-GCM requires a fresh nonce per seal, so
/// each `encrypt` call builds a provider-scoped key with exactly one nonce.
struct OneShotNonce(Option<[u8; NONCE_LEN]>);

impl NonceSequence for OneShotNonce {
    fn advance(&mut self) -> Result<Nonce, ring::error::Unspecified> {
        self.0.take().map(Nonce::assume_unique_for_key).ok_or(ring::error::Unspecified)
    }
}

/// Provides the three crypto primitives the fiduciary core depends on:
/// authenticated encryption for token storage, a keyed MAC for ledger
/// signatures, and (via [`crate::otp`]) TOTP challenge generation.
pub struct CryptoProvider {
    encryption_key: [u8; 32],
    mac_key: Vec<u8>,
    rng: SystemRandom,
}

impl CryptoProvider {
    /// Build a provider from raw key bytes. Both keys must already be
    /// present; there is no default or generated fallback in production use.
    pub fn new(encryption_key: &[u8], mac_key: &[u8]) -> Result<Self, CryptoError> {
        if encryption_key.len() != 32 {
            return Err(CryptoError::InvalidKeyLength(encryption_key.len()));
        }
        let mut key = [0u8; 32];
        key.copy_from_slice(encryption_key);
        Ok(Self {
            encryption_key: key,
            mac_key: mac_key.to_vec(),
            rng: SystemRandom::new(),
        })
    }

    /// Build a provider from hex-encoded keys, as read from configuration
    /// (`TRUSTGATE_ENCRYPTION_KEY` / `TRUSTGATE_MAC_KEY`).
    pub fn from_hex(encryption_key_hex: &str, mac_key_hex: &str) -> Result<Self, CryptoError> {
        let enc = hex::decode(encryption_key_hex)?;
        let mac = hex::decode(mac_key_hex)?;
        Self::new(&enc, &mac)
    }

    /// Ephemeral provider for tests only: generates random keys in-process.
    /// Never use this for anything that outlives the current test process.
    pub fn ephemeral() -> Self {
        let rng = SystemRandom::new();
        let mut enc = [0u8; 32];
        rng.fill(&mut enc).expect("system RNG unavailable");
        let mut mac = [0u8; 32];
        rng.fill(&mut mac).expect("system RNG unavailable");
        Self {
            encryption_key: enc,
            mac_key: mac.to_vec(),
            rng,
        }
    }

    /// Encrypt `plaintext` with AES-256-GCM. The returned buffer is
    /// `nonce || ciphertext || tag`.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let unbound = UnboundKey::new(&AES_256_GCM, &self.encryption_key)
            .map_err(|_| CryptoError::EncryptionFailed)?;

        let mut nonce_bytes = [0u8; NONCE_LEN];
        self.rng
            .fill(&mut nonce_bytes)
            .map_err(|e| CryptoError::NonceGeneration(format!("{e:?}")))?;

        let mut sealing_key = aead::SealingKey::new(unbound, OneShotNonce(Some(nonce_bytes)));

        let mut in_out = plaintext.to_vec();
        sealing_key
            .seal_in_place_append_tag(aead::Aad::empty(), &mut in_out)
            .map_err(|_| CryptoError::EncryptionFailed)?;

        let mut out = Vec::with_capacity(NONCE_LEN + in_out.len());
        out.extend_from_slice(&nonce_bytes);
        out.extend_from_slice(&in_out);
        Ok(out)
    }

    /// Decrypt a buffer produced by [`Self::encrypt`].
    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        if ciphertext.len() < NONCE_LEN {
            return Err(CryptoError::DecryptionFailed);
        }
        let (nonce_bytes, sealed) = ciphertext.split_at(NONCE_LEN);
        let mut nonce_arr = [0u8; NONCE_LEN];
        nonce_arr.copy_from_slice(nonce_bytes);

        let unbound = UnboundKey::new(&AES_256_GCM, &self.encryption_key)
            .map_err(|_| CryptoError::DecryptionFailed)?;
        let mut opening_key = aead::OpeningKey::new(unbound, OneShotNonce(Some(nonce_arr)));

        let mut in_out = sealed.to_vec();
        let plaintext = opening_key
            .open_in_place(aead::Aad::empty(), &mut in_out)
            .map_err(|_| CryptoError::DecryptionFailed)?;
        Ok(plaintext.to_vec())
    }

    /// Sign canonicalized bytes with HMAC-SHA-256, returning a hex digest.
    pub fn sign(&self, canonical_bytes: &[u8]) -> String {
        let mut mac = HmacSha256::new_from_slice(&self.mac_key)
            .expect("HMAC accepts keys of any length");
        mac.update(canonical_bytes);
        hex::encode(mac.finalize().into_bytes())
    }

    /// Verify a hex-encoded MAC against canonicalized bytes, constant-time.
    pub fn verify(&self, canonical_bytes: &[u8], mac_hex: &str) -> bool {
        let Ok(expected) = hex::decode(mac_hex) else {
            return false;
        };
        let mut mac = HmacSha256::new_from_slice(&self.mac_key)
            .expect("HMAC accepts keys of any length");
        mac.update(canonical_bytes);
        let computed = mac.finalize().into_bytes();
        computed.ct_eq(&expected[..]).into()
    }

    /// Access the MAC key for components (e.g. TOTP) that need their own
    /// derived keyed-hash construction.
    pub(crate) fn mac_key(&self) -> &[u8] {
        &self.mac_key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encrypt_decrypt_roundtrip() {
        let provider = CryptoProvider::ephemeral();
        let plaintext = b"oauth-access-token-xyz";
        let ciphertext = provider.encrypt(plaintext).unwrap();
        assert_ne!(ciphertext, plaintext);
        let decrypted = provider.decrypt(&ciphertext).unwrap();
        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn decrypt_rejects_tampered_ciphertext() {
        let provider = CryptoProvider::ephemeral();
        let mut ciphertext = provider.encrypt(b"secret").unwrap();
        let last = ciphertext.len() - 1;
        ciphertext[last] ^= 0xFF;
        assert!(provider.decrypt(&ciphertext).is_err());
    }

    #[test]
    fn sign_verify_roundtrip() {
        let provider = CryptoProvider::ephemeral();
        let data = b"poa_id=1;action=POA_CREATED;decision=ALLOWED";
        let sig = provider.sign(data);
        assert!(provider.verify(data, &sig));
    }

    #[test]
    fn verify_rejects_mutated_data() {
        let provider = CryptoProvider::ephemeral();
        let sig = provider.sign(b"original data");
        assert!(!provider.verify(b"mutated data", &sig));
    }

    #[test]
    fn rejects_wrong_key_length() {
        let err = CryptoProvider::new(b"too-short", b"mac-key").unwrap_err();
        assert!(matches!(err, CryptoError::InvalidKeyLength(_)));
    }
}
