//! Time-based one-time codes for the break-glass second factor.
//!
//! Generation uses HMAC-SHA-256 rather than the SHA-1 default most TOTP
//! implementations ship with, since the fiduciary core already carries a
//! SHA-256 MAC primitive ([`crate::CryptoProvider`]) and there is no reason
//! to pull in a second hash function for a six-digit challenge code.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

const STEP_SECONDS: i64 = 300;
const CODE_DIGITS: u32 = 6;
const ACCEPTED_WINDOWS: i64 = 1;

#[derive(Debug, Error)]
pub enum TotpError {
    #[error("secret must not be empty")]
    EmptySecret,
}

/// Generates and verifies six-digit TOTP codes on a 300-second step, with
/// one step of clock-skew tolerance on either side.
pub struct TotpGenerator {
    step_seconds: i64,
    accepted_windows: i64,
}

impl Default for TotpGenerator {
    fn default() -> Self {
        Self {
            step_seconds: STEP_SECONDS,
            accepted_windows: ACCEPTED_WINDOWS,
        }
    }
}

impl TotpGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate the code for `secret` at `at`.
    pub fn generate(&self, secret: &[u8], at: DateTime<Utc>) -> Result<String, TotpError> {
        if secret.is_empty() {
            return Err(TotpError::EmptySecret);
        }
        let counter = self.counter_at(at);
        Ok(Self::code_for_counter(secret, counter))
    }

    /// Verify `code` against `secret` at `at`, accepting codes from the
    /// current step and `accepted_windows` steps before or after it.
    pub fn verify(&self, secret: &[u8], code: &str, at: DateTime<Utc>) -> Result<bool, TotpError> {
        if secret.is_empty() {
            return Err(TotpError::EmptySecret);
        }
        let counter = self.counter_at(at);
        for offset in -self.accepted_windows..=self.accepted_windows {
            let candidate_counter = counter.saturating_add(offset);
            if Self::code_for_counter(secret, candidate_counter) == code {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn counter_at(&self, at: DateTime<Utc>) -> i64 {
        at.timestamp() / self.step_seconds
    }

    fn code_for_counter(secret: &[u8], counter: i64) -> String {
        let mut mac =
            HmacSha256::new_from_slice(secret).expect("HMAC accepts keys of any length");
        mac.update(&counter.to_be_bytes());
        let digest = mac.finalize().into_bytes();

        // RFC 4226 dynamic truncation, adapted for a 32-byte digest.
        let offset = (digest[digest.len() - 1] & 0x0f) as usize;
        let binary = ((digest[offset] as u32 & 0x7f) << 24)
            | ((digest[offset + 1] as u32) << 16)
            | ((digest[offset + 2] as u32) << 8)
            | (digest[offset + 3] as u32);

        let modulus = 10u32.pow(CODE_DIGITS);
        format!("{:0width$}", binary % modulus, width = CODE_DIGITS as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(seconds: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(seconds, 0).unwrap()
    }

    #[test]
    fn same_window_produces_matching_code() {
        let totp = TotpGenerator::new();
        let secret = b"per-senior-break-glass-secret";
        let code = totp.generate(secret, at(1_700_000_000)).unwrap();
        assert!(totp.verify(secret, &code, at(1_700_000_000)).unwrap());
    }

    #[test]
    fn adjacent_window_is_accepted() {
        let totp = TotpGenerator::new();
        let secret = b"per-senior-break-glass-secret";
        let code = totp.generate(secret, at(1_700_000_000)).unwrap();
        assert!(totp.verify(secret, &code, at(1_700_000_000 + STEP_SECONDS)).unwrap());
        assert!(totp.verify(secret, &code, at(1_700_000_000 - STEP_SECONDS)).unwrap());
    }

    #[test]
    fn two_windows_away_is_rejected() {
        let totp = TotpGenerator::new();
        let secret = b"per-senior-break-glass-secret";
        let code = totp.generate(secret, at(1_700_000_000)).unwrap();
        assert!(!totp
            .verify(secret, &code, at(1_700_000_000 + 2 * STEP_SECONDS))
            .unwrap());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let totp = TotpGenerator::new();
        let code = totp.generate(b"secret-a", at(1_700_000_000)).unwrap();
        assert!(!totp.verify(b"secret-b", &code, at(1_700_000_000)).unwrap());
    }

    #[test]
    fn empty_secret_errors() {
        let totp = TotpGenerator::new();
        assert!(totp.generate(b"", at(0)).is_err());
    }
}
