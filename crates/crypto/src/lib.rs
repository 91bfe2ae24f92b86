//! TrustGate-Crypto: symmetric encryption, HMAC signing, and TOTP.
//!
//! Every operation here is fatal-on-failure to its caller: there is no
//! silent fallback path. A `CryptoError` always means the calling decision
//! must be treated as failed, never retried with a weaker mode.

pub mod otp;
mod provider;

pub use otp::{TotpError, TotpGenerator};
pub use provider::{CryptoError, CryptoProvider};
