//! TrustGate-Card: the latency-bounded card-network authorization webhook.

mod binding;
mod error;
mod mcc;
mod service;
mod signature;
mod types;

pub use binding::{CardBinding, CardBindingRegistry};
pub use error::CardAuthError;
pub use mcc::MccTable;
pub use service::{CardAuthService, DEFAULT_DEADLINE_MS};
pub use signature::WebhookVerifier;
pub use types::{CardAuthEnvelope, CardAuthMetadata, CardAuthResponse, CardAuthResult, MerchantInfo};
