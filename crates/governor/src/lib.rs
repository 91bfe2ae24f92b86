//! TrustGate-Governor: context-aware transaction risk scoring.

mod governor;
mod types;

pub use governor::TransactionGovernor;
pub use types::{GovernorDecision, RiskLevel, TransactionFlag, TransactionRequest, TransactionStatus};
