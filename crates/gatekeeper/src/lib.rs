//! TrustGate-Gatekeeper: the central authorization decision, composing POA
//! validity, scope, and spend-limit checks with the audit ledger and
//! break-glass escalation.

mod gatekeeper;
mod types;

pub use gatekeeper::Gatekeeper;
pub use types::{GatekeeperDecision, GatekeeperRequest, ViolationType};
