//! TrustGate-Ledger: the append-only, signed audit trail every decision in
//! the fiduciary core writes to before it is allowed to return.

mod error;
mod ledger;
mod types;

pub use error::LedgerError;
pub use ledger::AuditLedger;
pub use types::{AuditEntry, Decision, ExportFormat, LedgerFilter};
