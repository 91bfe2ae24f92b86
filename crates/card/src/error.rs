use thiserror::Error;

/// Per spec §7: "the card service converts any unhandled failure into
/// DECLINED." Every variant here maps to a `DECLINED` response at the
/// service boundary; none of them are propagated to the card network as an
/// HTTP error beyond the initial signature check.
#[derive(Debug, Error)]
pub enum CardAuthError {
    #[error("webhook signature does not match the configured provider secret")]
    Unauthenticated,
    #[error("card token is not bound to a known principal")]
    UnknownCardToken,
    #[error("decision exceeded its latency budget")]
    Timeout,
    #[error("audit ledger unavailable: {0}")]
    LedgerUnavailable(#[from] trustgate_ledger::LedgerError),
}
