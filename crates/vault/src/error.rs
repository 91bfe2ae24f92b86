use thiserror::Error;
use trustgate_ledger::LedgerError;

#[derive(Debug, Error)]
pub enum VaultError {
    #[error("POA {0} not found")]
    PoaNotFound(uuid::Uuid),
    #[error("token {0} not found")]
    TokenNotFound(uuid::Uuid),
    #[error("credential presentation {0} not found")]
    PresentationNotFound(uuid::Uuid),
    #[error("audit ledger unavailable: {0}")]
    LedgerUnavailable(#[from] LedgerError),
}
