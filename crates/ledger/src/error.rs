use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("audit entry {0} not found")]
    EntryNotFound(u64),
    #[error("ledger storage unavailable: {0}")]
    StorageUnavailable(String),
}
