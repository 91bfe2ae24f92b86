//! TrustGate-Interceptor: scores call transcripts for scam indicators and
//! recommends allow / answer-bot / intervene-and-block.

mod analyzer;
mod table;
mod types;

pub use analyzer::ScamInterceptor;
pub use table::{ScamTable, ScamTableError};
pub use types::{ScamAction, ScamAnalysis, ScamIndicator};
