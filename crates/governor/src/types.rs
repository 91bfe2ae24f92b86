use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A transaction to be scored. `utc_offset_minutes`, when present, shifts
/// `timestamp` into the principal's local zone for the odd-hours check;
/// absent, UTC is used directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRequest {
    pub amount: Decimal,
    pub timestamp: DateTime<Utc>,
    pub category: String,
    pub merchant: String,
    pub principal_id: Option<String>,
    pub utc_offset_minutes: Option<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Approved,
    PendingApproval,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionFlag {
    HighAmount,
    VeryHighAmount,
    OddHours,
    OddHoursAtm,
    HighRiskCategory,
    MediumRiskCategory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GovernorDecision {
    pub risk_level: RiskLevel,
    pub risk_score: u32,
    pub status: TransactionStatus,
    pub flags: Vec<TransactionFlag>,
    pub reasoning: String,
    pub requires_approval: bool,
    pub timestamp: DateTime<Utc>,
}
