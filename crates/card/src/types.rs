use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The card network's authorization envelope, per spec §6.
#[derive(Debug, Clone, Deserialize)]
pub struct CardAuthEnvelope {
    pub token: String,
    pub card_token: String,
    /// Minor units (cents).
    pub amount: i64,
    pub merchant: MerchantInfo,
    pub created: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MerchantInfo {
    pub descriptor: String,
    pub mcc: String,
    pub city: Option<String>,
    pub state: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CardAuthResult {
    Approved,
    Declined,
}

#[derive(Debug, Clone, Serialize)]
pub struct CardAuthMetadata {
    pub risk_score: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decline_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending_advocate: Option<bool>,
}

/// Response envelope returned to the card network, per spec §6.
#[derive(Debug, Clone, Serialize)]
pub struct CardAuthResponse {
    pub result: CardAuthResult,
    /// Echoed back in minor units, matching the request.
    pub amount: i64,
    pub metadata: CardAuthMetadata,
}

impl CardAuthResponse {
    pub fn declined(amount: i64, risk_score: u32, reason: impl Into<String>, pending_advocate: bool) -> Self {
        Self {
            result: CardAuthResult::Declined,
            amount,
            metadata: CardAuthMetadata {
                risk_score,
                decline_reason: Some(reason.into()),
                pending_advocate: pending_advocate.then_some(true),
            },
        }
    }

    pub fn approved(amount: i64, risk_score: u32) -> Self {
        Self {
            result: CardAuthResult::Approved,
            amount,
            metadata: CardAuthMetadata { risk_score, decline_reason: None, pending_advocate: None },
        }
    }
}
