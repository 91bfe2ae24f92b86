use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BreakGlassTrigger {
    SpendLimitExceeded,
    ScopeViolation,
    HighRiskTx,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BreakGlassStatus {
    Pending,
    Approved,
    Denied,
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationMode {
    Otp,
    OtpLiveness,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LivenessMethod {
    Face,
    Voice,
}

/// A break-glass escalation event. `otp_hash` is a one-way fingerprint of
/// the per-event TOTP secret, kept only for audit correlation: the secret
/// itself is never serialized onto this struct, and the hash cannot be used
/// to recompute a valid code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakGlassEvent {
    pub id: Uuid,
    pub audit_entry_id: u64,
    pub trigger: BreakGlassTrigger,
    pub trigger_details: serde_json::Value,
    pub status: BreakGlassStatus,
    pub advocate_id: String,
    pub verification_mode: VerificationMode,
    pub otp_hash: String,
    pub otp_sent_at: DateTime<Utc>,
    pub otp_verified_at: Option<DateTime<Utc>>,
    pub liveness_required: bool,
    pub liveness_verified: Option<bool>,
    pub liveness_verified_at: Option<DateTime<Utc>>,
    pub approved_at: Option<DateTime<Utc>>,
    pub approved_by: Option<String>,
    pub denied_at: Option<DateTime<Utc>>,
    pub denied_by: Option<String>,
    pub denial_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl BreakGlassEvent {
    pub fn is_expired(&self, at: DateTime<Utc>) -> bool {
        at > self.expires_at
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.status, BreakGlassStatus::Approved | BreakGlassStatus::Denied | BreakGlassStatus::Expired)
    }
}

/// Outcome of [`crate::monitor::BreakGlassMonitor::verify_liveness`]'s
/// delegate evaluator.
#[derive(Debug, Clone, Copy)]
pub struct LivenessResult {
    pub ok: bool,
    pub confidence: f64,
}
