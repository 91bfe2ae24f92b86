//! The card-network authorization webhook: signature check, MCC mapping,
//! card-to-principal binding, a synchronous governor call, and an audit
//! write — all inside a hard latency deadline (spec §4.9/§5).
//!
//! Grounded in `original_source/backend/virtual_card_manager.py::
//! authorize_transaction` for the decision matrix, reshaped around a
//! `tokio::time::timeout` deadline per the teacher's tower-stack latency
//! controls (`packages/gate/src/bin/server.rs`'s `RateLimitLayer`/
//! `BufferLayer` pairing) rather than best-effort synchronous I/O.

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use serde_json::json;
use tracing::warn;
use trustgate_governor::{RiskLevel, TransactionGovernor, TransactionRequest};
use trustgate_ledger::{AuditLedger, Decision};

use crate::binding::CardBindingRegistry;
use crate::error::CardAuthError;
use crate::mcc::MccTable;
use crate::signature::WebhookVerifier;
use crate::types::{CardAuthEnvelope, CardAuthResponse};

/// P99 latency budget from spec §4.9.
pub const DEFAULT_DEADLINE_MS: u64 = 100;

pub struct CardAuthService {
    verifier: WebhookVerifier,
    mcc_table: MccTable,
    bindings: Arc<CardBindingRegistry>,
    governor: TransactionGovernor,
    ledger: Arc<AuditLedger>,
    deadline: Duration,
}

impl CardAuthService {
    pub fn new(verifier: WebhookVerifier, bindings: Arc<CardBindingRegistry>, ledger: Arc<AuditLedger>) -> Self {
        Self {
            verifier,
            mcc_table: MccTable::default(),
            bindings,
            governor: TransactionGovernor::new(),
            ledger,
            deadline: Duration::from_millis(DEFAULT_DEADLINE_MS),
        }
    }

    pub fn with_mcc_table(mut self, mcc_table: MccTable) -> Self {
        self.mcc_table = mcc_table;
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Verify the webhook signature. Done outside the latency-budget
    /// deadline: a mismatched signature is an authentication failure, not a
    /// scored decision, and must never count against the approval window.
    pub fn authenticate(&self, body: &[u8], signature_hex: &str) -> Result<(), CardAuthError> {
        if self.verifier.verify(body, signature_hex) {
            Ok(())
        } else {
            Err(CardAuthError::Unauthenticated)
        }
    }

    /// Score and respond to an already-authenticated envelope, bounded by
    /// the configured deadline. A deadline overrun, like any other
    /// unhandled failure, resolves to a conservative `DECLINED` rather than
    /// propagating an error to the card network (spec §5 cancellation
    /// clause, §7 fail-closed rule).
    pub async fn authorize(&self, envelope: CardAuthEnvelope) -> CardAuthResponse {
        match tokio::time::timeout(self.deadline, self.decide(&envelope)).await {
            Ok(response) => response,
            Err(_) => {
                warn!(card_token = %envelope.card_token, "card authorization exceeded latency budget");
                CardAuthResponse::declined(envelope.amount, 100, "decision exceeded latency budget", false)
            }
        }
    }

    async fn decide(&self, envelope: &CardAuthEnvelope) -> CardAuthResponse {
        let Some(binding) = self.bindings.resolve(&envelope.card_token).await else {
            warn!(card_token = %envelope.card_token, "card token has no configured principal binding");
            return CardAuthResponse::declined(envelope.amount, 100, "card token not recognized", false);
        };

        let amount = Decimal::new(envelope.amount, 2);
        let category = self.mcc_table.category_for(&envelope.merchant.mcc);

        let request = TransactionRequest {
            amount,
            timestamp: envelope.created,
            category,
            merchant: envelope.merchant.descriptor.clone(),
            principal_id: Some(binding.principal_id.clone()),
            utc_offset_minutes: None,
        };
        let analysis = self.governor.analyze(&request);

        let critical = analysis.risk_level == RiskLevel::Critical;
        let very_high = analysis.risk_score >= 90;
        let high = analysis.risk_score >= 70 || analysis.risk_level == RiskLevel::High;

        let (response, decision, pending_advocate) = if very_high || critical {
            (
                CardAuthResponse::declined(envelope.amount, analysis.risk_score, analysis.reasoning.clone(), false),
                Decision::Blocked,
                false,
            )
        } else if high {
            (
                CardAuthResponse::declined(
                    envelope.amount,
                    analysis.risk_score,
                    "high-risk transaction requires Trusted Advocate approval",
                    true,
                ),
                Decision::Blocked,
                true,
            )
        } else {
            (CardAuthResponse::approved(envelope.amount, analysis.risk_score), Decision::Allowed, false)
        };

        // Spawned rather than awaited directly against `decide`'s own future:
        // `authorize`'s `tokio::time::timeout` drops this function's future on
        // a deadline overrun, but `tokio::spawn` hands the append to its own
        // task, which keeps running after that drop. A decision already
        // reached always gets its audit entry, even one returned as a
        // timeout DECLINED, per spec §5's cancellation clause.
        let ledger = self.ledger.clone();
        let poa_id = binding.poa_id;
        let reasoning = analysis.reasoning.clone();
        let details = json!({
            "card_token": envelope.card_token,
            "merchant": envelope.merchant.descriptor,
            "mcc": envelope.merchant.mcc,
            "risk_score": analysis.risk_score,
            "risk_level": format!("{:?}", analysis.risk_level),
            "pending_advocate": pending_advocate,
        });
        let service_name = envelope.merchant.descriptor.clone();
        let append_handle = tokio::spawn(async move {
            ledger.append(poa_id, "CARD_AUTHORIZATION", decision, reasoning, details, Some(service_name), Some(amount)).await
        });

        match append_handle.await {
            Ok(Ok(_entry)) => response,
            Ok(Err(err)) => {
                warn!(card_token = %envelope.card_token, error = %err, "audit ledger append failed; failing closed");
                CardAuthResponse::declined(envelope.amount, analysis.risk_score, "ledger unavailable", false)
            }
            Err(join_err) => {
                warn!(card_token = %envelope.card_token, error = %join_err, "audit ledger append task panicked; failing closed");
                CardAuthResponse::declined(envelope.amount, analysis.risk_score, "ledger unavailable", false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use trustgate_crypto::CryptoProvider;

    fn service() -> (CardAuthService, Arc<CardBindingRegistry>) {
        let crypto = Arc::new(CryptoProvider::ephemeral());
        let ledger = Arc::new(AuditLedger::new(crypto));
        let bindings = Arc::new(CardBindingRegistry::new());
        (CardAuthService::new(WebhookVerifier::new(b"webhook-secret".to_vec()), bindings.clone(), ledger), bindings)
    }

    fn envelope(amount: i64, mcc: &str, descriptor: &str, at: chrono::DateTime<Utc>) -> CardAuthEnvelope {
        CardAuthEnvelope {
            token: "evt_1".into(),
            card_token: "card_tok_1".into(),
            amount,
            merchant: crate::types::MerchantInfo { descriptor: descriptor.into(), mcc: mcc.into(), city: None, state: None },
            created: at,
        }
    }

    #[tokio::test]
    async fn unbound_card_token_declines() {
        let (service, _bindings) = service();
        let response = service
            .authorize(envelope(8750, "5411", "Kroger", Utc.with_ymd_and_hms(2026, 1, 15, 14, 0, 0).unwrap()))
            .await;
        assert_eq!(response.result, crate::types::CardAuthResult::Declined);
    }

    #[tokio::test]
    async fn low_risk_groceries_purchase_is_approved() {
        let (service, bindings) = service();
        bindings
            .bind("card_tok_1", crate::binding::CardBinding { principal_id: "senior-1".into(), poa_id: uuid::Uuid::new_v4() })
            .await;

        let response = service
            .authorize(envelope(8750, "5411", "Kroger", Utc.with_ymd_and_hms(2026, 1, 15, 14, 0, 0).unwrap()))
            .await;
        assert_eq!(response.result, crate::types::CardAuthResult::Approved);
        assert_eq!(response.amount, 8750);
    }

    #[tokio::test]
    async fn critical_risk_purchase_is_declined() {
        let (service, bindings) = service();
        bindings
            .bind("card_tok_1", crate::binding::CardBinding { principal_id: "senior-1".into(), poa_id: uuid::Uuid::new_v4() })
            .await;

        // $1299.99, 2am, electronics -> CRITICAL per the governor's rules.
        let response = service
            .authorize(envelope(129_999, "5732", "Best Buy", Utc.with_ymd_and_hms(2026, 1, 15, 2, 0, 0).unwrap()))
            .await;
        assert_eq!(response.result, crate::types::CardAuthResult::Declined);
        assert!(response.metadata.pending_advocate.is_none());
    }

    #[tokio::test]
    async fn high_risk_purchase_declines_with_pending_advocate_flag() {
        let (service, bindings) = service();
        bindings
            .bind("card_tok_1", crate::binding::CardBinding { principal_id: "senior-1".into(), poa_id: uuid::Uuid::new_v4() })
            .await;

        // $1500 wire transfer at 2pm: HIGH_AMOUNT + VERY_HIGH_AMOUNT + HIGH_RISK_CATEGORY
        // without ODD_HOURS, so HIGH rather than CRITICAL.
        let response = service
            .authorize(envelope(150_000, "4829", "Wire Desk", Utc.with_ymd_and_hms(2026, 1, 15, 14, 0, 0).unwrap()))
            .await;
        assert_eq!(response.result, crate::types::CardAuthResult::Declined);
        assert_eq!(response.metadata.pending_advocate, Some(true));
    }

    #[tokio::test]
    async fn authenticate_rejects_bad_signature() {
        let (service, _bindings) = service();
        assert!(service.authenticate(b"body", "deadbeef").is_err());
    }

}
