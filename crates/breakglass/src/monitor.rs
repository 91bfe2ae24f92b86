//! Break-glass state machine: `PENDING -> (APPROVED | DENIED | EXPIRED)`.
//!
//! Modeled directly on `packages/arbiter/src/escalation/approval.rs`'s
//! `ApprovalWorkflow`: events live in a `parking_lot::RwLock<HashMap<_, _>>`
//! and every mutation happens while holding the single write lock, so
//! concurrent calls against the same event race on one guard and exactly one
//! transition wins — the same preemption-guarded-resource shape as
//! `packages/arbiter/src/locks.rs::LockManager`.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, Utc};
use parking_lot::RwLock;
use rand::RngCore;
use serde_json::Value;
use trustgate_crypto::{CryptoProvider, TotpGenerator};
use trustgate_notifier::{FanoutNotifier, Notification};
use uuid::Uuid;

use crate::error::BreakGlassError;
use crate::evaluator::{LivenessEvaluator, MockLivenessEvaluator};
use crate::types::{BreakGlassEvent, BreakGlassStatus, BreakGlassTrigger, LivenessMethod, VerificationMode};

const EVENT_TTL: Duration = Duration::hours(1);
const SECRET_LEN: usize = 32;

pub struct BreakGlassMonitor {
    crypto: Arc<CryptoProvider>,
    totp: TotpGenerator,
    evaluator: Box<dyn LivenessEvaluator>,
    notifier: Arc<FanoutNotifier>,
    events: RwLock<HashMap<Uuid, BreakGlassEvent>>,
    secrets: RwLock<HashMap<Uuid, Vec<u8>>>,
}

impl BreakGlassMonitor {
    pub fn new(crypto: Arc<CryptoProvider>, notifier: Arc<FanoutNotifier>) -> Self {
        Self {
            crypto,
            totp: TotpGenerator::new(),
            evaluator: Box::new(MockLivenessEvaluator),
            notifier,
            events: RwLock::new(HashMap::new()),
            secrets: RwLock::new(HashMap::new()),
        }
    }

    pub fn with_evaluator(mut self, evaluator: Box<dyn LivenessEvaluator>) -> Self {
        self.evaluator = evaluator;
        self
    }

    /// Creates the event, generates a fresh per-event TOTP secret, and
    /// enqueues advocate notifications. Never stores the OTP in cleartext:
    /// `otp_hash` is a one-way fingerprint, the secret itself lives only in
    /// an internal map that is never serialized.
    pub async fn trigger_break_glass(
        &self,
        audit_entry_id: u64,
        trigger: BreakGlassTrigger,
        trigger_details: Value,
        advocate_id: String,
        liveness_required: bool,
    ) -> BreakGlassEvent {
        let mut secret = vec![0u8; SECRET_LEN];
        rand::rng().fill_bytes(&mut secret);
        let otp_hash = self.crypto.sign(&secret);

        let now = Utc::now();
        let event = BreakGlassEvent {
            id: Uuid::new_v4(),
            audit_entry_id,
            trigger,
            trigger_details,
            status: BreakGlassStatus::Pending,
            advocate_id: advocate_id.clone(),
            verification_mode: if liveness_required { VerificationMode::OtpLiveness } else { VerificationMode::Otp },
            otp_hash,
            otp_sent_at: now,
            otp_verified_at: None,
            liveness_required,
            liveness_verified: None,
            liveness_verified_at: None,
            approved_at: None,
            approved_by: None,
            denied_at: None,
            denied_by: None,
            denial_reason: None,
            created_at: now,
            expires_at: now + EVENT_TTL,
        };

        self.events.write().insert(event.id, event.clone());
        self.secrets.write().insert(event.id, secret);

        let notification = Notification {
            advocate_id,
            title: "Break-Glass Protocol Triggered".to_string(),
            message: format!("Authorization required: {trigger:?} on audit entry {audit_entry_id}"),
            event_id: Some(event.id.to_string()),
        };
        self.notifier.notify_all(&notification).await;

        event
    }

    pub fn verify_otp(&self, event_id: Uuid, code: &str) -> Result<BreakGlassEvent, BreakGlassError> {
        let now = Utc::now();
        let mut events = self.events.write();
        let event = events.get_mut(&event_id).ok_or(BreakGlassError::EventNotFound(event_id))?;

        if event.status != BreakGlassStatus::Pending {
            return Err(BreakGlassError::NotPending { event_id, status: format!("{:?}", event.status) });
        }
        if event.is_expired(now) {
            event.status = BreakGlassStatus::Expired;
            return Err(BreakGlassError::Expired(event_id));
        }

        let secrets = self.secrets.read();
        let secret = secrets.get(&event_id).expect("secret exists for every pending event");
        let matches = self.totp.verify(secret, code, now).unwrap_or(false);
        if !matches {
            return Err(BreakGlassError::InvalidOtp(event_id));
        }

        event.otp_verified_at = Some(now);
        if event.verification_mode == VerificationMode::Otp {
            event.status = BreakGlassStatus::Approved;
            event.approved_at = Some(now);
            event.approved_by = Some(event.advocate_id.clone());
        }
        Ok(event.clone())
    }

    pub fn verify_liveness(
        &self,
        event_id: Uuid,
        method: LivenessMethod,
        artifact: &[u8],
    ) -> Result<BreakGlassEvent, BreakGlassError> {
        let now = Utc::now();
        let mut events = self.events.write();
        let event = events.get_mut(&event_id).ok_or(BreakGlassError::EventNotFound(event_id))?;

        if event.status != BreakGlassStatus::Pending {
            return Err(BreakGlassError::NotPending { event_id, status: format!("{:?}", event.status) });
        }
        if event.is_expired(now) {
            event.status = BreakGlassStatus::Expired;
            return Err(BreakGlassError::Expired(event_id));
        }
        if event.otp_verified_at.is_none() || !event.liveness_required {
            return Err(BreakGlassError::LivenessNotEligible { event_id });
        }

        let result = self.evaluator.verify(method, artifact);
        event.liveness_verified = Some(result.ok);
        event.liveness_verified_at = Some(now);
        if result.ok {
            event.status = BreakGlassStatus::Approved;
            event.approved_at = Some(now);
            event.approved_by = Some(event.advocate_id.clone());
        }
        Ok(event.clone())
    }

    /// Valid only from `PENDING`; repeating against an already-terminal
    /// event is a no-op that returns the final status unchanged.
    pub fn deny(&self, event_id: Uuid, denier: impl Into<String>, reason: impl Into<String>) -> Result<BreakGlassEvent, BreakGlassError> {
        let mut events = self.events.write();
        let event = events.get_mut(&event_id).ok_or(BreakGlassError::EventNotFound(event_id))?;
        if event.is_terminal() {
            return Ok(event.clone());
        }
        event.status = BreakGlassStatus::Denied;
        event.denied_at = Some(Utc::now());
        event.denied_by = Some(denier.into());
        event.denial_reason = Some(reason.into());
        Ok(event.clone())
    }

    pub fn get(&self, event_id: Uuid) -> Option<BreakGlassEvent> {
        self.events.read().get(&event_id).cloned()
    }

    /// Lists events still awaiting a decision, optionally narrowed to one
    /// advocate, for the `breakglass.pending` surface.
    pub fn pending(&self, advocate_id: Option<&str>) -> Vec<BreakGlassEvent> {
        self.events
            .read()
            .values()
            .filter(|event| event.status == BreakGlassStatus::Pending)
            .filter(|event| advocate_id.is_none_or(|id| event.advocate_id == id))
            .cloned()
            .collect()
    }

    /// Sweeps every pending event past its deadline into `EXPIRED`. Intended
    /// to be driven by a periodic background task.
    pub fn expire_stale(&self) -> usize {
        let now = Utc::now();
        let mut events = self.events.write();
        let mut count = 0;
        for event in events.values_mut() {
            if event.status == BreakGlassStatus::Pending && event.is_expired(now) {
                event.status = BreakGlassStatus::Expired;
                count += 1;
            }
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monitor() -> BreakGlassMonitor {
        BreakGlassMonitor::new(Arc::new(CryptoProvider::ephemeral()), Arc::new(FanoutNotifier::new()))
    }

    async fn code_for(monitor: &BreakGlassMonitor, event_id: Uuid) -> String {
        let secrets = monitor.secrets.read();
        let secret = secrets.get(&event_id).unwrap();
        monitor.totp.generate(secret, Utc::now()).unwrap()
    }

    #[tokio::test]
    async fn otp_only_event_approves_immediately_on_correct_code() {
        let monitor = monitor();
        let event = monitor
            .trigger_break_glass(1, BreakGlassTrigger::SpendLimitExceeded, Value::Null, "advocate-1".into(), false)
            .await;
        let code = code_for(&monitor, event.id).await;

        let updated = monitor.verify_otp(event.id, &code).unwrap();
        assert_eq!(updated.status, BreakGlassStatus::Approved);
        assert_eq!(updated.approved_by.as_deref(), Some("advocate-1"));
    }

    #[tokio::test]
    async fn otp_plus_liveness_stays_pending_until_liveness_verified() {
        let monitor = monitor();
        let event = monitor
            .trigger_break_glass(1, BreakGlassTrigger::HighRiskTx, Value::Null, "advocate-1".into(), true)
            .await;
        let code = code_for(&monitor, event.id).await;

        let after_otp = monitor.verify_otp(event.id, &code).unwrap();
        assert_eq!(after_otp.status, BreakGlassStatus::Pending);
        assert!(after_otp.otp_verified_at.is_some());

        let after_liveness = monitor.verify_liveness(event.id, LivenessMethod::Face, b"selfie").unwrap();
        assert_eq!(after_liveness.status, BreakGlassStatus::Approved);
    }

    #[tokio::test]
    async fn liveness_before_otp_is_rejected() {
        let monitor = monitor();
        let event = monitor
            .trigger_break_glass(1, BreakGlassTrigger::HighRiskTx, Value::Null, "advocate-1".into(), true)
            .await;
        let result = monitor.verify_liveness(event.id, LivenessMethod::Face, b"selfie");
        assert!(matches!(result, Err(BreakGlassError::LivenessNotEligible { .. })));
    }

    #[tokio::test]
    async fn wrong_code_is_rejected_without_transition() {
        let monitor = monitor();
        let event = monitor
            .trigger_break_glass(1, BreakGlassTrigger::SpendLimitExceeded, Value::Null, "advocate-1".into(), false)
            .await;
        let result = monitor.verify_otp(event.id, "000000");
        assert!(matches!(result, Err(BreakGlassError::InvalidOtp(_))));
        assert_eq!(monitor.get(event.id).unwrap().status, BreakGlassStatus::Pending);
    }

    #[tokio::test]
    async fn deny_is_idempotent_on_terminal_state() {
        let monitor = monitor();
        let event = monitor
            .trigger_break_glass(1, BreakGlassTrigger::ScopeViolation, Value::Null, "advocate-1".into(), false)
            .await;
        let first = monitor.deny(event.id, "advocate-1", "not recognized").unwrap();
        let second = monitor.deny(event.id, "advocate-1", "different reason").unwrap();
        assert_eq!(first.status, BreakGlassStatus::Denied);
        assert_eq!(second.denial_reason, first.denial_reason);
    }

    #[tokio::test]
    async fn expire_stale_sweeps_past_deadline_events() {
        let monitor = monitor();
        let event = monitor
            .trigger_break_glass(1, BreakGlassTrigger::SpendLimitExceeded, Value::Null, "advocate-1".into(), false)
            .await;
        {
            let mut events = monitor.events.write();
            events.get_mut(&event.id).unwrap().expires_at = Utc::now() - Duration::seconds(1);
        }
        assert_eq!(monitor.expire_stale(), 1);
        assert_eq!(monitor.get(event.id).unwrap().status, BreakGlassStatus::Expired);
    }

    #[tokio::test]
    async fn pending_filters_by_advocate_and_excludes_terminal_events() {
        let monitor = monitor();
        let pending_for_a = monitor
            .trigger_break_glass(1, BreakGlassTrigger::SpendLimitExceeded, Value::Null, "advocate-a".into(), false)
            .await;
        let approved = monitor
            .trigger_break_glass(2, BreakGlassTrigger::SpendLimitExceeded, Value::Null, "advocate-a".into(), false)
            .await;
        let code = code_for(&monitor, approved.id).await;
        monitor.verify_otp(approved.id, &code).unwrap();
        monitor
            .trigger_break_glass(3, BreakGlassTrigger::ScopeViolation, Value::Null, "advocate-b".into(), false)
            .await;

        let for_a = monitor.pending(Some("advocate-a"));
        assert_eq!(for_a.len(), 1);
        assert_eq!(for_a[0].id, pending_for_a.id);

        assert_eq!(monitor.pending(None).len(), 2);
    }
}
