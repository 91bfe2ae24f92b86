//! TrustGate-Notifier: capability-shaped notification sink for advocates.
//!
//! Modeled on `packages/arbiter/src/escalation/webhook.rs::WebhookNotifier`:
//! a trait per sink, a log-only "demo mode" default when no transport is
//! configured, and a fan-out wrapper that attempts every configured sink
//! without letting one failure block another. Delivery retries are a
//! transport concern and explicitly out of scope here.

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// A single notification attempt's outcome. The break-glass event's own
/// state never depends on this: the core records only that an attempt was
/// made and to whom.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryResult {
    pub sink: String,
    pub target: String,
    pub success: bool,
    pub detail: Option<String>,
}

/// A notification to deliver to an advocate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub advocate_id: String,
    pub title: String,
    pub message: String,
    pub event_id: Option<String>,
}

/// Capability-shaped sink. Implementors need not support every method;
/// [`FanoutNotifier`] tolerates individual sinks failing.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn push(&self, notification: &Notification) -> DeliveryResult;
    async fn sms(&self, phone_number: &str, notification: &Notification) -> DeliveryResult;
    async fn email(&self, address: &str, notification: &Notification) -> DeliveryResult;
}

/// Default sink: logs every attempt via `tracing` rather than performing
/// real transport I/O. Matches the teacher's "demo mode" log-only branch
/// taken whenever no delivery credentials are configured.
#[derive(Debug, Default)]
pub struct LoggingNotifier;

#[async_trait]
impl Notifier for LoggingNotifier {
    async fn push(&self, notification: &Notification) -> DeliveryResult {
        tracing::info!(
            advocate_id = %notification.advocate_id,
            event_id = ?notification.event_id,
            "push notification (demo mode) - set TRUSTGATE_ADVOCATE_PUSH_ENDPOINT for live delivery"
        );
        DeliveryResult {
            sink: "push".to_string(),
            target: notification.advocate_id.clone(),
            success: true,
            detail: Some("logged only, no push transport configured".to_string()),
        }
    }

    async fn sms(&self, phone_number: &str, notification: &Notification) -> DeliveryResult {
        tracing::info!(
            phone_number,
            advocate_id = %notification.advocate_id,
            "sms notification (demo mode) - set TRUSTGATE_ADVOCATE_SMS for live delivery"
        );
        DeliveryResult {
            sink: "sms".to_string(),
            target: phone_number.to_string(),
            success: true,
            detail: Some("logged only, no sms transport configured".to_string()),
        }
    }

    async fn email(&self, address: &str, notification: &Notification) -> DeliveryResult {
        tracing::info!(
            address,
            advocate_id = %notification.advocate_id,
            "email notification (demo mode) - set TRUSTGATE_ADVOCATE_EMAIL for live delivery"
        );
        DeliveryResult {
            sink: "email".to_string(),
            target: address.to_string(),
            success: true,
            detail: Some("logged only, no email transport configured".to_string()),
        }
    }
}

/// Attempts delivery through every configured sink, collecting per-sink
/// results without letting one sink's failure suppress another's attempt.
#[derive(Default)]
pub struct FanoutNotifier {
    sinks: Vec<std::sync::Arc<dyn Notifier>>,
    sms_targets: Vec<String>,
    email_targets: Vec<String>,
}

impl FanoutNotifier {
    pub fn new() -> Self {
        Self { sinks: Vec::new(), sms_targets: Vec::new(), email_targets: Vec::new() }
    }

    pub fn with_sink(mut self, sink: std::sync::Arc<dyn Notifier>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn with_sms_target(mut self, phone_number: impl Into<String>) -> Self {
        self.sms_targets.push(phone_number.into());
        self
    }

    pub fn with_email_target(mut self, address: impl Into<String>) -> Self {
        self.email_targets.push(address.into());
        self
    }

    pub async fn notify_all(&self, notification: &Notification) -> Vec<DeliveryResult> {
        let mut results = Vec::new();
        for sink in &self.sinks {
            results.push(sink.push(notification).await);
            for phone_number in &self.sms_targets {
                results.push(sink.sms(phone_number, notification).await);
            }
            for address in &self.email_targets {
                results.push(sink.email(address, notification).await);
            }
        }
        tracing::debug!(attempted = %Utc::now().to_rfc3339(), count = results.len(), "notification fan-out complete");
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_notification() -> Notification {
        Notification {
            advocate_id: "advocate-1".to_string(),
            title: "Break-Glass Protocol Triggered".to_string(),
            message: "Authorization required".to_string(),
            event_id: Some("event-123".to_string()),
        }
    }

    #[tokio::test]
    async fn logging_notifier_reports_success_for_every_channel() {
        let notifier = LoggingNotifier;
        let notification = sample_notification();
        assert!(notifier.push(&notification).await.success);
        assert!(notifier.sms("+15555550100", &notification).await.success);
        assert!(notifier.email("advocate@example.com", &notification).await.success);
    }

    #[tokio::test]
    async fn fanout_notifier_attempts_every_configured_target() {
        let fanout = FanoutNotifier::new()
            .with_sink(std::sync::Arc::new(LoggingNotifier))
            .with_sms_target("+15555550100")
            .with_email_target("advocate@example.com");

        let results = fanout.notify_all(&sample_notification()).await;
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| r.success));
    }

    #[tokio::test]
    async fn fanout_with_no_sinks_returns_empty() {
        let fanout = FanoutNotifier::new();
        let results = fanout.notify_all(&sample_notification()).await;
        assert!(results.is_empty());
    }
}
