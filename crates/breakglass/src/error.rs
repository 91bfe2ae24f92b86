use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum BreakGlassError {
    #[error("break-glass event {0} not found")]
    EventNotFound(Uuid),
    #[error("event {event_id} is not pending (status: {status})")]
    NotPending { event_id: Uuid, status: String },
    #[error("event {event_id} has no liveness requirement or OTP has not been verified yet")]
    LivenessNotEligible { event_id: Uuid },
    #[error("invalid one-time code for event {0}")]
    InvalidOtp(Uuid),
    #[error("event {0} has expired")]
    Expired(Uuid),
}
