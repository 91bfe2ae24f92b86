//! TrustGate-Breakglass: the OTP/liveness escalation state machine that
//! backstops every spend-limit and high-risk override.

mod error;
mod evaluator;
mod monitor;
mod types;

pub use error::BreakGlassError;
pub use evaluator::{LivenessEvaluator, MockLivenessEvaluator, LIVENESS_THRESHOLD};
pub use monitor::BreakGlassMonitor;
pub use types::{
    BreakGlassEvent, BreakGlassStatus, BreakGlassTrigger, LivenessMethod, LivenessResult, VerificationMode,
};
