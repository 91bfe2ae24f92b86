//! Pluggable liveness verification.
//!
//! The reference implementation this replaces is a mock that always reports
//! a fixed confidence score; this crate keeps that shape as the default so
//! the state machine is independently testable, and expects production
//! deployments to supply a real evaluator (face/voice biometrics vendor).

use crate::types::{LivenessMethod, LivenessResult};

pub const LIVENESS_THRESHOLD: f64 = 0.85;

pub trait LivenessEvaluator: Send + Sync {
    fn verify(&self, method: LivenessMethod, artifact: &[u8]) -> LivenessResult;
}

/// Always succeeds above threshold, mirroring the mock face/voice verifier
/// in the reference implementation. Never use in production.
#[derive(Debug, Default)]
pub struct MockLivenessEvaluator;

impl LivenessEvaluator for MockLivenessEvaluator {
    fn verify(&self, method: LivenessMethod, _artifact: &[u8]) -> LivenessResult {
        let confidence = match method {
            LivenessMethod::Face => 0.92,
            LivenessMethod::Voice => 0.89,
        };
        LivenessResult { ok: confidence >= LIVENESS_THRESHOLD, confidence }
    }
}
