use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Action recommended for a scored transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScamAction {
    Allow,
    ActivateAnswerBot,
    InterveneAndBlock,
}

/// A single matched category, carried through for audit surfacing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScamIndicator {
    pub category: String,
    pub weight: u32,
}

/// Result of scoring one transcript. `PartialEq`/`Eq` compare every field,
/// `timestamp` included — callers checking the scoring invariant that two
/// calls against the same transcript and clock reading yield the same
/// analysis should call [`crate::ScamInterceptor::analyze_at`] with a fixed
/// `at` so the comparison isn't defeated by wall-clock drift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScamAnalysis {
    pub score: u32,
    pub indicators: Vec<ScamIndicator>,
    pub action: ScamAction,
    pub reasoning: String,
    pub timestamp: DateTime<Utc>,
    pub analysis_method: &'static str,
}
