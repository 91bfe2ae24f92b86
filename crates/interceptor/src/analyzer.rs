//! Transcript scoring against a [`ScamTable`].

use chrono::{DateTime, Utc};

use crate::table::ScamTable;
use crate::types::{ScamAction, ScamAnalysis, ScamIndicator};

/// Scores a free-text transcript for fraud indicators. Pure in-memory work:
/// no I/O, so the only failure mode is an internal invariant violation,
/// which is treated as a panic rather than a recoverable error.
pub struct ScamInterceptor {
    table: ScamTable,
}

impl ScamInterceptor {
    pub fn new(table: ScamTable) -> Self {
        Self { table }
    }

    /// Scores `transcript` against the wall clock. Delegates to
    /// [`Self::analyze_at`]; see there for the determinism guarantee.
    pub fn analyze(&self, transcript: &str) -> ScamAnalysis {
        self.analyze_at(transcript, Utc::now())
    }

    /// Scores `transcript` as of `at`. `score`, `indicators`, `action`, and
    /// `reasoning` are pure functions of `transcript` and the category table;
    /// `timestamp` is stamped from `at` rather than read from the wall clock,
    /// the same injectable-clock shape `TotpGenerator::generate` uses, so
    /// that two calls with the same `(transcript, at)` produce a bitwise
    /// identical `ScamAnalysis`.
    pub fn analyze_at(&self, transcript: &str, at: DateTime<Utc>) -> ScamAnalysis {
        let lowered = transcript.to_lowercase();

        let mut indicators = Vec::new();
        let mut total_score: u32 = 0;

        for category in self.table.categories() {
            if category.patterns.iter().any(|pattern| pattern.is_match(&lowered)) {
                indicators.push(ScamIndicator { category: category.name.clone(), weight: category.weight });
                total_score += category.weight;
            }
        }

        let score = total_score.min(100);
        let (action, reasoning) = determine_action(score, &indicators);

        ScamAnalysis {
            score,
            indicators,
            action,
            reasoning,
            timestamp: at,
            analysis_method: "RULE_BASED",
        }
    }
}

impl Default for ScamInterceptor {
    fn default() -> Self {
        Self::new(ScamTable::default_table())
    }
}

fn determine_action(score: u32, indicators: &[ScamIndicator]) -> (ScamAction, String) {
    if score > 80 {
        (
            ScamAction::InterveneAndBlock,
            format!("fraud score {score} exceeds intervention threshold; indicators: {}", indicator_names(indicators)),
        )
    } else if score > 50 {
        (
            ScamAction::ActivateAnswerBot,
            format!("fraud score {score} warrants answer-bot screening; indicators: {}", indicator_names(indicators)),
        )
    } else if indicators.is_empty() {
        (ScamAction::Allow, "no fraud indicators detected".to_string())
    } else {
        (
            ScamAction::Allow,
            format!("fraud score {score} below intervention threshold; indicators: {}", indicator_names(indicators)),
        )
    }
}

fn indicator_names(indicators: &[ScamIndicator]) -> String {
    indicators.iter().map(|i| i.category.as_str()).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn empty_transcript_allows() {
        let interceptor = ScamInterceptor::default();
        let result = interceptor.analyze("");
        assert_eq!(result.score, 0);
        assert_eq!(result.action, ScamAction::Allow);
        assert!(result.indicators.is_empty());
    }

    #[test]
    fn gift_card_plus_urgency_activates_answer_bot() {
        let interceptor = ScamInterceptor::default();
        let result = interceptor.analyze("This is urgent, you need to buy a gift card right now.");
        assert_eq!(result.score, 60);
        assert_eq!(result.action, ScamAction::ActivateAnswerBot);
    }

    #[test]
    fn stacked_categories_intervene_and_block() {
        let interceptor = ScamInterceptor::default();
        let result = interceptor.analyze(
            "This is the IRS. Your account is frozen, act now or face arrest. \
             Buy a gift card and read the activation code immediately.",
        );
        assert_eq!(result.action, ScamAction::InterveneAndBlock);
        assert!(result.score > 80);
    }

    #[test]
    fn category_only_counted_once_even_with_multiple_matching_patterns() {
        let interceptor = ScamInterceptor::default();
        let result = interceptor.analyze("urgent urgent act now last chance");
        assert_eq!(result.score, 25);
        assert_eq!(result.indicators.len(), 1);
    }

    #[test]
    fn matching_is_case_insensitive() {
        let interceptor = ScamInterceptor::default();
        let lower = interceptor.analyze("this is urgent");
        let upper = interceptor.analyze("THIS IS URGENT");
        assert_eq!(lower.score, upper.score);
    }

    #[test]
    fn analyze_at_is_deterministic_for_identical_input_and_clock() {
        let interceptor = ScamInterceptor::default();
        let at = Utc.with_ymd_and_hms(2026, 1, 15, 14, 0, 0).unwrap();
        let first = interceptor.analyze_at("this is urgent, buy a gift card", at);
        let second = interceptor.analyze_at("this is urgent, buy a gift card", at);
        assert_eq!(first, second);
    }

    #[test]
    fn custom_table_from_json_overrides_default() {
        let json = r#"[{"category": "custom", "patterns": ["\\bfoo\\b"], "weight": 90}]"#;
        let table = ScamTable::from_json(json).unwrap();
        let interceptor = ScamInterceptor::new(table);
        let result = interceptor.analyze("say foo to me");
        assert_eq!(result.score, 90);
        assert_eq!(result.action, ScamAction::InterveneAndBlock);
    }
}
