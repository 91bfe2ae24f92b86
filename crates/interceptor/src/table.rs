//! The scam-indicator pattern table: data, not code.
//!
//! Category names and weights are carried over verbatim from the reference
//! fraud analyzer this component replaces. The default table is compiled
//! once behind a [`std::sync::LazyLock`]; [`ScamTable::from_json`] lets an
//! operator externalize and retune the table without a rebuild.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScamTableError {
    #[error("invalid pattern table JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid regex pattern `{pattern}`: {source}")]
    Regex { pattern: String, #[source] source: regex::Error },
}

pub(crate) struct CompiledCategory {
    pub(crate) name: String,
    pub(crate) patterns: Vec<Regex>,
    pub(crate) weight: u32,
}

#[derive(Debug, Deserialize)]
struct RawCategory {
    category: String,
    patterns: Vec<String>,
    weight: u32,
}

const DEFAULT_TABLE: &[(&str, &[&str], u32)] = &[
    (
        "urgency",
        &[
            r"\b(urgent|emergency|immediately|right now|asap|hurry)\b",
            r"\b(act now|time sensitive|limited time)\b",
            r"\b(before it's too late|last chance)\b",
        ],
        25,
    ),
    (
        "gift_cards",
        &[
            r"\b(gift card|gift|card|itunes|google play|steam|amazon card)\b",
            r"\b(prepaid card|reload|redeem)\b",
            r"\b(scratch off|activation code)\b",
        ],
        35,
    ),
    (
        "authority_impersonation",
        &[
            r"\b(irs|internal revenue|tax|government|federal)\b",
            r"\b(social security|medicare|medicaid)\b",
            r"\b(police|sheriff|officer|detective|fbi|dea)\b",
            r"\b(warrant|arrest|legal action|lawsuit)\b",
            r"\b(bank|account frozen|suspicious activity)\b",
        ],
        30,
    ),
    (
        "payment_pressure",
        &[
            r"\b(pay now|send money|wire transfer|western union)\b",
            r"\b(cash|bitcoin|cryptocurrency|venmo|zelle)\b",
            r"\b(penalty|fine|fee|charge|owe)\b",
        ],
        20,
    ),
    (
        "personal_info_request",
        &[
            r"\b(social security number|ssn|account number|password)\b",
            r"\b(pin|verification code|security code)\b",
            r"\b(date of birth|mother's maiden name)\b",
        ],
        25,
    ),
    (
        "family_emergency",
        &[
            r"\b(grandchild|grandson|granddaughter|nephew|niece)\b",
            r"\b(accident|hospital|jail|arrested|trouble)\b",
            r"\b(bail|lawyer|attorney|legal fees)\b",
        ],
        30,
    ),
];

static DEFAULT_CATEGORIES: LazyLock<Vec<CompiledCategory>> = LazyLock::new(|| {
    DEFAULT_TABLE
        .iter()
        .map(|(name, patterns, weight)| CompiledCategory {
            name: (*name).to_string(),
            patterns: patterns.iter().map(|p| Regex::new(p).expect("built-in pattern is valid")).collect(),
            weight: *weight,
        })
        .collect()
});

enum TableData {
    Default,
    Custom(Vec<CompiledCategory>),
}

/// A scam-indicator pattern table, either the shipped default or one loaded
/// from externalized JSON.
pub struct ScamTable(TableData);

impl ScamTable {
    pub fn default_table() -> Self {
        ScamTable(TableData::Default)
    }

    /// Load a table from JSON: `[{"category": "...", "patterns": ["..."], "weight": 25}, ...]`.
    pub fn from_json(json: &str) -> Result<Self, ScamTableError> {
        let raw: Vec<RawCategory> = serde_json::from_str(json)?;
        let mut categories = Vec::with_capacity(raw.len());
        for entry in raw {
            let mut patterns = Vec::with_capacity(entry.patterns.len());
            for pattern in entry.patterns {
                let compiled = Regex::new(&pattern)
                    .map_err(|source| ScamTableError::Regex { pattern: pattern.clone(), source })?;
                patterns.push(compiled);
            }
            categories.push(CompiledCategory { name: entry.category, patterns, weight: entry.weight });
        }
        Ok(ScamTable(TableData::Custom(categories)))
    }

    pub(crate) fn categories(&self) -> &[CompiledCategory] {
        match &self.0 {
            TableData::Default => &DEFAULT_CATEGORIES,
            TableData::Custom(categories) => categories,
        }
    }
}

impl Default for ScamTable {
    fn default() -> Self {
        Self::default_table()
    }
}
