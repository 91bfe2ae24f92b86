//! Merchant Category Code to risk-category mapping: data, not code, matching
//! `original_source/backend/virtual_card_manager.py::_mcc_to_category`'s
//! table verbatim. Unknown codes map to `"other"`, never to an error.

use std::collections::HashMap;
use std::sync::LazyLock;

const DEFAULT_MCC_TABLE: &[(&str, &str)] = &[
    ("5732", "electronics"),
    ("5734", "electronics"),
    ("5411", "groceries"),
    ("5422", "groceries"),
    ("5812", "restaurants"),
    ("5814", "restaurants"),
    ("4829", "wire_transfer"),
    ("6051", "cryptocurrency"),
    ("5945", "gift_cards"),
    ("5999", "miscellaneous"),
    ("7995", "gambling"),
    ("4900", "cash_advance"),
];

static DEFAULT_MAP: LazyLock<HashMap<&'static str, &'static str>> =
    LazyLock::new(|| DEFAULT_MCC_TABLE.iter().copied().collect());

/// An injectable MCC -> category table, so operators can retune without a
/// rebuild. Falls back to [`DEFAULT_MCC_TABLE`] when constructed via
/// [`MccTable::default`].
#[derive(Default)]
pub struct MccTable {
    overrides: HashMap<String, String>,
}

impl MccTable {
    pub fn from_map(overrides: HashMap<String, String>) -> Self {
        Self { overrides }
    }

    /// Maps an MCC to a category; unknown codes become `"other"`.
    pub fn category_for(&self, mcc: &str) -> String {
        if let Some(category) = self.overrides.get(mcc) {
            return category.clone();
        }
        DEFAULT_MAP.get(mcc).map(|c| c.to_string()).unwrap_or_else(|| "other".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_mcc_maps_to_category() {
        let table = MccTable::default();
        assert_eq!(table.category_for("5732"), "electronics");
        assert_eq!(table.category_for("4829"), "wire_transfer");
    }

    #[test]
    fn unknown_mcc_maps_to_other() {
        let table = MccTable::default();
        assert_eq!(table.category_for("0000"), "other");
    }

    #[test]
    fn override_takes_precedence_over_default() {
        let mut overrides = HashMap::new();
        overrides.insert("5411".to_string(), "luxury_goods".to_string());
        let table = MccTable::from_map(overrides);
        assert_eq!(table.category_for("5411"), "luxury_goods");
    }
}
