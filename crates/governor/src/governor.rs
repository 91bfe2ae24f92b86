//! Context-aware transaction risk scoring.

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::types::{GovernorDecision, RiskLevel, TransactionFlag, TransactionRequest, TransactionStatus};

const HIGH_AMOUNT_THRESHOLD: Decimal = dec!(200);
const VERY_HIGH_AMOUNT_THRESHOLD: Decimal = dec!(1000);

const HIGH_RISK_CATEGORIES: &[&str] = &[
    "electronics",
    "wire_transfer",
    "cryptocurrency",
    "gift_cards",
    "cash_advance",
    "gambling",
    "international_transfer",
];

const MEDIUM_RISK_CATEGORIES: &[&str] = &["jewelry", "luxury_goods", "travel", "online_shopping"];

/// Scores transactions for suspicious spending patterns. Purely in-memory;
/// never suspends.
#[derive(Debug, Default)]
pub struct TransactionGovernor;

impl TransactionGovernor {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(&self, request: &TransactionRequest) -> GovernorDecision {
        let mut flags = Vec::new();
        let mut score: i64 = 0;

        let is_high_amount = request.amount > HIGH_AMOUNT_THRESHOLD;
        if is_high_amount {
            flags.push(TransactionFlag::HighAmount);
            score += 30;
        }

        let is_very_high_amount = request.amount > VERY_HIGH_AMOUNT_THRESHOLD;
        if is_very_high_amount {
            flags.push(TransactionFlag::VeryHighAmount);
            score += 20;
        }

        let is_odd_hours = Self::is_odd_hours(request);
        if is_odd_hours {
            flags.push(TransactionFlag::OddHours);
            score += 25;
        }

        let category = normalize_category(&request.category);
        let is_high_risk_category = HIGH_RISK_CATEGORIES.contains(&category.as_str());
        let is_medium_risk_category = !is_high_risk_category && MEDIUM_RISK_CATEGORIES.contains(&category.as_str());
        if is_high_risk_category {
            flags.push(TransactionFlag::HighRiskCategory);
            score += 35;
        } else if is_medium_risk_category {
            flags.push(TransactionFlag::MediumRiskCategory);
            score += 15;
        }

        if request.merchant.to_lowercase().contains("atm") && is_odd_hours {
            flags.push(TransactionFlag::OddHoursAtm);
            score += 15;
        }

        let risk_score = score.clamp(0, 100) as u32;
        let (risk_level, status, reasoning) =
            determine_risk_and_status(risk_score, &flags, is_high_amount, is_odd_hours, is_high_risk_category, request);

        GovernorDecision {
            risk_level,
            risk_score,
            status,
            flags,
            reasoning,
            requires_approval: status == TransactionStatus::PendingApproval,
            timestamp: Utc::now(),
        }
    }

    fn is_odd_hours(request: &TransactionRequest) -> bool {
        let local = request.timestamp + Duration::minutes(request.utc_offset_minutes.unwrap_or(0) as i64);
        let t = local.time();
        let start = chrono::NaiveTime::from_hms_opt(23, 0, 0).unwrap();
        let end = chrono::NaiveTime::from_hms_opt(5, 0, 0).unwrap();
        // Range crosses midnight: odd hours are [23:00, 24:00) union [00:00, 05:00].
        t >= start || t <= end
    }
}

fn normalize_category(category: &str) -> String {
    category.trim().to_lowercase().replace(' ', "_")
}

fn determine_risk_and_status(
    risk_score: u32,
    flags: &[TransactionFlag],
    is_high_amount: bool,
    is_odd_hours: bool,
    is_high_risk_category: bool,
    request: &TransactionRequest,
) -> (RiskLevel, TransactionStatus, String) {
    if is_high_amount && is_odd_hours && is_high_risk_category {
        let reasoning = format!(
            "CRITICAL RISK TRANSACTION: {} {} purchase at {} (odd hours). This combination of high amount, \
             unusual time, and high-risk category requires immediate Trusted Advocate approval.",
            request.amount,
            request.category,
            request.timestamp.format("%I:%M %p"),
        );
        return (RiskLevel::Critical, TransactionStatus::PendingApproval, reasoning);
    }

    if risk_score >= 70 {
        let reasoning = format!(
            "HIGH RISK TRANSACTION (Score: {risk_score}/100): {} {} purchase. Flags: {}. Requires approval.",
            request.amount,
            request.category,
            format_flags(flags),
        );
        return (RiskLevel::High, TransactionStatus::PendingApproval, reasoning);
    }

    if risk_score >= 40 {
        let reasoning = format!(
            "MEDIUM RISK TRANSACTION (Score: {risk_score}/100): {} {} purchase. Flags: {}. Recommended for review.",
            request.amount,
            request.category,
            format_flags(flags),
        );
        return (RiskLevel::Medium, TransactionStatus::PendingApproval, reasoning);
    }

    let reasoning = format!(
        "LOW RISK TRANSACTION (Score: {risk_score}/100): {} {} purchase appears normal.",
        request.amount, request.category,
    );
    (RiskLevel::Low, TransactionStatus::Approved, reasoning)
}

fn format_flags(flags: &[TransactionFlag]) -> String {
    flags.iter().map(|f| format!("{f:?}")).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn base_request() -> TransactionRequest {
        TransactionRequest {
            amount: dec!(50),
            timestamp: Utc.with_ymd_and_hms(2026, 1, 15, 14, 0, 0).unwrap(),
            category: "groceries".to_string(),
            merchant: "Corner Store".to_string(),
            principal_id: None,
            utc_offset_minutes: None,
        }
    }

    #[test]
    fn low_risk_transaction_is_approved() {
        let governor = TransactionGovernor::new();
        let decision = governor.analyze(&base_request());
        assert_eq!(decision.risk_level, RiskLevel::Low);
        assert_eq!(decision.status, TransactionStatus::Approved);
        assert!(!decision.requires_approval);
    }

    #[test]
    fn high_amount_odd_hours_high_risk_category_is_critical() {
        let governor = TransactionGovernor::new();
        let mut request = base_request();
        request.amount = dec!(5000);
        request.category = "Wire Transfer".to_string();
        request.timestamp = Utc.with_ymd_and_hms(2026, 1, 15, 2, 0, 0).unwrap();
        let decision = governor.analyze(&request);
        assert_eq!(decision.risk_level, RiskLevel::Critical);
        assert_eq!(decision.status, TransactionStatus::PendingApproval);
        assert!(decision.flags.contains(&TransactionFlag::VeryHighAmount));
    }

    #[test]
    fn odd_hours_atm_withdrawal_adds_flag() {
        let governor = TransactionGovernor::new();
        let mut request = base_request();
        request.amount = dec!(250);
        request.merchant = "Downtown ATM".to_string();
        request.timestamp = Utc.with_ymd_and_hms(2026, 1, 15, 23, 30, 0).unwrap();
        let decision = governor.analyze(&request);
        assert!(decision.flags.contains(&TransactionFlag::OddHoursAtm));
        assert!(decision.flags.contains(&TransactionFlag::OddHours));
    }

    #[test]
    fn category_normalization_is_case_and_whitespace_insensitive() {
        let governor = TransactionGovernor::new();
        let mut request = base_request();
        request.amount = dec!(50);
        request.category = "  Gift Cards  ".to_string();
        let decision = governor.analyze(&request);
        assert!(decision.flags.contains(&TransactionFlag::HighRiskCategory));
    }

    #[test]
    fn local_offset_shifts_odd_hours_window() {
        let governor = TransactionGovernor::new();
        let mut request = base_request();
        // 20:30 UTC with a +4 hour offset becomes 00:30 local, odd hours.
        request.timestamp = Utc.with_ymd_and_hms(2026, 1, 15, 20, 30, 0).unwrap();
        request.utc_offset_minutes = Some(4 * 60);
        let decision = governor.analyze(&request);
        assert!(decision.flags.contains(&TransactionFlag::OddHours));
    }

    #[test]
    fn medium_risk_category_alone_is_pending_approval() {
        let governor = TransactionGovernor::new();
        let mut request = base_request();
        request.category = "travel".to_string();
        request.amount = dec!(250);
        let decision = governor.analyze(&request);
        assert_eq!(decision.status, TransactionStatus::PendingApproval);
        assert_eq!(decision.risk_level, RiskLevel::Medium);
    }
}
