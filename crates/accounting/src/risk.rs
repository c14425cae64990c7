use serde::{Deserialize, Serialize};

use crate::reconcile::FinancialSummary;

/// Percent thresholds for the risk rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskThresholds {
    /// Margin below this is `LowMargin`.
    pub low_margin_percent: f64,
    /// Margin below this (and not low) is `ModerateMargin`.
    pub moderate_margin_percent: f64,
    /// Non-negative ROI below this is `LowRoi`.
    pub low_roi_percent: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            low_margin_percent: 10.0,
            moderate_margin_percent: 20.0,
            low_roi_percent: 15.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskFactor {
    LowMargin,
    ModerateMargin,
    NegativeRoi,
    LowRoi,
    ExpensesExceedRevenue,
    NoRevenue,
}

impl RiskFactor {
    /// Contribution to the 0-100 risk score.
    pub fn weight(self) -> u8 {
        match self {
            RiskFactor::LowMargin => 20,
            RiskFactor::ModerateMargin => 10,
            RiskFactor::NegativeRoi => 40,
            RiskFactor::LowRoi => 20,
            RiskFactor::ExpensesExceedRevenue => 30,
            RiskFactor::NoRevenue => 30,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Sum of factor weights, capped at 100.
    pub score: u8,
    pub factors: Vec<RiskFactor>,
}

impl RiskAssessment {
    pub fn level(&self) -> RiskLevel {
        match self.score {
            0..=29 => RiskLevel::Low,
            30..=59 => RiskLevel::Moderate,
            _ => RiskLevel::High,
        }
    }
}

/// Score a reconciled summary.
///
/// Metrics that are absent (no revenue, no expenses) contribute nothing by
/// themselves; an empty ledger scores 0.
pub fn assess_risk(summary: &FinancialSummary, thresholds: &RiskThresholds) -> RiskAssessment {
    let mut factors = Vec::new();

    if let Some(margin) = summary.profit_margin_percent {
        if margin < thresholds.low_margin_percent {
            factors.push(RiskFactor::LowMargin);
        } else if margin < thresholds.moderate_margin_percent {
            factors.push(RiskFactor::ModerateMargin);
        }
    }

    if let Some(roi) = summary.roi_percent {
        if roi < 0.0 {
            factors.push(RiskFactor::NegativeRoi);
        } else if roi < thresholds.low_roi_percent {
            factors.push(RiskFactor::LowRoi);
        }
    }

    if summary.total_revenue == 0 {
        if summary.total_expenses > 0 {
            factors.push(RiskFactor::NoRevenue);
        }
    } else if summary.total_expenses > summary.total_revenue {
        factors.push(RiskFactor::ExpensesExceedRevenue);
    }

    let score = factors
        .iter()
        .map(|f| u32::from(f.weight()))
        .sum::<u32>()
        .min(100) as u8;

    RiskAssessment { score, factors }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{ExpenseCategory, LedgerEntry};
    use crate::reconcile::reconcile;
    use pondops_core::LedgerLinkId;

    fn link() -> LedgerLinkId {
        LedgerLinkId::new("pond-7").unwrap()
    }

    fn summary(revenue: u64, expenses: u64) -> FinancialSummary {
        let mut entries = Vec::new();
        if revenue > 0 {
            entries.push(LedgerEntry::income(link(), revenue, "2024-01-01"));
        }
        if expenses > 0 {
            entries.push(LedgerEntry::expense(link(), expenses, Some(ExpenseCategory::Feed), "2024-01-01"));
        }
        reconcile(&entries)
    }

    #[test]
    fn empty_ledger_has_no_risk() {
        let a = assess_risk(&summary(0, 0), &RiskThresholds::default());
        assert_eq!(a.score, 0);
        assert!(a.factors.is_empty());
        assert_eq!(a.level(), RiskLevel::Low);
    }

    #[test]
    fn healthy_operation_has_no_factors() {
        // margin 50%, roi 100%
        let a = assess_risk(&summary(1_000, 500), &RiskThresholds::default());
        assert!(a.factors.is_empty());
    }

    #[test]
    fn thin_margin_and_low_roi() {
        // margin ~9.1%, roi 10%
        let a = assess_risk(&summary(1_100, 1_000), &RiskThresholds::default());
        assert_eq!(a.factors, vec![RiskFactor::LowMargin, RiskFactor::LowRoi]);
        assert_eq!(a.score, 40);
        assert_eq!(a.level(), RiskLevel::Moderate);
    }

    #[test]
    fn moderate_margin_only() {
        // margin 15%, roi ~17.6%
        let a = assess_risk(&summary(1_000, 850), &RiskThresholds::default());
        assert_eq!(a.factors, vec![RiskFactor::ModerateMargin]);
        assert_eq!(a.score, 10);
    }

    #[test]
    fn loss_making_operation_scores_high() {
        let a = assess_risk(&summary(500, 1_000), &RiskThresholds::default());
        assert_eq!(
            a.factors,
            vec![
                RiskFactor::LowMargin,
                RiskFactor::NegativeRoi,
                RiskFactor::ExpensesExceedRevenue
            ]
        );
        assert_eq!(a.score, 90);
        assert_eq!(a.level(), RiskLevel::High);
    }

    #[test]
    fn expenses_without_revenue() {
        let a = assess_risk(&summary(0, 300), &RiskThresholds::default());
        assert_eq!(a.factors, vec![RiskFactor::NegativeRoi, RiskFactor::NoRevenue]);
        assert_eq!(a.score, 70);
    }

    #[test]
    fn score_stays_within_scale() {
        let strict = RiskThresholds {
            low_margin_percent: 200.0,
            moderate_margin_percent: 300.0,
            low_roi_percent: 1_000.0,
        };
        for (revenue, expenses) in [(0, 300), (500, 1_000), (1, u64::MAX / 2), (1_000, 999)] {
            let a = assess_risk(&summary(revenue, expenses), &strict);
            assert!(a.score <= 100, "{revenue}/{expenses} scored {}", a.score);
        }
    }
}
