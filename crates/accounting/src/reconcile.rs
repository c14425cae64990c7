use std::collections::BTreeMap;

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use pondops_core::LedgerLinkId;

use crate::entry::{EntryType, ExpenseCategory, LedgerEntry};

/// Share of total expenses spent in one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryShare {
    pub category: ExpenseCategory,
    /// Smallest currency unit.
    pub amount: u64,
    /// `0` for every bucket when total expenses are zero.
    pub percent_of_expenses: f64,
}

/// Calendar-month totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyBucket {
    pub year: i32,
    pub month: u32,
    /// `YYYY-MM`.
    pub label: String,
    pub revenue: u64,
    pub expenses: u64,
    pub profit: i64,
}

/// Reconciled view over a unit's ledger entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialSummary {
    pub total_revenue: u64,
    pub total_expenses: u64,
    pub net_profit: i64,
    /// Largest share first; ties broken by label.
    pub category_breakdown: Vec<CategoryShare>,
    /// Chronological; months without entries are omitted.
    pub monthly_trend: Vec<MonthlyBucket>,
    /// `None` when there is no revenue (a zero ratio would read as healthy).
    pub expense_to_revenue_ratio: Option<f64>,
    /// Net profit over revenue; `None` when there is no revenue.
    pub profit_margin_percent: Option<f64>,
    /// Net profit over expenses; `None` when there are no expenses.
    pub roi_percent: Option<f64>,
    pub entry_count: usize,
    /// Entries counted in totals but left out of `monthly_trend`.
    pub undated_entry_count: usize,
}

impl FinancialSummary {
    pub fn is_empty(&self) -> bool {
        self.entry_count == 0
    }
}

#[derive(Default)]
struct MonthTotals {
    revenue: u64,
    expenses: u64,
}

/// Aggregate ledger entries into a [`FinancialSummary`].
///
/// Result depends only on the multiset of entries, never on their order.
/// Entries whose date does not resolve still count toward totals and the
/// category breakdown; they are only left out of the monthly trend.
pub fn reconcile(entries: &[LedgerEntry]) -> FinancialSummary {
    let mut total_revenue: u64 = 0;
    let mut total_expenses: u64 = 0;
    let mut by_category: BTreeMap<ExpenseCategory, u64> = BTreeMap::new();
    let mut by_month: BTreeMap<(i32, u32), MonthTotals> = BTreeMap::new();
    let mut undated_entry_count = 0;

    for entry in entries {
        match entry.entry_type {
            EntryType::Income => {
                total_revenue = total_revenue.saturating_add(entry.amount);
            }
            EntryType::Expense => {
                total_expenses = total_expenses.saturating_add(entry.amount);
                let bucket = by_category.entry(entry.expense_category()).or_insert(0);
                *bucket = bucket.saturating_add(entry.amount);
            }
        }

        let Some(date) = entry.resolved_date() else {
            undated_entry_count += 1;
            continue;
        };

        let month = by_month.entry((date.year(), date.month())).or_default();
        match entry.entry_type {
            EntryType::Income => month.revenue = month.revenue.saturating_add(entry.amount),
            EntryType::Expense => month.expenses = month.expenses.saturating_add(entry.amount),
        }
    }

    let mut category_breakdown: Vec<CategoryShare> = by_category
        .into_iter()
        .map(|(category, amount)| CategoryShare {
            category,
            amount,
            percent_of_expenses: percent_of(amount, total_expenses),
        })
        .collect();
    category_breakdown.sort_by(|a, b| {
        b.amount
            .cmp(&a.amount)
            .then_with(|| a.category.label().cmp(b.category.label()))
    });

    let monthly_trend = by_month
        .into_iter()
        .map(|((year, month), totals)| MonthlyBucket {
            year,
            month,
            label: format!("{year:04}-{month:02}"),
            revenue: totals.revenue,
            expenses: totals.expenses,
            profit: signed_diff(totals.revenue, totals.expenses),
        })
        .collect();

    let net_profit = signed_diff(total_revenue, total_expenses);

    FinancialSummary {
        total_revenue,
        total_expenses,
        net_profit,
        category_breakdown,
        monthly_trend,
        expense_to_revenue_ratio: ratio(total_expenses as f64, total_revenue),
        profit_margin_percent: ratio(net_profit as f64, total_revenue).map(|r| r * 100.0),
        roi_percent: ratio(net_profit as f64, total_expenses).map(|r| r * 100.0),
        entry_count: entries.len(),
        undated_entry_count,
    }
}

/// Reconcile only the entries that belong to `link`.
///
/// The join key is explicit so the unit never needs a back-reference to its
/// transactions.
pub fn reconcile_for_link(link: &LedgerLinkId, entries: &[LedgerEntry]) -> FinancialSummary {
    let linked: Vec<LedgerEntry> = entries.iter().filter(|e| &e.link == link).cloned().collect();

    let summary = reconcile(&linked);
    tracing::debug!(
        link = %link,
        matched = linked.len(),
        ignored = entries.len() - linked.len(),
        undated = summary.undated_entry_count,
        "reconciled ledger entries"
    );
    summary
}

fn percent_of(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 * 100.0 / whole as f64
}

fn ratio(numerator: f64, denominator: u64) -> Option<f64> {
    (denominator > 0).then(|| numerator / denominator as f64)
}

fn signed_diff(a: u64, b: u64) -> i64 {
    let diff = i128::from(a) - i128::from(b);
    i64::try_from(diff).unwrap_or(if diff < 0 { i64::MIN } else { i64::MAX })
}
