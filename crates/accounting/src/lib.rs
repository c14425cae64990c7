//! Pond financial reconciliation.
//!
//! Pure domain logic only: no IO, no persistence concerns. Entries arrive from
//! an external ledger; everything here aggregates them into summaries that
//! never fail on imperfect input.

pub mod entry;
pub mod reconcile;
pub mod risk;

pub use entry::{CustomCategory, EntryType, ExpenseCategory, LedgerEntry};
pub use reconcile::{
    reconcile, reconcile_for_link, CategoryShare, FinancialSummary, MonthlyBucket,
};
pub use risk::{assess_risk, RiskAssessment, RiskFactor, RiskLevel, RiskThresholds};
