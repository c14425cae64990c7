use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use pondops_core::LedgerLinkId;

/// Direction of a ledger entry. Amounts are always non-negative; the type
/// carries the sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    Income,
    Expense,
}

/// Expense category.
///
/// Known cost heads get their own variant; any other non-blank label is kept
/// as `Custom` (normalized), and a missing or blank label is `Other`. A
/// `Custom` value can only come out of [`ExpenseCategory::parse`], so it never
/// shadows a known head.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ExpenseCategory {
    Postlarvae,
    Feed,
    Labor,
    Electricity,
    Fuel,
    Medication,
    Probiotics,
    WaterTreatment,
    Maintenance,
    Transportation,
    Packaging,
    Custom(CustomCategory),
    Other,
}

impl ExpenseCategory {
    pub fn parse(raw: &str) -> Self {
        let normalized: String = raw
            .trim()
            .chars()
            .map(|c| match c {
                ' ' | '-' => '_',
                c => c.to_ascii_lowercase(),
            })
            .collect();

        match normalized.as_str() {
            "" | "other" | "misc" | "miscellaneous" => Self::Other,
            "postlarvae" | "post_larvae" | "seed" => Self::Postlarvae,
            "feed" => Self::Feed,
            "labor" | "labour" => Self::Labor,
            "electricity" | "power" => Self::Electricity,
            "fuel" => Self::Fuel,
            "medication" | "medicine" => Self::Medication,
            "probiotics" => Self::Probiotics,
            "water_treatment" => Self::WaterTreatment,
            "maintenance" | "repairs" => Self::Maintenance,
            "transportation" | "transport" => Self::Transportation,
            "packaging" => Self::Packaging,
            _ => Self::Custom(CustomCategory(normalized)),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Postlarvae => "postlarvae",
            Self::Feed => "feed",
            Self::Labor => "labor",
            Self::Electricity => "electricity",
            Self::Fuel => "fuel",
            Self::Medication => "medication",
            Self::Probiotics => "probiotics",
            Self::WaterTreatment => "water_treatment",
            Self::Maintenance => "maintenance",
            Self::Transportation => "transportation",
            Self::Packaging => "packaging",
            Self::Custom(label) => label.as_str(),
            Self::Other => "other",
        }
    }
}

/// Normalized label of a category outside the known cost heads.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CustomCategory(String);

impl CustomCategory {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ExpenseCategory {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<&str> for ExpenseCategory {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<ExpenseCategory> for String {
    fn from(value: ExpenseCategory) -> Self {
        value.label().to_string()
    }
}

impl core::fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

/// One transaction as supplied by the ledger boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub link: LedgerLinkId,
    pub entry_type: EntryType,
    /// Amount in smallest currency unit (e.g., cents).
    pub amount: u64,
    /// Only meaningful for expenses; income entries ignore it.
    #[serde(default)]
    pub category: Option<ExpenseCategory>,
    /// Raw date as stored upstream. See [`LedgerEntry::resolved_date`].
    pub date: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl LedgerEntry {
    pub fn income(link: LedgerLinkId, amount: u64, date: impl Into<String>) -> Self {
        Self {
            link,
            entry_type: EntryType::Income,
            amount,
            category: None,
            date: date.into(),
            description: None,
        }
    }

    pub fn expense(
        link: LedgerLinkId,
        amount: u64,
        category: Option<ExpenseCategory>,
        date: impl Into<String>,
    ) -> Self {
        Self {
            link,
            entry_type: EntryType::Expense,
            amount,
            category,
            date: date.into(),
            description: None,
        }
    }

    pub fn is_income(&self) -> bool {
        self.entry_type == EntryType::Income
    }

    pub fn is_expense(&self) -> bool {
        self.entry_type == EntryType::Expense
    }

    /// Category used for the expense breakdown.
    pub fn expense_category(&self) -> ExpenseCategory {
        self.category.clone().unwrap_or(ExpenseCategory::Other)
    }

    /// Calendar date of the entry, using the date components as given.
    ///
    /// Accepted: `YYYY-MM-DD`, naive `YYYY-MM-DDTHH:MM:SS[.f]` or
    /// `YYYY-MM-DD HH:MM:SS[.f]`, and RFC 3339 (the date in the timestamp's
    /// own offset). Anything else is `None`, never "today".
    pub fn resolved_date(&self) -> Option<NaiveDate> {
        resolve_date(&self.date)
    }
}

fn resolve_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .into_iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|dt| dt.date())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link() -> LedgerLinkId {
        LedgerLinkId::new("pond-7").unwrap()
    }

    fn date_of(raw: &str) -> Option<NaiveDate> {
        LedgerEntry::income(link(), 1, raw).resolved_date()
    }

    #[test]
    fn resolves_supported_date_shapes() {
        let jan5 = NaiveDate::from_ymd_opt(2024, 1, 5);
        assert_eq!(date_of("2024-01-05"), jan5);
        assert_eq!(date_of(" 2024-01-05 "), jan5);
        assert_eq!(date_of("2024-01-05T10:30:00"), jan5);
        assert_eq!(date_of("2024-01-05T10:30:00.250"), jan5);
        assert_eq!(date_of("2024-01-05 10:30:00"), jan5);
        assert_eq!(date_of("2024-01-05T10:30:00Z"), jan5);
    }

    #[test]
    fn rfc3339_keeps_the_local_date_as_given() {
        // 23:30 at -05:00 is already the 6th in UTC; the entry's own date wins.
        assert_eq!(
            date_of("2024-01-05T23:30:00-05:00"),
            NaiveDate::from_ymd_opt(2024, 1, 5)
        );
    }

    #[test]
    fn unparsable_dates_resolve_to_none() {
        for raw in ["", "   ", "yesterday", "2024-13-01", "2024-02-30", "05/01/2024"] {
            assert_eq!(date_of(raw), None, "{raw:?} should not resolve");
        }
    }

    #[test]
    fn categories_are_closed_with_custom_and_other() {
        assert_eq!(ExpenseCategory::parse("Feed"), ExpenseCategory::Feed);
        assert_eq!(ExpenseCategory::parse(" water treatment "), ExpenseCategory::WaterTreatment);
        assert_eq!(ExpenseCategory::parse("labour"), ExpenseCategory::Labor);
        assert_eq!(ExpenseCategory::parse(""), ExpenseCategory::Other);
        let lab = ExpenseCategory::parse("Lab Tests");
        assert!(matches!(&lab, ExpenseCategory::Custom(c) if c.as_str() == "lab_tests"));
        assert_eq!(lab.label(), "lab_tests");
    }

    #[test]
    fn known_labels_never_become_custom() {
        for raw in ["feed", " FEED ", "Labour", "water-treatment", "misc"] {
            let category = ExpenseCategory::parse(raw);
            assert!(!matches!(category, ExpenseCategory::Custom(_)), "{raw:?} parsed as {category:?}");
        }

        // Serialized labels read back as the same category.
        for category in [ExpenseCategory::Feed, ExpenseCategory::parse("Lab Tests"), ExpenseCategory::Other] {
            let json = serde_json::to_string(&category).unwrap();
            let back: ExpenseCategory = serde_json::from_str(&json).unwrap();
            assert_eq!(back, category);
        }
    }

    #[test]
    fn missing_category_falls_into_other() {
        let entry = LedgerEntry::expense(link(), 10, None, "2024-01-01");
        assert_eq!(entry.expense_category(), ExpenseCategory::Other);
    }

    #[test]
    fn entry_deserializes_from_ledger_json() {
        let json = r#"{
            "link": "pond-7",
            "entry_type": "expense",
            "amount": 12500,
            "category": "Feed",
            "date": "2024-01-05"
        }"#;
        let entry: LedgerEntry = serde_json::from_str(json).unwrap();
        assert!(entry.is_expense());
        assert_eq!(entry.category, Some(ExpenseCategory::Feed));
        assert_eq!(entry.description, None);
    }
}
