use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use pondops_core::{DomainError, DomainResult, ValueObject};

use crate::parameter::ParameterName;

/// Optimal band for a parameter (inclusive on both ends).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceRange {
    pub min: f64,
    pub max: f64,
    pub unit: String,
}

impl ValueObject for ReferenceRange {}

impl ReferenceRange {
    pub fn new(min: f64, max: f64, unit: impl Into<String>) -> DomainResult<Self> {
        let range = Self {
            min,
            max,
            unit: unit.into(),
        };
        range.validate()?;
        Ok(range)
    }

    /// Check the range invariants. Deserialized ranges must be validated
    /// explicitly since serde bypasses `new`.
    pub fn validate(&self) -> DomainResult<()> {
        if !(self.min.is_finite() && self.max.is_finite()) {
            return Err(DomainError::validation("reference range bounds must be finite"));
        }
        if self.min > self.max {
            return Err(DomainError::validation(format!(
                "reference range min ({}) exceeds max ({})",
                self.min, self.max
            )));
        }
        Ok(())
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Per-parameter reference ranges.
///
/// Immutable once built; share it by reference across classifier calls.
///
/// Deserializes from a map keyed by raw names. Two keys that normalize to the
/// same parameter (`pH` and `ph`) are rejected rather than one silently
/// replacing the other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, ReferenceRange>",
    into = "BTreeMap<ParameterName, ReferenceRange>"
)]
pub struct ReferenceTable {
    ranges: BTreeMap<ParameterName, ReferenceRange>,
}

impl TryFrom<BTreeMap<String, ReferenceRange>> for ReferenceTable {
    type Error = DomainError;

    fn try_from(raw: BTreeMap<String, ReferenceRange>) -> Result<Self, Self::Error> {
        let mut ranges: BTreeMap<ParameterName, ReferenceRange> = BTreeMap::new();
        let mut sources: BTreeMap<ParameterName, String> = BTreeMap::new();

        for (key, range) in raw {
            let name = ParameterName::new(&key);
            if let Some(first) = sources.get(&name) {
                return Err(DomainError::validation(format!(
                    "keys `{first}` and `{key}` both name parameter `{name}`"
                )));
            }
            sources.insert(name.clone(), key);
            ranges.insert(name, range);
        }

        Ok(Self { ranges })
    }
}

impl From<ReferenceTable> for BTreeMap<ParameterName, ReferenceRange> {
    fn from(table: ReferenceTable) -> Self {
        table.ranges
    }
}

impl ReferenceTable {
    pub fn empty() -> Self {
        Self {
            ranges: BTreeMap::new(),
        }
    }

    /// Builds a table, rejecting any invalid range.
    pub fn from_ranges(
        ranges: impl IntoIterator<Item = (ParameterName, ReferenceRange)>,
    ) -> DomainResult<Self> {
        let mut table = Self::empty();
        for (name, range) in ranges {
            range
                .validate()
                .map_err(|e| DomainError::validation(format!("{name}: {e}")))?;
            table.ranges.insert(name, range);
        }
        Ok(table)
    }

    pub fn with_range(mut self, name: impl Into<ParameterName>, range: ReferenceRange) -> Self {
        self.ranges.insert(name.into(), range);
        self
    }

    pub fn get(&self, name: &ParameterName) -> Option<&ReferenceRange> {
        self.ranges.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ParameterName, &ReferenceRange)> {
        self.ranges.iter()
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn validate(&self) -> DomainResult<()> {
        for (name, range) in &self.ranges {
            range
                .validate()
                .map_err(|e| DomainError::validation(format!("{name}: {e}")))?;
        }
        Ok(())
    }
}

/// Shrimp-pond water quality bands.
impl Default for ReferenceTable {
    fn default() -> Self {
        let defaults: [(&str, f64, f64, &str); 10] = [
            (ParameterName::PH, 7.5, 8.5, "pH"),
            (ParameterName::DISSOLVED_OXYGEN, 4.0, 10.0, "mg/L"),
            (ParameterName::TEMPERATURE, 28.0, 32.0, "°C"),
            (ParameterName::SALINITY, 15.0, 25.0, "ppt"),
            (ParameterName::AMMONIA, 0.0, 0.5, "mg/L"),
            (ParameterName::NITRITE, 0.0, 1.0, "mg/L"),
            (ParameterName::ALKALINITY, 80.0, 150.0, "mg/L"),
            (ParameterName::CALCIUM, 100.0, 300.0, "mg/L"),
            (ParameterName::MAGNESIUM, 300.0, 1000.0, "mg/L"),
            (ParameterName::POTASSIUM, 100.0, 300.0, "mg/L"),
        ];

        let ranges = defaults
            .into_iter()
            .map(|(name, min, max, unit)| {
                (
                    ParameterName::new(name),
                    ReferenceRange {
                        min,
                        max,
                        unit: unit.to_string(),
                    },
                )
            })
            .collect();

        Self { ranges }
    }
}
