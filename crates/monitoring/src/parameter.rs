use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pondops_core::PondId;

/// Name of a measurable parameter (e.g. `ph`, `dissolved_oxygen`).
///
/// Names are normalized on construction: trimmed, lowercased, with spaces and
/// dashes folded to `_`, so `"Dissolved Oxygen"` and `"dissolved-oxygen"` are
/// the same parameter. Any name is accepted; whether it can be classified is
/// decided by the reference table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ParameterName(String);

impl ParameterName {
    pub const PH: &'static str = "ph";
    pub const DISSOLVED_OXYGEN: &'static str = "dissolved_oxygen";
    pub const TEMPERATURE: &'static str = "temperature";
    pub const SALINITY: &'static str = "salinity";
    pub const AMMONIA: &'static str = "ammonia";
    pub const NITRITE: &'static str = "nitrite";
    pub const ALKALINITY: &'static str = "alkalinity";
    pub const CALCIUM: &'static str = "calcium";
    pub const MAGNESIUM: &'static str = "magnesium";
    pub const POTASSIUM: &'static str = "potassium";

    pub fn new(raw: impl AsRef<str>) -> Self {
        let normalized = raw
            .as_ref()
            .trim()
            .chars()
            .map(|c| match c {
                ' ' | '-' => '_',
                c => c.to_ascii_lowercase(),
            })
            .collect();
        Self(normalized)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ParameterName {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for ParameterName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<ParameterName> for String {
    fn from(value: ParameterName) -> Self {
        value.0
    }
}

impl core::fmt::Display for ParameterName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One reading of a parameter for a pond.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementSample {
    pub pond_id: PondId,
    pub parameter: ParameterName,
    pub value: f64,
    pub taken_at: DateTime<Utc>,
}

impl MeasurementSample {
    pub fn new(
        pond_id: PondId,
        parameter: impl Into<ParameterName>,
        value: f64,
        taken_at: DateTime<Utc>,
    ) -> Self {
        Self {
            pond_id,
            parameter: parameter.into(),
            value,
            taken_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_normalized() {
        assert_eq!(ParameterName::new(" Dissolved Oxygen ").as_str(), "dissolved_oxygen");
        assert_eq!(ParameterName::new("dissolved-oxygen").as_str(), "dissolved_oxygen");
        assert_eq!(ParameterName::new("pH").as_str(), ParameterName::PH);
    }

    #[test]
    fn deserialization_normalizes_too() {
        let name: ParameterName = serde_json::from_str("\"Ammonia\"").unwrap();
        assert_eq!(name.as_str(), ParameterName::AMMONIA);
    }
}
