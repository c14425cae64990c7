use serde::{Deserialize, Serialize};

use crate::parameter::{MeasurementSample, ParameterName};
use crate::reference::{ReferenceRange, ReferenceTable};

/// Percentage change a reading must exceed (in either direction) against its
/// baseline before the trend stops being `Stable`.
pub const TREND_THRESHOLD_PERCENT: f64 = 2.0;

/// Where a reading sits relative to its reference range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterStatus {
    Deficient,
    Optimal,
    Excess,
    /// No reference range is configured, or the reading is not a finite number.
    Unclassified,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Rising,
    Falling,
    Stable,
}

/// Classifier output for a single reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub status: ParameterStatus,
    pub trend: Trend,
    /// Absolute percentage change against the window baseline.
    pub trend_magnitude_percent: f64,
}

impl Classification {
    pub fn is_out_of_range(&self) -> bool {
        matches!(self.status, ParameterStatus::Deficient | ParameterStatus::Excess)
    }

    /// Out of range and still moving away from the band.
    pub fn is_worsening(&self) -> bool {
        matches!(
            (self.status, self.trend),
            (ParameterStatus::Deficient, Trend::Falling) | (ParameterStatus::Excess, Trend::Rising)
        )
    }

    fn unclassified() -> Self {
        Self {
            status: ParameterStatus::Unclassified,
            trend: Trend::Stable,
            trend_magnitude_percent: 0.0,
        }
    }
}

/// Classifies readings against a reference table.
///
/// Model:
/// - Status compares the reading against the parameter's inclusive band.
/// - Trend compares the reading against the earliest value in a trailing
///   window of the supplied history (whole history unless `with_window`).
/// - The change is expressed as a percentage of the baseline and compared
///   against `threshold_percent`.
#[derive(Debug, Clone, Copy)]
pub struct Classifier<'a> {
    ranges: &'a ReferenceTable,
    /// Trailing history window; `None` covers the whole supplied history.
    window: Option<usize>,
    threshold_percent: f64,
}

impl<'a> Classifier<'a> {
    pub fn new(ranges: &'a ReferenceTable) -> Self {
        Self {
            ranges,
            window: None,
            threshold_percent: TREND_THRESHOLD_PERCENT,
        }
    }

    pub fn with_window(mut self, window: usize) -> Self {
        self.window = Some(window);
        self
    }

    /// Override the trend threshold. Negative or non-finite values are ignored.
    pub fn with_threshold_percent(mut self, threshold_percent: f64) -> Self {
        if threshold_percent.is_finite() && threshold_percent >= 0.0 {
            self.threshold_percent = threshold_percent;
        }
        self
    }

    pub fn window(&self) -> Option<usize> {
        self.window
    }

    pub fn threshold_percent(&self) -> f64 {
        self.threshold_percent
    }

    /// Classify `current` for `parameter`; `history` is oldest-first.
    pub fn classify(&self, parameter: &ParameterName, current: f64, history: &[f64]) -> Classification {
        if !current.is_finite() {
            return Classification::unclassified();
        }

        let range = self.ranges.get(parameter);
        if range.is_none() {
            tracing::debug!(parameter = %parameter, "no reference range; reading passes through unclassified");
        }

        let (trend, trend_magnitude_percent) =
            trend_for(current, history, self.window, self.threshold_percent);

        Classification {
            status: status_for(range, current),
            trend,
            trend_magnitude_percent,
        }
    }

    /// Classify a sample against other samples of the same pond.
    ///
    /// Only samples of the same parameter taken strictly before `current`
    /// count, so a full store history (which includes `current` itself) can be
    /// passed as is. The remainder is ordered by `taken_at`.
    pub fn classify_samples(
        &self,
        current: &MeasurementSample,
        history: &[MeasurementSample],
    ) -> Classification {
        let mut relevant: Vec<&MeasurementSample> = history
            .iter()
            .filter(|s| s.parameter == current.parameter && s.taken_at < current.taken_at)
            .collect();
        relevant.sort_by(|a, b| {
            a.taken_at
                .cmp(&b.taken_at)
                .then_with(|| a.value.total_cmp(&b.value))
        });

        let values: Vec<f64> = relevant.iter().map(|s| s.value).collect();
        self.classify(&current.parameter, current.value, &values)
    }
}

fn status_for(range: Option<&ReferenceRange>, value: f64) -> ParameterStatus {
    match range {
        None => ParameterStatus::Unclassified,
        Some(r) if r.contains(value) => ParameterStatus::Optimal,
        Some(r) if value < r.min => ParameterStatus::Deficient,
        Some(_) => ParameterStatus::Excess,
    }
}

fn trend_for(current: f64, history: &[f64], window: Option<usize>, threshold: f64) -> (Trend, f64) {
    let finite: Vec<f64> = history.iter().copied().filter(|v| v.is_finite()).collect();
    let take = window.unwrap_or(finite.len()).min(finite.len());
    if take == 0 {
        return (Trend::Stable, 0.0);
    }

    let baseline = finite[finite.len() - take];
    let delta = current - baseline;

    // A zero baseline has no percentage scale; report direction only.
    let change_percent = if delta == 0.0 {
        0.0
    } else if baseline == 0.0 {
        100.0 * delta.signum()
    } else {
        let pct = delta / baseline.abs() * 100.0;
        if pct.is_finite() { pct } else { 100.0 * delta.signum() }
    };

    let trend = if change_percent > threshold {
        Trend::Rising
    } else if change_percent < -threshold {
        Trend::Falling
    } else {
        Trend::Stable
    };

    (trend, change_percent.abs())
}
