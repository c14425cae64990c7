use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use pondops_accounting::{RiskAssessment, RiskFactor};
use pondops_core::PondId;
use pondops_lifecycle::{LifecycleProgress, Phase};
use pondops_monitoring::{ParameterName, ParameterStatus, ReferenceRange, Trend};

use crate::overview::ParameterReading;
use crate::source::AlertSink;

/// Urgency, most urgent first. `Ord` follows that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertPriority {
    Critical,
    High,
    Medium,
    Low,
    Info,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AlertKind {
    /// A reading outside its reference range.
    Parameter {
        parameter: ParameterName,
        value: f64,
        status: ParameterStatus,
        trend: Trend,
        range: Option<ReferenceRange>,
    },
    /// The unit is past the nominal duration of its current phase.
    PhaseOverrun { phase: Phase, overrun_days: u32 },
    /// The current phase has reached its nominal duration exactly.
    PhaseDue { phase: Phase },
    Financial { factor: RiskFactor },
}

impl AlertKind {
    /// Secondary ordering within a priority.
    fn sort_key(&self) -> (u8, &str) {
        match self {
            AlertKind::Parameter { parameter, .. } => (0, parameter.as_str()),
            AlertKind::PhaseOverrun { phase, .. } => (1, phase.as_str()),
            AlertKind::PhaseDue { phase } => (2, phase.as_str()),
            AlertKind::Financial { factor } => (3, factor_key(*factor)),
        }
    }
}

fn factor_key(factor: RiskFactor) -> &'static str {
    match factor {
        RiskFactor::NegativeRoi => "negative_roi",
        RiskFactor::ExpensesExceedRevenue => "expenses_exceed_revenue",
        RiskFactor::NoRevenue => "no_revenue",
        RiskFactor::LowMargin => "low_margin",
        RiskFactor::LowRoi => "low_roi",
        RiskFactor::ModerateMargin => "moderate_margin",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub pond_id: PondId,
    pub priority: AlertPriority,
    #[serde(flatten)]
    pub kind: AlertKind,
}

impl Alert {
    pub fn new(pond_id: PondId, priority: AlertPriority, kind: AlertKind) -> Self {
        Self {
            pond_id,
            priority,
            kind,
        }
    }
}

/// Alerts implied by one unit's state.
///
/// Rules:
/// - Out-of-range reading: `Critical` when still moving away from the band,
///   `High` otherwise. In-range and unclassified readings raise nothing,
///   whatever their trend.
/// - Phase overrun: `Medium`. Phase exactly at its nominal length: `Info`.
/// - Financial risk factor: `High` for losses or missing revenue, `Low` for
///   thin margins and returns.
pub fn derive_alerts(
    pond_id: PondId,
    progress: &LifecycleProgress,
    readings: &[ParameterReading],
    risk: Option<&RiskAssessment>,
) -> Vec<Alert> {
    let mut alerts = Vec::new();

    for reading in readings {
        let classification = &reading.classification;
        if !classification.is_out_of_range() {
            continue;
        }
        let priority = if classification.is_worsening() {
            AlertPriority::Critical
        } else {
            AlertPriority::High
        };
        alerts.push(Alert::new(
            pond_id,
            priority,
            AlertKind::Parameter {
                parameter: reading.sample.parameter.clone(),
                value: reading.sample.value,
                status: classification.status,
                trend: classification.trend,
                range: reading.range.clone(),
            },
        ));
    }

    if progress.overrun {
        alerts.push(Alert::new(
            pond_id,
            AlertPriority::Medium,
            AlertKind::PhaseOverrun {
                phase: progress.current_phase,
                overrun_days: progress.overrun_days,
            },
        ));
    } else if progress.days_remaining == Some(0) {
        alerts.push(Alert::new(
            pond_id,
            AlertPriority::Info,
            AlertKind::PhaseDue {
                phase: progress.current_phase,
            },
        ));
    }

    if let Some(risk) = risk {
        for factor in &risk.factors {
            alerts.push(Alert::new(
                pond_id,
                financial_priority(*factor),
                AlertKind::Financial { factor: *factor },
            ));
        }
    }

    alerts
}

fn financial_priority(factor: RiskFactor) -> AlertPriority {
    match factor {
        RiskFactor::NegativeRoi | RiskFactor::ExpensesExceedRevenue | RiskFactor::NoRevenue => {
            AlertPriority::High
        }
        RiskFactor::LowMargin | RiskFactor::ModerateMargin | RiskFactor::LowRoi => AlertPriority::Low,
    }
}

/// Sort by priority, then by kind. Stable, so equal alerts keep their order.
pub fn prioritize(alerts: &mut [Alert]) {
    alerts.sort_by(|a, b| {
        a.priority
            .cmp(&b.priority)
            .then_with(|| a.kind.sort_key().cmp(&b.kind.sort_key()))
    });
}

/// Publish alerts most urgent first. A failed publish is logged and does not
/// stop the rest; returns how many were accepted.
pub fn dispatch<S>(alerts: &[Alert], sink: &S) -> usize
where
    S: AlertSink + ?Sized,
{
    let mut ordered = alerts.to_vec();
    prioritize(&mut ordered);

    let mut published = 0;
    for alert in &ordered {
        match sink.publish(alert) {
            Ok(()) => published += 1,
            Err(e) => {
                warn!(pond_id = %alert.pond_id, priority = ?alert.priority, error = %e, "alert not delivered");
            }
        }
    }

    debug!(total = ordered.len(), published, "alerts dispatched");
    published
}
