use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use pondops_accounting::{assess_risk, reconcile_for_link, FinancialSummary, RiskAssessment};
use pondops_core::{DomainResult, PondId};
use pondops_lifecycle::{LifecycleProgress, ProductionUnit};
use pondops_monitoring::{Classification, MeasurementSample, ReferenceRange};

use crate::alert::{derive_alerts, prioritize, Alert};
use crate::config::CoreConfig;
use crate::source::{LedgerSource, MeasurementSource};

/// Latest sample of one parameter with its classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterReading {
    pub sample: MeasurementSample,
    pub classification: Classification,
    pub range: Option<ReferenceRange>,
}

/// Everything known about one unit at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitOverview {
    pub pond_id: PondId,
    pub name: String,
    pub retired: bool,
    pub progress: LifecycleProgress,
    /// `None` when the unit has no ledger link or the ledger could not be read.
    pub finance: Option<FinancialSummary>,
    pub risk: Option<RiskAssessment>,
    /// Ordered by parameter name.
    pub readings: Vec<ParameterReading>,
    /// Most urgent first. Retired units raise none.
    pub alerts: Vec<Alert>,
}

/// Combines lifecycle, monitoring and accounting into per-unit overviews.
///
/// Collaborator failures degrade the overview (missing finance, missing
/// readings) and are logged; building an overview never fails.
#[derive(Debug, Clone, Copy)]
pub struct Overviewer<'a> {
    config: &'a CoreConfig,
}

impl<'a> Overviewer<'a> {
    pub fn new(config: &'a CoreConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CoreConfig {
        self.config
    }

    pub fn overview<L, M>(&self, unit: &ProductionUnit, ledger: &L, measurements: &M) -> UnitOverview
    where
        L: LedgerSource + ?Sized,
        M: MeasurementSource + ?Sized,
    {
        let pond_id = unit.id_typed();
        let progress = self.config.phase_machine().progress(unit);
        let finance = self.finance_for(unit, ledger);
        let risk = finance
            .as_ref()
            .map(|summary| assess_risk(summary, self.config.risk_thresholds()));
        let readings = self.readings_for(pond_id, measurements);

        let alerts = if unit.is_retired() {
            Vec::new()
        } else {
            let mut alerts = derive_alerts(pond_id, &progress, &readings, risk.as_ref());
            prioritize(&mut alerts);
            alerts
        };

        debug!(
            pond_id = %pond_id,
            phase = %progress.current_phase,
            readings = readings.len(),
            alerts = alerts.len(),
            has_finance = finance.is_some(),
            "overview built"
        );

        UnitOverview {
            pond_id,
            name: unit.name().to_string(),
            retired: unit.is_retired(),
            progress,
            finance,
            risk,
            readings,
            alerts,
        }
    }

    /// Move a unit to its next phase. `InvalidTransition` reaches the caller
    /// unchanged.
    pub fn advance(&self, unit: &ProductionUnit) -> DomainResult<ProductionUnit> {
        let next = self.config.phase_machine().advance(unit)?;
        info!(
            pond_id = %unit.id_typed(),
            from = %unit.current_phase(),
            to = %next.current_phase(),
            "unit advanced"
        );
        Ok(next)
    }

    /// Overviews for many units, computed in parallel. Output order matches
    /// input order.
    pub fn overview_many<L, M>(
        &self,
        units: &[ProductionUnit],
        ledger: &L,
        measurements: &M,
    ) -> Vec<UnitOverview>
    where
        L: LedgerSource + ?Sized,
        M: MeasurementSource + ?Sized,
    {
        units
            .par_iter()
            .map(|unit| self.overview(unit, ledger, measurements))
            .collect()
    }

    fn finance_for<L>(&self, unit: &ProductionUnit, ledger: &L) -> Option<FinancialSummary>
    where
        L: LedgerSource + ?Sized,
    {
        let link = unit.linked_ledger_id()?;
        match ledger.entries_for(link) {
            Ok(entries) => Some(reconcile_for_link(link, &entries)),
            Err(e) => {
                warn!(pond_id = %unit.id_typed(), link = %link, error = %e, "ledger unavailable; overview has no finance");
                None
            }
        }
    }

    fn readings_for<M>(&self, pond_id: PondId, measurements: &M) -> Vec<ParameterReading>
    where
        M: MeasurementSource + ?Sized,
    {
        let latest = match measurements.latest(pond_id) {
            Ok(latest) => latest,
            Err(e) => {
                warn!(pond_id = %pond_id, error = %e, "measurements unavailable; overview has no readings");
                return Vec::new();
            }
        };

        let classifier = self.config.classifier();
        let mut readings: Vec<ParameterReading> = latest
            .into_iter()
            .map(|sample| {
                let history = measurements
                    .history(pond_id, &sample.parameter)
                    .unwrap_or_else(|e| {
                        warn!(pond_id = %pond_id, parameter = %sample.parameter, error = %e, "history unavailable; trend reported stable");
                        Vec::new()
                    });

                ParameterReading {
                    classification: classifier.classify_samples(&sample, &history),
                    range: self.config.reference_table().get(&sample.parameter).cloned(),
                    sample,
                }
            })
            .collect();

        readings.sort_by(|a, b| a.sample.parameter.cmp(&b.sample.parameter));
        readings
    }
}
