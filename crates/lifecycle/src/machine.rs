use serde::{Deserialize, Serialize};

use pondops_core::{DomainError, DomainResult};

use crate::phase::{Phase, PhaseSchedule};
use crate::unit::ProductionUnit;

/// Position of a phase relative to the unit's current phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseState {
    Completed,
    Current,
    Upcoming,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseProgress {
    pub phase: Phase,
    pub state: PhaseState,
    /// Display value in `[0, 100]`.
    pub percent: f64,
}

/// Progress report for one unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifecycleProgress {
    pub current_phase: Phase,
    pub cycle_day: u32,
    /// One entry per canonical phase, in order.
    pub phases: Vec<PhaseProgress>,
    /// Current phase progress, capped at 100.
    pub current_percent: f64,
    /// Uncapped current phase progress; `None` for open-ended phases.
    pub raw_percent: Option<f64>,
    /// `cycle_day` is past the nominal duration of the current phase.
    pub overrun: bool,
    pub overrun_days: u32,
    /// Days left before the nominal duration is reached; `None` for open-ended phases.
    pub days_remaining: Option<u32>,
    /// Mean of the per-phase percents.
    pub overall_percent: f64,
}

/// Phase transitions and progress for production units.
///
/// Transitions are pure: every operation returns a new unit and leaves the
/// input untouched.
#[derive(Debug, Clone, Copy)]
pub struct PhaseMachine<'a> {
    schedule: &'a PhaseSchedule,
}

impl<'a> PhaseMachine<'a> {
    pub fn new(schedule: &'a PhaseSchedule) -> Self {
        Self { schedule }
    }

    pub fn schedule(&self) -> &PhaseSchedule {
        self.schedule
    }

    pub fn progress(&self, unit: &ProductionUnit) -> LifecycleProgress {
        let current = unit.current_phase();
        let cycle_day = unit.cycle_day();
        let nominal = self.schedule.nominal_duration(current);

        let raw_percent = nominal.map(|days| f64::from(cycle_day) / f64::from(days) * 100.0);
        let current_percent = raw_percent.map_or(0.0, |p| p.min(100.0));
        let overrun_days = nominal.map_or(0, |days| cycle_day.saturating_sub(days));
        let days_remaining = nominal.map(|days| days.saturating_sub(cycle_day));

        let phases: Vec<PhaseProgress> = Phase::ALL
            .into_iter()
            .map(|phase| {
                let (state, percent) = match phase.cmp(&current) {
                    core::cmp::Ordering::Less => (PhaseState::Completed, 100.0),
                    core::cmp::Ordering::Equal => (PhaseState::Current, current_percent),
                    core::cmp::Ordering::Greater => (PhaseState::Upcoming, 0.0),
                };
                PhaseProgress {
                    phase,
                    state,
                    percent,
                }
            })
            .collect();

        let overall_percent =
            phases.iter().map(|p| p.percent).sum::<f64>() / (phases.len() as f64);

        LifecycleProgress {
            current_phase: current,
            cycle_day,
            phases,
            current_percent,
            raw_percent,
            overrun: overrun_days > 0,
            overrun_days,
            days_remaining,
            overall_percent,
        }
    }

    /// Move to the next phase and restart the day count.
    ///
    /// The last phase has no successor; starting over is `reset`'s job.
    pub fn advance(&self, unit: &ProductionUnit) -> DomainResult<ProductionUnit> {
        let current = unit.current_phase();
        let next = current.next().ok_or_else(|| {
            DomainError::invalid_transition(format!(
                "cannot advance past {current}; reset to start a new cycle"
            ))
        })?;

        Ok(unit.with_position(next, 0, unit.cycle_number()))
    }

    /// Count `days` more days in the current phase. Never changes phase.
    pub fn tick(&self, unit: &ProductionUnit, days: u32) -> ProductionUnit {
        unit.with_position(
            unit.current_phase(),
            unit.cycle_day().saturating_add(days),
            unit.cycle_number(),
        )
    }

    pub fn tick_day(&self, unit: &ProductionUnit) -> ProductionUnit {
        self.tick(unit, 1)
    }

    /// Start a new cycle from the first phase.
    pub fn reset(&self, unit: &ProductionUnit) -> ProductionUnit {
        unit.with_position(Phase::first(), 0, unit.cycle_number().saturating_add(1))
    }
}
