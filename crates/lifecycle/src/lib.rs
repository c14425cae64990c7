//! Pond lifecycle domain module.
//!
//! Tracks a production unit through the canonical phase sequence. Everything
//! here is deterministic domain logic (no IO, no clocks): phase changes happen
//! only through explicit `advance`/`reset` calls, never from elapsed days.

pub mod machine;
pub mod phase;
pub mod unit;

pub use machine::{LifecycleProgress, PhaseMachine, PhaseProgress, PhaseState};
pub use phase::{Phase, PhaseDefinition, PhaseSchedule};
pub use unit::{ProductionUnit, UnitRecord};
