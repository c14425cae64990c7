use serde::{Deserialize, Serialize};

use pondops_core::{DomainError, DomainResult, ValueObject};

/// Canonical operating phases, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Planning,
    Setup,
    Stocking,
    Operation,
    Harvest,
    Analysis,
}

impl Phase {
    pub const ALL: [Phase; 6] = [
        Phase::Planning,
        Phase::Setup,
        Phase::Stocking,
        Phase::Operation,
        Phase::Harvest,
        Phase::Analysis,
    ];

    pub fn first() -> Phase {
        Phase::ALL[0]
    }

    pub fn last() -> Phase {
        Phase::ALL[Phase::ALL.len() - 1]
    }

    /// Position in the canonical sequence.
    pub fn index(self) -> usize {
        self as usize
    }

    /// The following phase, or `None` for the last one.
    pub fn next(self) -> Option<Phase> {
        Phase::ALL.get(self.index() + 1).copied()
    }

    pub fn is_last(self) -> bool {
        self.next().is_none()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Planning => "planning",
            Phase::Setup => "setup",
            Phase::Stocking => "stocking",
            Phase::Operation => "operation",
            Phase::Harvest => "harvest",
            Phase::Analysis => "analysis",
        }
    }
}

impl core::fmt::Display for Phase {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static definition of one phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseDefinition {
    pub phase: Phase,
    /// Expected length in days; `None` means open-ended.
    #[serde(default)]
    pub nominal_duration_days: Option<u32>,
}

impl ValueObject for PhaseDefinition {}

impl PhaseDefinition {
    pub fn new(phase: Phase, nominal_duration_days: Option<u32>) -> Self {
        Self {
            phase,
            nominal_duration_days,
        }
    }
}

/// Ordered phase definitions: exactly one per canonical phase, in canonical order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<PhaseDefinition>", into = "Vec<PhaseDefinition>")]
pub struct PhaseSchedule {
    definitions: Vec<PhaseDefinition>,
}

impl PhaseSchedule {
    pub fn new(definitions: Vec<PhaseDefinition>) -> DomainResult<Self> {
        if definitions.len() != Phase::ALL.len() {
            return Err(DomainError::validation(format!(
                "phase schedule must define {} phases, got {}",
                Phase::ALL.len(),
                definitions.len()
            )));
        }

        for (def, expected) in definitions.iter().zip(Phase::ALL) {
            if def.phase != expected {
                return Err(DomainError::validation(format!(
                    "phase schedule out of order: expected {expected}, found {}",
                    def.phase
                )));
            }
            if def.nominal_duration_days == Some(0) {
                return Err(DomainError::validation(format!(
                    "nominal duration of {expected} must be positive"
                )));
            }
        }

        Ok(Self { definitions })
    }

    pub fn definitions(&self) -> &[PhaseDefinition] {
        &self.definitions
    }

    pub fn nominal_duration(&self, phase: Phase) -> Option<u32> {
        self.definitions[phase.index()].nominal_duration_days
    }
}

impl Default for PhaseSchedule {
    fn default() -> Self {
        let durations = [7, 14, 7, 90, 7, 7];
        Self {
            definitions: Phase::ALL
                .into_iter()
                .zip(durations)
                .map(|(phase, days)| PhaseDefinition::new(phase, Some(days)))
                .collect(),
        }
    }
}

impl TryFrom<Vec<PhaseDefinition>> for PhaseSchedule {
    type Error = DomainError;

    fn try_from(value: Vec<PhaseDefinition>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PhaseSchedule> for Vec<PhaseDefinition> {
    fn from(value: PhaseSchedule) -> Self {
        value.definitions
    }
}
