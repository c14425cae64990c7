use serde::{Deserialize, Serialize};

use pondops_core::{DomainError, DomainResult, Entity, LedgerLinkId, PondId};

use crate::phase::Phase;

/// A managed pond.
///
/// Transactions and samples point at a unit (via `linked_ledger_id` and the
/// pond id); the unit never holds them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "UnitRecord", into = "UnitRecord")]
pub struct ProductionUnit {
    id: PondId,
    name: String,
    area_hectares: f64,
    species: String,
    current_phase: Phase,
    cycle_day: u32,
    cycle_number: u32,
    linked_ledger_id: Option<LedgerLinkId>,
    retired: bool,
}

impl ProductionUnit {
    /// Provision a new unit at the start of its first cycle.
    pub fn new(
        id: PondId,
        name: impl Into<String>,
        area_hectares: f64,
        species: impl Into<String>,
    ) -> DomainResult<Self> {
        let name = name.into();
        validate_name(&name)?;
        validate_area(area_hectares)?;

        Ok(Self {
            id,
            name,
            area_hectares,
            species: species.into(),
            current_phase: Phase::first(),
            cycle_day: 0,
            cycle_number: 1,
            linked_ledger_id: None,
            retired: false,
        })
    }

    pub fn with_ledger_link(mut self, link: LedgerLinkId) -> Self {
        self.linked_ledger_id = Some(link);
        self
    }

    /// Soft-delete: the unit stays addressable so its financial history does too.
    pub fn retire(&self) -> Self {
        Self {
            retired: true,
            ..self.clone()
        }
    }

    pub fn id_typed(&self) -> PondId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn area_hectares(&self) -> f64 {
        self.area_hectares
    }

    pub fn species(&self) -> &str {
        &self.species
    }

    pub fn current_phase(&self) -> Phase {
        self.current_phase
    }

    pub fn cycle_day(&self) -> u32 {
        self.cycle_day
    }

    pub fn cycle_number(&self) -> u32 {
        self.cycle_number
    }

    pub fn linked_ledger_id(&self) -> Option<&LedgerLinkId> {
        self.linked_ledger_id.as_ref()
    }

    pub fn is_linked(&self) -> bool {
        self.linked_ledger_id.is_some()
    }

    pub fn is_retired(&self) -> bool {
        self.retired
    }

    pub(crate) fn with_position(&self, phase: Phase, cycle_day: u32, cycle_number: u32) -> Self {
        Self {
            current_phase: phase,
            cycle_day,
            cycle_number,
            ..self.clone()
        }
    }
}

impl Entity for ProductionUnit {
    type Id = PondId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Flat, storage-shaped view of a unit.
///
/// This is how a host rehydrates a unit it persisted earlier; converting back
/// into a `ProductionUnit` re-checks the invariants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitRecord {
    pub id: PondId,
    pub name: String,
    pub area_hectares: f64,
    pub species: String,
    pub current_phase: Phase,
    pub cycle_day: u32,
    #[serde(default = "first_cycle")]
    pub cycle_number: u32,
    #[serde(default)]
    pub linked_ledger_id: Option<LedgerLinkId>,
    #[serde(default)]
    pub retired: bool,
}

fn first_cycle() -> u32 {
    1
}

impl TryFrom<UnitRecord> for ProductionUnit {
    type Error = DomainError;

    fn try_from(r: UnitRecord) -> Result<Self, Self::Error> {
        validate_name(&r.name)?;
        validate_area(r.area_hectares)?;
        if r.cycle_number == 0 {
            return Err(DomainError::validation("cycle_number starts at 1"));
        }

        Ok(Self {
            id: r.id,
            name: r.name,
            area_hectares: r.area_hectares,
            species: r.species,
            current_phase: r.current_phase,
            cycle_day: r.cycle_day,
            cycle_number: r.cycle_number,
            linked_ledger_id: r.linked_ledger_id,
            retired: r.retired,
        })
    }
}

impl From<ProductionUnit> for UnitRecord {
    fn from(u: ProductionUnit) -> Self {
        Self {
            id: u.id,
            name: u.name,
            area_hectares: u.area_hectares,
            species: u.species,
            current_phase: u.current_phase,
            cycle_day: u.cycle_day,
            cycle_number: u.cycle_number,
            linked_ledger_id: u.linked_ledger_id,
            retired: u.retired,
        }
    }
}

fn validate_name(name: &str) -> DomainResult<()> {
    if name.trim().is_empty() {
        return Err(DomainError::validation("unit name cannot be empty"));
    }
    Ok(())
}

fn validate_area(area_hectares: f64) -> DomainResult<()> {
    if !(area_hectares.is_finite() && area_hectares > 0.0) {
        return Err(DomainError::validation("area must be a finite positive number of hectares"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_unit() -> ProductionUnit {
        ProductionUnit::new(PondId::new(), "North 1", 0.5, "L. vannamei").unwrap()
    }

    #[test]
    fn new_unit_starts_unlinked_in_first_phase() {
        let unit = test_unit();
        assert_eq!(unit.current_phase(), Phase::Planning);
        assert_eq!(unit.cycle_day(), 0);
        assert_eq!(unit.cycle_number(), 1);
        assert!(!unit.is_linked());
        assert!(!unit.is_retired());
    }

    #[test]
    fn new_unit_rejects_bad_area_and_name() {
        for area in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = ProductionUnit::new(PondId::new(), "p", area, "s").unwrap_err();
            assert!(matches!(err, DomainError::Validation(msg) if msg.contains("area")));
        }
        let err = ProductionUnit::new(PondId::new(), "  ", 1.0, "s").unwrap_err();
        assert!(matches!(err, DomainError::Validation(msg) if msg.contains("name")));
    }

    #[test]
    fn retire_keeps_everything_else() {
        let unit = test_unit().with_ledger_link(LedgerLinkId::new("pond-north-1").unwrap());
        let retired = unit.retire();
        assert!(retired.is_retired());
        assert_eq!(retired.id_typed(), unit.id_typed());
        assert_eq!(retired.linked_ledger_id(), unit.linked_ledger_id());
        assert!(!unit.is_retired());
    }

    #[test]
    fn record_round_trip_preserves_position() {
        let unit = test_unit().with_position(Phase::Operation, 95, 3);
        let record = UnitRecord::from(unit.clone());
        let back = ProductionUnit::try_from(record).unwrap();
        assert_eq!(back, unit);
    }

    #[test]
    fn record_defaults_apply_when_deserializing() {
        let id = PondId::new();
        let json = format!(
            r#"{{"id":"{id}","name":"South","area_hectares":1.2,"species":"P. monodon","current_phase":"stocking","cycle_day":3}}"#
        );
        let unit: ProductionUnit = serde_json::from_str(&json).unwrap();
        assert_eq!(unit.current_phase(), Phase::Stocking);
        assert_eq!(unit.cycle_number(), 1);
        assert!(!unit.is_linked());
    }

    #[test]
    fn record_with_invalid_area_is_rejected() {
        let record = UnitRecord {
            area_hectares: -2.0,
            ..UnitRecord::from(test_unit())
        };
        assert!(ProductionUnit::try_from(record).is_err());
    }
}
