//! Per-unit overviews: lifecycle progress, water quality, finance and the
//! alerts they imply, behind collaborator traits the host implements.

pub mod alert;
pub mod config;
pub mod overview;
pub mod source;

pub use alert::{derive_alerts, dispatch, prioritize, Alert, AlertKind, AlertPriority};
pub use config::{ConfigError, CoreConfig, TrendConfig};
pub use overview::{Overviewer, ParameterReading, UnitOverview};
pub use source::{
    AlertSink, InMemoryLedger, InMemoryMeasurements, LedgerSource, MeasurementSource,
    RecordingAlertSink, SourceError, SourceResult,
};
