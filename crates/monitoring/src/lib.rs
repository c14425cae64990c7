//! Water-quality monitoring: reference ranges and reading classification.
//!
//! Pure, deterministic logic only. Readings are supplied by callers; this crate
//! never fetches or stores them, and it never fails on imperfect input:
//! unknown parameters and non-finite values come back as `Unclassified`.

pub mod classify;
pub mod parameter;
pub mod reference;

pub use classify::{Classification, Classifier, ParameterStatus, Trend, TREND_THRESHOLD_PERCENT};
pub use parameter::{MeasurementSample, ParameterName};
pub use reference::{ReferenceRange, ReferenceTable};
