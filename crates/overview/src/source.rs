//! Collaborator boundaries: where ledger entries and measurements come from,
//! and where alerts go.
//!
//! Hosts implement these against their own storage; the in-memory versions
//! here serve tests and embedded use.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use thiserror::Error;

use pondops_accounting::LedgerEntry;
use pondops_core::{LedgerLinkId, PondId};
use pondops_monitoring::{MeasurementSample, ParameterName};

use crate::alert::Alert;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("source unavailable: {0}")]
    Unavailable(String),
}

impl SourceError {
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }
}

pub type SourceResult<T> = Result<T, SourceError>;

/// Supplies ledger entries by link key.
pub trait LedgerSource: Send + Sync {
    /// Entries carrying `link`. An unknown link is an empty ledger, not an error.
    fn entries_for(&self, link: &LedgerLinkId) -> SourceResult<Vec<LedgerEntry>>;
}

/// Supplies measurement samples for a pond.
pub trait MeasurementSource: Send + Sync {
    /// Most recent sample of each parameter measured for the pond.
    fn latest(&self, pond_id: PondId) -> SourceResult<Vec<MeasurementSample>>;

    /// All samples of one parameter for the pond, oldest first.
    fn history(&self, pond_id: PondId, parameter: &ParameterName) -> SourceResult<Vec<MeasurementSample>>;
}

/// Receives alerts for delivery.
pub trait AlertSink: Send + Sync {
    fn publish(&self, alert: &Alert) -> SourceResult<()>;
}

impl<S> LedgerSource for Arc<S>
where
    S: LedgerSource + ?Sized,
{
    fn entries_for(&self, link: &LedgerLinkId) -> SourceResult<Vec<LedgerEntry>> {
        (**self).entries_for(link)
    }
}

impl<S> MeasurementSource for Arc<S>
where
    S: MeasurementSource + ?Sized,
{
    fn latest(&self, pond_id: PondId) -> SourceResult<Vec<MeasurementSample>> {
        (**self).latest(pond_id)
    }

    fn history(&self, pond_id: PondId, parameter: &ParameterName) -> SourceResult<Vec<MeasurementSample>> {
        (**self).history(pond_id, parameter)
    }
}

impl<S> AlertSink for Arc<S>
where
    S: AlertSink + ?Sized,
{
    fn publish(&self, alert: &Alert) -> SourceResult<()> {
        (**self).publish(alert)
    }
}

/// In-memory ledger shared by every unit; entries are filtered by link.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    entries: RwLock<Vec<LedgerEntry>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, entry: LedgerEntry) -> SourceResult<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| SourceError::unavailable("ledger lock poisoned"))?;
        entries.push(entry);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FromIterator<LedgerEntry> for InMemoryLedger {
    fn from_iter<T: IntoIterator<Item = LedgerEntry>>(iter: T) -> Self {
        Self {
            entries: RwLock::new(iter.into_iter().collect()),
        }
    }
}

impl LedgerSource for InMemoryLedger {
    fn entries_for(&self, link: &LedgerLinkId) -> SourceResult<Vec<LedgerEntry>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| SourceError::unavailable("ledger lock poisoned"))?;
        Ok(entries.iter().filter(|e| &e.link == link).cloned().collect())
    }
}

/// In-memory measurement log keyed by pond.
#[derive(Debug, Default)]
pub struct InMemoryMeasurements {
    samples: RwLock<HashMap<PondId, Vec<MeasurementSample>>>,
}

impl InMemoryMeasurements {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, sample: MeasurementSample) -> SourceResult<()> {
        let mut samples = self
            .samples
            .write()
            .map_err(|_| SourceError::unavailable("measurement lock poisoned"))?;
        samples.entry(sample.pond_id).or_default().push(sample);
        Ok(())
    }
}

impl FromIterator<MeasurementSample> for InMemoryMeasurements {
    fn from_iter<T: IntoIterator<Item = MeasurementSample>>(iter: T) -> Self {
        let mut samples: HashMap<PondId, Vec<MeasurementSample>> = HashMap::new();
        for sample in iter {
            samples.entry(sample.pond_id).or_default().push(sample);
        }
        Self {
            samples: RwLock::new(samples),
        }
    }
}

impl MeasurementSource for InMemoryMeasurements {
    fn latest(&self, pond_id: PondId) -> SourceResult<Vec<MeasurementSample>> {
        let samples = self
            .samples
            .read()
            .map_err(|_| SourceError::unavailable("measurement lock poisoned"))?;

        let mut latest: HashMap<&ParameterName, &MeasurementSample> = HashMap::new();
        for sample in samples.get(&pond_id).into_iter().flatten() {
            latest
                .entry(&sample.parameter)
                .and_modify(|current| {
                    if sample.taken_at >= current.taken_at {
                        *current = sample;
                    }
                })
                .or_insert(sample);
        }

        let mut out: Vec<MeasurementSample> = latest.into_values().cloned().collect();
        out.sort_by(|a, b| a.parameter.cmp(&b.parameter));
        Ok(out)
    }

    fn history(&self, pond_id: PondId, parameter: &ParameterName) -> SourceResult<Vec<MeasurementSample>> {
        let samples = self
            .samples
            .read()
            .map_err(|_| SourceError::unavailable("measurement lock poisoned"))?;

        let mut out: Vec<MeasurementSample> = samples
            .get(&pond_id)
            .into_iter()
            .flatten()
            .filter(|s| &s.parameter == parameter)
            .cloned()
            .collect();
        out.sort_by(|a, b| a.taken_at.cmp(&b.taken_at));
        Ok(out)
    }
}

/// Sink that keeps every published alert, in publish order.
#[derive(Debug, Default)]
pub struct RecordingAlertSink {
    published: Mutex<Vec<Alert>>,
}

impl RecordingAlertSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alerts(&self) -> Vec<Alert> {
        self.published.lock().map(|a| a.clone()).unwrap_or_default()
    }
}

impl AlertSink for RecordingAlertSink {
    fn publish(&self, alert: &Alert) -> SourceResult<()> {
        let mut published = self
            .published
            .lock()
            .map_err(|_| SourceError::unavailable("alert sink lock poisoned"))?;
        published.push(alert.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use pondops_accounting::ExpenseCategory;

    #[test]
    fn ledger_filters_by_link() {
        let a = LedgerLinkId::new("pond-a").unwrap();
        let b = LedgerLinkId::new("pond-b").unwrap();
        let ledger: InMemoryLedger = [
            LedgerEntry::income(a.clone(), 500, "2024-01-10"),
            LedgerEntry::expense(b.clone(), 100, Some(ExpenseCategory::Feed), "2024-01-05"),
            LedgerEntry::expense(a.clone(), 50, None, "2024-02-01"),
        ]
        .into_iter()
        .collect();

        assert_eq!(ledger.len(), 3);
        assert_eq!(ledger.entries_for(&a).unwrap().len(), 2);
        assert_eq!(ledger.entries_for(&b).unwrap().len(), 1);
        assert!(ledger.entries_for(&LedgerLinkId::new("pond-c").unwrap()).unwrap().is_empty());
    }

    #[test]
    fn latest_picks_newest_sample_per_parameter() {
        let pond = PondId::new();
        let t0 = Utc.with_ymd_and_hms(2024, 3, 1, 6, 0, 0).unwrap();
        let store = InMemoryMeasurements::new();
        store.record(MeasurementSample::new(pond, "ph", 8.4, t0 + Duration::hours(12))).unwrap();
        store.record(MeasurementSample::new(pond, "ph", 8.0, t0)).unwrap();
        store.record(MeasurementSample::new(pond, "ammonia", 0.2, t0)).unwrap();
        store.record(MeasurementSample::new(PondId::new(), "ph", 6.0, t0 + Duration::days(1))).unwrap();

        let latest = store.latest(pond).unwrap();
        assert_eq!(latest.len(), 2);
        assert_eq!(latest[0].parameter.as_str(), "ammonia");
        assert_eq!(latest[1].parameter.as_str(), "ph");
        assert_eq!(latest[1].value, 8.4);
    }

    #[test]
    fn history_is_oldest_first() {
        let pond = PondId::new();
        let t0 = Utc.with_ymd_and_hms(2024, 3, 1, 6, 0, 0).unwrap();
        let store: InMemoryMeasurements = [2i32, 0, 1]
            .into_iter()
            .map(|d| {
                MeasurementSample::new(pond, "ph", 8.0 + f64::from(d) / 10.0, t0 + Duration::days(i64::from(d)))
            })
            .collect();

        let history = store.history(pond, &ParameterName::new("ph")).unwrap();
        let days: Vec<_> = history.iter().map(|s| (s.taken_at - t0).num_days()).collect();
        assert_eq!(days, vec![0, 1, 2]);
        assert!(store.history(pond, &ParameterName::new("salinity")).unwrap().is_empty());
    }

    #[test]
    fn unknown_pond_has_no_measurements() {
        let store = InMemoryMeasurements::new();
        assert!(store.latest(PondId::new()).unwrap().is_empty());
    }
}
