//! Process-wide configuration: phase schedule, reference ranges, trend and
//! risk tuning.
//!
//! Built once at start-up and passed by reference into every component call.
//! Search order for [`CoreConfig::load`]:
//! 1. `$PONDOPS_CONFIG`
//! 2. `./pondops.toml`
//! 3. Built-in defaults

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use pondops_accounting::RiskThresholds;
use pondops_lifecycle::{PhaseMachine, PhaseSchedule};
use pondops_monitoring::{Classifier, ReferenceTable, TREND_THRESHOLD_PERCENT};

pub const CONFIG_ENV_VAR: &str = "PONDOPS_CONFIG";
pub const LOCAL_CONFIG_FILE: &str = "pondops.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O error ({}): {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config parse error ({origin}): {source}")]
    Parse {
        origin: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("config serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("config validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),
}

/// Trend detection tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendConfig {
    pub threshold_percent: f64,
    /// Number of trailing history samples considered; absent means all.
    pub window: Option<usize>,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            threshold_percent: TREND_THRESHOLD_PERCENT,
            window: None,
        }
    }
}

/// Immutable configuration shared by the classifier, the phase machine and
/// the risk rules.
///
/// Any section missing from a file keeps its default. A `reference_ranges`
/// section, when present, replaces the whole default table.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub phases: PhaseSchedule,
    pub reference_ranges: ReferenceTable,
    pub trend: TrendConfig,
    pub risk: RiskThresholds,
}

impl CoreConfig {
    /// Load using the standard search order. Never fails: unreadable or
    /// invalid files are logged and skipped.
    pub fn load() -> Self {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "loaded config from {CONFIG_ENV_VAR}");
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "failed to load config from {CONFIG_ENV_VAR}, falling back");
                    }
                }
            } else {
                warn!(path = %path, "{CONFIG_ENV_VAR} points to a missing file, falling back");
            }
        }

        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!("loaded config from ./{LOCAL_CONFIG_FILE}");
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "failed to load ./{LOCAL_CONFIG_FILE}, using defaults");
                }
            }
        }

        info!("no {LOCAL_CONFIG_FILE} found, using built-in defaults");
        Self::default()
    }

    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents, path.display().to_string())
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Self::parse(contents, "inline".to_string())
    }

    fn parse(contents: &str, origin: String) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(contents).map_err(|source| ConfigError::Parse { origin, source })?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Collect every problem rather than stopping at the first.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if let Err(e) = PhaseSchedule::new(self.phases.definitions().to_vec()) {
            errors.push(format!("phases: {e}"));
        }

        for (name, range) in self.reference_ranges.iter() {
            if let Err(e) = range.validate() {
                errors.push(format!("reference_ranges.{name}: {e}"));
            }
        }

        if !(self.trend.threshold_percent.is_finite() && self.trend.threshold_percent >= 0.0) {
            errors.push(format!(
                "trend.threshold_percent must be a finite non-negative number, got {}",
                self.trend.threshold_percent
            ));
        }
        if self.trend.window == Some(0) {
            errors.push("trend.window must be at least 1 when set".to_string());
        }

        let risk = &self.risk;
        for (key, value) in [
            ("low_margin_percent", risk.low_margin_percent),
            ("moderate_margin_percent", risk.moderate_margin_percent),
            ("low_roi_percent", risk.low_roi_percent),
        ] {
            if !value.is_finite() {
                errors.push(format!("risk.{key} must be finite"));
            }
        }
        if risk.low_margin_percent > risk.moderate_margin_percent {
            errors.push(format!(
                "risk.low_margin_percent ({}) exceeds risk.moderate_margin_percent ({})",
                risk.low_margin_percent, risk.moderate_margin_percent
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    pub fn phase_schedule(&self) -> &PhaseSchedule {
        &self.phases
    }

    pub fn reference_table(&self) -> &ReferenceTable {
        &self.reference_ranges
    }

    pub fn risk_thresholds(&self) -> &RiskThresholds {
        &self.risk
    }

    pub fn phase_machine(&self) -> PhaseMachine<'_> {
        PhaseMachine::new(&self.phases)
    }

    pub fn classifier(&self) -> Classifier<'_> {
        let classifier =
            Classifier::new(&self.reference_ranges).with_threshold_percent(self.trend.threshold_percent);
        match self.trend.window {
            Some(window) => classifier.with_window(window),
            None => classifier,
        }
    }
}
