//! Analytics configuration and its JSON persistence.

use crate::portfolio::{RiskLimits, DEFAULT_RISK_FREE_RATE};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable that overrides the config file location.
pub const CONFIG_ENV_VAR: &str = "FOLIO_ANALYTICS_CONFIG";

/// Tunable parameters of the analytics engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Per-period risk-free rate for the Sharpe ratio
    pub risk_free_rate: f64,
    /// Heat cap and tier thresholds
    pub risk_limits: RiskLimits,
    /// Portfolio percentage risked per trade when sizing
    pub default_risk_percent: f64,
    /// Stop distance in percent when sizing
    pub default_stop_loss_percent: f64,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            risk_free_rate: DEFAULT_RISK_FREE_RATE,
            risk_limits: RiskLimits::default(),
            default_risk_percent: 2.0,
            default_stop_loss_percent: 5.0,
        }
    }
}

impl AnalyticsConfig {
    /// Get the default config file path.
    ///
    /// Default path: `~/.folio/analytics.json`
    /// Can be overridden with the `FOLIO_ANALYTICS_CONFIG` environment variable.
    pub fn default_path() -> PathBuf {
        if let Ok(path) = env::var(CONFIG_ENV_VAR) {
            return PathBuf::from(path);
        }

        directories::BaseDirs::new()
            .map(|dirs| dirs.home_dir().join(".folio/analytics.json"))
            .unwrap_or_else(|| PathBuf::from("analytics.json"))
    }

    /// Load the config from the default path, falling back to defaults.
    pub fn load() -> Self {
        let path = Self::default_path();
        match Self::load_from_path(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(
                    "Ignoring config at {}: {}; using defaults",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Load and validate the config at `path`. A missing file yields the defaults.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save the config to `path` as pretty JSON.
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        self.validate()?;

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Check every field is within its domain.
    pub fn validate(&self) -> Result<()> {
        if !self.risk_free_rate.is_finite() {
            return Err(Error::InvalidArgument(format!(
                "risk_free_rate must be finite, got {}",
                self.risk_free_rate
            )));
        }
        for (name, value) in [
            ("default_risk_percent", self.default_risk_percent),
            ("default_stop_loss_percent", self.default_stop_loss_percent),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::InvalidArgument(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }
        self.risk_limits.validate()
    }
}
