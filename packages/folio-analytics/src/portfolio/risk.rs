//! Portfolio risk metrics calculation.
//!
//! Provides position sizing, portfolio heat, and risk level classification.

use crate::types::Position;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Ceiling on a single open position's contribution to portfolio heat.
pub const MAX_POSITION_RISK: f64 = 10.0;

/// Heat at which the portfolio becomes `Medium` risk.
pub const MEDIUM_RISK_THRESHOLD: f64 = 5.0;

/// Heat at which the portfolio becomes `High` risk.
pub const HIGH_RISK_THRESHOLD: f64 = 15.0;

/// Three-tier classification of portfolio heat.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        }
    }

    /// Display color for dashboards.
    pub fn color(&self) -> &'static str {
        match self {
            RiskLevel::Low => "green",
            RiskLevel::Medium => "yellow",
            RiskLevel::High => "red",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Caps and tier boundaries used by the heat calculation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RiskLimits {
    /// Maximum risk (in percent) a single open position can contribute
    pub max_position_risk: f64,
    /// Lower bound (inclusive) of the `Medium` tier
    pub medium_threshold: f64,
    /// Lower bound (inclusive) of the `High` tier
    pub high_threshold: f64,
}

impl Default for RiskLimits {
    fn default() -> Self {
        Self {
            max_position_risk: MAX_POSITION_RISK,
            medium_threshold: MEDIUM_RISK_THRESHOLD,
            high_threshold: HIGH_RISK_THRESHOLD,
        }
    }
}

impl RiskLimits {
    /// Check that the cap is positive and the tier thresholds are ordered.
    pub fn validate(&self) -> Result<()> {
        let all_finite = [
            self.max_position_risk,
            self.medium_threshold,
            self.high_threshold,
        ]
        .iter()
        .all(|x| x.is_finite());

        if !all_finite {
            return Err(Error::InvalidArgument(
                "risk limits must be finite numbers".to_string(),
            ));
        }
        if self.max_position_risk <= 0.0 {
            return Err(Error::InvalidArgument(format!(
                "max_position_risk must be positive, got {}",
                self.max_position_risk
            )));
        }
        if self.medium_threshold <= 0.0 || self.medium_threshold >= self.high_threshold {
            return Err(Error::InvalidArgument(format!(
                "thresholds must satisfy 0 < medium ({}) < high ({})",
                self.medium_threshold, self.high_threshold
            )));
        }
        Ok(())
    }

    /// Risk contributed by one position, in percent of its value, capped.
    ///
    /// Closed positions contribute nothing. A zero current value contributes the cap.
    /// The result is never negative, even for limits that fail [`RiskLimits::validate`].
    pub fn position_risk(&self, position: &Position) -> f64 {
        if !position.is_open() {
            return 0.0;
        }

        // NaN or negative caps collapse to 0
        let cap = self.max_position_risk.max(0.0);
        let ratio = (position.unrealized_pl / position.current_value).abs() * 100.0;
        if ratio.is_finite() {
            ratio.clamp(0.0, cap)
        } else {
            cap
        }
    }

    /// Sum of capped per-position risk over all open positions.
    pub fn heat(&self, positions: &[Position]) -> f64 {
        positions.iter().map(|p| self.position_risk(p)).sum()
    }

    /// Map heat to a risk tier. Lower bounds are inclusive.
    pub fn classify(&self, heat: f64) -> RiskLevel {
        if heat < self.medium_threshold {
            RiskLevel::Low
        } else if heat < self.high_threshold {
            RiskLevel::Medium
        } else {
            // Also catches NaN
            RiskLevel::High
        }
    }
}

/// Aggregate heat of a portfolio and its risk tier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RiskAssessment {
    pub heat: f64,
    pub level: RiskLevel,
}

impl RiskAssessment {
    /// Assess the open positions of a portfolio against the given limits.
    pub fn assess(positions: &[Position], limits: &RiskLimits) -> Self {
        let heat = limits.heat(positions);
        let level = limits.classify(heat);
        tracing::trace!("Portfolio heat {:.2} classified as {}", heat, level);

        Self { heat, level }
    }
}

/// Calculate the notional position size that risks `risk_percent` of the
/// portfolio when a `stop_loss_percent` stop is hit.
///
/// # Arguments
///
/// * `portfolio_value` - Total portfolio value in dollars
/// * `risk_percent` - Portfolio percentage to risk (e.g., 2.0 for 2%)
/// * `stop_loss_percent` - Stop distance from entry (e.g., 5.0 for 5%)
///
/// # Returns
///
/// The position size in dollars, or 0 when any input is zero, negative, or not finite.
pub fn position_size(portfolio_value: f64, risk_percent: f64, stop_loss_percent: f64) -> f64 {
    try_position_size(portfolio_value, risk_percent, stop_loss_percent).unwrap_or(0.0)
}

/// Strict variant of [`position_size`] that reports which input was rejected.
pub fn try_position_size(
    portfolio_value: f64,
    risk_percent: f64,
    stop_loss_percent: f64,
) -> Result<f64> {
    for (name, value) in [
        ("portfolio_value", portfolio_value),
        ("risk_percent", risk_percent),
        ("stop_loss_percent", stop_loss_percent),
    ] {
        if !value.is_finite() || value <= 0.0 {
            return Err(Error::InvalidArgument(format!(
                "{} must be a positive number, got {}",
                name, value
            )));
        }
    }

    let size = portfolio_value * (risk_percent / 100.0) / (stop_loss_percent / 100.0);
    if !size.is_finite() {
        return Err(Error::InvalidArgument(format!(
            "position size overflowed to {}",
            size
        )));
    }
    Ok(size)
}

/// Calculate portfolio heat with the default limits.
pub fn portfolio_heat(positions: &[Position]) -> f64 {
    RiskLimits::default().heat(positions)
}

/// Classify heat with the default thresholds.
pub fn classify_risk_level(heat: f64) -> RiskLevel {
    RiskLimits::default().classify(heat)
}
