//! Core data types consumed and produced by the analytics engine.

use crate::portfolio::periodic_returns;
use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Lifecycle state of a position.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PositionStatus {
    Open,
    Closed,
}

/// A portfolio position as supplied by the dashboard API.
///
/// Only the fields the analytics engine reads are modeled. Field names follow
/// the camelCase records the API client deserializes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    /// Ticker symbol (uppercase), informational only
    #[serde(default)]
    pub symbol: String,
    /// Whether the position is still open
    pub status: PositionStatus,
    /// Signed realized (or running) profit and loss
    #[serde(rename = "grossPL", default)]
    pub gross_pl: f64,
    /// Signed unrealized profit and loss, meaningful only while open
    #[serde(rename = "unrealizedPL", default)]
    pub unrealized_pl: f64,
    /// Current market value of the position
    #[serde(default)]
    pub current_value: f64,
    /// When the position was opened
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opened_at: Option<DateTime<Utc>>,
    /// When the position was closed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,
}

impl Position {
    /// Create an open position with its unrealized P&L and current market value.
    pub fn open(symbol: &str, unrealized_pl: f64, current_value: f64) -> Self {
        Self {
            symbol: symbol.to_uppercase(),
            status: PositionStatus::Open,
            gross_pl: unrealized_pl,
            unrealized_pl,
            current_value,
            opened_at: None,
            closed_at: None,
        }
    }

    /// Create a closed position with its realized P&L.
    pub fn closed(symbol: &str, gross_pl: f64) -> Self {
        Self {
            symbol: symbol.to_uppercase(),
            status: PositionStatus::Closed,
            gross_pl,
            unrealized_pl: 0.0,
            current_value: 0.0,
            opened_at: None,
            closed_at: None,
        }
    }

    /// Attach open and close timestamps.
    pub fn with_hold_period(mut self, opened_at: DateTime<Utc>, closed_at: DateTime<Utc>) -> Self {
        self.opened_at = Some(opened_at);
        self.closed_at = Some(closed_at);
        self
    }

    /// Whether the position is still open.
    pub fn is_open(&self) -> bool {
        self.status == PositionStatus::Open
    }

    /// Whether the position has been closed.
    pub fn is_closed(&self) -> bool {
        self.status == PositionStatus::Closed
    }
}

/// Everything the data layer hands to the engine for one dashboard render.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PortfolioSnapshot {
    /// Open and closed positions
    #[serde(default)]
    pub positions: Vec<Position>,
    /// Portfolio values over time, oldest first
    #[serde(default)]
    pub values: Vec<f64>,
    /// Periodic fractional returns, oldest first
    #[serde(default)]
    pub returns: Vec<f64>,
}

impl PortfolioSnapshot {
    /// Load a snapshot from a JSON file.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// The supplied returns, or returns derived from the value series when none were given.
    pub fn returns_or_derived(&self) -> Result<Vec<f64>> {
        if !self.returns.is_empty() {
            return Ok(self.returns.clone());
        }
        periodic_returns(&self.values)
    }
}

/// API response wrapper used for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Create a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    /// Create an error response.
    pub fn err(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(error.into()),
        }
    }
}
