//! Folio Analytics - Portfolio risk and performance analytics engine.
//!
//! This crate turns already-fetched portfolio data into display-ready metrics:
//!
//! - **Performance metrics**: Sharpe ratio, max drawdown, volatility, win rate, average hold time
//! - **Risk metrics**: position sizing, portfolio heat, risk level classification
//! - **Statistics**: mean, population variance and standard deviation, periodic returns
//!
//! Every calculation is a pure function of its inputs. Degenerate input never
//! produces `NaN` or `Infinity`; it produces a typed [`Error`] instead.
//!
//! # Example
//!
//! ```rust
//! use folio_analytics::portfolio::{classify_risk_level, max_drawdown, portfolio_heat};
//! use folio_analytics::{Position, RiskLevel};
//!
//! let drawdown = max_drawdown(&[100.0, 80.0, 120.0, 60.0]).unwrap();
//! assert_eq!(drawdown, 0.5);
//!
//! let positions = vec![
//!     Position::open("AAPL", -300.0, 10_000.0),
//!     Position::closed("MSFT", 250.0),
//! ];
//! let heat = portfolio_heat(&positions);
//! assert_eq!(classify_risk_level(heat), RiskLevel::Low);
//! ```

pub mod config;
pub mod portfolio;
pub mod types;

// Re-export commonly used types
pub use config::AnalyticsConfig;
pub use types::{ApiResponse, PortfolioSnapshot, Position, PositionStatus};

// Re-export main functionality
pub use portfolio::{
    average_hold_time, classify_risk_level, max_drawdown, portfolio_heat, position_size,
    sharpe_ratio, sharpe_ratio_default, try_position_size, volatility, win_rate, Metrics,
    RiskAssessment, RiskLevel, RiskLimits, DEFAULT_RISK_FREE_RATE,
};

/// Error types for folio-analytics operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Division by zero: {0}")]
    DivisionByZero(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for folio-analytics operations.
pub type Result<T> = std::result::Result<T, Error>;
