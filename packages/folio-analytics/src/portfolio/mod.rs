//! Portfolio analytics module.
//!
//! Provides shared statistics, performance metrics, and risk metrics.

mod performance;
mod risk;
mod stats;

pub use performance::{
    average_hold_time, max_drawdown, sharpe_ratio, sharpe_ratio_default, volatility, win_rate,
    Metrics, DEFAULT_RISK_FREE_RATE,
};
pub use risk::{
    classify_risk_level, portfolio_heat, position_size, try_position_size, RiskAssessment,
    RiskLevel, RiskLimits, HIGH_RISK_THRESHOLD, MAX_POSITION_RISK, MEDIUM_RISK_THRESHOLD,
};
pub use stats::{mean, periodic_returns, population_std_dev, population_variance};
