//! Portfolio performance analytics.
//!
//! Provides Sharpe ratio, max drawdown, volatility, win rate, and average hold time.

use super::stats::{is_zero_spread, mean, population_std_dev};
use crate::types::{PortfolioSnapshot, Position};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Risk-free rate used when the caller does not supply one.
///
/// Expressed per period, in the same units as the return series.
pub const DEFAULT_RISK_FREE_RATE: f64 = 0.02;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Performance metrics for a portfolio.
///
/// Each field is computed independently. A field is `None` when its input was
/// missing or degenerate; the dashboard renders those as "N/A".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    /// Mean excess return over the population standard deviation of excess returns
    pub sharpe_ratio: Option<f64>,
    /// Largest peak-to-trough decline as a fraction of the peak
    pub max_drawdown: Option<f64>,
    /// Population standard deviation of periodic returns
    pub volatility: Option<f64>,
    /// Percentage of closed positions with positive P&L
    pub win_rate: f64,
    /// Mean days between open and close of closed positions
    pub average_hold_time: Option<f64>,
}

impl Metrics {
    /// Calculate every metric from a portfolio snapshot.
    ///
    /// Returns are taken from the snapshot, or derived from its value series
    /// when none were supplied.
    pub fn calculate(snapshot: &PortfolioSnapshot, risk_free_rate: f64) -> Self {
        let (sharpe, vol) = match snapshot.returns_or_derived() {
            Ok(returns) => (
                skip_on_error("sharpe_ratio", sharpe_ratio(&returns, risk_free_rate)),
                skip_on_error("volatility", volatility(&returns)),
            ),
            Err(e) => {
                tracing::debug!("Skipping sharpe_ratio and volatility: {}", e);
                (None, None)
            }
        };

        Self {
            sharpe_ratio: sharpe,
            max_drawdown: skip_on_error("max_drawdown", max_drawdown(&snapshot.values)),
            volatility: vol,
            win_rate: win_rate(&snapshot.positions),
            average_hold_time: skip_on_error(
                "average_hold_time",
                average_hold_time(&snapshot.positions),
            ),
        }
    }
}

fn skip_on_error(metric: &str, result: Result<f64>) -> Option<f64> {
    match result {
        Ok(value) => {
            tracing::trace!("{} = {}", metric, value);
            Some(value)
        }
        Err(e) => {
            tracing::debug!("Skipping {}: {}", metric, e);
            None
        }
    }
}

/// Calculate the Sharpe ratio of a return series.
///
/// # Arguments
///
/// * `returns` - Periodic returns (e.g., 0.01 for 1%)
/// * `risk_free_rate` - Risk-free rate for the same period as `returns`
///
/// # Errors
///
/// * `InsufficientData` if `returns` is empty
/// * `DivisionByZero` if the excess returns have zero standard deviation
///   (within floating-point rounding of their mean)
/// * `InvalidArgument` if any input is not finite or the result overflows
pub fn sharpe_ratio(returns: &[f64], risk_free_rate: f64) -> Result<f64> {
    if returns.is_empty() {
        return Err(Error::InsufficientData(
            "Sharpe ratio needs at least 1 return".to_string(),
        ));
    }
    if !risk_free_rate.is_finite() {
        return Err(Error::InvalidArgument(format!(
            "risk-free rate must be finite, got {}",
            risk_free_rate
        )));
    }

    let excess: Vec<f64> = returns.iter().map(|r| r - risk_free_rate).collect();
    let avg_excess = mean(&excess)?;
    let std_dev = population_std_dev(&excess)?;

    if is_zero_spread(std_dev, avg_excess) {
        return Err(Error::DivisionByZero(
            "Sharpe ratio is undefined for returns with zero volatility".to_string(),
        ));
    }

    let ratio = avg_excess / std_dev;
    if !ratio.is_finite() {
        return Err(Error::InvalidArgument(format!(
            "Sharpe ratio overflowed to {}",
            ratio
        )));
    }
    Ok(ratio)
}

/// Calculate the Sharpe ratio using [`DEFAULT_RISK_FREE_RATE`].
pub fn sharpe_ratio_default(returns: &[f64]) -> Result<f64> {
    sharpe_ratio(returns, DEFAULT_RISK_FREE_RATE)
}

/// Calculate maximum drawdown from a series of portfolio values.
///
/// Returns the maximum peak-to-trough decline as a decimal (e.g., 0.15 for 15% drawdown).
pub fn max_drawdown(values: &[f64]) -> Result<f64> {
    let Some(&first) = values.first() else {
        return Err(Error::InsufficientData(
            "Max drawdown needs at least 1 value".to_string(),
        ));
    };

    if let Some(idx) = values.iter().position(|v| !v.is_finite() || *v < 0.0) {
        return Err(Error::InvalidArgument(format!(
            "portfolio value at index {} must be a non-negative number, got {}",
            idx, values[idx]
        )));
    }

    let mut peak = first;
    let mut max_drawdown = 0.0;

    for (idx, &value) in values.iter().enumerate().skip(1) {
        if value > peak {
            peak = value;
        }
        if peak == 0.0 {
            return Err(Error::DivisionByZero(format!(
                "peak value is zero at index {}",
                idx
            )));
        }

        let drawdown = (peak - value) / peak;
        if drawdown > max_drawdown {
            max_drawdown = drawdown;
        }
    }

    Ok(max_drawdown)
}

/// Calculate volatility (population standard deviation) of a return series.
///
/// Not annualized; the result is in the same period as the returns.
pub fn volatility(returns: &[f64]) -> Result<f64> {
    if returns.is_empty() {
        return Err(Error::InsufficientData(
            "Volatility needs at least 1 return".to_string(),
        ));
    }

    population_std_dev(returns)
}

/// Percentage of closed positions that made money.
///
/// Open positions are ignored. With no closed positions the win rate is 0.
pub fn win_rate(positions: &[Position]) -> f64 {
    let (winners, total) = positions
        .iter()
        .filter(|p| p.is_closed())
        .fold((0usize, 0usize), |(winners, total), p| {
            (winners + usize::from(p.gross_pl > 0.0), total + 1)
        });

    if total == 0 {
        return 0.0;
    }

    100.0 * winners as f64 / total as f64
}

/// Mean hold time, in days, of closed positions with known open and close times.
pub fn average_hold_time(positions: &[Position]) -> Result<f64> {
    let mut total_days = 0.0;
    let mut count = 0usize;

    for p in positions.iter().filter(|p| p.is_closed()) {
        let (Some(opened), Some(closed)) = (p.opened_at, p.closed_at) else {
            continue;
        };
        if closed < opened {
            return Err(Error::InvalidArgument(format!(
                "position {} closed at {} before it opened at {}",
                p.symbol, closed, opened
            )));
        }

        total_days += (closed - opened).num_milliseconds() as f64 / MILLIS_PER_DAY;
        count += 1;
    }

    if count == 0 {
        return Err(Error::InsufficientData(
            "No closed positions with open and close times".to_string(),
        ));
    }

    Ok(total_days / count as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{Duration, TimeZone, Utc};

    fn closed_for_days(symbol: &str, pnl: f64, days: i64) -> Position {
        let opened = Utc.with_ymd_and_hms(2024, 1, 1, 9, 30, 0).unwrap();
        Position::closed(symbol, pnl).with_hold_period(opened, opened + Duration::days(days))
    }

    #[test]
    fn test_sharpe_ratio() {
        // Excess returns: 0.02, -0.02, 0.04 -> mean 4/300, population std sqrt(56)/300
        let returns = vec![0.04, 0.0, 0.06];
        let sharpe = sharpe_ratio(&returns, 0.02).unwrap();

        assert_relative_eq!(sharpe, (2.0_f64 / 7.0).sqrt(), epsilon = 1e-9);
    }

    #[test]
    fn test_sharpe_ratio_sign() {
        let good_returns = vec![0.05, 0.03, 0.04, 0.06];
        assert!(sharpe_ratio_default(&good_returns).unwrap() > 0.0);

        let bad_returns = vec![-0.01, 0.0, -0.02, 0.01];
        assert!(sharpe_ratio_default(&bad_returns).unwrap() < 0.0);
    }

    #[test]
    fn test_sharpe_ratio_empty() {
        assert!(matches!(
            sharpe_ratio(&[], 0.02),
            Err(Error::InsufficientData(_))
        ));
    }

    #[test]
    fn test_sharpe_ratio_zero_volatility() {
        let flat: Vec<f64> = (0..20).map(|_| 0.02).collect();
        assert!(matches!(
            sharpe_ratio(&flat, 0.02),
            Err(Error::DivisionByZero(_))
        ));
    }

    #[test]
    fn test_sharpe_ratio_flat_returns_with_rounding_noise() {
        // Excess returns are all 0.1, whose mean is not exactly 0.1
        assert!(matches!(
            sharpe_ratio(&[0.1; 10], 0.0),
            Err(Error::DivisionByZero(_))
        ));
        assert!(matches!(
            sharpe_ratio(&[0.07; 252], 0.02),
            Err(Error::DivisionByZero(_))
        ));
    }

    #[test]
    fn test_sharpe_ratio_overflow() {
        assert!(matches!(
            sharpe_ratio(&[1e308, 1e308], 0.0),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_sharpe_ratio_rejects_nan_rate() {
        assert!(matches!(
            sharpe_ratio(&[0.01, 0.02], f64::NAN),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_max_drawdown() {
        // Peak moves 100 -> 120, then falls to 60
        let mdd = max_drawdown(&[100.0, 80.0, 120.0, 60.0]).unwrap();
        assert_relative_eq!(mdd, 0.5);
    }

    #[test]
    fn test_max_drawdown_no_loss() {
        let mdd = max_drawdown(&[100.0, 101.0, 105.0, 110.0]).unwrap();
        assert_eq!(mdd, 0.0);
    }

    #[test]
    fn test_max_drawdown_single_value() {
        assert_eq!(max_drawdown(&[250.0]).unwrap(), 0.0);
    }

    #[test]
    fn test_max_drawdown_total_loss() {
        assert_relative_eq!(max_drawdown(&[100.0, 50.0, 0.0]).unwrap(), 1.0);
    }

    #[test]
    fn test_max_drawdown_errors() {
        assert!(matches!(max_drawdown(&[]), Err(Error::InsufficientData(_))));
        assert!(matches!(
            max_drawdown(&[0.0, 0.0]),
            Err(Error::DivisionByZero(_))
        ));
        assert!(matches!(
            max_drawdown(&[100.0, -5.0]),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_max_drawdown_recovers_from_zero_start() {
        // A zero start is fine once a positive peak exists
        assert_relative_eq!(max_drawdown(&[0.0, 200.0, 150.0]).unwrap(), 0.25);
    }

    #[test]
    fn test_volatility() {
        let returns = vec![0.01, -0.01, 0.01, -0.01];
        assert_relative_eq!(volatility(&returns).unwrap(), 0.01, epsilon = 1e-12);
    }

    #[test]
    fn test_volatility_flat_returns_is_zero() {
        assert_eq!(volatility(&[0.1; 10]).unwrap(), 0.0);
    }

    #[test]
    fn test_volatility_overflow() {
        assert!(matches!(
            volatility(&[1e308, -1e308, 1e308]),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_volatility_empty() {
        assert!(matches!(volatility(&[]), Err(Error::InsufficientData(_))));
    }

    #[test]
    fn test_win_rate() {
        let positions = vec![
            Position::closed("AAPL", 120.0),
            Position::closed("MSFT", -40.0),
            Position::closed("GOOGL", 0.0),
            Position::closed("AMZN", 15.0),
            // Open positions never count, even when in profit
            Position::open("TSLA", 500.0, 2000.0),
        ];

        assert_relative_eq!(win_rate(&positions), 50.0);
    }

    #[test]
    fn test_win_rate_no_closed_positions() {
        assert_eq!(win_rate(&[]), 0.0);
        assert_eq!(win_rate(&[Position::open("AAPL", 10.0, 100.0)]), 0.0);
    }

    #[test]
    fn test_average_hold_time() {
        let positions = vec![
            closed_for_days("AAPL", 10.0, 4),
            closed_for_days("MSFT", -5.0, 10),
            // No timestamps, ignored
            Position::closed("GOOGL", 3.0),
        ];

        assert_relative_eq!(average_hold_time(&positions).unwrap(), 7.0);
    }

    #[test]
    fn test_average_hold_time_fractional_days() {
        let opened = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let pos = Position::closed("AAPL", 1.0).with_hold_period(opened, opened + Duration::hours(36));

        assert_relative_eq!(average_hold_time(&[pos]).unwrap(), 1.5);
    }

    #[test]
    fn test_average_hold_time_errors() {
        assert!(matches!(
            average_hold_time(&[Position::closed("AAPL", 1.0)]),
            Err(Error::InsufficientData(_))
        ));

        let opened = Utc.with_ymd_and_hms(2024, 5, 2, 0, 0, 0).unwrap();
        let inverted =
            Position::closed("AAPL", 1.0).with_hold_period(opened, opened - Duration::days(1));
        assert!(matches!(
            average_hold_time(&[inverted]),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_metrics_calculate() {
        let snapshot = PortfolioSnapshot {
            positions: vec![
                closed_for_days("AAPL", 100.0, 2),
                closed_for_days("MSFT", -50.0, 4),
            ],
            values: vec![100.0, 80.0, 120.0, 60.0],
            returns: vec![0.01, -0.01, 0.01, -0.01],
        };

        let metrics = Metrics::calculate(&snapshot, 0.0);

        assert_relative_eq!(metrics.sharpe_ratio.unwrap(), 0.0, epsilon = 1e-12);
        assert_relative_eq!(metrics.max_drawdown.unwrap(), 0.5);
        assert_relative_eq!(metrics.volatility.unwrap(), 0.01, epsilon = 1e-12);
        assert_relative_eq!(metrics.win_rate, 50.0);
        assert_relative_eq!(metrics.average_hold_time.unwrap(), 3.0);
    }

    #[test]
    fn test_metrics_fields_are_independent() {
        // No series at all: only the position-based metrics survive
        let snapshot = PortfolioSnapshot {
            positions: vec![closed_for_days("AAPL", 100.0, 1)],
            ..Default::default()
        };

        let metrics = Metrics::calculate(&snapshot, DEFAULT_RISK_FREE_RATE);

        assert!(metrics.sharpe_ratio.is_none());
        assert!(metrics.max_drawdown.is_none());
        assert!(metrics.volatility.is_none());
        assert_eq!(metrics.win_rate, 100.0);
        assert_relative_eq!(metrics.average_hold_time.unwrap(), 1.0);
    }

    #[test]
    fn test_metrics_flat_returns() {
        let snapshot = PortfolioSnapshot {
            returns: vec![0.1; 10],
            ..Default::default()
        };

        let metrics = Metrics::calculate(&snapshot, 0.0);

        assert!(metrics.sharpe_ratio.is_none());
        assert_eq!(metrics.volatility, Some(0.0));
    }

    #[test]
    fn test_metrics_derive_returns_from_values() {
        let snapshot = PortfolioSnapshot {
            values: vec![100.0, 110.0, 99.0, 108.9],
            ..Default::default()
        };

        let metrics = Metrics::calculate(&snapshot, 0.0);

        assert!(metrics.volatility.unwrap() > 0.0);
        assert!(metrics.sharpe_ratio.is_some());
        assert!(metrics.average_hold_time.is_none());
        assert_eq!(metrics.win_rate, 0.0);
    }
}
