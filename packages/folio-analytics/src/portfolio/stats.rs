//! Shared statistics helpers.
//!
//! All helpers reject non-finite input so that `NaN` never leaks into a metric.

use crate::{Error, Result};

fn ensure_finite(xs: &[f64], what: &str) -> Result<()> {
    match xs.iter().position(|x| !x.is_finite()) {
        Some(idx) => Err(Error::InvalidArgument(format!(
            "{} contains a non-finite value at index {}",
            what, idx
        ))),
        None => Ok(()),
    }
}

fn ensure_finite_result(value: f64, what: &str) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(Error::InvalidArgument(format!(
            "{} overflowed to {}",
            what, value
        )))
    }
}

/// Relative tolerance under which a standard deviation counts as zero.
///
/// Scaled by `max(|mean|, 1)` at the call site.
const ZERO_SPREAD_TOLERANCE: f64 = 8.0 * f64::EPSILON;

/// Whether `std_dev` is rounding noise around `mean` rather than real spread.
pub(crate) fn is_zero_spread(std_dev: f64, mean: f64) -> bool {
    std_dev <= ZERO_SPREAD_TOLERANCE * mean.abs().max(1.0)
}

/// Arithmetic mean.
pub fn mean(xs: &[f64]) -> Result<f64> {
    if xs.is_empty() {
        return Err(Error::InsufficientData(
            "Mean of an empty series is undefined".to_string(),
        ));
    }
    ensure_finite(xs, "series")?;

    let sum = ensure_finite_result(xs.iter().sum::<f64>(), "sum of series")?;
    Ok(sum / xs.len() as f64)
}

/// Population variance (squared deviations divided by `n`, not `n - 1`).
pub fn population_variance(xs: &[f64]) -> Result<f64> {
    let mean = mean(xs)?;
    let n = xs.len() as f64;

    // A constant series has no spread, whatever rounding left in the mean
    if xs.iter().all(|x| *x == xs[0]) {
        return Ok(0.0);
    }

    let sum_sq = ensure_finite_result(
        xs.iter().map(|x| (x - mean).powi(2)).sum::<f64>(),
        "sum of squared deviations",
    )?;
    Ok(sum_sq / n)
}

/// Population standard deviation.
pub fn population_std_dev(xs: &[f64]) -> Result<f64> {
    Ok(population_variance(xs)?.sqrt())
}

/// Simple periodic returns of a value series: `v[i] / v[i - 1] - 1`.
pub fn periodic_returns(values: &[f64]) -> Result<Vec<f64>> {
    if values.len() < 2 {
        return Err(Error::InsufficientData(
            "Need at least 2 values to derive returns".to_string(),
        ));
    }
    ensure_finite(values, "value series")?;

    values
        .windows(2)
        .enumerate()
        .map(|(i, w)| {
            if w[0] == 0.0 {
                Err(Error::DivisionByZero(format!(
                    "value at index {} is zero, return is undefined",
                    i
                )))
            } else {
                Ok(w[1] / w[0] - 1.0)
            }
        })
        .collect()
}
