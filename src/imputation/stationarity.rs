//! imputation::stationarity — differencing order from a unit-root test.
//!
//! Purpose
//! -------
//! Decide how many times a column must be differenced before it looks
//! stationary, using any [`StationarityTest`] (the augmented Dickey–Fuller
//! test by default).
//!
//! Key behaviors
//! -------------
//! - [`is_stationary`] answers `(false, 1.0)` below
//!   [`MIN_STATIONARITY_OBS`] observations without running the test.
//! - [`find_difference_order`] returns the first `d ∈ 0..=max_d` whose
//!   `d`-times differenced series passes, else `max_d`.
//!
//! Invariants & assumptions
//! ------------------------
//! - Inputs are observed values only (gaps already removed).
//! - Test failures propagate; the column procedure turns them into a
//!   column fallback.
use crate::{
    arima::differencing::difference,
    statistical_tests::{errors::StatTestResult, StationarityTest},
};
use tracing::debug;

/// Fewer observations than this are reported as non-stationary.
pub const MIN_STATIONARITY_OBS: usize = 10;

/// Largest p-value at which the unit root is rejected.
pub const STATIONARITY_LEVEL: f64 = 0.05;

/// Run the unit-root test and return `(stationary, p_value)`.
///
/// # Errors
/// Propagates the test's [`StatTestError`](crate::statistical_tests::StatTestError).
pub fn is_stationary<S>(test: &S, observed: &[f64]) -> StatTestResult<(bool, f64)>
where
    S: StationarityTest + ?Sized,
{
    if observed.len() < MIN_STATIONARITY_OBS {
        return Ok((false, 1.0));
    }
    let p = test.p_value(observed)?;
    Ok((p <= STATIONARITY_LEVEL, p))
}

/// Smallest differencing order in `0..=max_d` that passes [`is_stationary`],
/// or `max_d` if none does.
///
/// # Errors
/// Propagates the first test failure.
pub fn find_difference_order<S>(test: &S, observed: &[f64], max_d: usize) -> StatTestResult<usize>
where
    S: StationarityTest + ?Sized,
{
    for d in 0..=max_d {
        let candidate = difference(observed, d);
        let (stationary, p) = is_stationary(test, &candidate)?;
        debug!(d, p_value = p, stationary, "unit-root test");
        if stationary {
            return Ok(d);
        }
    }
    Ok(max_d)
}
