//! statistical_tests::validation — input guards for unit-root testing.
//!
//! Purpose
//! -------
//! Check length, finiteness and variation of a series once, before any
//! regression is assembled.
//!
//! Invariants & assumptions
//! ------------------------
//! - A series passing [`validate_series`] has at least `min_len` finite
//!   values and at least two distinct values.

use crate::statistical_tests::errors::{StatTestError, StatTestResult};

/// Validate a series for unit-root testing.
///
/// Parameters
/// ----------
/// - `data`: `&[f64]`
///   Observed values, already stripped of missing entries.
/// - `min_len`: `usize`
///   Minimum number of observations the caller's regression needs.
///
/// Returns
/// -------
/// `StatTestResult<()>`
///
/// Errors
/// ------
/// - `StatTestError::InsufficientData` when `data.len() < min_len`.
/// - `StatTestError::InvalidData` for the first non-finite value.
/// - `StatTestError::ConstantSeries` when all values are equal.
///
/// Examples
/// --------
/// ```rust
/// # use sensor_gapfill::statistical_tests::validation::validate_series;
/// # use sensor_gapfill::statistical_tests::errors::StatTestError;
/// assert!(validate_series(&[1.0, 2.0, 1.5, 3.0], 4).is_ok());
/// assert_eq!(validate_series(&[2.0; 6], 4), Err(StatTestError::ConstantSeries));
/// ```
pub fn validate_series(data: &[f64], min_len: usize) -> StatTestResult<()> {
    if data.len() < min_len {
        return Err(StatTestError::InsufficientData { needed: min_len, found: data.len() });
    }
    if let Some((index, &value)) = data.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(StatTestError::InvalidData { index, value });
    }
    let first = data[0];
    if data.iter().all(|&v| v == first) {
        return Err(StatTestError::ConstantSeries);
    }
    Ok(())
}
