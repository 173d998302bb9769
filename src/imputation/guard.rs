//! imputation::guard — plausibility envelope and selective correction.
//!
//! Purpose
//! -------
//! Catch model forecasts that leave the range the sensor actually produced
//! and replace only those values with a conservative estimate.
//!
//! Key behaviors
//! -------------
//! - [`PlausibilityEnvelope::from_observed`] builds
//!   `lower = max(min − std, 0.1·min)` and `upper = min(max + std, 3·max)`
//!   from the observed values (sample standard deviation).
//! - [`apply_guard`] marks every originally missing position whose imputed
//!   value is outside the envelope (or absent, or non-finite) and rewrites
//!   exactly those positions from [`conservative_fill`] of the original.
//!
//! Invariants & assumptions
//! ------------------------
//! - Observed positions are never modified.
//! - After [`apply_guard`] every originally missing position holds a value.
//!
//! Conventions
//! -----------
//! - For negative-valued channels the scaled bounds (`0.1·min`, `3·max`)
//!   can make the envelope narrower than the observed range; that is the
//!   rule as specified and is kept.
use crate::imputation::interpolation::conservative_fill;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Envelope used when a column has no observations.
pub const DEFAULT_ENVELOPE: (f64, f64) = (0.0, 100.0);
/// Mean used when a column has no observations.
pub const DEFAULT_MEAN: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlausibilityEnvelope {
    pub lower: f64,
    pub upper: f64,
    /// Observed mean, the last-resort fill value.
    pub mean: f64,
}

impl PlausibilityEnvelope {
    /// Envelope over the observed (`Some`) values of `series`.
    pub fn from_observed(series: &[Option<f64>]) -> Self {
        let values: Vec<f64> = series.iter().flatten().copied().collect();
        if values.is_empty() {
            return Self { lower: DEFAULT_ENVELOPE.0, upper: DEFAULT_ENVELOPE.1, mean: DEFAULT_MEAN };
        }
        let n = values.len() as f64;
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = values.iter().sum::<f64>() / n;
        let std = if values.len() > 1 {
            (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0)).sqrt()
        } else {
            0.0
        };
        Self { lower: (min - std).max(min * 0.1), upper: (max + std).min(max * 3.0), mean }
    }

    pub fn contains(&self, value: f64) -> bool {
        value.is_finite() && value >= self.lower && value <= self.upper
    }
}

/// Replace implausible imputations in `filled`.
///
/// `original` is the column before imputation (its gaps define which
/// positions may be corrected). Returns the number of corrected positions.
pub fn apply_guard(
    original: &[Option<f64>], filled: &mut [Option<f64>], envelope: &PlausibilityEnvelope,
) -> usize {
    let violations: Vec<usize> = original
        .iter()
        .zip(filled.iter())
        .enumerate()
        .filter(|(_, (orig, new))| orig.is_none() && !new.is_some_and(|v| envelope.contains(v)))
        .map(|(i, _)| i)
        .collect();
    if violations.is_empty() {
        return 0;
    }

    warn!(
        corrections = violations.len(),
        lower = envelope.lower,
        upper = envelope.upper,
        "implausible imputed values replaced by conservative interpolation"
    );
    let conservative = conservative_fill(original, envelope.mean);
    for &i in &violations {
        filled[i] = Some(conservative[i]);
    }
    violations.len()
}
