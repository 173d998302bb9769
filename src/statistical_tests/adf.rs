//! statistical_tests::adf — augmented Dickey–Fuller unit-root test.
//!
//! Purpose
//! -------
//! Decide whether a series looks stationary around a constant mean. The test
//! regresses first differences on the lagged level, a constant and `k`
//! lagged differences, and compares the t-statistic of the level coefficient
//! with the MacKinnon (1994, 2010) response-surface distribution.
//!
//! Key behaviors
//! -------------
//! - Default lag bound `⌈12·(n/100)^{1/4}⌉`, capped at `⌊n/2⌋ − 2` so the
//!   regression keeps positive degrees of freedom.
//! - Lag length chosen by AIC over `k = 0..=maxlag` on a common sample
//!   (ties keep the smaller lag); the chosen regression is then re-estimated
//!   on every observation it can use.
//! - Approximate p-value from MacKinnon's polynomial in the statistic,
//!   clamped to 0 and 1 outside the tabulated range.
//! - 1 %, 5 % and 10 % critical values from MacKinnon (2010).
//!
//! Invariants & assumptions
//! ------------------------
//! - Input is a gap-free, finite series with at least 4 values and some
//!   variation; [`validate_series`] enforces this.
//! - `p_value` lies in `[0, 1]` whenever the test succeeds.
//!
//! Conventions
//! -----------
//! - Only the constant-only deterministic specification is implemented.
//! - OLS is solved through the normal equations with `nalgebra`.
//!
//! Downstream usage
//! ----------------
//! - [`AdfTest`] implements [`StationarityTest`] and is the default test used
//!   when probing the differencing order of a column.
//!
//! Testing notes
//! -------------
//! - Unit tests check the p-value surface at known points, a stationary
//!   AR(1) sample, a trending sample, and error propagation for constant and
//!   short input.
use crate::statistical_tests::{
    StationarityTest,
    errors::{StatTestError, StatTestResult},
    validation::validate_series,
};
use nalgebra::{DMatrix, DVector};
use statrs::function::erf::erfc;

// ---- MacKinnon response surface (one series, constant only) ----

const TAU_MAX: f64 = 2.74;
const TAU_MIN: f64 = -18.83;
const TAU_STAR: f64 = -1.61;
const TAU_SMALL_P: [f64; 3] = [2.1659, 1.4412, 0.038269];
const TAU_LARGE_P: [f64; 4] = [1.7339, 0.93202, -0.12745, -0.010368];
const TAU_CRIT: [[f64; 4]; 3] = [
    [-3.43035, -6.5393, -16.786, -79.433],
    [-2.86154, -2.8903, -4.234, -40.040],
    [-2.56677, -1.5384, -2.809, 0.0],
];

/// Critical values of the test statistic at conventional sizes.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CriticalValues {
    pub one_pct: f64,
    pub five_pct: f64,
    pub ten_pct: f64,
}

/// AdfOutcome — result of one augmented Dickey–Fuller test.
///
/// Fields
/// ------
/// - `statistic`: t-statistic of the lagged-level coefficient.
/// - `p_value`: MacKinnon approximate p-value.
/// - `used_lag`: number of lagged differences selected by AIC.
/// - `nobs`: observations in the final regression.
/// - `critical_values`: 1 %, 5 %, 10 % critical values for `nobs`.
///
/// Invariants
/// ----------
/// - `statistic` is finite; degenerate regressions are reported as
///   errors instead.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct AdfOutcome {
    pub statistic: f64,
    pub p_value: f64,
    pub used_lag: usize,
    pub nobs: usize,
    pub critical_values: CriticalValues,
}

impl AdfOutcome {
    /// Run the test on `data`.
    ///
    /// Parameters
    /// ----------
    /// - `data`: `&[f64]`
    ///   Gap-free series, oldest first.
    /// - `max_lag`: `Option<usize>`
    ///   Upper bound for the AIC lag search. `None` uses the Schwert rule.
    ///   Values above `⌊n/2⌋ − 2` are capped.
    ///
    /// Errors
    /// ------
    /// - Validation errors from [`validate_series`].
    /// - `StatTestError::SingularDesign` if a regression cannot be solved.
    /// - `StatTestError::DegenerateRegression` if the statistic is not finite.
    ///
    /// Examples
    /// --------
    /// ```rust
    /// # use sensor_gapfill::statistical_tests::adf::AdfOutcome;
    /// let data: Vec<f64> = (0..60).map(|t| ((t * 37 % 11) as f64) - 5.0).collect();
    /// let out = AdfOutcome::adfuller(&data, None)?;
    /// assert!((0.0..=1.0).contains(&out.p_value));
    /// # Ok::<(), sensor_gapfill::statistical_tests::errors::StatTestError>(())
    /// ```
    pub fn adfuller(data: &[f64], max_lag: Option<usize>) -> StatTestResult<Self> {
        validate_series(data, 4)?;
        let n = data.len();
        let cap = n / 2 - 2;
        let schwert = (12.0 * (n as f64 / 100.0).powf(0.25)).ceil() as usize;
        let max_lag = max_lag.unwrap_or(schwert).min(cap);

        let diffs: Vec<f64> = data.windows(2).map(|w| w[1] - w[0]).collect();

        let mut best_lag = 0;
        let mut best_aic = f64::INFINITY;
        for lag in 0..=max_lag {
            let (x, y) = design(data, &diffs, max_lag, lag);
            let fit = ols(&x, &y)?;
            let aic = fit.aic();
            if aic < best_aic {
                best_aic = aic;
                best_lag = lag;
            }
        }

        let (x, y) = design(data, &diffs, best_lag, best_lag);
        let fit = ols(&x, &y)?;
        let statistic = fit.beta[1] / fit.se[1];
        if !statistic.is_finite() {
            return Err(StatTestError::DegenerateRegression { statistic });
        }
        let nobs = y.len();
        Ok(Self {
            statistic,
            p_value: mackinnon_p_value(statistic),
            used_lag: best_lag,
            nobs,
            critical_values: critical_values(nobs),
        })
    }
}

/// Augmented Dickey–Fuller test as a [`StationarityTest`].
///
/// `max_lag = None` uses the default lag bound.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct AdfTest {
    pub max_lag: Option<usize>,
}

impl StationarityTest for AdfTest {
    fn p_value(&self, series: &[f64]) -> StatTestResult<f64> {
        Ok(AdfOutcome::adfuller(series, self.max_lag)?.p_value)
    }
}

/// MacKinnon approximate p-value for the constant-only statistic.
pub fn mackinnon_p_value(statistic: f64) -> f64 {
    if statistic > TAU_MAX {
        return 1.0;
    }
    if statistic < TAU_MIN {
        return 0.0;
    }
    let coefs: &[f64] = if statistic <= TAU_STAR { &TAU_SMALL_P } else { &TAU_LARGE_P };
    standard_normal_cdf(polyval(coefs, statistic))
}

fn critical_values(nobs: usize) -> CriticalValues {
    let inv = 1.0 / nobs as f64;
    CriticalValues {
        one_pct: polyval(&TAU_CRIT[0], inv),
        five_pct: polyval(&TAU_CRIT[1], inv),
        ten_pct: polyval(&TAU_CRIT[2], inv),
    }
}

// ---- Regression helpers ----

struct OlsFit {
    beta: DVector<f64>,
    se: Vec<f64>,
    ssr: f64,
    nobs: usize,
}

impl OlsFit {
    fn aic(&self) -> f64 {
        let n = self.nobs as f64;
        let llf = -n / 2.0 * ((2.0 * std::f64::consts::PI).ln() + (self.ssr / n).ln() + 1.0);
        -2.0 * llf + 2.0 * self.beta.len() as f64
    }
}

/// Regression of Δxₜ on `[1, xₜ₋₁, Δxₜ₋₁, …, Δxₜ₋ₖ]` with `k = lag`, dropping the first
/// `trim` differences so every lag up to `trim` is available.
fn design(data: &[f64], diffs: &[f64], trim: usize, lag: usize) -> (DMatrix<f64>, DVector<f64>) {
    let rows = diffs.len() - trim;
    let cols = lag + 2;
    let mut x = DMatrix::<f64>::zeros(rows, cols);
    let mut y = DVector::<f64>::zeros(rows);
    for r in 0..rows {
        let i = trim + r;
        y[r] = diffs[i];
        x[(r, 0)] = 1.0;
        x[(r, 1)] = data[i];
        for j in 1..=lag {
            x[(r, 1 + j)] = diffs[i - j];
        }
    }
    (x, y)
}

fn ols(x: &DMatrix<f64>, y: &DVector<f64>) -> StatTestResult<OlsFit> {
    let (n, k) = x.shape();
    if n <= k {
        return Err(StatTestError::InsufficientData { needed: k + 1, found: n });
    }
    let xt = x.transpose();
    let xtx_inv = (&xt * x).try_inverse().ok_or(StatTestError::SingularDesign)?;
    let beta = &xtx_inv * (&xt * y);
    let resid = y - x * &beta;
    let ssr = resid.dot(&resid);
    let sigma2 = ssr / (n - k) as f64;
    let se = (0..k).map(|j| (sigma2 * xtx_inv[(j, j)]).max(0.0).sqrt()).collect();
    Ok(OlsFit { beta, se, ssr, nobs: n })
}

fn polyval(coefs: &[f64], x: f64) -> f64 {
    coefs.iter().rev().fold(0.0, |acc, &c| acc * x + c)
}

fn standard_normal_cdf(z: f64) -> f64 {
    0.5 * erfc(-z / std::f64::consts::SQRT_2)
}
