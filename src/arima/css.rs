//! arima::css — conditional-sum-of-squares ARIMA estimation.
//!
//! Purpose
//! -------
//! Provide the default [`ArimaFitter`]: difference the series `d` times,
//! fit an ARMA(p, q) (with a mean only when `d = 0`) by maximizing the
//! concentrated Gaussian CSS log-likelihood, and forecast by running the
//! ARMA recursion forward and integrating back to levels.
//!
//! Key behaviors
//! -------------
//! - The differenced series is standardized before optimization and every
//!   reported quantity is mapped back to the original units.
//! - AR and MA coefficients are searched in unconstrained coordinates and
//!   mapped through [`constrain_ar`] / [`constrain_ma`], so every candidate
//!   is stationary and invertible.
//! - AR start values are the Yule–Walker coefficients from the `arima`
//!   crate's Durbin–Levinson recursion; everything else starts at zero.
//! - Each fit runs under the optimizer's evaluation budget, so a stalled
//!   line search ends as [`FitError::Optimization`] instead of spinning.
//! - A differenced series without variation is fitted exactly with zero
//!   coefficients instead of running the optimizer.
//!
//! Invariants & assumptions
//! ------------------------
//! - Every order is scored on the same sample: all `n − d` differenced
//!   points. Pre-sample values enter at the mean and pre-sample innovations
//!   at zero, so criteria are comparable across `p` and `q`.
//! - `σ²` is concentrated out as `SSR / n_eff`, floored at
//!   [`SIGMA2_FLOOR`] in standardized units.
//!
//! Conventions
//! -----------
//! - θ layout: `[μ (only when d = 0), ar_raw[0..p), ma_raw[0..q)]`.
//! - Forecasts set future innovations to zero.
//!
//! Testing notes
//! -------------
//! - Unit tests recover an AR(1) coefficient from a simulated sample, check
//!   random-walk and constant-series forecasts, residual lengths, and the
//!   insufficient-data guard.
use ndarray::{Array1, s};
use tracing::debug;

use crate::{
    arima::{
        differencing::{DifferenceTails, difference},
        errors::{FitError, FitResult},
        order::{InformationCriterion, OrderTriple},
        traits::{ArimaFitter, ArimaModel},
    },
    optimization::{
        errors::{OptError, OptResult},
        loglik_optimizer::{LogLikelihood, MLEOptions, Theta, maximize},
        numerical_stability::{constrain_ar, constrain_ma, unconstrain_ar},
    },
};

/// Lower bound for the standardized innovation variance.
pub const SIGMA2_FLOOR: f64 = 1e-10;

const DEGENERATE_SCALE: f64 = 1e-12;

// ---- Objective ----

/// Concentrated CSS log-likelihood of an ARMA(p, q) on a standardized series.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CssObjective {
    pub p: usize,
    pub q: usize,
    pub include_mean: bool,
}

impl CssObjective {
    pub fn for_order(order: OrderTriple) -> Self {
        Self { p: order.p, q: order.q, include_mean: order.has_mean() }
    }

    pub fn dim(&self) -> usize {
        usize::from(self.include_mean) + self.p + self.q
    }

    /// Split θ into `(μ, φ, ϑ)` in model space.
    pub fn unpack(&self, theta: &Theta) -> (f64, Array1<f64>, Array1<f64>) {
        let offset = usize::from(self.include_mean);
        let mu = if self.include_mean { theta[0] } else { 0.0 };
        let ar = constrain_ar(theta.slice(s![offset..offset + self.p]));
        let ma = constrain_ma(theta.slice(s![offset + self.p..]));
        (mu, ar, ma)
    }
}

impl LogLikelihood for CssObjective {
    type Data = Vec<f64>;

    fn value(&self, theta: &Theta, data: &Self::Data) -> OptResult<f64> {
        let (mu, ar, ma) = self.unpack(theta);
        let resid = css_residuals(data, mu, &ar.to_vec(), &ma.to_vec());
        Ok(concentrated_loglik(&resid))
    }

    fn check(&self, theta: &Theta, data: &Self::Data) -> OptResult<()> {
        if theta.len() != self.dim() {
            return Err(OptError::ThetaLengthMismatch { expected: self.dim(), actual: theta.len() });
        }
        if let Some((index, &value)) = theta.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(OptError::InvalidThetaInput { index, value });
        }
        let needed = self.dim() + 1;
        if data.len() < needed {
            return Err(OptError::InsufficientObservations { needed, available: data.len() });
        }
        Ok(())
    }
}

/// One-step residuals of `z` under an ARMA with mean `mu`, one per point.
///
/// Lags that fall before the start of `z` contribute nothing: the AR term
/// sees the mean and the MA term a zero innovation.
pub fn css_residuals(z: &[f64], mu: f64, ar: &[f64], ma: &[f64]) -> Vec<f64> {
    let mut e = vec![0.0; z.len()];
    for t in 0..z.len() {
        let mut pred = 0.0;
        for (i, phi) in ar.iter().enumerate().take(t) {
            pred += phi * (z[t - 1 - i] - mu);
        }
        for (j, theta) in ma.iter().enumerate().take(t) {
            pred += theta * e[t - 1 - j];
        }
        e[t] = z[t] - mu - pred;
    }
    e
}

fn concentrated_loglik(resid: &[f64]) -> f64 {
    let n = resid.len() as f64;
    let ssr: f64 = resid.iter().map(|e| e * e).sum();
    let sigma2 = (ssr / n).max(SIGMA2_FLOOR);
    -n / 2.0 * ((2.0 * std::f64::consts::PI * sigma2).ln() + 1.0)
}

// ---- Fitter ----

/// Default [`ArimaFitter`] using conditional sum of squares and L-BFGS.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CssArimaFitter {
    pub mle: MLEOptions,
}

impl CssArimaFitter {
    pub fn new(mle: MLEOptions) -> Self {
        Self { mle }
    }

    fn start_values(&self, z: &[f64], objective: &CssObjective) -> Theta {
        let mut theta = Array1::zeros(objective.dim());
        let offset = usize::from(objective.include_mean);
        if objective.p > 0 && z.len() > 2 * objective.p + 2 {
            let raw = ::arima::acf::ar(z, Some(objective.p))
                .ok()
                .filter(|(coef, _)| coef.len() == objective.p)
                .and_then(|(coef, _)| unconstrain_ar(&coef));
            if let Some(raw) = raw {
                theta.slice_mut(s![offset..offset + objective.p]).assign(&raw);
            }
        }
        theta
    }
}

impl ArimaFitter for CssArimaFitter {
    type Model = FittedArima;

    /// Fit `order` by conditional sum of squares.
    ///
    /// # Errors
    /// - `FitError::InvalidData` for non-finite input.
    /// - `FitError::InsufficientData` when `n < d + p + k`, with `k` the
    ///   parameter count of the order.
    /// - `FitError::Optimization` when the solver fails.
    fn fit(&self, series: &[f64], order: OrderTriple) -> FitResult<FittedArima> {
        if let Some((index, &value)) = series.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(FitError::InvalidData { index, value });
        }
        let needed = order.d + order.p + order.n_params();
        if series.len() < needed {
            return Err(FitError::InsufficientData { order, needed, found: series.len() });
        }

        let objective = CssObjective::for_order(order);
        let w = difference(series, order.d);
        let tails = DifferenceTails::capture(series, order.d);
        let (center, raw_scale) = standardization(&w, objective.include_mean);
        let degenerate = raw_scale < DEGENERATE_SCALE;
        let scale = if degenerate { 1.0 } else { raw_scale };
        let z: Vec<f64> = w.iter().map(|v| (v - center) / scale).collect();

        let (theta_hat, converged) = if degenerate || objective.dim() == 0 {
            (Array1::zeros(objective.dim()), true)
        } else {
            let theta0 = self.start_values(&z, &objective);
            let outcome = maximize(&objective, theta0, &z, &self.mle)?;
            (outcome.theta_hat, outcome.converged)
        };

        let (mu_z, ar, ma) = objective.unpack(&theta_hat);
        let ar = ar.to_vec();
        let ma = ma.to_vec();
        let e_z = css_residuals(&z, mu_z, &ar, &ma);
        let nobs = z.len();
        let loglik = concentrated_loglik(&e_z) - nobs as f64 * scale.ln();
        let residuals: Vec<f64> = e_z.iter().map(|e| e * scale).collect();

        debug!(%order, loglik, converged, nobs, "fitted ARIMA candidate");

        Ok(FittedArima {
            order,
            mean: center + scale * mu_z,
            ar,
            ma,
            loglik,
            nobs,
            residuals,
            converged,
            mu_z,
            center,
            scale,
            z_tail: z[z.len() - order.p..].to_vec(),
            e_tail: e_z[e_z.len() - order.q..].to_vec(),
            tails,
        })
    }
}

fn standardization(w: &[f64], include_mean: bool) -> (f64, f64) {
    let n = w.len() as f64;
    if include_mean {
        let mean = w.iter().sum::<f64>() / n;
        let var = w.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        (mean, var.sqrt())
    } else {
        (0.0, (w.iter().map(|v| v * v).sum::<f64>() / n).sqrt())
    }
}

// ---- Fitted model ----

/// A fitted ARIMA(p, d, q) with everything needed to forecast.
///
/// `mean` is the level of the differenced series (zero when `d > 0`).
/// `ar` / `ma` follow `wₜ − μ = Σ φᵢ(wₜ₋ᵢ − μ) + eₜ + Σ ϑⱼ eₜ₋ⱼ`.
#[derive(Debug, Clone, PartialEq)]
pub struct FittedArima {
    pub order: OrderTriple,
    pub mean: f64,
    pub ar: Vec<f64>,
    pub ma: Vec<f64>,
    pub loglik: f64,
    pub nobs: usize,
    pub residuals: Vec<f64>,
    pub converged: bool,
    mu_z: f64,
    center: f64,
    scale: f64,
    z_tail: Vec<f64>,
    e_tail: Vec<f64>,
    tails: DifferenceTails,
}

impl FittedArima {
    /// Innovation variance in the units of the differenced series.
    pub fn sigma2(&self) -> f64 {
        let n = self.residuals.len().max(1) as f64;
        self.residuals.iter().map(|e| e * e).sum::<f64>() / n
    }
}

impl ArimaModel for FittedArima {
    fn order(&self) -> OrderTriple {
        self.order
    }

    fn forecast(&self, steps: usize) -> FitResult<Vec<f64>> {
        let mut z_hist = self.z_tail.clone();
        let mut e_hist = self.e_tail.clone();
        let mut differenced = Vec::with_capacity(steps);
        for _ in 0..steps {
            let mut pred = self.mu_z;
            for (i, phi) in self.ar.iter().enumerate() {
                pred += phi * (z_hist[z_hist.len() - 1 - i] - self.mu_z);
            }
            for (j, theta) in self.ma.iter().enumerate() {
                pred += theta * e_hist[e_hist.len() - 1 - j];
            }
            z_hist.push(pred);
            e_hist.push(0.0);
            differenced.push(self.center + self.scale * pred);
        }
        let levels = self.tails.integrate(&differenced);
        if let Some((i, &value)) = levels.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(FitError::NonFiniteForecast { step: i + 1, value });
        }
        Ok(levels)
    }

    fn criterion(&self, kind: InformationCriterion) -> f64 {
        kind.evaluate(self.loglik, self.order.n_params(), self.nobs)
    }

    fn residuals(&self) -> &[f64] {
        &self.residuals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Coefficient recovery on a simulated AR(1).
    // - Closed-form forecasts for a random walk and a constant series.
    // - Residual bookkeeping and criterion wiring.
    // - The minimum-sample guard.
    //
    // They intentionally DO NOT cover:
    // - Optimizer internals, which are tested in `optimization`.
    // -------------------------------------------------------------------------

    fn simulate_ar1(n: usize, phi: f64, level: f64, seed: u64) -> Vec<f64> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut dev = 0.0;
        (0..n)
            .map(|_| {
                dev = phi * dev + rng.gen_range(-1.0..1.0);
                level + dev
            })
            .collect()
    }

    #[test]
    // Purpose
    // -------
    // Verify CSS recovers the AR coefficient and the mean of an AR(1).
    //
    // Given
    // -----
    // - 400 draws of an AR(1) with φ = 0.6 around level 50.
    //
    // Expect
    // ------
    // - φ̂ within 0.1 of 0.6 and μ̂ within 0.5 of 50.
    fn fit_recovers_ar1_coefficient() {
        // Arrange
        let data = simulate_ar1(400, 0.6, 50.0, 3);

        // Act
        let model = CssArimaFitter::default()
            .fit(&data, OrderTriple::new(1, 0, 0))
            .expect("AR(1) fit should succeed");

        // Assert
        assert_abs_diff_eq!(model.ar[0], 0.6, epsilon = 0.1);
        assert_abs_diff_eq!(model.mean, 50.0, epsilon = 0.5);
        assert_eq!(model.residuals().len(), 400);
    }

    #[test]
    // Purpose
    // -------
    // AR start values come from the Yule–Walker recursion, which runs
    // without any solver of its own.
    //
    // Given
    // -----
    // - 400 centered draws of an AR(1) with φ = 0.6 and order (1, 0, 0).
    //
    // Expect
    // ------
    // - Mean slot at zero and the mapped AR start within 0.1 of 0.6.
    fn start_values_use_yule_walker() {
        // Arrange
        let raw = simulate_ar1(400, 0.6, 0.0, 3);
        let mean = raw.iter().sum::<f64>() / raw.len() as f64;
        let z: Vec<f64> = raw.iter().map(|v| v - mean).collect();
        let objective = CssObjective::for_order(OrderTriple::new(1, 0, 0));

        // Act
        let theta0 = CssArimaFitter::default().start_values(&z, &objective);

        // Assert
        assert_eq!(theta0.len(), 2);
        assert_eq!(theta0[0], 0.0);
        let phi = constrain_ar(theta0.slice(s![1..2]));
        assert_abs_diff_eq!(phi[0], 0.6, epsilon = 0.1);
    }

    #[test]
    // Purpose
    // -------
    // Check that ARIMA(0, 1, 0) forecasts repeat the last observation.
    //
    // Given
    // -----
    // - A short irregular series ending at 7.5.
    //
    // Expect
    // ------
    // - Three forecasts all equal to 7.5.
    fn random_walk_forecast_repeats_last_value() {
        // Arrange
        let data = [3.0, 4.5, 4.0, 6.0, 5.5, 7.0, 6.5, 7.5];

        // Act
        let model =
            CssArimaFitter::default().fit(&data, OrderTriple::new(0, 1, 0)).expect("should fit");
        let fc = model.forecast(3).expect("forecast should be finite");

        // Assert
        assert_eq!(fc, vec![7.5, 7.5, 7.5]);
    }

    #[test]
    // Purpose
    // -------
    // Ensure a constant series is fitted exactly and forecast flat.
    //
    // Given
    // -----
    // - Twenty copies of 12.0 with order (1, 0, 1).
    //
    // Expect
    // ------
    // - Forecasts equal 12.0 and the criterion is finite.
    fn constant_series_forecasts_its_level() {
        // Arrange
        let data = vec![12.0; 20];

        // Act
        let model =
            CssArimaFitter::default().fit(&data, OrderTriple::new(1, 0, 1)).expect("should fit");
        let fc = model.forecast(4).expect("forecast should be finite");

        // Assert
        for v in fc {
            assert_abs_diff_eq!(v, 12.0, epsilon = 1e-9);
        }
        assert!(model.criterion(InformationCriterion::Aic).is_finite());
    }

    #[test]
    // Purpose
    // -------
    // Verify the criteria use the order's parameter count and sample size.
    //
    // Given
    // -----
    // - An ARIMA(1, 1, 1) fit on a simulated sample of 120 points.
    //
    // Expect
    // ------
    // - AIC = -2ℓ + 2·3 with nobs = 120 − 1 (no mean term once
    //   differenced).
    fn criterion_uses_order_parameter_count() {
        // Arrange
        let data = simulate_ar1(120, 0.5, 10.0, 9);

        // Act
        let model =
            CssArimaFitter::default().fit(&data, OrderTriple::new(1, 1, 1)).expect("should fit");

        // Assert
        assert_eq!(model.nobs, 119);
        assert_abs_diff_eq!(
            model.criterion(InformationCriterion::Aic),
            -2.0 * model.loglik + 6.0,
            epsilon = 1e-9
        );
    }

    #[test]
    // Purpose
    // -------
    // Ensure too-short input is refused before optimization.
    //
    // Given
    // -----
    // - Five observations for order (3, 1, 3).
    //
    // Expect
    // ------
    // - `FitError::InsufficientData`.
    fn fit_rejects_short_series() {
        // Act
        let result =
            CssArimaFitter::default().fit(&[1.0, 2.0, 1.0, 3.0, 2.0], OrderTriple::new(3, 1, 3));

        // Assert
        assert!(matches!(result, Err(FitError::InsufficientData { .. })));
    }

    /// Sum of twelve uniforms minus six: an approximately standard normal
    /// i.i.d. sample.
    fn irwin_hall_noise(n: usize, seed: u64) -> Vec<f64> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        (0..n).map(|_| (0..12).map(|_| rng.gen::<f64>()).sum::<f64>() - 6.0).collect()
    }

    #[test]
    // Purpose
    // -------
    // Orders with different AR lags are scored on the same sample, so their
    // criteria are comparable.
    //
    // Given
    // -----
    // - 300 i.i.d. values fitted with (0, 0, 0), (2, 0, 0) and (3, 0, 1).
    //
    // Expect
    // ------
    // - `nobs` and the residual count equal 300 for every order.
    fn every_order_uses_the_full_sample() {
        // Arrange
        let data = irwin_hall_noise(300, 0);
        let fitter = CssArimaFitter::default();

        for order in [OrderTriple::new(0, 0, 0), OrderTriple::new(2, 0, 0), OrderTriple::new(3, 0, 1)] {
            // Act
            let model = fitter.fit(&data, order).expect("fit should succeed on noise");

            // Assert
            assert_eq!(model.nobs, 300, "{order}");
            assert_eq!(model.residuals().len(), 300, "{order}");
        }
    }

    #[test]
    // Purpose
    // -------
    // An MA(1) fit on noise that used to stall the line search returns
    // within a bounded number of evaluations.
    //
    // Given
    // -----
    // - 300 i.i.d. values from seed 11 and order (0, 0, 1), fitted on a
    //   worker thread.
    //
    // Expect
    // ------
    // - A result (fit or error) arrives within 60 s.
    fn ma_fit_on_noise_returns() {
        // Arrange
        let data = irwin_hall_noise(300, 11);
        let (tx, rx) = std::sync::mpsc::channel();

        // Act
        std::thread::spawn(move || {
            let result = CssArimaFitter::default().fit(&data, OrderTriple::new(0, 0, 1));
            let _ = tx.send(result.map(|m| m.loglik));
        });
        let received = rx.recv_timeout(std::time::Duration::from_secs(60));

        // Assert
        assert!(received.is_ok(), "fit did not return");
    }
}
