//! Polynomial reparameterizations for ARMA estimation.
//!
//! An unconstrained vector `v ∈ ℝᵏ` is mapped to partial autocorrelations
//! `rⱼ = (1 − STATIONARITY_MARGIN)·tanh(vⱼ)` and then, through the
//! Durbin–Levinson recursion, to coefficients `φ` whose polynomial
//! `1 − φ₁z − … − φₖzᵏ` has every root outside the unit circle. The MA side
//! reuses the same map with a sign flip so `1 + θ₁z + … + θₖzᵏ` is invertible.
//!
//! # Provided items
//! - [`STATIONARITY_MARGIN`]
//! - [`constrain_ar`], [`constrain_ma`]: ℝᵏ → stationary / invertible.
//! - [`unconstrain_ar`]: inverse of [`constrain_ar`] for start values.
use ndarray::{Array1, ArrayView1};

/// Keeps partial autocorrelations strictly inside (−1, 1).
pub const STATIONARITY_MARGIN: f64 = 1e-6;

/// Map unconstrained coordinates to stationary AR coefficients.
///
/// # Parameters
/// - `raw`: unconstrained values, one per lag.
///
/// # Returns
/// - `φ` of the same length; empty input gives an empty vector.
pub fn constrain_ar(raw: ArrayView1<f64>) -> Array1<f64> {
    let pacf: Vec<f64> = raw.iter().map(|&v| (1.0 - STATIONARITY_MARGIN) * v.tanh()).collect();
    Array1::from(levinson_from_pacf(&pacf))
}

/// Map unconstrained coordinates to invertible MA coefficients.
pub fn constrain_ma(raw: ArrayView1<f64>) -> Array1<f64> {
    -constrain_ar(raw)
}

/// Invert [`constrain_ar`] by the step-down recursion.
///
/// Returns `None` when `phi` is not stationary (some partial
/// autocorrelation has magnitude ≥ 1). Partial autocorrelations that land
/// closer to ±1 than the margin allows are pulled back inside first.
pub fn unconstrain_ar(phi: &[f64]) -> Option<Array1<f64>> {
    let pacf = pacf_from_coefficients(phi)?;
    let limit = (1.0 - STATIONARITY_MARGIN) * (1.0 - 1e-3);
    Some(
        pacf.iter()
            .map(|&r| (r.clamp(-limit, limit) / (1.0 - STATIONARITY_MARGIN)).atanh())
            .collect(),
    )
}

// ---- Recursions ----

fn levinson_from_pacf(pacf: &[f64]) -> Vec<f64> {
    let mut phi: Vec<f64> = Vec::with_capacity(pacf.len());
    for (k, &r) in pacf.iter().enumerate() {
        let prev = phi.clone();
        for j in 0..k {
            phi[j] = prev[j] - r * prev[k - 1 - j];
        }
        phi.push(r);
    }
    phi
}

fn pacf_from_coefficients(phi: &[f64]) -> Option<Vec<f64>> {
    let mut current = phi.to_vec();
    let mut pacf = vec![0.0; phi.len()];
    for k in (0..phi.len()).rev() {
        let r = current[k];
        if !r.is_finite() || r.abs() >= 1.0 {
            return None;
        }
        pacf[k] = r;
        let denom = 1.0 - r * r;
        let reduced: Vec<f64> =
            (0..k).map(|j| (current[j] + r * current[k - 1 - j]) / denom).collect();
        current = reduced;
    }
    Some(pacf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - The AR(1) and AR(2) shapes produced by `constrain_ar`.
    // - Round-tripping through `unconstrain_ar` for a stationary AR(2).
    // - Rejection of a non-stationary polynomial.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Verify the AR(1) map is a scaled tanh and the MA map is its negation.
    //
    // Given
    // -----
    // - raw = [0.5].
    //
    // Expect
    // ------
    // - φ₁ = (1 − margin)·tanh(0.5); θ₁ = −φ₁.
    fn constrain_ar1_is_scaled_tanh() {
        // Act
        let phi = constrain_ar(array![0.5].view());
        let theta = constrain_ma(array![0.5].view());

        // Assert
        let expected = (1.0 - STATIONARITY_MARGIN) * 0.5_f64.tanh();
        assert_abs_diff_eq!(phi[0], expected, epsilon = 1e-12);
        assert_abs_diff_eq!(theta[0], -expected, epsilon = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Check that a stationary AR(2) survives unconstrain → constrain.
    //
    // Given
    // -----
    // - φ = (0.5, 0.3), which is stationary.
    //
    // Expect
    // ------
    // - The recovered coefficients match within 1e-9.
    fn unconstrain_then_constrain_recovers_stationary_ar2() {
        // Arrange
        let phi = [0.5, 0.3];

        // Act
        let raw = unconstrain_ar(&phi).expect("stationary AR(2) should invert");
        let back = constrain_ar(raw.view());

        // Assert
        assert_abs_diff_eq!(back[0], 0.5, epsilon = 1e-9);
        assert_abs_diff_eq!(back[1], 0.3, epsilon = 1e-9);
    }

    #[test]
    // Purpose
    // -------
    // Ensure non-stationary polynomials are refused.
    //
    // Given
    // -----
    // - φ = (1.2), an explosive AR(1).
    //
    // Expect
    // ------
    // - `None`.
    fn unconstrain_rejects_explosive_ar() {
        assert!(unconstrain_ar(&[1.2]).is_none());
    }
}
