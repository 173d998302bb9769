//! Seams between the imputation engine and the time-series model backend.
use crate::arima::{
    errors::FitResult,
    order::{InformationCriterion, OrderTriple},
};

/// Fits an ARIMA model of a given order to a gap-free series.
///
/// Implementors are shared read-only across column workers, hence `Sync`.
pub trait ArimaFitter: Sync {
    type Model: ArimaModel;

    /// Fit `order` to `series` (oldest first, all finite).
    ///
    /// # Errors
    /// Any [`FitError`](crate::arima::errors::FitError); callers treat every
    /// failure as "this candidate is unusable".
    fn fit(&self, series: &[f64], order: OrderTriple) -> FitResult<Self::Model>;
}

/// A fitted model able to extrapolate and report its fit quality.
pub trait ArimaModel {
    fn order(&self) -> OrderTriple;

    /// Point forecasts for the next `steps` positions after the fitted data.
    ///
    /// # Errors
    /// [`FitError::NonFiniteForecast`](crate::arima::errors::FitError::NonFiniteForecast)
    /// when the recursion diverges.
    fn forecast(&self, steps: usize) -> FitResult<Vec<f64>>;

    /// Value of `kind` for this fit (lower is better).
    fn criterion(&self, kind: InformationCriterion) -> f64;

    /// In-sample one-step residuals in the units of the fitted series.
    fn residuals(&self) -> &[f64];
}
