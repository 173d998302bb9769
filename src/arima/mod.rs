//! arima — the time-series model primitive behind gap imputation.
//!
//! Purpose
//! -------
//! Fit ARIMA(p, d, q) models to gap-free series, forecast from them, and
//! report information criteria and residuals. The imputation engine only
//! talks to the [`ArimaFitter`] / [`ArimaModel`] traits; [`CssArimaFitter`]
//! is the default implementation.
//!
//! Key behaviors
//! -------------
//! - [`OrderTriple`] and [`InformationCriterion`] describe what to fit and
//!   how candidates are compared.
//! - [`differencing`] removes and restores integration order.
//! - [`css`] estimates ARMA coefficients by conditional sum of squares with
//!   the crate's L-BFGS maximizer.
//!
//! Invariants & assumptions
//! ------------------------
//! - Fits never panic on user data; every failure is a [`FitError`].
//! - Fitted AR polynomials are stationary and MA polynomials invertible.
//!
//! Downstream usage
//! ----------------
//! - `imputation::order_selection` fits each grid candidate and compares
//!   [`ArimaModel::criterion`].
//! - `imputation::segment_imputer` forecasts each gap from the history on
//!   one side of it.
//! - `imputation::column` refits the chosen order on the completed series
//!   for diagnostics.

pub mod css;
pub mod differencing;
pub mod errors;
pub mod order;
pub mod traits;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::css::{CssArimaFitter, FittedArima};
pub use self::errors::{FitError, FitResult};
pub use self::order::{InformationCriterion, OrderTriple};
pub use self::traits::{ArimaFitter, ArimaModel};

// ---- Optional convenience prelude for downstream crates -------------------

pub mod prelude {
    pub use super::css::{CssArimaFitter, FittedArima};
    pub use super::errors::{FitError, FitResult};
    pub use super::order::{InformationCriterion, OrderTriple};
    pub use super::traits::{ArimaFitter, ArimaModel};
}
