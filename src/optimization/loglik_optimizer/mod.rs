//! loglik_optimizer — argmin-powered log-likelihood maximizer.
//!
//! Purpose
//! -------
//! Maximize a log-likelihood `ℓ(θ)` over an unconstrained parameter vector
//! with L-BFGS. Model code implements [`LogLikelihood`] and calls
//! [`maximize`]; everything argmin-specific stays inside this module.
//!
//! Key behaviors
//! -------------
//! - [`adapter::ArgMinAdapter`] turns `ℓ(θ)` into the argmin cost
//!   `c(θ) = -ℓ(θ)` and supplies finite-difference gradients when the model
//!   has no analytic one.
//! - [`maximize`] validates the start point, builds the solver chosen by
//!   [`traits::LineSearcher`] through [`builders`], and runs it with
//!   [`run::run_lbfgs`].
//! - [`OptimOutcome`] normalizes the final solver state.
//!
//! Invariants & assumptions
//! ------------------------
//! - Model code implements `ℓ(θ)` and, optionally, `∇ℓ(θ)`; never the cost.
//! - Invalid parameter vectors surface as [`OptError`](crate::optimization::errors::OptError)
//!   values, not panics.
//! - [`Tolerances`] and [`MLEOptions`] are validated on construction.
//!
//! Conventions
//! -----------
//! - Parameters are [`Theta`] (`Array1<f64>`); any constrained mapping lives
//!   in the model layer.
//! - [`OptimOutcome::value`] is reported in log-likelihood units.
//!
//! Downstream usage
//! ----------------
//! - The ARIMA fitter implements [`LogLikelihood`] for its conditional sum of
//!   squares objective and calls [`maximize`] once per candidate order.
//!
//! Testing notes
//! -------------
//! - Unit tests cover solver construction in [`builders`], the sign
//!   convention of [`adapter`], option validation in [`traits`], and a toy
//!   quadratic maximization in [`api`].

pub mod adapter;
pub mod api;
pub mod builders;
pub mod run;
pub mod traits;
pub mod types;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::api::maximize;
pub use self::traits::{LineSearcher, LogLikelihood, MLEOptions, OptimOutcome, Tolerances};
pub use self::types::{Cost, DEFAULT_LBFGS_MEM, EVALS_PER_ITER, FnEvalMap, Grad, Theta, UNCAPPED_ITERS};

// ---- Optional convenience prelude for downstream crates -------------------

pub mod prelude {
    pub use super::api::maximize;
    pub use super::traits::{LineSearcher, LogLikelihood, MLEOptions, OptimOutcome, Tolerances};
    pub use super::types::{Cost, Grad, Theta};
}
