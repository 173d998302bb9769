//! optimization — likelihood maximization and parameter transforms.
//!
//! Purpose
//! -------
//! Provide the numerical optimization layer used to fit ARIMA candidates
//! during order selection and segment imputation. Callers implement a
//! log-likelihood, pick tolerances, and receive fitted parameters plus
//! solver diagnostics without touching argmin types.
//!
//! Key behaviors
//! -------------
//! - [`loglik_optimizer`] maximizes a log-likelihood `ℓ(θ)` with L-BFGS and a
//!   configurable line search, falling back to finite-difference gradients
//!   when no analytic gradient exists.
//! - [`numerical_stability`] maps unconstrained optimizer coordinates onto
//!   stationary AR and invertible MA polynomials.
//! - [`errors`] folds configuration problems, numeric failures and argmin
//!   backend errors into one [`OptError`](errors::OptError).
//!
//! Invariants & assumptions
//! ------------------------
//! - Optimizers work in an unconstrained space `θ ∈ ℝᵏ`; every constrained
//!   coefficient is obtained through a transform in [`numerical_stability`].
//! - A likelihood that cannot be evaluated at some `θ` reports an
//!   `OptError`; nothing in this layer panics on user data.
//!
//! Conventions
//! -----------
//! - The solver minimizes `c(θ) = -ℓ(θ)`; outcomes report `ℓ`.
//! - Vectors use the `ndarray` aliases from [`loglik_optimizer::types`].
//! - Progress is only reported through `tracing` when
//!   [`MLEOptions::verbose`](loglik_optimizer::MLEOptions) is set.
//!
//! Downstream usage
//! ----------------
//! - `arima::css` implements `LogLikelihood` for the conditional sum of
//!   squares objective and calls [`maximize`](loglik_optimizer::maximize).
//!
//! Testing notes
//! -------------
//! - Submodules carry unit tests for solver construction, the adapter sign
//!   convention and the polynomial transforms. End-to-end fits are covered by
//!   the ARIMA fitter tests.

pub mod errors;
pub mod loglik_optimizer;
pub mod numerical_stability;

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use sensor_gapfill::optimization::prelude::*;
//
// to import the main optimization surface in a single line.

pub mod prelude {
    pub use super::errors::{OptError, OptResult};
    pub use super::loglik_optimizer::prelude::*;
    pub use super::numerical_stability::prelude::*;
}
