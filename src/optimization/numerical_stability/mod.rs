//! numerical_stability — constrained coefficient maps for ARMA fitting.
//!
//! Purpose
//! -------
//! Let the optimizer search an unconstrained space while every candidate
//! ARMA model it evaluates stays stationary on the AR side and invertible on
//! the MA side.
//!
//! Conventions
//! -----------
//! - Unconstrained coordinates are mapped through scaled `tanh` to partial
//!   autocorrelations, then through the Durbin–Levinson recursion.
//! - Pure functions over `ndarray` vectors; no logging, no I/O.
//!
//! Testing notes
//! -------------
//! - [`transformations`] tests the AR(1) closed form, an AR(2) round trip,
//!   and rejection of explosive polynomials.

pub mod transformations;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::transformations::{STATIONARITY_MARGIN, constrain_ar, constrain_ma, unconstrain_ar};

pub mod prelude {
    pub use super::transformations::{
        STATIONARITY_MARGIN, constrain_ar, constrain_ma, unconstrain_ar,
    };
}
