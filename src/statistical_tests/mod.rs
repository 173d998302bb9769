//! statistical_tests — unit-root testing for stationarity probing.
//!
//! Purpose
//! -------
//! Provide the stationarity primitive consumed by order selection: a test
//! that maps a gap-free series to a p-value under the unit-root null.
//!
//! Key behaviors
//! -------------
//! - [`StationarityTest`] is the seam between the imputation engine and the
//!   concrete test, so alternative tests (or test doubles) can be injected.
//! - [`AdfTest`] / [`AdfOutcome`] implement the augmented Dickey–Fuller test
//!   with AIC lag selection and MacKinnon p-values.
//! - [`validate_series`] centralizes length, finiteness and variation checks.
//!
//! Invariants & assumptions
//! ------------------------
//! - Tests receive observed values only; missing entries are removed by
//!   the caller.
//! - Failures are reported through [`StatTestResult`] and never panic.
//!
//! Downstream usage
//! ----------------
//! - `imputation::stationarity` differences a column until
//!   [`StationarityTest::p_value`] drops to the 5 % level.
//!
//! Testing notes
//! -------------
//! - [`errors`] checks message payloads; [`validation`] covers every
//!   branch; [`adf`] covers the p-value surface and end-to-end decisions.

pub mod adf;
pub mod errors;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::adf::{AdfOutcome, AdfTest, CriticalValues};
pub use self::errors::{StatTestError, StatTestResult};
pub use self::validation::validate_series;

/// A unit-root test returning a p-value for the null of non-stationarity.
///
/// Implementors must be shareable across worker threads because columns
/// can be processed in parallel.
pub trait StationarityTest: Sync {
    fn p_value(&self, series: &[f64]) -> StatTestResult<f64>;
}

// ---- Optional convenience prelude for downstream crates -------------------

pub mod prelude {
    pub use super::StationarityTest;
    pub use super::adf::{AdfOutcome, AdfTest};
    pub use super::errors::{StatTestError, StatTestResult};
}
