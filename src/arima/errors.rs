//! arima::errors — failures while fitting or forecasting a candidate model.
//!
//! Every variant is recoverable from the engine's point of view: order
//! selection skips the candidate, and segment imputation downgrades the run
//! to interpolation.
use crate::{arima::order::OrderTriple, optimization::errors::OptError};

pub type FitResult<T> = Result<T, FitError>;

#[derive(Debug, Clone, PartialEq)]
pub enum FitError {
    // ---- Input ----
    /// Too few observations for the requested order.
    InsufficientData {
        order: OrderTriple,
        needed: usize,
        found: usize,
    },
    /// Non-finite observation handed to the fitter.
    InvalidData {
        index: usize,
        value: f64,
    },
    /// Unknown information-criterion name.
    UnknownCriterion {
        name: String,
    },

    // ---- Estimation ----
    /// The likelihood maximization failed.
    Optimization(OptError),

    // ---- Forecast ----
    /// A forecast step produced a non-finite value.
    NonFiniteForecast {
        step: usize,
        value: f64,
    },
}

impl std::error::Error for FitError {}

impl std::fmt::Display for FitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FitError::InsufficientData { order, needed, found } => {
                write!(f, "ARIMA{order} needs at least {needed} observations, found {found}")
            }
            FitError::InvalidData { index, value } => {
                write!(f, "Invalid observation at index {index}: {value}, must be finite")
            }
            FitError::UnknownCriterion { name } => {
                write!(f, "Unknown information criterion '{name}': expected aic, bic or hqic")
            }
            FitError::Optimization(err) => write!(f, "Likelihood optimization failed: {err}"),
            FitError::NonFiniteForecast { step, value } => {
                write!(f, "Forecast step {step} is not finite: {value}")
            }
        }
    }
}

impl From<OptError> for FitError {
    fn from(err: OptError) -> Self {
        FitError::Optimization(err)
    }
}
