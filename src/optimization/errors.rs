//! optimization::errors — failures of the likelihood maximizer.
//!
//! Covers solver configuration (`MLEOptions`), objective evaluation (cost,
//! gradient, parameter vector) and the solver outcome. Errors raised inside
//! the argmin loop come back boxed; [`OptError::from`] unboxes crate errors
//! and folds argmin's own kinds into [`OptError::Backend`].
use argmin::core::{ArgminError, Error};

/// Result alias for optimizer operations.
pub type OptResult<T> = Result<T, OptError>;

#[derive(Debug, Clone, PartialEq)]
pub enum OptError {
    // ---- Solver configuration ----
    InvalidTolGrad { tol: f64, reason: &'static str },
    InvalidTolCost { tol: f64, reason: &'static str },
    InvalidMaxIter { max_iter: usize, reason: &'static str },
    /// Neither a gradient nor a cost tolerance was set.
    NoTolerancesProvided,
    InvalidLineSearch { name: String, reason: &'static str },
    InvalidLBFGSMem { mem: usize, reason: &'static str },

    // ---- Objective evaluation ----
    /// The objective has no analytic gradient; finite differences are used.
    GradientNotImplemented,
    GradientDimMismatch { expected: usize, found: usize },
    InvalidGradient { index: usize, value: f64, reason: &'static str },
    NonFiniteCost { value: f64 },
    ThetaLengthMismatch { expected: usize, actual: usize },
    InvalidThetaInput { index: usize, value: f64 },
    /// Fewer usable observations than conditioning plus free parameters.
    InsufficientObservations { needed: usize, available: usize },
    /// The solver asked for more cost and gradient evaluations than allowed.
    EvaluationBudgetExceeded { budget: usize },

    // ---- Solver outcome ----
    InvalidThetaHat { index: usize, value: f64, reason: &'static str },
    MissingThetaHat,

    /// Error reported by argmin itself. `kind` names the argmin variant.
    Backend { kind: &'static str, text: String },
}

impl std::error::Error for OptError {}

impl std::fmt::Display for OptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OptError::InvalidTolGrad { tol, reason } => write!(f, "gradient tolerance {tol}: {reason}"),
            OptError::InvalidTolCost { tol, reason } => write!(f, "cost tolerance {tol}: {reason}"),
            OptError::InvalidMaxIter { max_iter, reason } => write!(f, "max_iter {max_iter}: {reason}"),
            OptError::NoTolerancesProvided => write!(f, "no stopping rule configured"),
            OptError::InvalidLineSearch { name, reason } => write!(f, "line searcher '{name}': {reason}"),
            OptError::InvalidLBFGSMem { mem, reason } => write!(f, "L-BFGS memory {mem}: {reason}"),

            OptError::GradientNotImplemented => write!(f, "objective has no analytic gradient"),
            OptError::GradientDimMismatch { expected, found } => {
                write!(f, "gradient has {found} entries, expected {expected}")
            }
            OptError::InvalidGradient { index, value, reason } => {
                write!(f, "gradient entry {index} is {value}: {reason}")
            }
            OptError::NonFiniteCost { value } => write!(f, "objective evaluated to {value}"),
            OptError::ThetaLengthMismatch { expected, actual } => {
                write!(f, "parameter vector has {actual} entries, expected {expected}")
            }
            OptError::InvalidThetaInput { index, value } => {
                write!(f, "parameter {index} is {value}, must be finite")
            }
            OptError::InsufficientObservations { needed, available } => {
                write!(f, "objective needs {needed} observations, {available} available")
            }
            OptError::EvaluationBudgetExceeded { budget } => {
                write!(f, "solver exceeded its budget of {budget} objective evaluations")
            }

            OptError::InvalidThetaHat { index, value, reason } => {
                write!(f, "estimated parameter {index} is {value}: {reason}")
            }
            OptError::MissingThetaHat => write!(f, "solver finished without a parameter estimate"),

            OptError::Backend { kind, text } => write!(f, "argmin {kind}: {text}"),
        }
    }
}

impl From<Error> for OptError {
    fn from(err: Error) -> Self {
        let err = match err.downcast::<OptError>() {
            Ok(opt_err) => return opt_err,
            Err(err) => err,
        };
        match err.downcast::<ArgminError>() {
            Ok(argmin_err) => {
                let kind = match &argmin_err {
                    ArgminError::InvalidParameter { .. } => "invalid parameter",
                    ArgminError::NotImplemented { .. } => "not implemented",
                    ArgminError::NotInitialized { .. } => "not initialized",
                    ArgminError::ConditionViolated { .. } => "condition violated",
                    ArgminError::CheckpointNotFound { .. } => "checkpoint not found",
                    ArgminError::PotentialBug { .. } => "potential bug",
                    ArgminError::ImpossibleError { .. } => "impossible error",
                    _ => "error",
                };
                OptError::Backend { kind, text: argmin_err.to_string() }
            }
            Err(other) => OptError::Backend { kind: "error", text: other.to_string() },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Unboxing of crate errors raised inside a cost evaluation.
    // - Folding of argmin's own error kinds into `Backend`.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // A non-finite CSS objective surfaces unchanged after passing through
    // argmin's boxed error type.
    //
    // Given
    // -----
    // - `NonFiniteCost { value: inf }` boxed as `argmin::core::Error`.
    //
    // Expect
    // ------
    // - The identical variant after conversion.
    fn boxed_opt_error_is_recovered() {
        // Arrange
        let boxed: Error = OptError::NonFiniteCost { value: f64::INFINITY }.into();

        // Act
        let back = OptError::from(boxed);

        // Assert
        assert_eq!(back, OptError::NonFiniteCost { value: f64::INFINITY });
    }

    #[test]
    // Purpose
    // -------
    // argmin's native errors keep their kind and message.
    //
    // Given
    // -----
    // - `ArgminError::InvalidParameter` mentioning "tol".
    //
    // Expect
    // ------
    // - `Backend { kind: "invalid parameter", .. }` whose text mentions "tol".
    fn argmin_error_maps_to_backend_with_kind() {
        // Arrange
        let boxed: Error = ArgminError::InvalidParameter { text: "tol".to_string() }.into();

        // Act
        let mapped = OptError::from(boxed);

        // Assert
        match mapped {
            OptError::Backend { kind, text } => {
                assert_eq!(kind, "invalid parameter");
                assert!(text.contains("tol"));
            }
            other => panic!("expected Backend, got {other:?}"),
        }
    }
}
