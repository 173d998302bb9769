//! statistical_tests::errors — error surface for unit-root testing.
//!
//! Purpose
//! -------
//! Provide the error enum and result alias returned by the augmented
//! Dickey–Fuller test and its validation helpers. Stationarity probing
//! treats every variant as a test failure that the caller must handle.
//!
//! Conventions
//! -----------
//! - Messages describe the violated requirement ("series is constant",
//!   "need at least 4 observations") rather than numerical internals.

pub type StatTestResult<T> = Result<T, StatTestError>;

/// StatTestError — failure conditions of the unit-root test.
///
/// Variants
/// --------
/// - `InsufficientData { needed, found }`
///   Too few observations for the lag structure of the regression.
/// - `InvalidData { index, value }`
///   A non-finite observation.
/// - `ConstantSeries`
///   Every observation is identical, so the regression is undefined.
/// - `SingularDesign`
///   The regressor cross-product matrix cannot be inverted.
/// - `DegenerateRegression { statistic }`
///   The fitted regression has (near) zero residual variance, so the
///   t-statistic is not finite.
#[derive(Debug, Clone, PartialEq)]
pub enum StatTestError {
    //------ Input validation errors ------
    InsufficientData { needed: usize, found: usize },
    InvalidData { index: usize, value: f64 },
    ConstantSeries,

    //------ Regression errors ------
    SingularDesign,
    DegenerateRegression { statistic: f64 },
}

impl std::error::Error for StatTestError {}

impl std::fmt::Display for StatTestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatTestError::InsufficientData { needed, found } => {
                write!(f, "Need at least {needed} observations for the unit-root test, found {found}.")
            }
            StatTestError::InvalidData { index, value } => {
                write!(f, "Invalid data value at index {index}: {value}. Must be a finite number.")
            }
            StatTestError::ConstantSeries => {
                write!(f, "Invalid input: series is constant.")
            }
            StatTestError::SingularDesign => {
                write!(f, "Unit-root regression design matrix is singular.")
            }
            StatTestError::DegenerateRegression { statistic } => {
                write!(f, "Unit-root regression is degenerate (test statistic {statistic}).")
            }
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
    // - Embedding of payload values into `Display` messages.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Verify that `InsufficientData` reports both counts.
    //
    // Given
    // -----
    // - `StatTestError::InsufficientData { needed: 4, found: 2 }`.
    //
    // Expect
    // ------
    // - The message contains "4" and "2".
    fn insufficient_data_includes_counts_in_display() {
        // Arrange
        let err = StatTestError::InsufficientData { needed: 4, found: 2 };

        // Act
        let msg = err.to_string();

        // Assert
        assert!(msg.contains('4') && msg.contains('2'), "Got: {msg}");
    }

    #[test]
    // Purpose
    // -------
    // Ensure the constant-series message is human readable.
    //
    // Given
    // -----
    // - `StatTestError::ConstantSeries`.
    //
    // Expect
    // ------
    // - The message mentions "constant".
    fn constant_series_display_mentions_constant() {
        // Act
        let msg = StatTestError::ConstantSeries.to_string();

        // Assert
        assert!(msg.contains("constant"), "Got: {msg}");
    }
}
