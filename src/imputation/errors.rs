//! imputation::errors — error surface of the gap-imputation engine.
//!
//! Purpose
//! -------
//! Collect the failures the engine can report in one enum. Only a few reach
//! the caller of [`impute_table`](crate::imputation::orchestrator::impute_table):
//! a bad time column, no usable timestamps, nothing to process, or invalid
//! options. The column-level variants (`Stationarity`, `Fit`,
//! `IncompleteImputation`, `NoObservedValues`) are caught by the column procedure and turned into
//! a fallback report.
//!
//! Conventions
//! -----------
//! - Lower layers keep their own enums ([`TableError`], [`StatTestError`],
//!   [`FitError`]); `From` conversions wrap them so `?` works across layers.
use crate::{arima::errors::FitError, statistical_tests::errors::StatTestError, table::TableError};

pub type ImputeResult<T> = Result<T, ImputeError>;

#[derive(Debug, Clone, PartialEq)]
pub enum ImputeError {
    // ---- Table / grid ----
    /// Structural table failure.
    Table(TableError),
    /// The configured time column does not exist.
    TimeColumnMissing { name: String, available: Vec<String> },
    /// The time column exists but does not hold timestamps.
    NotATimestampColumn { name: String },
    /// Every timestamp is absent.
    NoValidTimestamps { column: String },
    /// Neither an explicit nor an auto-detected column survived filtering.
    NoColumnsToProcess,

    // ---- Configuration ----
    /// Cadence string could not be parsed or is not positive.
    InvalidCadence { input: String },
    /// An option value is out of range.
    InvalidOptions { field: &'static str, reason: String },
    /// Unknown sensor data type name.
    UnknownDataType { name: String },
    /// Malformed TOML configuration.
    ConfigParse { message: String },

    // ---- Column procedure ----
    /// The unit-root test failed while choosing the differencing order.
    Stationarity(StatTestError),
    /// A model fit failed where the procedure cannot skip it.
    Fit(FitError),
    /// Missing values survived every filling step.
    IncompleteImputation { remaining: usize },
    /// The column has no observed value to fit or interpolate from.
    NoObservedValues,
}

impl std::error::Error for ImputeError {}

impl std::fmt::Display for ImputeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImputeError::Table(err) => write!(f, "Table error: {err}"),
            ImputeError::TimeColumnMissing { name, available } => write!(
                f,
                "Time column '{name}' does not exist. Available columns: {}",
                available.join(", ")
            ),
            ImputeError::NotATimestampColumn { name } => {
                write!(f, "Time column '{name}' does not hold timestamps")
            }
            ImputeError::NoValidTimestamps { column } => {
                write!(f, "Time column '{column}' has no valid timestamps")
            }
            ImputeError::NoColumnsToProcess => write!(f, "No numeric columns to impute"),
            ImputeError::InvalidCadence { input } => {
                write!(f, "Invalid cadence '{input}': expected e.g. 15min, 30min, 1h, 45s, 2d")
            }
            ImputeError::InvalidOptions { field, reason } => {
                write!(f, "Invalid option '{field}': {reason}")
            }
            ImputeError::UnknownDataType { name } => write!(
                f,
                "Unknown data type '{name}': expected flux, aqi, sapflow, nai or micro_meteorology"
            ),
            ImputeError::ConfigParse { message } => write!(f, "Invalid configuration: {message}"),
            ImputeError::Stationarity(err) => write!(f, "Stationarity test failed: {err}"),
            ImputeError::Fit(err) => write!(f, "Model fit failed: {err}"),
            ImputeError::IncompleteImputation { remaining } => {
                write!(f, "{remaining} values are still missing after imputation")
            }
            ImputeError::NoObservedValues => write!(f, "Column has no observed values"),
        }
    }
}

impl From<TableError> for ImputeError {
    fn from(err: TableError) -> Self {
        ImputeError::Table(err)
    }
}

impl From<StatTestError> for ImputeError {
    fn from(err: StatTestError) -> Self {
        ImputeError::Stationarity(err)
    }
}

impl From<FitError> for ImputeError {
    fn from(err: FitError) -> Self {
        ImputeError::Fit(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Wrapping of lower-layer errors via `From`.
    // - Message payloads that end up in fallback reports.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Ensure a unit-root failure converts with `?` and keeps its message.
    //
    // Given
    // -----
    // - `StatTestError::ConstantSeries`.
    //
    // Expect
    // ------
    // - `ImputeError::Stationarity` whose message mentions the constant series.
    fn stat_test_errors_wrap_into_stationarity() {
        // Arrange
        let err: ImputeError = StatTestError::ConstantSeries.into();

        // Act
        let msg = err.to_string();

        // Assert
        assert!(matches!(err, ImputeError::Stationarity(StatTestError::ConstantSeries)));
        assert!(msg.contains("constant"), "{msg}");
    }

    #[test]
    // Purpose
    // -------
    // Check the missing time column message lists the available columns.
    //
    // Given
    // -----
    // - A missing "record_time" with columns "time" and "pm10".
    //
    // Expect
    // ------
    // - Both names appear in the message.
    fn time_column_missing_lists_alternatives() {
        // Arrange
        let err = ImputeError::TimeColumnMissing {
            name: "record_time".into(),
            available: vec!["time".into(), "pm10".into()],
        };

        // Act
        let msg = err.to_string();

        // Assert
        assert!(msg.contains("record_time") && msg.contains("time, pm10"), "{msg}");
    }
}
