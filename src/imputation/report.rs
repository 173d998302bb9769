//! imputation::report — durable diagnostics of an imputation run.
//!
//! Purpose
//! -------
//! Describe what the engine did, per run, per column and per table, in
//! plain serde-serializable types that callers can log, persist as JSON, or
//! assert on in tests.
//!
//! Key behaviors
//! -------------
//! - [`RunReport`] names the strategy actually applied to one missing run,
//!   including downgrades after a failed fit.
//! - [`ImputationReport`] carries a column's status, chosen order, refit
//!   diagnostics and correction count.
//! - [`DatasetSummary`] aggregates column reports with grid diagnostics and
//!   counts by status.
//!
//! Conventions
//! -----------
//! - Optional diagnostics are `None` when they could not be computed (no
//!   refit, fallback column), never NaN.
use crate::{
    arima::{InformationCriterion, OrderTriple},
    imputation::{
        grid::Cadence,
        order_selection::OrderSelection,
        segments::{MissingRun, RunPosition},
    },
};
use serde::{Deserialize, Serialize};

/// Outcome class of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImputationStatus {
    /// No missing values; the column was left unchanged.
    Complete,
    /// Model-based imputation finished.
    Success,
    /// The column procedure failed and the column was interpolated.
    FallbackInterpolation,
}

/// How one missing run was filled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum RunStrategy {
    /// Forecast from the history before the run.
    ForwardForecast,
    /// Forecast from the reversed history after the run.
    BackwardForecast,
    /// Not enough history on either side.
    Interpolation,
    /// A fit or forecast failed; the run was interpolated instead.
    InterpolationAfterFailure { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub start: usize,
    pub end: usize,
    pub position: RunPosition,
    pub strategy: RunStrategy,
}

impl RunReport {
    pub fn new(run: &MissingRun, strategy: RunStrategy) -> Self {
        Self { start: run.start, end: run.end, position: run.position, strategy }
    }

    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Diagnostics for one column.
///
/// Fields
/// ------
/// - `column`: source column name.
/// - `status`: see [`ImputationStatus`].
/// - `missing_count`: absent values on the grid before imputation.
/// - `order`: chosen order (`Success` only).
/// - `selection`: full order-search outcome (`Success` only).
/// - `criterion`: criterion requested for order selection.
/// - `criterion_value`, `aic`, `bic`, `hqic`, `mse`, `mae`: diagnostic
///   refit on the completed series; `None` if the refit failed.
/// - `corrections`: imputed values replaced by the plausibility guard.
/// - `error`: message of the failure behind a fallback.
/// - `runs`: one entry per missing run, in series order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImputationReport {
    pub column: String,
    pub status: ImputationStatus,
    pub missing_count: usize,
    pub order: Option<OrderTriple>,
    pub selection: Option<OrderSelection>,
    pub criterion: InformationCriterion,
    pub criterion_value: Option<f64>,
    pub aic: Option<f64>,
    pub bic: Option<f64>,
    pub hqic: Option<f64>,
    pub mse: Option<f64>,
    pub mae: Option<f64>,
    pub corrections: usize,
    pub error: Option<String>,
    pub runs: Vec<RunReport>,
}

impl ImputationReport {
    fn empty(column: &str, status: ImputationStatus, criterion: InformationCriterion) -> Self {
        Self {
            column: column.to_string(),
            status,
            missing_count: 0,
            order: None,
            selection: None,
            criterion,
            criterion_value: None,
            aic: None,
            bic: None,
            hqic: None,
            mse: None,
            mae: None,
            corrections: 0,
            error: None,
            runs: Vec::new(),
        }
    }

    /// Report for a column without gaps.
    pub fn complete(column: &str, criterion: InformationCriterion) -> Self {
        Self::empty(column, ImputationStatus::Complete, criterion)
    }

    /// Report for a column that fell back to interpolation.
    pub fn fallback(
        column: &str, criterion: InformationCriterion, missing_count: usize, error: String,
    ) -> Self {
        Self {
            missing_count,
            error: Some(error),
            ..Self::empty(column, ImputationStatus::FallbackInterpolation, criterion)
        }
    }

    /// Start a `Success` report; diagnostics are filled in by the caller.
    pub fn success(
        column: &str, criterion: InformationCriterion, missing_count: usize,
        selection: OrderSelection,
    ) -> Self {
        Self {
            missing_count,
            order: Some(selection.order),
            selection: Some(selection),
            ..Self::empty(column, ImputationStatus::Success, criterion)
        }
    }
}

/// Diagnostics of the grid normalization step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridReport {
    pub cadence: Cadence,
    pub rows_in: usize,
    pub grid_rows: usize,
    /// Grid rows with no matching input row.
    pub synthetic_rows: usize,
    pub dropped_absent_timestamp: usize,
    pub dropped_duplicate: usize,
    pub dropped_misaligned: usize,
    /// Rows in the returned table after filtering back to input timestamps.
    pub rows_returned: usize,
}

/// Table-level summary returned next to the completed table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub processed_columns: Vec<String>,
    pub successful: usize,
    pub fallback: usize,
    pub complete: usize,
    pub keep_original: bool,
    pub grid: Option<GridReport>,
    pub columns: Vec<ImputationReport>,
}

impl DatasetSummary {
    pub fn new(columns: Vec<ImputationReport>, keep_original: bool, grid: Option<GridReport>) -> Self {
        let count = |s: ImputationStatus| columns.iter().filter(|r| r.status == s).count();
        Self {
            processed_columns: columns.iter().map(|r| r.column.clone()).collect(),
            successful: count(ImputationStatus::Success),
            fallback: count(ImputationStatus::FallbackInterpolation),
            complete: count(ImputationStatus::Complete),
            keep_original,
            grid,
            columns,
        }
    }

    pub fn total_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn report(&self, column: &str) -> Option<&ImputationReport> {
        self.columns.iter().find(|r| r.column == column)
    }

    /// Pretty-printed JSON.
    ///
    /// # Errors
    /// Serialization failure from `serde_json`.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
