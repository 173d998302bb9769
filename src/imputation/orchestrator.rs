//! imputation::orchestrator — table-level entry points.
//!
//! Purpose
//! -------
//! Drive the per-column procedure over a whole table: resolve target
//! columns, normalize onto the time grid once, impute every column
//! independently, write the results back, and restore the input row set.
//!
//! Key behaviors
//! -------------
//! - [`ImputationEngine`] binds an [`ArimaFitter`], a [`StationarityTest`]
//!   and [`ImputeOptions`]; the free functions use the default CSS fitter
//!   and ADF test.
//! - Target columns are either explicit (unknown or non-numeric names are
//!   skipped with a warning) or every numeric column except the time column
//!   and the excluded names.
//! - Columns run sequentially, or on the rayon pool when
//!   `options.parallel` is set; reports always follow target order.
//! - `keep_original` writes `<name>_filled` siblings, also for gap-free
//!   columns; otherwise columns are overwritten.
//! - The output keeps only rows whose timestamp was present in the input.
//!
//! Invariants & assumptions
//! ------------------------
//! - Column failures never escape; only table-level problems (time column,
//!   no timestamps, nothing to process, invalid options) are errors.
//! - The input table is never mutated.
//!
//! Downstream usage
//! ----------------
//! - QC pipelines call [`impute_table`] or one of the preset helpers
//!   ([`fill_missing_values_multicolumn`], [`fill_environmental_data`],
//!   [`fill_missing_values`]) and persist [`DatasetSummary`] as JSON.
//!
//! Testing notes
//! -------------
//! - Unit tests here cover column resolution and output shape; end-to-end
//!   scenarios live in `tests/integration_imputation.rs`.
use crate::{
    arima::{ArimaFitter, CssArimaFitter},
    imputation::{
        column::{impute_series, ColumnOutcome},
        errors::{ImputeError, ImputeResult},
        grid::{filter_to_original, normalize, Cadence, CadenceSpec},
        options::{ImputeOptions, Preset},
        report::{DatasetSummary, ImputationStatus},
    },
    statistical_tests::{AdfTest, StationarityTest},
    table::{Column, ColumnKind, Table},
};
use rayon::prelude::*;
use tracing::{info, warn};

/// Default time column name of the sensor exports.
pub const DEFAULT_TIME_COLUMN: &str = "record_time";

/// Suffix of the sibling column written in keep-original mode.
pub const FILLED_SUFFIX: &str = "_filled";

/// Completed table and its summary.
#[derive(Debug, Clone, PartialEq)]
pub struct ImputationOutput {
    pub table: Table,
    pub summary: DatasetSummary,
}

/// Imputation engine over a model backend `F` and a unit-root test `S`.
#[derive(Debug, Clone)]
pub struct ImputationEngine<F, S> {
    fitter: F,
    test: S,
    options: ImputeOptions,
}

impl ImputationEngine<CssArimaFitter, AdfTest> {
    /// Engine with the CSS fitter (configured from `options.fit`) and the
    /// ADF test.
    ///
    /// # Errors
    /// [`ImputeError::InvalidOptions`] if `options` fail validation.
    pub fn with_defaults(options: ImputeOptions) -> ImputeResult<Self> {
        options.validate()?;
        let fitter = CssArimaFitter::new(options.fit.to_mle_options()?);
        Ok(Self { fitter, test: AdfTest::default(), options })
    }
}

impl<F, S> ImputationEngine<F, S>
where
    F: ArimaFitter,
    S: StationarityTest,
{
    /// # Errors
    /// [`ImputeError::InvalidOptions`] if `options` fail validation.
    pub fn new(fitter: F, test: S, options: ImputeOptions) -> ImputeResult<Self> {
        options.validate()?;
        Ok(Self { fitter, test, options })
    }

    pub fn options(&self) -> &ImputeOptions {
        &self.options
    }

    /// Impute a bare series (no time grid).
    pub fn impute_series(&self, name: &str, series: &[Option<f64>]) -> ColumnOutcome {
        impute_series(&self.fitter, &self.test, name, series, self.options.bounds, self.options.criterion)
    }

    /// Columns to impute: `explicit` filtered to existing numeric columns,
    /// or every numeric column other than `time_col` and the excluded
    /// names.
    pub fn resolve_columns(&self, table: &Table, time_col: &str, explicit: Option<&[&str]>) -> Vec<String> {
        match explicit {
            Some(names) => names
                .iter()
                .filter(|&&name| match table.column(name) {
                    Some(col) if col.kind() == ColumnKind::Numeric && name != time_col => true,
                    Some(col) => {
                        warn!(column = name, kind = %col.kind(), "skipping non-numeric column");
                        false
                    }
                    None => {
                        warn!(column = name, "skipping unknown column");
                        false
                    }
                })
                .map(|name| name.to_string())
                .collect(),
            None => table
                .columns()
                .iter()
                .filter(|c| {
                    c.kind() == ColumnKind::Numeric
                        && c.name != time_col
                        && !self.options.is_excluded(&c.name)
                })
                .map(|c| c.name.clone())
                .collect(),
        }
    }

    /// Impute `table` on its time grid.
    ///
    /// # Errors
    /// - [`ImputeError::TimeColumnMissing`], [`ImputeError::NotATimestampColumn`]
    ///   or [`ImputeError::NoValidTimestamps`] for the time column.
    /// - [`ImputeError::NoColumnsToProcess`] when no target column remains.
    pub fn impute_table(
        &self, table: &Table, time_col: &str, columns: Option<&[&str]>,
    ) -> ImputeResult<ImputationOutput> {
        let grid = normalize(table, time_col, self.options.cadence)?;
        let targets = self.resolve_columns(table, time_col, columns);
        if targets.is_empty() {
            return Err(ImputeError::NoColumnsToProcess);
        }
        info!(columns = ?targets, cadence = %grid.cadence, "columns to impute");

        let run = |name: &String| -> ImputeResult<ColumnOutcome> {
            Ok(self.impute_series(name, grid.table.numeric(name)?))
        };
        let outcomes: Vec<ColumnOutcome> = if self.options.parallel {
            targets.par_iter().map(run).collect::<ImputeResult<_>>()?
        } else {
            targets.iter().map(run).collect::<ImputeResult<_>>()?
        };

        let mut out = grid.table.clone();
        let mut reports = Vec::with_capacity(outcomes.len());
        for (name, outcome) in targets.iter().zip(outcomes) {
            if self.options.keep_original {
                upsert_numeric(&mut out, &format!("{name}{FILLED_SUFFIX}"), outcome.values)?;
            } else {
                out.replace_numeric(name, outcome.values)?;
            }
            reports.push(outcome.report);
        }

        let out = filter_to_original(&out, time_col, &grid.original_timestamps)?;
        let mut grid_report = grid.report;
        grid_report.rows_returned = out.n_rows();
        let summary = DatasetSummary::new(reports, self.options.keep_original, Some(grid_report));
        info!(
            successful = summary.successful,
            fallback = summary.fallback,
            complete = summary.complete,
            rows = out.n_rows(),
            "imputation finished"
        );
        Ok(ImputationOutput { table: out, summary })
    }
}

fn upsert_numeric(table: &mut Table, name: &str, values: Vec<Option<f64>>) -> ImputeResult<()> {
    if table.column(name).is_some() {
        table.replace_numeric(name, values)?;
    } else {
        table.push_column(Column::numeric(name, values))?;
    }
    Ok(())
}

// ---- Free functions over the default engine ----

/// Impute `table` with the default fitter and test.
///
/// # Errors
/// See [`ImputationEngine::impute_table`] and [`ImputeOptions::validate`].
pub fn impute_table(
    table: &Table, time_col: &str, columns: Option<&[&str]>, options: &ImputeOptions,
) -> ImputeResult<ImputationOutput> {
    ImputationEngine::with_defaults(options.clone())?.impute_table(table, time_col, columns)
}

/// Impute a single bare series with the default fitter and test.
///
/// # Errors
/// [`ImputeError::InvalidOptions`] if `options` fail validation.
pub fn impute_column(values: &[Option<f64>], options: &ImputeOptions) -> ImputeResult<ColumnOutcome> {
    Ok(ImputationEngine::with_defaults(options.clone())?.impute_series("value", values))
}

fn preset_options(preset: Preset, cadence: Cadence, keep_original: bool) -> ImputeOptions {
    ImputeOptions { cadence: CadenceSpec::Fixed(cadence), keep_original, ..ImputeOptions::from_preset(preset) }
}

/// Standard (3, 1, 3) AIC search over the given or detected columns.
///
/// # Errors
/// See [`impute_table`].
pub fn fill_missing_values_multicolumn(
    table: &Table, time_col: &str, columns: Option<&[&str]>, cadence: Cadence, keep_original: bool,
) -> ImputeResult<Table> {
    let options = preset_options(Preset::Standard, cadence, keep_original);
    Ok(impute_table(table, time_col, columns, &options)?.table)
}

/// Conservative (2, 1, 2) AIC search for noisy environmental channels
/// (AQI, meteorology). Logs the envelope corrections of each column.
///
/// # Errors
/// See [`impute_table`].
pub fn fill_environmental_data(
    table: &Table, time_col: &str, columns: Option<&[&str]>, cadence: Cadence, keep_original: bool,
) -> ImputeResult<Table> {
    let options = preset_options(Preset::Environmental, cadence, keep_original);
    let out = impute_table(table, time_col, columns, &options)?;
    for report in &out.summary.columns {
        if report.status == ImputationStatus::Success {
            if report.corrections > 0 {
                info!(column = %report.column, corrections = report.corrections, "corrected implausible imputations");
            } else {
                info!(column = %report.column, "imputation within plausible range");
            }
        }
    }
    Ok(out.table)
}

/// Wide (5, 2, 5) AIC search on one named column.
///
/// # Errors
/// See [`impute_table`].
pub fn fill_missing_values(table: &Table, time_col: &str, column: &str, cadence: Cadence) -> ImputeResult<Table> {
    let options = preset_options(Preset::Wide, cadence, false);
    Ok(impute_table(table, time_col, Some(&[column]), &options)?.table)
}
