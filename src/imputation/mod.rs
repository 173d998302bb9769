//! imputation — automatic gap filling for environmental sensor tables.
//!
//! Purpose
//! -------
//! Turn an irregular, gap-ridden sensor table into a complete one, column by
//! column, with a statistically chosen ARIMA model per column and a
//! diagnostic report for every decision.
//!
//! Key behaviors
//! -------------
//! - [`grid`] re-indexes the table onto a uniform time grid, making missing
//!   timestamps explicit.
//! - [`stationarity`] and [`order_selection`] choose `(p, d, q)` per column
//!   with a unit-root test and a bounded information-criterion search.
//! - [`segments`] splits the missing mask into runs; [`segment_imputer`]
//!   forecasts each run from the side with enough history.
//! - [`guard`] replaces implausible forecasts; [`column`] ties the steps
//!   together and falls back to interpolation when modeling fails.
//! - [`orchestrator`] runs columns (optionally in parallel) and restores the
//!   input row set; [`options`] and [`report`] are the configuration and
//!   output surfaces.
//!
//! Invariants & assumptions
//! ------------------------
//! - Every grid position of a processed column is filled on return.
//! - A column failure never aborts other columns or the table.
//! - Model fitting sees only observed or already-imputed values.
//!
//! Conventions
//! -----------
//! - Absent values are `None`; non-finite inputs are normalized to `None`
//!   by the table layer.
//! - Runs use inclusive `[start, end]` bounds on the grid.
//!
//! Downstream usage
//! ----------------
//! - Most callers need [`impute_table`] plus [`ImputeOptions`]; the preset
//!   helpers cover the common sensor families.
//!
//! Testing notes
//! -------------
//! - Each submodule has unit tests; scenarios across modules live in
//!   `tests/integration_imputation.rs` and property tests in
//!   `tests/proptest_invariants.rs`.

pub mod column;
pub mod errors;
pub mod grid;
pub mod guard;
pub mod interpolation;
pub mod options;
pub mod order_selection;
pub mod orchestrator;
pub mod report;
pub mod segment_imputer;
pub mod segments;
pub mod stationarity;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::column::{impute_series, ColumnOutcome};
pub use self::errors::{ImputeError, ImputeResult};
pub use self::grid::{detect_cadence, normalize, Cadence, CadenceSpec, NormalizedTable};
pub use self::guard::{apply_guard, PlausibilityEnvelope};
pub use self::options::{DataType, FitOptions, ImputeOptions, Preset, SearchBounds};
pub use self::order_selection::{select_order, OrderSelection};
pub use self::orchestrator::{
    fill_environmental_data, fill_missing_values, fill_missing_values_multicolumn, impute_column,
    impute_table, ImputationEngine, ImputationOutput, DEFAULT_TIME_COLUMN,
};
pub use self::report::{
    DatasetSummary, GridReport, ImputationReport, ImputationStatus, RunReport, RunStrategy,
};
pub use self::segment_imputer::{impute_runs, SegmentOutcome};
pub use self::segments::{find_runs, provisional_fill, MissingRun, RunPosition};
pub use self::stationarity::{find_difference_order, is_stationary};

// ---- Optional convenience prelude for downstream crates -------------------

pub mod prelude {
    pub use super::errors::{ImputeError, ImputeResult};
    pub use super::grid::{Cadence, CadenceSpec};
    pub use super::options::{DataType, ImputeOptions, Preset, SearchBounds};
    pub use super::orchestrator::{impute_column, impute_table, ImputationEngine, ImputationOutput};
    pub use super::report::{DatasetSummary, ImputationReport, ImputationStatus};
}
