//! sensor_gapfill — automatic ARIMA gap imputation for environmental sensor
//! time series.
//!
//! Purpose
//! -------
//! Serve as the crate root. The crate takes irregular, gap-ridden sensor
//! tables (air quality, sap flow, micrometeorology), re-indexes them onto a
//! regular time grid, and fills every gap with a per-column ARIMA model,
//! falling back to interpolation whenever modeling is not justified.
//!
//! Key behaviors
//! -------------
//! - [`table`] holds typed columnar data with explicit absent cells.
//! - [`imputation`] is the engine: grid normalization, order selection,
//!   run-wise forecasting, plausibility guard, and table orchestration.
//! - [`arima`] fits and forecasts ARIMA(p, d, q) models by conditional sum
//!   of squares; [`optimization`] provides the L-BFGS maximizer behind it.
//! - [`statistical_tests`] provides the augmented Dickey–Fuller test used
//!   to choose the differencing order.
//! - [`evaluation`] masks complete series and scores the reconstruction.
//!
//! Invariants & assumptions
//! ------------------------
//! - Public entry points never panic on user data; failures are typed
//!   errors or, inside the engine, fallback reports.
//! - The crate emits `tracing` events but never installs a subscriber.
//!
//! Conventions
//! -----------
//! - Absent values are `None`; timestamps are naive `chrono` date-times.
//! - Each subsystem owns an error enum and a `Result` alias.
//!
//! Downstream usage
//! ----------------
//! - Build a [`table::Table`], call [`imputation::impute_table`] with
//!   [`imputation::ImputeOptions`], persist the returned
//!   [`imputation::DatasetSummary`].
//! - Custom model backends or unit-root tests plug in through
//!   [`arima::ArimaFitter`] and [`statistical_tests::StationarityTest`] via
//!   [`imputation::ImputationEngine`].
//!
//! Testing notes
//! -------------
//! - Unit tests live next to the code; cross-module scenarios are in
//!   `tests/integration_imputation.rs` and invariants in
//!   `tests/proptest_invariants.rs`.

pub mod arima;
pub mod evaluation;
pub mod imputation;
pub mod optimization;
pub mod statistical_tests;
pub mod table;
