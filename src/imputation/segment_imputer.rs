//! imputation::segment_imputer — fill each missing run from its history.
//!
//! Purpose
//! -------
//! Impute every missing run of a column with the column's chosen order,
//! forecasting from whichever side of the run has enough history and
//! interpolating otherwise.
//!
//! Key behaviors
//! -------------
//! - Runs are processed left to right over a working copy that starts as
//!   the provisional fill of the column and accumulates each run's values,
//!   so later runs see earlier imputations as history.
//! - `before ≥ MIN_HISTORY` → forecast forward from the values before the
//!   run; else `after ≥ MIN_HISTORY` → fit the reversed values after the
//!   run and reverse the forecast; else interpolate the working copy.
//! - A failed fit or forecast downgrades that run alone to interpolation
//!   and is logged with `tracing::warn!`.
//!
//! Invariants & assumptions
//! ------------------------
//! - Observed positions are never written.
//! - One [`RunReport`] per run, in series order.
use crate::{
    arima::{ArimaFitter, ArimaModel, FitError, FitResult, OrderTriple},
    imputation::{
        interpolation::interpolate_linear,
        report::{RunReport, RunStrategy},
        segments::{find_runs, missing_mask, observed_values, provisional_fill, MissingRun},
    },
};
use tracing::{debug, warn};

/// Minimum history on one side of a run needed to forecast into it.
pub const MIN_HISTORY: usize = 10;

/// Column after run imputation, before the plausibility guard.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentOutcome {
    pub values: Vec<Option<f64>>,
    pub runs: Vec<RunReport>,
}

fn forecast_from<F>(fitter: &F, history: &[f64], order: OrderTriple, steps: usize) -> FitResult<Vec<f64>>
where
    F: ArimaFitter + ?Sized,
{
    let forecast = fitter.fit(history, order)?.forecast(steps)?;
    if let Some((step, &value)) = forecast.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(FitError::NonFiniteForecast { step, value });
    }
    Ok(forecast)
}

fn impute_run<F>(
    fitter: &F, working: &[Option<f64>], run: &MissingRun, order: OrderTriple,
) -> FitResult<Option<(Vec<f64>, RunStrategy)>>
where
    F: ArimaFitter + ?Sized,
{
    let before = observed_values(&working[..run.start]);
    if before.len() >= MIN_HISTORY {
        let values = forecast_from(fitter, &before, order, run.len())?;
        return Ok(Some((values, RunStrategy::ForwardForecast)));
    }
    let mut after = observed_values(&working[run.end + 1..]);
    if after.len() >= MIN_HISTORY {
        after.reverse();
        let mut values = forecast_from(fitter, &after, order, run.len())?;
        values.reverse();
        return Ok(Some((values, RunStrategy::BackwardForecast)));
    }
    Ok(None)
}

/// Impute every missing run of `original` with `order`.
pub fn impute_runs<F>(fitter: &F, original: &[Option<f64>], order: OrderTriple) -> SegmentOutcome
where
    F: ArimaFitter + ?Sized,
{
    let runs = find_runs(&missing_mask(original));
    let mut working = provisional_fill(original);
    let mut reports = Vec::with_capacity(runs.len());

    for run in &runs {
        let span = run.start..=run.end;
        let strategy = match impute_run(fitter, &working, run, order) {
            Ok(Some((values, strategy))) => {
                for (slot, v) in working[span].iter_mut().zip(values) {
                    *slot = Some(v);
                }
                strategy
            }
            Ok(None) => {
                let interpolated = interpolate_linear(&working);
                working[span.clone()].copy_from_slice(&interpolated[span]);
                RunStrategy::Interpolation
            }
            Err(err) => {
                warn!(
                    start = run.start,
                    end = run.end,
                    %order,
                    error = %err,
                    "run forecast failed, interpolating"
                );
                let interpolated = interpolate_linear(&working);
                working[span.clone()].copy_from_slice(&interpolated[span]);
                RunStrategy::InterpolationAfterFailure { reason: err.to_string() }
            }
        };
        debug!(start = run.start, end = run.end, ?strategy, "imputed run");
        reports.push(RunReport::new(run, strategy));
    }

    SegmentOutcome { values: working, runs: reports }
}
