//! imputation::column — the per-column imputation procedure.
//!
//! Purpose
//! -------
//! Run the full pipeline on one grid-aligned column: order selection,
//! run-wise imputation, plausibility guard, diagnostic refit, and the
//! column-level fallback when anything unrecoverable happens.
//!
//! Key behaviors
//! -------------
//! - A column without gaps is returned unchanged with status `Complete`.
//! - Errors from order selection, a column with no observed value, or a
//!   column that is still incomplete after the guard, discard the model work: the column is rebuilt by
//!   interpolation → forward fill → backward fill → observed mean and
//!   reported as `FallbackInterpolation` with the error message. An
//!   all-missing column is filled with the envelope's default mean.
//! - The diagnostic refit never changes values or status; when it fails
//!   its fields stay `None`.
//!
//! Invariants & assumptions
//! ------------------------
//! - The returned values have no gaps whenever the input has at least one
//!   position.
//! - Observed positions keep their input values in every branch.
use crate::{
    arima::{ArimaFitter, ArimaModel, InformationCriterion},
    imputation::{
        errors::{ImputeError, ImputeResult},
        guard::{apply_guard, PlausibilityEnvelope},
        interpolation::conservative_fill,
        options::SearchBounds,
        order_selection::select_order,
        report::ImputationReport,
        segment_imputer::{impute_runs, SegmentOutcome},
        segments::observed_values,
    },
    statistical_tests::StationarityTest,
};
use tracing::{debug, info, warn};

/// Completed column with its report.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnOutcome {
    pub values: Vec<Option<f64>>,
    pub report: ImputationReport,
}

/// Impute one column. Never fails: errors become a fallback report.
pub fn impute_series<F, S>(
    fitter: &F, test: &S, name: &str, series: &[Option<f64>], bounds: SearchBounds,
    criterion: InformationCriterion,
) -> ColumnOutcome
where
    F: ArimaFitter + ?Sized,
    S: StationarityTest + ?Sized,
{
    let missing = series.iter().filter(|v| v.is_none()).count();
    if missing == 0 {
        debug!(column = name, "no missing values");
        return ColumnOutcome {
            values: series.to_vec(),
            report: ImputationReport::complete(name, criterion),
        };
    }
    info!(column = name, missing, "imputing column");

    let envelope = PlausibilityEnvelope::from_observed(series);
    match model_imputation(fitter, test, name, series, missing, &envelope, bounds, criterion) {
        Ok(outcome) => outcome,
        Err(err) => {
            warn!(column = name, error = %err, "imputation failed, falling back to interpolation");
            let values = conservative_fill(series, envelope.mean).into_iter().map(Some).collect();
            ColumnOutcome {
                values,
                report: ImputationReport::fallback(name, criterion, missing, err.to_string()),
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn model_imputation<F, S>(
    fitter: &F, test: &S, name: &str, series: &[Option<f64>], missing: usize,
    envelope: &PlausibilityEnvelope, bounds: SearchBounds, criterion: InformationCriterion,
) -> ImputeResult<ColumnOutcome>
where
    F: ArimaFitter + ?Sized,
    S: StationarityTest + ?Sized,
{
    let observed = observed_values(series);
    if observed.is_empty() {
        return Err(ImputeError::NoObservedValues);
    }
    let selection = select_order(fitter, test, &observed, bounds, criterion)?;
    let SegmentOutcome { mut values, runs } = impute_runs(fitter, series, selection.order);

    let corrections = apply_guard(series, &mut values, envelope);
    let remaining = values.iter().filter(|v| v.is_none()).count();
    if remaining > 0 {
        return Err(ImputeError::IncompleteImputation { remaining });
    }

    let mut report = ImputationReport::success(name, criterion, missing, selection);
    report.runs = runs;
    report.corrections = corrections;

    let completed: Vec<f64> = values.iter().flatten().copied().collect();
    match fitter.fit(&completed, selection.order) {
        Ok(model) => {
            let resid = model.residuals();
            report.criterion_value = Some(model.criterion(criterion));
            report.aic = Some(model.criterion(InformationCriterion::Aic));
            report.bic = Some(model.criterion(InformationCriterion::Bic));
            report.hqic = Some(model.criterion(InformationCriterion::Hqic));
            if !resid.is_empty() {
                let n = resid.len() as f64;
                report.mse = Some(resid.iter().map(|e| e * e).sum::<f64>() / n);
                report.mae = Some(resid.iter().map(|e| e.abs()).sum::<f64>() / n);
            }
        }
        Err(err) => debug!(column = name, error = %err, "diagnostic refit failed"),
    }
    info!(
        column = name,
        order = %selection.order,
        corrections,
        aic = report.aic,
        "column imputed"
    );
    Ok(ColumnOutcome { values, report })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        arima::{CssArimaFitter, FitError, FitResult, OrderTriple},
        imputation::{
            guard::DEFAULT_MEAN,
            report::{ImputationStatus, RunStrategy},
        },
        statistical_tests::{errors::StatTestResult, AdfTest, StatTestError},
    };
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - The `Complete` short-circuit.
    // - Column fallback after a stationarity failure or with nothing observed.
    // - Scenario E (every candidate fails) end to end within a column.
    // - A realistic seeded AR(1) column with the default fitter and test.
    // -------------------------------------------------------------------------

    struct NeverFits;

    struct Never;

    impl ArimaModel for Never {
        fn order(&self) -> OrderTriple {
            OrderTriple::new(0, 0, 0)
        }
        fn forecast(&self, steps: usize) -> FitResult<Vec<f64>> {
            Ok(vec![0.0; steps])
        }
        fn criterion(&self, _kind: InformationCriterion) -> f64 {
            0.0
        }
        fn residuals(&self) -> &[f64] {
            &[]
        }
    }

    impl ArimaFitter for NeverFits {
        type Model = Never;

        fn fit(&self, series: &[f64], order: OrderTriple) -> FitResult<Never> {
            Err(FitError::InsufficientData { order, needed: usize::MAX, found: series.len() })
        }
    }

    struct AlwaysStationary;

    impl StationarityTest for AlwaysStationary {
        fn p_value(&self, _series: &[f64]) -> StatTestResult<f64> {
            Ok(0.001)
        }
    }

    fn ar1(n: usize, seed: u64) -> Vec<f64> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut x = 0.0;
        (0..n)
            .map(|_| {
                x = 0.6 * x + rng.gen_range(-1.0..1.0);
                30.0 + x
            })
            .collect()
    }

    #[test]
    // Purpose
    // -------
    // Gap-free columns come back untouched with status `Complete`.
    //
    // Given
    // -----
    // - [1, 2, 3] and a fitter that always fails.
    //
    // Expect
    // ------
    // - Same values, `Complete`, zero missing.
    fn complete_column_is_unchanged() {
        // Arrange
        let series = [Some(1.0), Some(2.0), Some(3.0)];

        // Act
        let out = impute_series(
            &NeverFits,
            &AlwaysStationary,
            "x",
            &series,
            SearchBounds::STANDARD,
            InformationCriterion::Aic,
        );

        // Assert
        assert_eq!(out.values, series.to_vec());
        assert_eq!(out.report.status, ImputationStatus::Complete);
        assert_eq!(out.report.missing_count, 0);
    }

    #[test]
    // Purpose
    // -------
    // A constant column makes the unit-root test fail, which sends the whole
    // column to the interpolation fallback.
    //
    // Given
    // -----
    // - 30 copies of 4.0 with two gaps and the ADF test.
    //
    // Expect
    // ------
    // - `FallbackInterpolation`, error message recorded, gaps filled with 4.
    fn stationarity_failure_triggers_column_fallback() {
        // Arrange
        let mut series = vec![Some(4.0); 30];
        series[10] = None;
        series[29] = None;

        // Act
        let out = impute_series(
            &CssArimaFitter::default(),
            &AdfTest::default(),
            "flat",
            &series,
            SearchBounds::STANDARD,
            InformationCriterion::Aic,
        );

        // Assert
        assert_eq!(out.report.status, ImputationStatus::FallbackInterpolation);
        let msg = out.report.error.clone().unwrap_or_default();
        assert!(msg.contains(&StatTestError::ConstantSeries.to_string()), "{msg}");
        assert_eq!(out.values[10], Some(4.0));
        assert_eq!(out.values[29], Some(4.0));
        assert_eq!(out.report.missing_count, 2);
    }

    #[test]
    // Purpose
    // -------
    // A column with nothing observed cannot be modelled and is reported as
    // a fallback, even though the default mean completes it.
    //
    // Given
    // -----
    // - Six absent values, the default fitter and the ADF test.
    //
    // Expect
    // ------
    // - `FallbackInterpolation` carrying the no-observed-values message and
    //   every value equal to `DEFAULT_MEAN`.
    fn all_missing_column_reports_fallback() {
        // Arrange
        let series = vec![None; 6];

        // Act
        let out = impute_series(
            &CssArimaFitter::default(),
            &AdfTest::default(),
            "nai",
            &series,
            SearchBounds::STANDARD,
            InformationCriterion::Aic,
        );

        // Assert
        assert_eq!(out.report.status, ImputationStatus::FallbackInterpolation);
        assert_eq!(out.report.error, Some(ImputeError::NoObservedValues.to_string()));
        assert_eq!(out.report.missing_count, 6);
        assert!(out.values.iter().all(|v| *v == Some(DEFAULT_MEAN)));
    }

    #[test]
    // Purpose
    // -------
    // Scenario E: when every candidate fails, the order is (1, d, 1), every
    // run is interpolated, and the column still succeeds without
    // diagnostics.
    //
    // Given
    // -----
    // - 40 seeded AR(1) values with a 3-point interior gap, a stationary
    //   test (d = 0), and a fitter that always fails.
    //
    // Expect
    // ------
    // - `Success`, order (1, 0, 1), 16 failed candidates, run strategy
    //   `InterpolationAfterFailure`, no AIC.
    fn all_candidates_failing_still_completes_column() {
        // Arrange
        let mut series: Vec<Option<f64>> = ar1(40, 3).into_iter().map(Some).collect();
        for v in &mut series[20..23] {
            *v = None;
        }

        // Act
        let out = impute_series(
            &NeverFits,
            &AlwaysStationary,
            "pm10",
            &series,
            SearchBounds::STANDARD,
            InformationCriterion::Aic,
        );

        // Assert
        assert_eq!(out.report.status, ImputationStatus::Success);
        assert_eq!(out.report.order, Some(OrderTriple::new(1, 0, 1)));
        let sel = out.report.selection.unwrap();
        assert_eq!(sel.candidates_failed, 16);
        assert!(matches!(out.report.runs[0].strategy, RunStrategy::InterpolationAfterFailure { .. }));
        assert_eq!(out.report.aic, None);
        assert!(out.values.iter().all(Option::is_some));
    }

    #[test]
    // Purpose
    // -------
    // A realistic column goes through the default fitter and ADF test and
    // keeps observed values while filling every gap plausibly.
    //
    // Given
    // -----
    // - 200 seeded AR(1) values around 30 with an interior gap of 5 and a
    //   trailing gap of 2.
    //
    // Expect
    // ------
    // - No gaps, observed values unchanged, imputations inside the
    //   envelope, two run reports, and refit diagnostics present unless the
    //   column fell back.
    fn realistic_column_is_completed_within_envelope() {
        // Arrange
        let raw = ar1(200, 11);
        let mut series: Vec<Option<f64>> = raw.iter().copied().map(Some).collect();
        for i in (100..105).chain(198..200) {
            series[i] = None;
        }
        let envelope = PlausibilityEnvelope::from_observed(&series);

        // Act
        let out = impute_series(
            &CssArimaFitter::default(),
            &AdfTest::default(),
            "ta",
            &series,
            SearchBounds::ENVIRONMENTAL,
            InformationCriterion::Aic,
        );

        // Assert
        assert!(out.values.iter().all(Option::is_some));
        for (orig, new) in series.iter().zip(&out.values) {
            if orig.is_some() {
                assert_eq!(orig, new);
            }
        }
        for i in (100..105).chain(198..200) {
            let v = out.values[i].unwrap();
            assert!(envelope.contains(v) || out.report.status != ImputationStatus::Success, "{v}");
        }
        if out.report.status == ImputationStatus::Success {
            assert_eq!(out.report.runs.len(), 2);
            assert!(out.report.mse.is_some());
        }
        assert_eq!(out.report.missing_count, 7);
    }
}
