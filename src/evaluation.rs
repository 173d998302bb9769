//! evaluation — mask-and-score accuracy harness for the imputation engine.
//!
//! Purpose
//! -------
//! Measure how well the engine reconstructs known values: hide part of a
//! complete series with a reproducible missing pattern, impute it, and
//! score the imputations against the hidden truth.
//!
//! Key behaviors
//! -------------
//! - [`mask_positions`] draws a mask for one of four [`MissingPattern`]s
//!   from a caller-supplied RNG (seed it for reproducible experiments).
//! - [`AccuracyMetrics::compute`] scores masked positions only (MAE, MSE,
//!   RMSE, MAPE in percent, R²).
//! - [`evaluate_column`] runs one trial; [`evaluate_trials`] repeats it with
//!   consecutive seeds and summarizes the metrics.
//!
//! Conventions
//! -----------
//! - `missing_rate` is a fraction in `[0, 1]`; the number of hidden points
//!   is `⌊n · rate⌋`. The consecutive and block patterns may overlap their
//!   segments, so the realized count can be lower; periodic masking is
//!   probabilistic.
//! - Metrics that are undefined (no valid points, zero truth for MAPE,
//!   constant truth for R²) are `None`.
use crate::{
    arima::ArimaFitter,
    imputation::{
        errors::{ImputeError, ImputeResult},
        orchestrator::ImputationEngine,
        report::ImputationStatus,
    },
    statistical_tests::StationarityTest,
};
use rand::{seq::index::sample, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use tracing::debug;

/// Probability that a periodic slot is masked.
pub const PERIODIC_MASK_PROBABILITY: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingPattern {
    /// Isolated positions drawn without replacement.
    Random,
    /// Up to five runs of equal length.
    Consecutive,
    /// Every `⌊n / n_missing⌋`-th position, each masked with probability 0.7.
    Periodic,
    /// Up to three long blocks.
    Block,
}

impl MissingPattern {
    pub const ALL: [MissingPattern; 4] =
        [MissingPattern::Random, MissingPattern::Consecutive, MissingPattern::Periodic, MissingPattern::Block];

    pub fn as_str(&self) -> &'static str {
        match self {
            MissingPattern::Random => "random",
            MissingPattern::Consecutive => "consecutive",
            MissingPattern::Periodic => "periodic",
            MissingPattern::Block => "block",
        }
    }
}

impl fmt::Display for MissingPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MissingPattern {
    type Err = ImputeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "random" => Ok(MissingPattern::Random),
            "consecutive" => Ok(MissingPattern::Consecutive),
            "periodic" => Ok(MissingPattern::Periodic),
            "block" => Ok(MissingPattern::Block),
            other => Err(ImputeError::InvalidOptions {
                field: "pattern",
                reason: format!("unknown missing pattern '{other}'"),
            }),
        }
    }
}

fn mask_segments<R: Rng + ?Sized>(mask: &mut [bool], count: usize, len: usize, rng: &mut R) {
    let n = mask.len();
    if len == 0 {
        return;
    }
    for _ in 0..count {
        let start = if n > len { rng.gen_range(0..n - len) } else { 0 };
        let end = (start + len).min(n);
        mask[start..end].iter_mut().for_each(|m| *m = true);
    }
}

/// Draw a missing mask of length `n` (`true` = hidden).
///
/// # Errors
/// [`ImputeError::InvalidOptions`] when `missing_rate` is outside `[0, 1]`.
pub fn mask_positions<R: Rng + ?Sized>(
    n: usize, missing_rate: f64, pattern: MissingPattern, rng: &mut R,
) -> ImputeResult<Vec<bool>> {
    if !(0.0..=1.0).contains(&missing_rate) {
        return Err(ImputeError::InvalidOptions {
            field: "missing_rate",
            reason: format!("{missing_rate} is not a fraction in [0, 1]"),
        });
    }
    let mut mask = vec![false; n];
    let n_missing = (n as f64 * missing_rate).floor() as usize;
    if n_missing == 0 {
        return Ok(mask);
    }

    match pattern {
        MissingPattern::Random => {
            for i in sample(rng, n, n_missing) {
                mask[i] = true;
            }
        }
        MissingPattern::Consecutive => {
            let segments = (n_missing / 10).clamp(1, 5);
            mask_segments(&mut mask, segments, n_missing / segments, rng);
        }
        MissingPattern::Periodic => {
            let interval = (n / n_missing).max(1);
            for i in (0..n).step_by(interval) {
                if rng.gen::<f64>() < PERIODIC_MASK_PROBABILITY {
                    mask[i] = true;
                }
            }
        }
        MissingPattern::Block => {
            let blocks = (n_missing / 20).clamp(1, 3);
            mask_segments(&mut mask, blocks, n_missing / blocks, rng);
        }
    }
    Ok(mask)
}

/// Accuracy of imputed values at hidden positions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccuracyMetrics {
    pub mae: f64,
    pub mse: f64,
    pub rmse: f64,
    /// Mean absolute percentage error over points with non-zero truth.
    pub mape: Option<f64>,
    /// Coefficient of determination; `None` for constant truth.
    pub r2: Option<f64>,
    pub valid_points: usize,
}

impl AccuracyMetrics {
    /// Score `predicted` against `truth` where `mask` is set and both values
    /// are finite. Returns `None` without any such point.
    pub fn compute(truth: &[f64], predicted: &[Option<f64>], mask: &[bool]) -> Option<Self> {
        let pairs: Vec<(f64, f64)> = truth
            .iter()
            .zip(predicted)
            .zip(mask)
            .filter(|&(_, &m)| m)
            .filter_map(|((&t, p), _)| p.filter(|p| p.is_finite() && t.is_finite()).map(|p| (t, p)))
            .collect();
        if pairs.is_empty() {
            return None;
        }
        let n = pairs.len() as f64;
        let mae = pairs.iter().map(|(t, p)| (t - p).abs()).sum::<f64>() / n;
        let mse = pairs.iter().map(|(t, p)| (t - p).powi(2)).sum::<f64>() / n;

        let pct: Vec<f64> = pairs.iter().filter(|(t, _)| *t != 0.0).map(|(t, p)| ((t - p) / t).abs()).collect();
        let mape = (!pct.is_empty()).then(|| 100.0 * pct.iter().sum::<f64>() / pct.len() as f64);

        let mean = pairs.iter().map(|(t, _)| t).sum::<f64>() / n;
        let ss_tot = pairs.iter().map(|(t, _)| (t - mean).powi(2)).sum::<f64>();
        let r2 = (ss_tot > 0.0).then(|| 1.0 - mse * n / ss_tot);

        Some(Self { mae, mse, rmse: mse.sqrt(), mape, r2, valid_points: pairs.len() })
    }
}

/// One masked-and-imputed trial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationOutcome {
    pub pattern: MissingPattern,
    pub missing_rate: f64,
    pub missing_count: usize,
    pub status: ImputationStatus,
    pub metrics: Option<AccuracyMetrics>,
}

/// Hide part of the complete series `truth`, impute it with `engine`, and
/// score the hidden positions.
///
/// # Errors
/// [`ImputeError::InvalidOptions`] for a bad `missing_rate`.
pub fn evaluate_column<F, S>(
    engine: &ImputationEngine<F, S>, truth: &[f64], missing_rate: f64, pattern: MissingPattern,
    seed: u64,
) -> ImputeResult<EvaluationOutcome>
where
    F: ArimaFitter,
    S: StationarityTest,
{
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mask = mask_positions(truth.len(), missing_rate, pattern, &mut rng)?;
    let damaged: Vec<Option<f64>> =
        truth.iter().zip(&mask).map(|(&v, &hide)| (!hide).then_some(v)).collect();

    let outcome = engine.impute_series("evaluation", &damaged);
    let metrics = AccuracyMetrics::compute(truth, &outcome.values, &mask);
    debug!(%pattern, missing_rate, status = ?outcome.report.status, mae = metrics.map(|m| m.mae), "evaluation trial");
    Ok(EvaluationOutcome {
        pattern,
        missing_rate,
        missing_count: outcome.report.missing_count,
        status: outcome.report.status,
        metrics,
    })
}

/// Mean, population standard deviation, minimum and maximum of a metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricStats {
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

impl MetricStats {
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let std = (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt();
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Some(Self { mean, std, min, max })
    }
}

/// Summary of repeated trials for one (rate, pattern) configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialSummary {
    pub pattern: MissingPattern,
    pub missing_rate: f64,
    pub mae: Option<MetricStats>,
    pub rmse: Option<MetricStats>,
    pub mape: Option<MetricStats>,
    pub r2: Option<MetricStats>,
    /// Trials that produced metrics.
    pub successful_trials: usize,
    pub total_trials: usize,
    pub trials: Vec<EvaluationOutcome>,
}

/// Run `n_trials` trials with seeds `seed, seed + 1, …` and summarize.
///
/// # Errors
/// [`ImputeError::InvalidOptions`] for a bad `missing_rate`.
pub fn evaluate_trials<F, S>(
    engine: &ImputationEngine<F, S>, truth: &[f64], missing_rate: f64, pattern: MissingPattern,
    n_trials: usize, seed: u64,
) -> ImputeResult<TrialSummary>
where
    F: ArimaFitter,
    S: StationarityTest,
{
    let trials = (0..n_trials as u64)
        .map(|k| evaluate_column(engine, truth, missing_rate, pattern, seed.wrapping_add(k)))
        .collect::<ImputeResult<Vec<_>>>()?;
    let scored: Vec<AccuracyMetrics> = trials.iter().filter_map(|t| t.metrics).collect();
    let stats = |f: &dyn Fn(&AccuracyMetrics) -> Option<f64>| {
        MetricStats::from_values(&scored.iter().filter_map(f).collect::<Vec<_>>())
    };
    Ok(TrialSummary {
        pattern,
        missing_rate,
        mae: stats(&|m| Some(m.mae)),
        rmse: stats(&|m| Some(m.rmse)),
        mape: stats(&|m| m.mape),
        r2: stats(&|m| m.r2),
        successful_trials: scored.len(),
        total_trials: n_trials,
        trials,
    })
}
