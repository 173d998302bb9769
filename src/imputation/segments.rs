//! imputation::segments — missing-run detection.
//!
//! A column's missing mask is split into maximal runs of consecutive absent
//! positions. Each run is imputed independently, so its position matters:
//! a leading run has no history on its left, a trailing run none on its
//! right.
use serde::{Deserialize, Serialize};

/// Where a run sits in the series. A run that covers the first position is
/// `Leading` even when it also reaches the end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPosition {
    Leading,
    Interior,
    Trailing,
}

/// Maximal run of missing positions, bounds inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingRun {
    pub start: usize,
    pub end: usize,
    pub position: RunPosition,
}

impl MissingRun {
    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Missing mask of a column (`true` = absent).
pub fn missing_mask(series: &[Option<f64>]) -> Vec<bool> {
    series.iter().map(Option::is_none).collect()
}

/// Observed values in order, gaps removed.
pub fn observed_values(series: &[Option<f64>]) -> Vec<f64> {
    series.iter().flatten().copied().collect()
}

/// Split `mask` into maximal runs, left to right, in one pass.
pub fn find_runs(mask: &[bool]) -> Vec<MissingRun> {
    let n = mask.len();
    let classify = |start: usize, end: usize| {
        if start == 0 {
            RunPosition::Leading
        } else if end + 1 == n {
            RunPosition::Trailing
        } else {
            RunPosition::Interior
        }
    };

    let mut runs = Vec::new();
    let mut open: Option<usize> = None;
    for (i, &missing) in mask.iter().enumerate() {
        match (missing, open) {
            (true, None) => open = Some(i),
            (false, Some(start)) => {
                runs.push(MissingRun { start, end: i - 1, position: classify(start, i - 1) });
                open = None;
            }
            _ => {}
        }
    }
    if let Some(start) = open {
        runs.push(MissingRun { start, end: n - 1, position: classify(start, n - 1) });
    }
    runs
}

/// Copy of `series` with the leading span set to the first observed value
/// and the trailing span set to the last one. Interior gaps stay absent.
///
/// Used only as value history for fitting; a series with no observations
/// is returned unchanged.
pub fn provisional_fill(series: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut out = series.to_vec();
    let first = series.iter().position(Option::is_some);
    let last = series.iter().rposition(Option::is_some);
    if let (Some(first), Some(last)) = (first, last) {
        let (head, tail) = (series[first], series[last]);
        out[..first].iter_mut().for_each(|v| *v = head);
        out[last + 1..].iter_mut().for_each(|v| *v = tail);
    }
    out
}
