//! imputation::interpolation — simple fillers used as fallbacks.
//!
//! Index-linear interpolation plus forward/backward/constant fills. These
//! are the last resort of every stage: a run without enough history, a run
//! whose model failed, envelope violations, and whole-column fallback.
//!
//! Interpolation semantics: interior gaps are filled on the straight line
//! between their neighbours (by position, not by time), trailing gaps repeat
//! the last observed value, and leading gaps stay absent.

/// Index-linear interpolation; leading gaps are left absent.
pub fn interpolate_linear(series: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut out = series.to_vec();
    let mut prev: Option<(usize, f64)> = None;
    for (i, v) in series.iter().enumerate() {
        let Some(v) = *v else { continue };
        if let Some((j, left)) = prev {
            let span = (i - j) as f64;
            for (k, slot) in out.iter_mut().enumerate().take(i).skip(j + 1) {
                *slot = Some(left + (v - left) * (k - j) as f64 / span);
            }
        }
        prev = Some((i, v));
    }
    if let Some((j, last)) = prev {
        out[j + 1..].iter_mut().for_each(|slot| *slot = Some(last));
    }
    out
}

/// Propagate the last seen value forward over gaps.
pub fn forward_fill(series: &mut [Option<f64>]) {
    let mut last = None;
    for slot in series.iter_mut() {
        match slot {
            Some(v) => last = Some(*v),
            None => *slot = last,
        }
    }
}

/// Propagate the next seen value backward over gaps.
pub fn backward_fill(series: &mut [Option<f64>]) {
    let mut next = None;
    for slot in series.iter_mut().rev() {
        match slot {
            Some(v) => next = Some(*v),
            None => *slot = next,
        }
    }
}

/// Interpolate, then forward fill, then backward fill, then fill whatever
/// is still absent with `fallback`. The result has no gaps.
pub fn conservative_fill(series: &[Option<f64>], fallback: f64) -> Vec<f64> {
    let mut out = interpolate_linear(series);
    forward_fill(&mut out);
    backward_fill(&mut out);
    out.into_iter().map(|v| v.unwrap_or(fallback)).collect()
}
