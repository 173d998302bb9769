//! imputation::order_selection — bounded ARIMA order search.
//!
//! Purpose
//! -------
//! Choose one [`OrderTriple`] per column: fix `d` with the stationarity
//! check, then try every `(p, q)` in the search box and keep the candidate
//! with the lowest information criterion.
//!
//! Key behaviors
//! -------------
//! - Fewer than [`MIN_SEARCH_OBS`] observations short-circuit to
//!   `(1, 1, 1)` with no test and no fit.
//! - Grid order is `p` outer, `q` inner, starting at `(0, 0)`; the strictly
//!   lower score wins, so ties keep the first candidate seen.
//! - Failed fits are counted and skipped. If all fail the order is
//!   `(1, d, 1)`.
//!
//! Invariants & assumptions
//! ------------------------
//! - At most `(max_p + 1)(max_q + 1)` fits per call.
//! - Deterministic for a deterministic fitter and test.
use crate::{
    arima::{ArimaFitter, ArimaModel, InformationCriterion, OrderTriple},
    imputation::{options::SearchBounds, stationarity::find_difference_order},
    statistical_tests::{errors::StatTestResult, StationarityTest},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Minimum observed values needed to run the grid search.
pub const MIN_SEARCH_OBS: usize = 20;

/// Order returned when there is too little data to search.
pub const SHORT_SERIES_ORDER: OrderTriple = OrderTriple::new(1, 1, 1);

/// Outcome of [`select_order`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrderSelection {
    pub order: OrderTriple,
    /// Winning criterion value, `None` when no candidate was fitted
    /// successfully or the search was skipped.
    pub criterion_value: Option<f64>,
    pub candidates_tried: usize,
    pub candidates_failed: usize,
    pub short_circuit: bool,
}

/// Pick the order for a column from its observed values.
///
/// # Errors
/// Propagates a failure of the stationarity test. Fit failures are not
/// errors.
pub fn select_order<F, S>(
    fitter: &F, test: &S, observed: &[f64], bounds: SearchBounds,
    criterion: InformationCriterion,
) -> StatTestResult<OrderSelection>
where
    F: ArimaFitter + ?Sized,
    S: StationarityTest + ?Sized,
{
    if observed.len() < MIN_SEARCH_OBS {
        debug!(observed = observed.len(), "too few observations for order search");
        return Ok(OrderSelection {
            order: SHORT_SERIES_ORDER,
            criterion_value: None,
            candidates_tried: 0,
            candidates_failed: 0,
            short_circuit: true,
        });
    }

    let d = find_difference_order(test, observed, bounds.max_d)?;
    let mut best: Option<(OrderTriple, f64)> = None;
    let mut tried = 0;
    let mut failed = 0;

    for p in 0..=bounds.max_p {
        for q in 0..=bounds.max_q {
            let order = OrderTriple::new(p, d, q);
            tried += 1;
            let score = match fitter.fit(observed, order) {
                Ok(model) => model.criterion(criterion),
                Err(err) => {
                    debug!(%order, error = %err, "candidate fit failed");
                    failed += 1;
                    continue;
                }
            };
            if !score.is_finite() {
                failed += 1;
                continue;
            }
            if best.map_or(true, |(_, b)| score < b) {
                best = Some((order, score));
            }
        }
    }

    let (order, criterion_value) = match best {
        Some((order, score)) => (order, Some(score)),
        None => (OrderTriple::new(1, d, 1), None),
    };
    info!(%order, %criterion, tried, failed, "selected ARIMA order");
    Ok(OrderSelection {
        order,
        criterion_value,
        candidates_tried: tried,
        candidates_failed: failed,
        short_circuit: false,
    })
}
