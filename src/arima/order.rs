//! Model order and information-criterion types.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::arima::errors::FitError;

/// ARIMA order `(p, d, q)`.
///
/// `p` autoregressive lags, `d` differencing passes, `q` moving-average lags.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderTriple {
    pub p: usize,
    pub d: usize,
    pub q: usize,
}

impl OrderTriple {
    pub const fn new(p: usize, d: usize, q: usize) -> Self {
        Self { p, d, q }
    }

    /// Whether the fitted model carries a mean term (only without differencing).
    pub fn has_mean(&self) -> bool {
        self.d == 0
    }

    /// Free parameters counted by the information criteria, including the
    /// innovation variance.
    pub fn n_params(&self) -> usize {
        self.p + self.q + usize::from(self.has_mean()) + 1
    }
}

impl fmt::Display for OrderTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.p, self.d, self.q)
    }
}

/// Criterion minimized during order selection.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InformationCriterion {
    #[default]
    Aic,
    Bic,
    Hqic,
}

impl InformationCriterion {
    /// Evaluate the criterion for a log-likelihood with `k` parameters and
    /// `nobs` effective observations.
    pub fn evaluate(&self, loglik: f64, k: usize, nobs: usize) -> f64 {
        let k = k as f64;
        let n = nobs as f64;
        match self {
            InformationCriterion::Aic => -2.0 * loglik + 2.0 * k,
            InformationCriterion::Bic => -2.0 * loglik + k * n.ln(),
            InformationCriterion::Hqic => -2.0 * loglik + 2.0 * k * n.ln().ln(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InformationCriterion::Aic => "aic",
            InformationCriterion::Bic => "bic",
            InformationCriterion::Hqic => "hqic",
        }
    }
}

impl fmt::Display for InformationCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InformationCriterion {
    type Err = FitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "aic" => Ok(InformationCriterion::Aic),
            "bic" => Ok(InformationCriterion::Bic),
            "hqic" => Ok(InformationCriterion::Hqic),
            _ => Err(FitError::UnknownCriterion { name: s.to_string() }),
        }
    }
}
