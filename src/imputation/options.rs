//! imputation::options — configuration for the imputation engine.
//!
//! Purpose
//! -------
//! Bundle every knob of the engine in [`ImputeOptions`]: the order search
//! box, the information criterion, the grid cadence, output shape, column
//! parallelism, optimizer budget and excluded columns. Options load from
//! TOML and are validated once before any work starts.
//!
//! Key behaviors
//! -------------
//! - [`Preset`] fixes the three standard search boxes: standard (3, 1, 3),
//!   environmental (2, 1, 2) and wide (5, 2, 5).
//! - [`DataType`] maps a sensor family to its preset and excluded columns.
//! - [`FitOptions::to_mle_options`] turns the optimizer budget into
//!   validated [`MLEOptions`].
//! - [`ImputeOptions::from_toml_str`] parses and validates in one step.
//!
//! Invariants & assumptions
//! ------------------------
//! - A validated search box has `max_p, max_q ≤ 10` and `max_d ≤ 2`, which
//!   bounds the search at 121 fits per column.
//!
//! Downstream usage
//! ----------------
//! - `orchestrator::impute_table` and the preset helpers take
//!   `&ImputeOptions`; tests usually start from `ImputeOptions::default()`
//!   and tweak fields.
use crate::{
    arima::InformationCriterion,
    imputation::{
        errors::{ImputeError, ImputeResult},
        grid::CadenceSpec,
    },
    optimization::loglik_optimizer::{LineSearcher, MLEOptions, Tolerances},
};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Largest `max_p` / `max_q` accepted by [`SearchBounds::validate`].
pub const MAX_SEARCH_LAG: usize = 10;
/// Largest `max_d` accepted by [`SearchBounds::validate`].
pub const MAX_DIFFERENCING: usize = 2;

/// Columns never imputed automatically: row identifiers and the raw eddy
/// covariance fluxes handled by the flux gap-filling stage.
pub const FLUX_EXCLUDED_COLUMNS: [&str; 4] = ["co2_flux", "h2o_flux", "le", "h"];

/// Upper bounds of the `(p, d, q)` search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchBounds {
    pub max_p: usize,
    pub max_d: usize,
    pub max_q: usize,
}

impl SearchBounds {
    pub const STANDARD: SearchBounds = SearchBounds { max_p: 3, max_d: 1, max_q: 3 };
    pub const ENVIRONMENTAL: SearchBounds = SearchBounds { max_p: 2, max_d: 1, max_q: 2 };
    pub const WIDE: SearchBounds = SearchBounds { max_p: 5, max_d: 2, max_q: 5 };

    pub const fn new(max_p: usize, max_d: usize, max_q: usize) -> Self {
        Self { max_p, max_d, max_q }
    }

    /// Fits attempted by a full grid search.
    pub fn n_candidates(&self) -> usize {
        (self.max_p + 1) * (self.max_q + 1)
    }

    /// # Errors
    /// [`ImputeError::InvalidOptions`] when a bound exceeds
    /// [`MAX_SEARCH_LAG`] or [`MAX_DIFFERENCING`].
    pub fn validate(&self) -> ImputeResult<()> {
        let check = |field: &'static str, value: usize, max: usize| {
            if value > max {
                Err(ImputeError::InvalidOptions {
                    field,
                    reason: format!("{value} exceeds the maximum of {max}"),
                })
            } else {
                Ok(())
            }
        };
        check("bounds.max_p", self.max_p, MAX_SEARCH_LAG)?;
        check("bounds.max_d", self.max_d, MAX_DIFFERENCING)?;
        check("bounds.max_q", self.max_q, MAX_SEARCH_LAG)
    }
}

impl Default for SearchBounds {
    fn default() -> Self {
        SearchBounds::STANDARD
    }
}

/// Budget of the likelihood optimizer behind every model fit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitOptions {
    pub max_iter: usize,
    pub tol_grad: f64,
    pub tol_cost: Option<f64>,
    pub line_searcher: LineSearcher,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self { max_iter: 200, tol_grad: 1e-5, tol_cost: None, line_searcher: LineSearcher::MoreThuente }
    }
}

impl FitOptions {
    /// # Errors
    /// [`ImputeError::InvalidOptions`] wrapping the optimizer's own check.
    pub fn to_mle_options(&self) -> ImputeResult<MLEOptions> {
        let invalid = |err: crate::optimization::errors::OptError| ImputeError::InvalidOptions {
            field: "fit",
            reason: err.to_string(),
        };
        let tols = Tolerances::new(Some(self.tol_grad), self.tol_cost, Some(self.max_iter)).map_err(invalid)?;
        MLEOptions::new(tols, self.line_searcher, false, None).map_err(invalid)
    }
}

/// Named search boxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    /// (3, 1, 3): the default multi-column search.
    Standard,
    /// (2, 1, 2): smaller models for noisy environmental channels.
    Environmental,
    /// (5, 2, 5): the single-column search.
    Wide,
}

impl Preset {
    pub fn bounds(&self) -> SearchBounds {
        match self {
            Preset::Standard => SearchBounds::STANDARD,
            Preset::Environmental => SearchBounds::ENVIRONMENTAL,
            Preset::Wide => SearchBounds::WIDE,
        }
    }
}

/// Sensor families handled by the quality-control pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    Flux,
    Aqi,
    Sapflow,
    Nai,
    MicroMeteorology,
}

impl DataType {
    pub fn preset(&self) -> Preset {
        match self {
            DataType::Aqi | DataType::Nai | DataType::MicroMeteorology => Preset::Environmental,
            DataType::Flux | DataType::Sapflow => Preset::Standard,
        }
    }

    /// Columns left out of automatic column detection.
    pub fn excluded_columns(&self) -> Vec<String> {
        let mut cols = vec!["id".to_string()];
        if *self == DataType::Flux {
            cols.extend(FLUX_EXCLUDED_COLUMNS.iter().map(|c| c.to_string()));
        }
        cols
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Flux => "flux",
            DataType::Aqi => "aqi",
            DataType::Sapflow => "sapflow",
            DataType::Nai => "nai",
            DataType::MicroMeteorology => "micro_meteorology",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = ImputeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "flux" => Ok(DataType::Flux),
            "aqi" => Ok(DataType::Aqi),
            "sapflow" => Ok(DataType::Sapflow),
            "nai" => Ok(DataType::Nai),
            "micro_meteorology" | "micrometeorology" => Ok(DataType::MicroMeteorology),
            _ => Err(ImputeError::UnknownDataType { name: s.to_string() }),
        }
    }
}

/// Engine configuration.
///
/// Fields
/// ------
/// - `bounds`: order search box (default standard (3, 1, 3)).
/// - `criterion`: score used to compare candidate orders (default AIC).
/// - `cadence`: grid spacing, fixed or `auto` (default 30 min).
/// - `keep_original`: write `<name>_filled` siblings instead of
///   overwriting.
/// - `parallel`: process columns on the rayon pool.
/// - `fit`: optimizer budget for every model fit.
/// - `excluded_columns`: names skipped by automatic column detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImputeOptions {
    pub bounds: SearchBounds,
    pub criterion: InformationCriterion,
    pub cadence: CadenceSpec,
    pub keep_original: bool,
    pub parallel: bool,
    pub fit: FitOptions,
    pub excluded_columns: Vec<String>,
}

impl Default for ImputeOptions {
    fn default() -> Self {
        Self {
            bounds: SearchBounds::STANDARD,
            criterion: InformationCriterion::Aic,
            cadence: CadenceSpec::default(),
            keep_original: false,
            parallel: false,
            fit: FitOptions::default(),
            excluded_columns: vec!["id".to_string()],
        }
    }
}

impl ImputeOptions {
    /// Default options with the search box of `preset`.
    pub fn from_preset(preset: Preset) -> Self {
        Self { bounds: preset.bounds(), ..Self::default() }
    }

    /// Options for a sensor family: its preset and its excluded columns.
    pub fn for_data_type(data_type: DataType) -> Self {
        Self { excluded_columns: data_type.excluded_columns(), ..Self::from_preset(data_type.preset()) }
    }

    /// Parse TOML and validate. Missing keys take their defaults.
    ///
    /// # Errors
    /// [`ImputeError::ConfigParse`] for malformed TOML or unknown values,
    /// then anything [`ImputeOptions::validate`] rejects.
    pub fn from_toml_str(input: &str) -> ImputeResult<Self> {
        let opts: ImputeOptions =
            toml::from_str(input).map_err(|e| ImputeError::ConfigParse { message: e.to_string() })?;
        opts.validate()?;
        Ok(opts)
    }

    /// # Errors
    /// [`ImputeError::InvalidOptions`] for out-of-range bounds or optimizer
    /// tolerances.
    pub fn validate(&self) -> ImputeResult<()> {
        self.bounds.validate()?;
        self.fit.to_mle_options().map(|_| ())
    }

    pub fn is_excluded(&self, column: &str) -> bool {
        self.excluded_columns.iter().any(|c| c == column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imputation::grid::Cadence;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Preset and data-type mappings.
    // - TOML loading with defaults, and validation failures.
    // - Conversion of the fit budget into optimizer options.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Data types map to the documented presets and exclusions.
    //
    // Given
    // -----
    // - "aqi", "flux", "Micro-Meteorology" and an unknown name.
    //
    // Expect
    // ------
    // - Environmental for aqi; standard plus flux exclusions for flux;
    //   `UnknownDataType` for the unknown name.
    fn data_types_map_to_presets() {
        // Act
        let aqi: DataType = "aqi".parse().unwrap();
        let flux: DataType = "flux".parse().unwrap();
        let micro: DataType = "Micro-Meteorology".parse().unwrap();

        // Assert
        assert_eq!(aqi.preset().bounds(), SearchBounds::new(2, 1, 2));
        assert_eq!(micro, DataType::MicroMeteorology);
        let opts = ImputeOptions::for_data_type(flux);
        assert_eq!(opts.bounds, SearchBounds::STANDARD);
        assert!(opts.is_excluded("co2_flux") && opts.is_excluded("id"));
        assert!(!opts.is_excluded("pm2_5"));
        assert!(matches!("soil".parse::<DataType>(), Err(ImputeError::UnknownDataType { .. })));
    }

    #[test]
    // Purpose
    // -------
    // TOML input overrides only the keys it names.
    //
    // Given
    // -----
    // - `criterion = "bic"`, `cadence = "1h"`, and `[bounds] max_p = 2`.
    //
    // Expect
    // ------
    // - BIC, 1 h, bounds (2, 1, 3), other fields at their defaults.
    fn from_toml_str_merges_with_defaults() {
        // Arrange
        let input = r#"
            criterion = "bic"
            cadence = "1h"
            keep_original = true

            [bounds]
            max_p = 2
        "#;

        // Act
        let opts = ImputeOptions::from_toml_str(input).unwrap();

        // Assert
        assert_eq!(opts.criterion, InformationCriterion::Bic);
        assert_eq!(opts.cadence, CadenceSpec::Fixed(Cadence::ONE_HOUR));
        assert_eq!(opts.bounds, SearchBounds::new(2, 1, 3));
        assert!(opts.keep_original);
        assert_eq!(opts.fit, FitOptions::default());
    }

    #[test]
    // Purpose
    // -------
    // Invalid values are rejected at load time.
    //
    // Given
    // -----
    // - An unknown criterion, a bad cadence, `max_d = 3`, and a negative
    //   gradient tolerance.
    //
    // Expect
    // ------
    // - `ConfigParse` for the first two, `InvalidOptions` for the others.
    fn from_toml_str_rejects_invalid_values() {
        // Act / Assert
        assert!(matches!(
            ImputeOptions::from_toml_str(r#"criterion = "mdl""#),
            Err(ImputeError::ConfigParse { .. })
        ));
        assert!(matches!(
            ImputeOptions::from_toml_str(r#"cadence = "often""#),
            Err(ImputeError::ConfigParse { .. })
        ));
        assert!(matches!(
            ImputeOptions::from_toml_str("[bounds]\nmax_d = 3"),
            Err(ImputeError::InvalidOptions { field: "bounds.max_d", .. })
        ));
        assert!(matches!(
            ImputeOptions::from_toml_str("[fit]\ntol_grad = -1.0"),
            Err(ImputeError::InvalidOptions { field: "fit", .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // The fit budget reaches the optimizer options unchanged.
    //
    // Given
    // -----
    // - Default `FitOptions`.
    //
    // Expect
    // ------
    // - `max_iter = 200`, `tol_grad = 1e-5`, no cost tolerance.
    fn fit_options_convert_to_mle_options() {
        // Act
        let mle = FitOptions::default().to_mle_options().unwrap();

        // Assert
        assert_eq!(mle.tols.max_iter, Some(200));
        assert_eq!(mle.tols.tol_grad, Some(1e-5));
        assert_eq!(mle.tols.tol_cost, None);
        assert_eq!(SearchBounds::WIDE.n_candidates(), 36);
    }
}
