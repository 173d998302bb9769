//! imputation::grid — regular time grid construction.
//!
//! Purpose
//! -------
//! Turn an irregular, possibly unsorted export into a table indexed by a
//! uniform timestamp grid, so that a gap in time becomes an explicit absent
//! value the imputer can see.
//!
//! Key behaviors
//! -------------
//! - [`Cadence`] parses pandas-style interval strings ("15min", "1h", "45s",
//!   "2d"); [`CadenceSpec::Auto`] defers to [`detect_cadence`].
//! - [`normalize`] drops rows without a timestamp, sorts, keeps the first
//!   row of each duplicated timestamp, and left-joins the survivors onto
//!   `min, min + c, …, ≤ max`.
//! - Rows whose timestamp does not sit on the grid are dropped and logged
//!   with `tracing::warn!`; every drop is counted in the [`GridReport`].
//! - [`filter_to_original`] keeps only rows whose timestamp was present in
//!   the input.
//!
//! Invariants & assumptions
//! ------------------------
//! - The output time column is strictly increasing with constant spacing
//!   and has no absent entries.
//! - Every retained input row maps to exactly one grid row.
//!
//! Testing notes
//! -------------
//! - Unit tests cover parsing, detection snapping, duplicate and
//!   misaligned rows, and the row filter.
use crate::{
    imputation::{
        errors::{ImputeError, ImputeResult},
        report::GridReport,
    },
    table::{Column, Table, TableError},
};
use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt, str::FromStr};
use tracing::{debug, warn};

/// Number of leading timestamps inspected by [`detect_cadence`].
pub const DETECTION_WINDOW: usize = 10;

/// Fixed, positive spacing of the time grid, stored in whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Cadence {
    seconds: i64,
}

impl Cadence {
    pub const FIFTEEN_MINUTES: Cadence = Cadence { seconds: 15 * 60 };
    pub const THIRTY_MINUTES: Cadence = Cadence { seconds: 30 * 60 };
    pub const ONE_HOUR: Cadence = Cadence { seconds: 60 * 60 };

    /// # Errors
    /// [`ImputeError::InvalidCadence`] unless `seconds > 0`.
    pub fn from_seconds(seconds: i64) -> ImputeResult<Self> {
        if seconds <= 0 {
            return Err(ImputeError::InvalidCadence { input: format!("{seconds}s") });
        }
        Ok(Self { seconds })
    }

    pub fn seconds(&self) -> i64 {
        self.seconds
    }

    pub fn as_duration(&self) -> Duration {
        Duration::seconds(self.seconds)
    }
}

impl Default for Cadence {
    fn default() -> Self {
        Cadence::THIRTY_MINUTES
    }
}

impl fmt::Display for Cadence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.seconds;
        if s % 86_400 == 0 {
            write!(f, "{}d", s / 86_400)
        } else if s % 3_600 == 0 {
            write!(f, "{}h", s / 3_600)
        } else if s % 60 == 0 {
            write!(f, "{}min", s / 60)
        } else {
            write!(f, "{s}s")
        }
    }
}

impl FromStr for Cadence {
    type Err = ImputeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ImputeError::InvalidCadence { input: s.to_string() };
        let norm = s.trim().to_ascii_lowercase();
        let split = norm.find(|c: char| !c.is_ascii_digit()).unwrap_or(norm.len());
        let (digits, unit) = norm.split_at(split);
        let count: i64 = if digits.is_empty() { 1 } else { digits.parse().map_err(|_| invalid())? };
        let unit_seconds = match unit.trim() {
            "s" | "sec" | "secs" | "second" | "seconds" => 1,
            "t" | "m" | "min" | "mins" | "minute" | "minutes" => 60,
            "h" | "hr" | "hour" | "hours" => 3_600,
            "d" | "day" | "days" => 86_400,
            _ => return Err(invalid()),
        };
        let seconds = count.checked_mul(unit_seconds).ok_or_else(invalid)?;
        Cadence::from_seconds(seconds).map_err(|_| invalid())
    }
}

impl TryFrom<String> for Cadence {
    type Error = ImputeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Cadence> for String {
    fn from(value: Cadence) -> Self {
        value.to_string()
    }
}

/// Explicit cadence or auto-detection from the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CadenceSpec {
    Auto,
    Fixed(Cadence),
}

impl CadenceSpec {
    /// Cadence to use for sorted, de-duplicated `timestamps`.
    pub fn resolve(&self, timestamps: &[NaiveDateTime]) -> Cadence {
        match self {
            CadenceSpec::Auto => detect_cadence(timestamps),
            CadenceSpec::Fixed(c) => *c,
        }
    }
}

impl Default for CadenceSpec {
    fn default() -> Self {
        CadenceSpec::Fixed(Cadence::THIRTY_MINUTES)
    }
}

impl fmt::Display for CadenceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CadenceSpec::Auto => f.write_str("auto"),
            CadenceSpec::Fixed(c) => c.fmt(f),
        }
    }
}

impl FromStr for CadenceSpec {
    type Err = ImputeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("auto") {
            Ok(CadenceSpec::Auto)
        } else {
            s.parse().map(CadenceSpec::Fixed)
        }
    }
}

impl TryFrom<String> for CadenceSpec {
    type Error = ImputeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CadenceSpec> for String {
    fn from(value: CadenceSpec) -> Self {
        value.to_string()
    }
}

/// Guess the sampling interval from the first [`DETECTION_WINDOW`] sorted
/// timestamps.
///
/// The modal gap (smallest on ties) is snapped: within 5 minutes of 30 →
/// 30 min, of 60 → 1 h, of 15 → 15 min; otherwise ≤ 45 min → 30 min, else
/// 1 h. Fewer than two timestamps give 30 min.
pub fn detect_cadence(timestamps: &[NaiveDateTime]) -> Cadence {
    if timestamps.len() < 2 {
        return Cadence::THIRTY_MINUTES;
    }
    let window = &timestamps[..timestamps.len().min(DETECTION_WINDOW)];
    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
    for pair in window.windows(2) {
        *counts.entry((pair[1] - pair[0]).num_seconds()).or_insert(0) += 1;
    }
    let mut modal = 0_i64;
    let mut best = 0_usize;
    for (&gap, &count) in &counts {
        if count > best {
            best = count;
            modal = gap;
        }
    }
    let minutes = modal as f64 / 60.0;
    let near = |target: f64| (minutes - target).abs() < 5.0;
    let cadence = if near(30.0) {
        Cadence::THIRTY_MINUTES
    } else if near(60.0) {
        Cadence::ONE_HOUR
    } else if near(15.0) {
        Cadence::FIFTEEN_MINUTES
    } else if minutes <= 45.0 {
        Cadence::THIRTY_MINUTES
    } else {
        Cadence::ONE_HOUR
    };
    debug!(modal_gap_minutes = minutes, cadence = %cadence, "detected cadence");
    cadence
}

/// Output of [`normalize`].
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTable {
    /// Grid-indexed table; synthetic rows are absent in every data column.
    pub table: Table,
    pub cadence: Cadence,
    /// Sorted, unique timestamps present in the input.
    pub original_timestamps: Vec<NaiveDateTime>,
    pub report: GridReport,
}

fn time_column<'a>(table: &'a Table, time_col: &str) -> ImputeResult<&'a [Option<NaiveDateTime>]> {
    table.timestamps(time_col).map_err(|err| match err {
        TableError::ColumnNotFound { name } => ImputeError::TimeColumnMissing {
            name,
            available: table.column_names().map(str::to_string).collect(),
        },
        TableError::WrongColumnKind { name, .. } => ImputeError::NotATimestampColumn { name },
        other => ImputeError::Table(other),
    })
}

/// Re-index `table` onto a uniform grid at the chosen cadence.
///
/// # Errors
/// - [`ImputeError::TimeColumnMissing`] / [`ImputeError::NotATimestampColumn`]
///   for a bad `time_col`.
/// - [`ImputeError::NoValidTimestamps`] when every timestamp is absent.
pub fn normalize(table: &Table, time_col: &str, spec: CadenceSpec) -> ImputeResult<NormalizedTable> {
    let stamps = time_column(table, time_col)?;

    let mut rows: Vec<(NaiveDateTime, usize)> =
        stamps.iter().enumerate().filter_map(|(i, t)| t.map(|t| (t, i))).collect();
    let dropped_absent = stamps.len() - rows.len();
    if rows.is_empty() {
        return Err(ImputeError::NoValidTimestamps { column: time_col.to_string() });
    }
    if dropped_absent > 0 {
        warn!(rows = dropped_absent, "dropping rows without a timestamp");
    }

    // Stable: the first occurrence of a duplicated timestamp stays first.
    rows.sort_by_key(|&(t, _)| t);
    let before_dedup = rows.len();
    rows.dedup_by_key(|&mut (t, _)| t);
    let dropped_duplicate = before_dedup - rows.len();
    if dropped_duplicate > 0 {
        warn!(rows = dropped_duplicate, "dropping rows with duplicated timestamps");
    }

    let original_timestamps: Vec<NaiveDateTime> = rows.iter().map(|&(t, _)| t).collect();
    let cadence = spec.resolve(&original_timestamps);
    let step = cadence.seconds();
    let start = original_timestamps[0];
    let end = original_timestamps[original_timestamps.len() - 1];
    let n_slots = usize::try_from((end - start).num_seconds() / step).unwrap_or(0) + 1;

    let mut slots: Vec<Option<usize>> = vec![None; n_slots];
    let mut dropped_misaligned = 0;
    for &(t, src) in &rows {
        // Compared as a full Duration so sub-second offsets count as misaligned.
        let offset = t - start;
        let k = offset.num_seconds() / step;
        if offset != Duration::seconds(step * k) {
            warn!(timestamp = %t, cadence = %cadence, "dropping row not aligned to the time grid");
            dropped_misaligned += 1;
            continue;
        }
        if let Some(slot) = usize::try_from(k).ok().and_then(|k| slots.get_mut(k)) {
            *slot = Some(src);
        }
    }

    let grid_times: Vec<Option<NaiveDateTime>> =
        (0..n_slots).map(|k| Some(start + Duration::seconds(step * k as i64))).collect();
    let matched = slots.iter().filter(|s| s.is_some()).count();
    let columns: Vec<Column> = table
        .gather(&slots)?
        .into_columns()
        .into_iter()
        .map(|c| if c.name == time_col { Column::timestamp(c.name, grid_times.clone()) } else { c })
        .collect();
    let grid = Table::new(columns)?;

    let report = GridReport {
        cadence,
        rows_in: table.n_rows(),
        grid_rows: n_slots,
        synthetic_rows: n_slots - matched,
        dropped_absent_timestamp: dropped_absent,
        dropped_duplicate,
        dropped_misaligned,
        rows_returned: n_slots,
    };
    debug!(
        cadence = %cadence,
        grid_rows = report.grid_rows,
        synthetic_rows = report.synthetic_rows,
        "normalized table onto time grid"
    );
    Ok(NormalizedTable { table: grid, cadence, original_timestamps, report })
}

/// Keep only rows whose timestamp appears in the sorted `original` list.
///
/// # Errors
/// Same time-column errors as [`normalize`].
pub fn filter_to_original(
    table: &Table, time_col: &str, original: &[NaiveDateTime],
) -> ImputeResult<Table> {
    let keep: Vec<usize> = time_column(table, time_col)?
        .iter()
        .enumerate()
        .filter(|(_, t)| t.is_some_and(|t| original.binary_search(&t).is_ok()))
        .map(|(i, _)| i)
        .collect();
    Ok(table.select_rows(&keep)?)
}
