//! table — typed columnar container for sensor exports.
//!
//! Purpose
//! -------
//! Hold a rectangular dataset of named columns (one timestamp column plus any
//! number of numeric and text channels) in a form the imputation engine can
//! re-index, overwrite, and extend without knowing where the data came from.
//!
//! Key behaviors
//! -------------
//! - [`Table::new`] validates equal column lengths and unique names.
//! - Numeric cells are `Option<f64>`; non-finite inputs are normalized to
//!   `None` when a numeric [`Column`] is built, so "absent" has exactly one
//!   representation downstream.
//! - [`Table::gather`] re-indexes every column by a list of optional source
//!   rows (a left join onto a new row set); [`Table::select_rows`] keeps a
//!   subset of rows in the given order.
//!
//! Invariants & assumptions
//! ------------------------
//! - All columns of a table have the same length (`n_rows`).
//! - Column names are unique and case-sensitive.
//!
//! Conventions
//! -----------
//! - Timestamps are naive (`chrono::NaiveDateTime`); time zone handling is the
//!   caller's concern.
//! - Row indices are 0-based.
//!
//! Testing notes
//! -------------
//! - Unit tests cover construction checks, non-finite normalization, typed
//!   accessors, and the gather/select re-indexing used by the grid step.
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

pub type TableResult<T> = Result<T, TableError>;

/// Storage kind of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Timestamp,
    Numeric,
    Text,
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ColumnKind::Timestamp => "timestamp",
            ColumnKind::Numeric => "numeric",
            ColumnKind::Text => "text",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableError {
    /// A column's length disagrees with the table's row count.
    LengthMismatch {
        column: String,
        expected: usize,
        found: usize,
    },
    /// Two columns share a name.
    DuplicateColumn { name: String },
    /// No column with this name.
    ColumnNotFound { name: String },
    /// The column exists but holds a different kind of data.
    WrongColumnKind {
        name: String,
        expected: ColumnKind,
        found: ColumnKind,
    },
    /// A row index is outside the table.
    RowOutOfRange { index: usize, n_rows: usize },
}

impl std::error::Error for TableError {}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableError::LengthMismatch { column, expected, found } => {
                write!(f, "Column '{column}' has {found} rows, expected {expected}")
            }
            TableError::DuplicateColumn { name } => write!(f, "Duplicate column name '{name}'"),
            TableError::ColumnNotFound { name } => write!(f, "Column '{name}' not found"),
            TableError::WrongColumnKind { name, expected, found } => {
                write!(f, "Column '{name}' is {found}, expected {expected}")
            }
            TableError::RowOutOfRange { index, n_rows } => {
                write!(f, "Row index {index} out of range for table with {n_rows} rows")
            }
        }
    }
}

/// Cell storage of one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "values", rename_all = "lowercase")]
pub enum ColumnData {
    Timestamp(Vec<Option<NaiveDateTime>>),
    Numeric(Vec<Option<f64>>),
    Text(Vec<Option<String>>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Timestamp(v) => v.len(),
            ColumnData::Numeric(v) => v.len(),
            ColumnData::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kind(&self) -> ColumnKind {
        match self {
            ColumnData::Timestamp(_) => ColumnKind::Timestamp,
            ColumnData::Numeric(_) => ColumnKind::Numeric,
            ColumnData::Text(_) => ColumnKind::Text,
        }
    }

    /// New column whose row `i` is the source row `rows[i]`, or absent when
    /// `rows[i]` is `None`. Indices must be in range.
    fn gather(&self, rows: &[Option<usize>]) -> ColumnData {
        fn pick<T: Clone>(src: &[Option<T>], rows: &[Option<usize>]) -> Vec<Option<T>> {
            rows.iter()
                .map(|r| r.and_then(|i| src.get(i).cloned().flatten()))
                .collect()
        }
        match self {
            ColumnData::Timestamp(v) => ColumnData::Timestamp(pick(v, rows)),
            ColumnData::Numeric(v) => ColumnData::Numeric(pick(v, rows)),
            ColumnData::Text(v) => ColumnData::Text(pick(v, rows)),
        }
    }
}

/// A named column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    pub fn timestamp(name: impl Into<String>, values: Vec<Option<NaiveDateTime>>) -> Self {
        Self { name: name.into(), data: ColumnData::Timestamp(values) }
    }

    /// Numeric column; NaN and ±inf become `None`.
    pub fn numeric(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        let values = values.into_iter().map(|v| v.filter(|x| x.is_finite())).collect();
        Self { name: name.into(), data: ColumnData::Numeric(values) }
    }

    /// Numeric column from raw floats where NaN marks a gap.
    pub fn from_f64(name: impl Into<String>, values: &[f64]) -> Self {
        Self::numeric(name, values.iter().map(|&v| Some(v)).collect())
    }

    pub fn text(name: impl Into<String>, values: Vec<Option<String>>) -> Self {
        Self { name: name.into(), data: ColumnData::Text(values) }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn kind(&self) -> ColumnKind {
        self.data.kind()
    }
}

/// Ordered collection of equal-length, uniquely named columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    columns: Vec<Column>,
    n_rows: usize,
}

impl Table {
    /// Build a table from columns.
    ///
    /// # Errors
    /// - [`TableError::LengthMismatch`] if column lengths differ.
    /// - [`TableError::DuplicateColumn`] if two columns share a name.
    pub fn new(columns: Vec<Column>) -> TableResult<Self> {
        let n_rows = columns.first().map_or(0, Column::len);
        for (i, col) in columns.iter().enumerate() {
            if col.len() != n_rows {
                return Err(TableError::LengthMismatch {
                    column: col.name.clone(),
                    expected: n_rows,
                    found: col.len(),
                });
            }
            if columns[..i].iter().any(|c| c.name == col.name) {
                return Err(TableError::DuplicateColumn { name: col.name.clone() });
            }
        }
        Ok(Self { columns, n_rows })
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn into_columns(self) -> Vec<Column> {
        self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    fn require(&self, name: &str) -> TableResult<&Column> {
        self.column(name).ok_or_else(|| TableError::ColumnNotFound { name: name.to_string() })
    }

    /// Values of a numeric column.
    ///
    /// # Errors
    /// [`TableError::ColumnNotFound`] or [`TableError::WrongColumnKind`].
    pub fn numeric(&self, name: &str) -> TableResult<&[Option<f64>]> {
        let col = self.require(name)?;
        match &col.data {
            ColumnData::Numeric(v) => Ok(v),
            other => Err(TableError::WrongColumnKind {
                name: name.to_string(),
                expected: ColumnKind::Numeric,
                found: other.kind(),
            }),
        }
    }

    /// Values of a timestamp column.
    ///
    /// # Errors
    /// [`TableError::ColumnNotFound`] or [`TableError::WrongColumnKind`].
    pub fn timestamps(&self, name: &str) -> TableResult<&[Option<NaiveDateTime>]> {
        let col = self.require(name)?;
        match &col.data {
            ColumnData::Timestamp(v) => Ok(v),
            other => Err(TableError::WrongColumnKind {
                name: name.to_string(),
                expected: ColumnKind::Timestamp,
                found: other.kind(),
            }),
        }
    }

    /// Append a column at the end.
    ///
    /// # Errors
    /// Same checks as [`Table::new`]. An empty table adopts the column's
    /// length.
    pub fn push_column(&mut self, column: Column) -> TableResult<()> {
        if self.column(&column.name).is_some() {
            return Err(TableError::DuplicateColumn { name: column.name });
        }
        if self.columns.is_empty() {
            self.n_rows = column.len();
        } else if column.len() != self.n_rows {
            let found = column.len();
            return Err(TableError::LengthMismatch { column: column.name, expected: self.n_rows, found });
        }
        self.columns.push(column);
        Ok(())
    }

    /// Overwrite the values of an existing numeric column.
    ///
    /// # Errors
    /// [`TableError::ColumnNotFound`], [`TableError::WrongColumnKind`] or
    /// [`TableError::LengthMismatch`].
    pub fn replace_numeric(&mut self, name: &str, values: Vec<Option<f64>>) -> TableResult<()> {
        if values.len() != self.n_rows {
            return Err(TableError::LengthMismatch {
                column: name.to_string(),
                expected: self.n_rows,
                found: values.len(),
            });
        }
        let col = self
            .columns
            .iter_mut()
            .find(|c| c.name == name)
            .ok_or_else(|| TableError::ColumnNotFound { name: name.to_string() })?;
        if col.kind() != ColumnKind::Numeric {
            return Err(TableError::WrongColumnKind {
                name: name.to_string(),
                expected: ColumnKind::Numeric,
                found: col.kind(),
            });
        }
        *col = Column::numeric(name, values);
        Ok(())
    }

    /// Left-join the table onto a new row set: output row `i` copies source
    /// row `rows[i]`, or is absent in every column when `rows[i]` is `None`.
    ///
    /// # Errors
    /// [`TableError::RowOutOfRange`] for an index past the end.
    pub fn gather(&self, rows: &[Option<usize>]) -> TableResult<Table> {
        if let Some(&index) = rows.iter().flatten().find(|&&i| i >= self.n_rows) {
            return Err(TableError::RowOutOfRange { index, n_rows: self.n_rows });
        }
        let columns = self
            .columns
            .iter()
            .map(|c| Column { name: c.name.clone(), data: c.data.gather(rows) })
            .collect();
        Ok(Table { columns, n_rows: rows.len() })
    }

    /// Keep the given rows in the given order.
    ///
    /// # Errors
    /// [`TableError::RowOutOfRange`] for an index past the end.
    pub fn select_rows(&self, rows: &[usize]) -> TableResult<Table> {
        let rows: Vec<Option<usize>> = rows.iter().copied().map(Some).collect();
        self.gather(&rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Construction checks (lengths, unique names).
    // - Normalization of non-finite numeric cells.
    // - Typed accessors and their error variants.
    // - Row re-indexing with `gather` / `select_rows`.
    //
    // They intentionally DO NOT cover:
    // - Grid alignment, which lives in `imputation::grid`.
    // -------------------------------------------------------------------------

    fn ts(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .and_then(|d| d.and_hms_opt(h, m, 0))
            .expect("valid test timestamp")
    }

    fn sample() -> Table {
        Table::new(vec![
            Column::timestamp("record_time", vec![Some(ts(0, 0)), Some(ts(0, 30)), None]),
            Column::numeric("pm2_5", vec![Some(1.0), None, Some(3.0)]),
            Column::text("site", vec![Some("a".into()), Some("b".into()), None]),
        ])
        .expect("valid table")
    }

    #[test]
    // Purpose
    // -------
    // Ensure `Table::new` rejects ragged and duplicated columns.
    //
    // Given
    // -----
    // - A 2-row and a 3-row column; two columns named "x".
    //
    // Expect
    // ------
    // - `LengthMismatch` and `DuplicateColumn` respectively.
    fn new_rejects_ragged_and_duplicate_columns() {
        // Arrange
        let ragged = vec![Column::from_f64("x", &[1.0, 2.0]), Column::from_f64("y", &[1.0; 3])];
        let dup = vec![Column::from_f64("x", &[1.0]), Column::from_f64("x", &[2.0])];

        // Act / Assert
        assert_eq!(
            Table::new(ragged),
            Err(TableError::LengthMismatch { column: "y".into(), expected: 2, found: 3 })
        );
        assert_eq!(Table::new(dup), Err(TableError::DuplicateColumn { name: "x".into() }));
    }

    #[test]
    // Purpose
    // -------
    // Verify NaN and infinities are stored as absent cells.
    //
    // Given
    // -----
    // - Raw values [1.0, NaN, +inf, 4.0].
    //
    // Expect
    // ------
    // - Stored values [Some(1.0), None, None, Some(4.0)].
    fn numeric_columns_normalize_non_finite_to_none() {
        // Arrange
        let col = Column::from_f64("v", &[1.0, f64::NAN, f64::INFINITY, 4.0]);

        // Act
        let table = Table::new(vec![col]).expect("valid table");

        // Assert
        assert_eq!(table.numeric("v").unwrap(), &[Some(1.0), None, None, Some(4.0)]);
    }

    #[test]
    // Purpose
    // -------
    // Check the typed accessors report missing and mistyped columns.
    //
    // Given
    // -----
    // - The sample table.
    //
    // Expect
    // ------
    // - `numeric("site")` is `WrongColumnKind`; `timestamps("nope")` is
    //   `ColumnNotFound`.
    fn typed_accessors_report_kind_and_presence() {
        // Arrange
        let table = sample();

        // Act / Assert
        assert_eq!(
            table.numeric("site"),
            Err(TableError::WrongColumnKind {
                name: "site".into(),
                expected: ColumnKind::Numeric,
                found: ColumnKind::Text,
            })
        );
        assert_eq!(table.timestamps("nope"), Err(TableError::ColumnNotFound { name: "nope".into() }));
        assert_eq!(table.timestamps("record_time").unwrap().len(), 3);
    }

    #[test]
    // Purpose
    // -------
    // Verify `gather` copies source rows and leaves unmatched rows absent in
    // every column.
    //
    // Given
    // -----
    // - The sample table gathered with [Some(2), None, Some(0)].
    //
    // Expect
    // ------
    // - Row 0 is source row 2, row 1 is empty, row 2 is source row 0.
    fn gather_left_joins_rows() {
        // Arrange
        let table = sample();

        // Act
        let out = table.gather(&[Some(2), None, Some(0)]).expect("in range");

        // Assert
        assert_eq!(out.n_rows(), 3);
        assert_eq!(out.numeric("pm2_5").unwrap(), &[Some(3.0), None, Some(1.0)]);
        assert_eq!(out.timestamps("record_time").unwrap()[2], Some(ts(0, 0)));
        assert!(table.gather(&[Some(3)]).is_err());
    }

    #[test]
    // Purpose
    // -------
    // Exercise the mutation helpers used by the orchestrator.
    //
    // Given
    // -----
    // - The sample table; a replacement vector and a `_filled` sibling.
    //
    // Expect
    // ------
    // - Replacement succeeds on numeric columns only; pushing a wrong-length
    //   column fails.
    fn replace_and_push_columns() {
        // Arrange
        let mut table = sample();

        // Act
        table.replace_numeric("pm2_5", vec![Some(1.0), Some(2.0), Some(3.0)]).unwrap();
        table
            .push_column(Column::numeric("pm2_5_filled", vec![Some(1.0), Some(2.0), Some(3.0)]))
            .unwrap();

        // Assert
        assert_eq!(table.numeric("pm2_5").unwrap(), &[Some(1.0), Some(2.0), Some(3.0)]);
        assert_eq!(table.n_cols(), 4);
        assert!(table.replace_numeric("site", vec![None; 3]).is_err());
        assert!(table.push_column(Column::from_f64("short", &[1.0])).is_err());
        let kept = table.select_rows(&[1]).unwrap();
        assert_eq!(kept.numeric("pm2_5").unwrap(), &[Some(2.0)]);
    }

    #[test]
    // Purpose
    // -------
    // A wrong-length column pushed onto a table reports its own name and
    // length.
    //
    // Given
    // -----
    // - The 3-row sample table and a 1-row column "short".
    //
    // Expect
    // ------
    // - `LengthMismatch { column: "short", expected: 3, found: 1 }` and the
    //   table unchanged.
    fn push_column_length_mismatch_names_the_column() {
        // Arrange
        let mut table = sample();
        let before = table.n_cols();

        // Act
        let result = table.push_column(Column::from_f64("short", &[1.0]));

        // Assert
        assert_eq!(result, Err(TableError::LengthMismatch { column: "short".into(), expected: 3, found: 1 }));
        assert_eq!(table.n_cols(), before);
    }
}
