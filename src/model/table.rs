//! Table and Row data structures

use super::schema::{CellType, Column, ColumnSignature};

/// A row in the table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    /// Raw cell text in column order
    pub cells: Vec<String>,
}

impl Row {
    pub fn new(cells: Vec<String>) -> Self {
        Self { cells }
    }

    /// Get a cell by column index
    pub fn get(&self, index: usize) -> Option<&str> {
        self.cells.get(index).map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for Row {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Into::into).collect())
    }
}

/// A table of named columns and rows of raw cells.
///
/// Every row holds exactly one cell per column. The position of a row in
/// `rows` is its index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    /// Column definitions
    pub columns: Vec<Column>,
    /// All rows in the table
    pub rows: Vec<Row>,
}

impl Table {
    /// Create a new empty table with column definitions
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Create an empty table from header names
    pub fn with_headers<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            names
                .into_iter()
                .enumerate()
                .map(|(i, name)| Column::new(name, i))
                .collect(),
        )
    }

    /// Add a row to the table
    pub fn add_row(&mut self, row: Row) {
        debug_assert_eq!(row.cells.len(), self.column_count());
        self.rows.push(row);
    }

    /// Column names in header order
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Get column index by name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// The set of column names, for schema comparison
    pub fn signature(&self) -> ColumnSignature {
        ColumnSignature::new(self.column_names())
    }

    /// Number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Recompute each column's inferred type from its cells
    pub fn infer_column_types(&mut self) {
        for (col_idx, col) in self.columns.iter_mut().enumerate() {
            col.inferred_type = self
                .rows
                .iter()
                .filter_map(|row| row.get(col_idx))
                .map(CellType::of)
                .fold(CellType::Null, CellType::widen);
        }
    }
}
