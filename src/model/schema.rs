//! Column metadata, type inference and column signatures

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// Inferred display type for a column
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellType {
    #[default]
    Null,
    Bool,
    Int,
    Float,
    String,
    Date,
    DateTime,
    Mixed,
}

const NULL_MARKERS: &[&str] = &["NA", "N/A", "NaN", "nan", "null", "NULL", "None"];

impl CellType {
    /// Classify a raw cell
    pub fn of(raw: &str) -> CellType {
        let trimmed = raw.trim();

        if trimmed.is_empty() || NULL_MARKERS.contains(&trimmed) {
            return CellType::Null;
        }
        if trimmed.eq_ignore_ascii_case("true") || trimmed.eq_ignore_ascii_case("false") {
            return CellType::Bool;
        }
        if trimmed.parse::<i64>().is_ok() {
            return CellType::Int;
        }
        if trimmed.parse::<f64>().is_ok() {
            return CellType::Float;
        }
        if chrono::NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").is_ok() {
            return CellType::Date;
        }
        if chrono::NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S").is_ok()
            || chrono::NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S").is_ok()
        {
            return CellType::DateTime;
        }

        CellType::String
    }

    /// Widen the type to accommodate another type
    pub fn widen(self, other: CellType) -> CellType {
        if self == other {
            return self;
        }

        match (self, other) {
            (CellType::Null, t) | (t, CellType::Null) => t,
            (CellType::Int, CellType::Float) | (CellType::Float, CellType::Int) => CellType::Float,
            (CellType::Date, CellType::DateTime) | (CellType::DateTime, CellType::Date) => {
                CellType::DateTime
            }
            _ => CellType::Mixed,
        }
    }
}

impl std::fmt::Display for CellType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellType::Null => write!(f, "null"),
            CellType::Bool => write!(f, "bool"),
            CellType::Int => write!(f, "int"),
            CellType::Float => write!(f, "float"),
            CellType::String => write!(f, "string"),
            CellType::Date => write!(f, "date"),
            CellType::DateTime => write!(f, "datetime"),
            CellType::Mixed => write!(f, "mixed"),
        }
    }
}

/// Column metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Column name (from header)
    pub name: String,
    /// Column index (0-based position)
    pub index: usize,
    /// Inferred type from data
    #[serde(rename = "type")]
    pub inferred_type: CellType,
}

impl Column {
    /// Create a new column with name and index
    pub fn new(name: impl Into<String>, index: usize) -> Self {
        Self {
            name: name.into(),
            index,
            inferred_type: CellType::Null,
        }
    }
}

/// The set of column names of a table.
///
/// Equality ignores order; iteration keeps header order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSignature(IndexSet<String>);

impl ColumnSignature {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(names.into_iter().map(Into::into).collect())
    }

    /// Column names in header order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Names in `self` that `other` lacks, in `self`'s order
    pub fn missing_from(&self, other: &ColumnSignature) -> Vec<String> {
        self.0.difference(&other.0).cloned().collect()
    }
}
