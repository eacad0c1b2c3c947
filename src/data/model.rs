use std::collections::HashSet;
use std::fmt;

use crate::error::TableError;

// ---------------------------------------------------------------------------
// CellValue – a single cell in a column
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring common Pandas dtypes.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Integer(i64),
    Float(f64),
    Bool(bool),
    Text(String),
    /// Missing value.
    Null,
}

// -- Manual Eq/Hash so values can be counted in hash maps --

impl Eq for CellValue {}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::Text(s) => s.hash(state),
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(f) => f.to_bits().hash(state),
            CellValue::Bool(b) => b.hash(state),
            CellValue::Null => {}
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v:.4}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    /// Try to interpret the value as an `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

// ---------------------------------------------------------------------------
// ColumnType – inferred dtype of a whole column
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Float,
    Bool,
    Text,
    /// A source type the dashboard cannot analyse (dates, nested lists, ...).
    Other(String),
}

impl fmt::Display for ColumnType {
    /// Pandas-style dtype label.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Integer => write!(f, "int64"),
            ColumnType::Float => write!(f, "float64"),
            ColumnType::Bool => write!(f, "bool"),
            ColumnType::Text => write!(f, "object"),
            ColumnType::Other(name) => write!(f, "{name}"),
        }
    }
}

/// Tokens read as missing values, matching the Pandas CSV defaults.
const NA_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND",
    "1.#QNAN", "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

pub fn is_na_token(s: &str) -> bool {
    NA_TOKENS.contains(&s)
}

fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "true" | "True" | "TRUE" => Some(true),
        "false" | "False" | "FALSE" => Some(false),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Column
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub dtype: ColumnType,
    pub values: Vec<CellValue>,
}

impl Column {
    pub fn new(name: impl Into<String>, dtype: ColumnType, values: Vec<CellValue>) -> Self {
        Column {
            name: name.into(),
            dtype,
            values,
        }
    }

    /// Infer the column type from raw text cells and convert every cell.
    ///
    /// Integer beats Float beats Bool beats Text; a column with no
    /// non-missing values is Float.
    pub fn infer<S: AsRef<str>>(name: impl Into<String>, raw: &[Option<S>]) -> Self {
        let present: Vec<Option<&str>> = raw
            .iter()
            .map(|cell| cell.as_ref().map(|s| s.as_ref()).filter(|s| !is_na_token(s)))
            .collect();
        let tokens = || present.iter().flatten();

        let (dtype, values) = if tokens().all(|s| s.parse::<i64>().is_ok()) {
            if tokens().next().is_none() {
                (ColumnType::Float, vec![CellValue::Null; present.len()])
            } else {
                let values = present
                    .iter()
                    .map(|c| match c.and_then(|s| s.parse::<i64>().ok()) {
                        Some(i) => CellValue::Integer(i),
                        None => CellValue::Null,
                    })
                    .collect();
                (ColumnType::Integer, values)
            }
        } else if tokens().all(|s| s.parse::<f64>().is_ok()) {
            let values = present
                .iter()
                .map(|c| match c.and_then(|s| s.parse::<f64>().ok()) {
                    Some(v) if !v.is_nan() => CellValue::Float(v),
                    _ => CellValue::Null,
                })
                .collect();
            (ColumnType::Float, values)
        } else if tokens().all(|s| parse_bool(s).is_some()) {
            let values = present
                .iter()
                .map(|c| match c.and_then(parse_bool) {
                    Some(b) => CellValue::Bool(b),
                    None => CellValue::Null,
                })
                .collect();
            (ColumnType::Bool, values)
        } else {
            let values = present
                .iter()
                .map(|c| match c {
                    Some(s) => CellValue::Text(s.to_string()),
                    None => CellValue::Null,
                })
                .collect();
            (ColumnType::Text, values)
        };

        Column::new(name, dtype, values)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_null()).count()
    }

    /// Numeric view of the column; `None` marks a missing, non-numeric or
    /// infinite cell.
    pub fn numeric_values(&self) -> Vec<Option<f64>> {
        self.values
            .iter()
            .map(|v| v.as_f64().filter(|f| f.is_finite()))
            .collect()
    }

    /// Finite numeric values in row order.
    pub fn present_f64(&self) -> Vec<f64> {
        self.numeric_values().into_iter().flatten().collect()
    }

    /// Pandas dtype label: an integer column with missing values is
    /// reported as `float64`, the way Pandas stores it.
    pub fn dtype_label(&self) -> String {
        match self.dtype {
            ColumnType::Integer if self.missing_count() > 0 => ColumnType::Float.to_string(),
            ref dtype => dtype.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Table – the complete loaded dataset
// ---------------------------------------------------------------------------

/// Ordered, named, equal-length columns. Read-only once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    /// Build a table, checking that names are unique and lengths agree.
    pub fn new(columns: Vec<Column>) -> Result<Self, TableError> {
        let mut seen = HashSet::new();
        for col in &columns {
            if !seen.insert(col.name.as_str()) {
                return Err(TableError::DuplicateColumn(col.name.clone()));
            }
        }
        if let Some(first) = columns.first() {
            let expected = first.len();
            if let Some(bad) = columns.iter().find(|c| c.len() != expected) {
                return Err(TableError::RaggedColumn {
                    column: bad.name.clone(),
                    expected,
                    found: bad.len(),
                });
            }
        }
        Ok(Table { columns })
    }

    /// Number of rows.
    pub fn num_rows(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// First `n` rows rendered as display strings (the "head" of the table).
    pub fn preview(&self, n: usize) -> Vec<Vec<String>> {
        (0..self.num_rows().min(n))
            .map(|row| {
                self.columns
                    .iter()
                    .map(|c| c.values[row].to_string())
                    .collect()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(cells: &[&str]) -> Vec<Option<String>> {
        cells.iter().map(|s| Some(s.to_string())).collect()
    }

    #[test]
    fn infers_integer_column() {
        let col = Column::infer("a", &raw(&["1", "2", "", "4"]));
        assert_eq!(col.dtype, ColumnType::Integer);
        assert_eq!(col.values[2], CellValue::Null);
        assert_eq!(col.missing_count(), 1);
    }

    #[test]
    fn integer_column_with_missing_is_labelled_float64() {
        assert_eq!(Column::infer("a", &raw(&["1", "", "3"])).dtype_label(), "float64");
        assert_eq!(Column::infer("b", &raw(&["1", "2"])).dtype_label(), "int64");
    }

    #[test]
    fn infinities_stay_out_of_numeric_views() {
        let col = Column::infer("a", &raw(&["1.5", "inf", "-inf", "2"]));
        assert_eq!(col.dtype, ColumnType::Float);
        assert_eq!(col.present_f64(), vec![1.5, 2.0]);
        assert_eq!(col.numeric_values(), vec![Some(1.5), None, None, Some(2.0)]);
    }

    #[test]
    fn mixed_ints_and_floats_become_float() {
        let col = Column::infer("a", &raw(&["1", "2.5", "NaN"]));
        assert_eq!(col.dtype, ColumnType::Float);
        assert_eq!(
            col.values,
            vec![CellValue::Float(1.0), CellValue::Float(2.5), CellValue::Null]
        );
    }

    #[test]
    fn text_keeps_original_strings() {
        let col = Column::infer("a", &raw(&["1", "x", "NA"]));
        assert_eq!(col.dtype, ColumnType::Text);
        assert_eq!(col.values[0], CellValue::Text("1".into()));
        assert!(col.values[2].is_null());
    }

    #[test]
    fn bool_and_all_missing_columns() {
        let col = Column::infer("flag", &raw(&["True", "false"]));
        assert_eq!(col.dtype, ColumnType::Bool);

        let col = Column::infer("empty", &raw(&["", "nan"]));
        assert_eq!(col.dtype, ColumnType::Float);
        assert_eq!(col.missing_count(), 2);
    }

    #[test]
    fn table_rejects_ragged_and_duplicate_columns() {
        let a = Column::infer("a", &raw(&["1", "2"]));
        let b = Column::infer("b", &raw(&["1"]));
        assert!(matches!(
            Table::new(vec![a.clone(), b]),
            Err(TableError::RaggedColumn { found: 1, .. })
        ));
        assert_eq!(
            Table::new(vec![a.clone(), a]),
            Err(TableError::DuplicateColumn("a".into()))
        );
    }

    #[test]
    fn preview_is_capped_at_row_count() {
        let a = Column::infer("a", &raw(&["1", "2"]));
        let table = Table::new(vec![a]).unwrap();
        assert_eq!(table.preview(5), vec![vec!["1".to_string()], vec!["2".to_string()]]);
    }
}
