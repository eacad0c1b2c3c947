use thiserror::Error;

use crate::data::schema::ColumnKind;

/// Structural problems detected while assembling a [`Table`](crate::data::model::Table).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TableError {
    #[error("duplicate column name `{0}`")]
    DuplicateColumn(String),

    #[error("column `{column}` has {found} rows, expected {expected}")]
    RaggedColumn {
        column: String,
        expected: usize,
        found: usize,
    },
}

/// A column whose type is neither numeric nor categorical.
///
/// Never fatal: the column is left out of both groups and reported.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    #[error("column `{column}` has unsupported type {dtype}; excluded from analysis")]
    Unclassifiable { column: String, dtype: String },
}

/// Failures scoped to a single statistics or chart request.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    #[error("column `{column}` is not a {expected} column")]
    InvalidColumn { column: String, expected: ColumnKind },

    #[error("dataset has no {0} columns")]
    EmptyGroup(ColumnKind),

    #[error("histogram needs at least one bin")]
    InvalidBinCount,
}

impl AnalysisError {
    pub fn invalid_column(column: &str, expected: ColumnKind) -> Self {
        AnalysisError::InvalidColumn {
            column: column.to_string(),
            expected,
        }
    }
}
