use std::fmt;

use super::model::{Column, ColumnType, Table};
use crate::error::{AnalysisError, SchemaError};

/// Analysis group a column belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnKind {
    Numeric,
    Categorical,
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnKind::Numeric => write!(f, "numeric"),
            ColumnKind::Categorical => write!(f, "categorical"),
        }
    }
}

/// Classify a single column by its inferred type.
pub fn classify_column(column: &Column) -> Result<ColumnKind, SchemaError> {
    match &column.dtype {
        ColumnType::Integer | ColumnType::Float => Ok(ColumnKind::Numeric),
        ColumnType::Text => Ok(ColumnKind::Categorical),
        other @ (ColumnType::Bool | ColumnType::Other(_)) => Err(SchemaError::Unclassifiable {
            column: column.name.clone(),
            dtype: other.to_string(),
        }),
    }
}

// ---------------------------------------------------------------------------
// ColumnGroups
// ---------------------------------------------------------------------------

/// Numeric and categorical column names, each in table order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnGroups {
    pub numeric: Vec<String>,
    pub categorical: Vec<String>,
    /// Columns left out of both groups.
    pub excluded: Vec<SchemaError>,
}

/// Partition the table's columns into numeric and categorical groups.
pub fn classify(table: &Table) -> ColumnGroups {
    let mut groups = ColumnGroups::default();
    for column in table.columns() {
        match classify_column(column) {
            Ok(ColumnKind::Numeric) => groups.numeric.push(column.name.clone()),
            Ok(ColumnKind::Categorical) => groups.categorical.push(column.name.clone()),
            Err(e) => {
                log::warn!("{e}");
                groups.excluded.push(e);
            }
        }
    }
    groups
}

impl ColumnGroups {
    pub fn group(&self, kind: ColumnKind) -> &[String] {
        match kind {
            ColumnKind::Numeric => &self.numeric,
            ColumnKind::Categorical => &self.categorical,
        }
    }

    /// First column of a group, the default pick for a selector.
    pub fn first(&self, kind: ColumnKind) -> Result<&str, AnalysisError> {
        self.group(kind)
            .first()
            .map(String::as_str)
            .ok_or(AnalysisError::EmptyGroup(kind))
    }
}
