use std::collections::HashMap;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::data::dataset::Dataset;
use crate::data::model::{CellValue, Column, Table};
use crate::data::schema::{classify_column, ColumnKind};
use crate::error::AnalysisError;

// ---------------------------------------------------------------------------
// Report types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericStatistics {
    pub mean: Option<f64>,
    /// Sample standard deviation (n - 1).
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub p25: Option<f64>,
    pub p50: Option<f64>,
    pub p75: Option<f64>,
    pub max: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoricalStatistics {
    pub unique: usize,
    pub top: Option<String>,
    pub freq: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value")]
pub enum StatisticsDetail {
    Numeric(NumericStatistics),
    Categorical(CategoricalStatistics),
    /// Column type is neither numeric nor categorical.
    Excluded { dtype: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnStatistics {
    pub column: String,
    /// Non-missing values.
    pub count: usize,
    pub detail: StatisticsDetail,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum CorrelationCell {
    Coefficient(f64),
    /// Zero variance or too few complete pairs.
    Undefined,
}

impl CorrelationCell {
    pub fn value(&self) -> Option<f64> {
        match self {
            CorrelationCell::Coefficient(r) => Some(*r),
            CorrelationCell::Undefined => None,
        }
    }
}

/// Square, symmetric Pearson correlation matrix over numeric columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub cells: Vec<Vec<CorrelationCell>>,
}

impl CorrelationMatrix {
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn get(&self, a: &str, b: &str) -> Option<CorrelationCell> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        Some(self.cells[i][j])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryReport {
    pub statistics: Vec<ColumnStatistics>,
    pub correlation: CorrelationMatrix,
}

// ---------------------------------------------------------------------------
// describe
// ---------------------------------------------------------------------------

/// Descriptive statistics for every column, in table order.
pub fn describe(table: &Table) -> Vec<ColumnStatistics> {
    table.columns().iter().map(describe_column).collect()
}

fn describe_column(column: &Column) -> ColumnStatistics {
    let count = column.len() - column.missing_count();
    let detail = match classify_column(column) {
        Ok(ColumnKind::Numeric) => StatisticsDetail::Numeric(numeric_statistics(&column.present_f64())),
        Ok(ColumnKind::Categorical) => StatisticsDetail::Categorical(categorical_statistics(column)),
        Err(_) => StatisticsDetail::Excluded {
            dtype: column.dtype.to_string(),
        },
    };
    ColumnStatistics {
        column: column.name.clone(),
        count,
        detail,
    }
}

fn numeric_statistics(values: &[f64]) -> NumericStatistics {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let n = values.len();
    let mean = (n > 0).then(|| values.iter().sum::<f64>() / n as f64);
    let std = mean.filter(|_| n > 1).map(|m| {
        let ss: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
        (ss / (n - 1) as f64).sqrt()
    });

    NumericStatistics {
        mean,
        std,
        min: sorted.first().copied(),
        p25: quantile(&sorted, 0.25),
        p50: quantile(&sorted, 0.50),
        p75: quantile(&sorted, 0.75),
        max: sorted.last().copied(),
    }
}

fn categorical_statistics(column: &Column) -> CategoricalStatistics {
    let counts = value_counts(&column.values);
    CategoricalStatistics {
        unique: counts.len(),
        top: counts.first().map(|(v, _)| v.to_string()),
        freq: counts.first().map_or(0, |(_, n)| *n),
    }
}

/// Frequency of each distinct non-missing value, most frequent first.
/// Ties keep the order in which values first appear.
pub fn value_counts(values: &[CellValue]) -> Vec<(&CellValue, usize)> {
    let mut index: HashMap<&CellValue, usize> = HashMap::new();
    let mut counts: Vec<(&CellValue, usize)> = Vec::new();
    for value in values.iter().filter(|v| !v.is_null()) {
        match index.get(value) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(value, counts.len());
                counts.push((value, 1));
            }
        }
    }
    // Stable sort keeps first-appearance order among equal counts.
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

/// Quantile of sorted data by linear interpolation between closest ranks
/// (the Pandas / NumPy default).
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

// ---------------------------------------------------------------------------
// correlate
// ---------------------------------------------------------------------------

/// Pearson correlation for every pair of the given numeric columns.
///
/// Missing values are dropped pairwise. Fewer than two columns gives an empty
/// matrix.
pub fn correlate(table: &Table, numeric_columns: &[String]) -> Result<CorrelationMatrix, AnalysisError> {
    let mut series = Vec::with_capacity(numeric_columns.len());
    for name in numeric_columns {
        let column = table
            .column(name)
            .filter(|c| matches!(classify_column(c), Ok(ColumnKind::Numeric)))
            .ok_or_else(|| AnalysisError::invalid_column(name, ColumnKind::Numeric))?;
        series.push(column.numeric_values());
    }

    if series.len() < 2 {
        return Ok(CorrelationMatrix::default());
    }

    let k = series.len();
    let mut cells = vec![vec![CorrelationCell::Undefined; k]; k];
    for i in 0..k {
        for j in i..k {
            let r = pearson(&series[i], &series[j]);
            let cell = match r {
                Some(_) if i == j => CorrelationCell::Coefficient(1.0),
                Some(r) => CorrelationCell::Coefficient(r),
                None => CorrelationCell::Undefined,
            };
            cells[i][j] = cell;
            cells[j][i] = cell;
        }
    }

    Ok(CorrelationMatrix {
        columns: numeric_columns.to_vec(),
        cells,
    })
}

/// Pairwise-complete Pearson coefficient, `None` when either side has zero
/// variance or there are fewer than two complete pairs.
fn pearson(xs: &[Option<f64>], ys: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .collect();
    if pairs.len() < 2 {
        return None;
    }
    // Checked on the raw values: the mean of a constant float column can round.
    let (x0, y0) = pairs[0];
    if pairs.iter().all(|p| p.0 == x0) || pairs.iter().all(|p| p.1 == y0) {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    let r = sxy / (sxx.sqrt() * syy.sqrt());
    r.is_finite().then(|| r.clamp(-1.0, 1.0))
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Statistics section content: `describe` plus the numeric correlation matrix.
pub fn summarize(dataset: &Dataset) -> SummaryReport {
    let correlation = correlate(&dataset.table, &dataset.groups.numeric).unwrap_or_else(|e| {
        // Groups are derived from the same table, so this only fires on a stale dataset.
        log::error!("correlation failed: {e}");
        CorrelationMatrix::default()
    });
    SummaryReport {
        statistics: describe(&dataset.table),
        correlation,
    }
}

/// Pretty-printed JSON of a report, for saving next to the dataset.
pub fn report_json(report: &SummaryReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("serialising summary report")
}
