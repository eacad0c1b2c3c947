use serde::Serialize;

use super::summary::{quantile, value_counts};
use crate::data::model::{CellValue, Column, Table};
use crate::data::schema::{classify_column, ColumnKind};
use crate::error::AnalysisError;

pub const DEFAULT_BIN_COUNT: usize = 30;

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// A chart the user asked for, built from widget selections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ChartRequest {
    Histogram { column: String, bin_count: usize },
    BoxPlot { column: String },
    Scatter { x: String, y: String, color: Option<String> },
    CategoricalBar { column: String },
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBucket {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub column: String,
    pub buckets: Vec<HistogramBucket>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxPlotSummary {
    pub column: String,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    /// Q1 - 1.5 * IQR
    pub lower_fence: f64,
    /// Q3 + 1.5 * IQR
    pub upper_fence: f64,
    /// Most extreme values inside the fences.
    pub lower_whisker: f64,
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

impl BoxPlotSummary {
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterGroup {
    /// Color category; `None` for the ungrouped series or rows missing a color value.
    pub label: Option<String>,
    pub points: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterChart {
    pub x: String,
    pub y: String,
    pub color: Option<String>,
    pub groups: Vec<ScatterGroup>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCounts {
    pub column: String,
    /// Value and frequency, most frequent first.
    pub counts: Vec<(String, usize)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ChartPayload {
    /// Nothing to draw: every selected value is missing.
    Empty,
    Histogram(Histogram),
    BoxPlot(BoxPlotSummary),
    Scatter(ScatterChart),
    CategoricalBar(CategoryCounts),
}

/// A renderable chart built from a validated request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartResult {
    pub title: String,
    pub payload: ChartPayload,
}

impl ChartResult {
    pub fn is_empty(&self) -> bool {
        matches!(self.payload, ChartPayload::Empty)
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Validate the request against the table's column groups and build the chart.
pub fn build_chart(table: &Table, request: &ChartRequest) -> Result<ChartResult, AnalysisError> {
    match request {
        ChartRequest::Histogram { column, bin_count } => {
            let col = require(table, column, ColumnKind::Numeric)?;
            if *bin_count == 0 {
                return Err(AnalysisError::InvalidBinCount);
            }
            Ok(ChartResult {
                title: format!("Histogram of {column}"),
                payload: histogram(col, *bin_count)
                    .map_or(ChartPayload::Empty, ChartPayload::Histogram),
            })
        }
        ChartRequest::BoxPlot { column } => {
            let col = require(table, column, ColumnKind::Numeric)?;
            Ok(ChartResult {
                title: format!("Boxplot of {column}"),
                payload: box_plot(col).map_or(ChartPayload::Empty, ChartPayload::BoxPlot),
            })
        }
        ChartRequest::Scatter { x, y, color } => {
            let x_col = require(table, x, ColumnKind::Numeric)?;
            let y_col = require(table, y, ColumnKind::Numeric)?;
            let color_col = color
                .as_deref()
                .map(|c| require(table, c, ColumnKind::Categorical))
                .transpose()?;
            Ok(ChartResult {
                title: format!("Scatter Plot: {x} vs {y}"),
                payload: scatter(x_col, y_col, color_col)
                    .map_or(ChartPayload::Empty, ChartPayload::Scatter),
            })
        }
        ChartRequest::CategoricalBar { column } => {
            let col = require(table, column, ColumnKind::Categorical)?;
            Ok(ChartResult {
                title: format!("Distribution of {column}"),
                payload: category_counts(col)
                    .map_or(ChartPayload::Empty, ChartPayload::CategoricalBar),
            })
        }
    }
}

/// Look up a column and check it belongs to the expected group.
fn require<'t>(table: &'t Table, name: &str, kind: ColumnKind) -> Result<&'t Column, AnalysisError> {
    table
        .column(name)
        .filter(|c| classify_column(c).ok() == Some(kind))
        .ok_or_else(|| AnalysisError::invalid_column(name, kind))
}

fn histogram(column: &Column, bin_count: usize) -> Option<Histogram> {
    let values = column.present_f64();
    let mut lo = values.iter().copied().reduce(f64::min)?;
    let mut hi = values.iter().copied().reduce(f64::max)?;
    if hi == lo {
        lo -= 0.5;
        hi += 0.5;
    }

    let width = (hi - lo) / bin_count as f64;
    let mut counts = vec![0usize; bin_count];
    for v in &values {
        let idx = (((v - lo) / width).floor() as usize).min(bin_count - 1);
        counts[idx] += 1;
    }

    let buckets = counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBucket {
            lower: lo + width * i as f64,
            upper: if i + 1 == bin_count { hi } else { lo + width * (i + 1) as f64 },
            count,
        })
        .collect();

    Some(Histogram {
        column: column.name.clone(),
        buckets,
    })
}

fn box_plot(column: &Column) -> Option<BoxPlotSummary> {
    let mut sorted = column.present_f64();
    sorted.sort_by(f64::total_cmp);

    let q1 = quantile(&sorted, 0.25)?;
    let median = quantile(&sorted, 0.5)?;
    let q3 = quantile(&sorted, 0.75)?;
    let iqr = q3 - q1;
    let lower_fence = q1 - 1.5 * iqr;
    let upper_fence = q3 + 1.5 * iqr;

    let inside = || sorted.iter().copied().filter(|v| (lower_fence..=upper_fence).contains(v));
    let lower_whisker = inside().next().unwrap_or(q1);
    let upper_whisker = inside().last().unwrap_or(q3);
    let outliers = sorted
        .iter()
        .copied()
        .filter(|v| !(lower_fence..=upper_fence).contains(v))
        .collect();

    Some(BoxPlotSummary {
        column: column.name.clone(),
        min: *sorted.first()?,
        q1,
        median,
        q3,
        max: *sorted.last()?,
        lower_fence,
        upper_fence,
        lower_whisker,
        upper_whisker,
        outliers,
    })
}

fn scatter(x: &Column, y: &Column, color: Option<&Column>) -> Option<ScatterChart> {
    let mut groups: Vec<ScatterGroup> = Vec::new();
    let mut unlabelled: Vec<[f64; 2]> = Vec::new();

    let (xs, ys) = (x.numeric_values(), y.numeric_values());
    for row in 0..x.len() {
        let (Some(xv), Some(yv)) = (xs[row], ys[row]) else {
            continue;
        };
        let label = color.and_then(|c| match &c.values[row] {
            CellValue::Null => None,
            v => Some(v.to_string()),
        });
        match label {
            Some(label) => match groups.iter_mut().find(|g| g.label.as_deref() == Some(label.as_str())) {
                Some(group) => group.points.push([xv, yv]),
                None => groups.push(ScatterGroup {
                    label: Some(label),
                    points: vec![[xv, yv]],
                }),
            },
            None => unlabelled.push([xv, yv]),
        }
    }

    if !unlabelled.is_empty() {
        groups.push(ScatterGroup {
            label: None,
            points: unlabelled,
        });
    }
    if groups.is_empty() {
        return None;
    }

    Some(ScatterChart {
        x: x.name.clone(),
        y: y.name.clone(),
        color: color.map(|c| c.name.clone()),
        groups,
    })
}

fn category_counts(column: &Column) -> Option<CategoryCounts> {
    let counts: Vec<(String, usize)> = value_counts(&column.values)
        .into_iter()
        .map(|(v, n)| (v.to_string(), n))
        .collect();
    if counts.is_empty() {
        return None;
    }
    Some(CategoryCounts {
        column: column.name.clone(),
        counts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::load_csv_reader;

    fn table(csv: &str) -> Table {
        load_csv_reader(csv.as_bytes()).unwrap()
    }

    fn hist(column: &str, bin_count: usize) -> ChartRequest {
        ChartRequest::Histogram {
            column: column.into(),
            bin_count,
        }
    }

    #[test]
    fn histogram_spans_min_to_max() {
        let t = table("v\n0\n1\n2\n3\n4\n10\n");
        let chart = build_chart(&t, &hist("v", 5)).unwrap();
        assert_eq!(chart.title, "Histogram of v");
        let ChartPayload::Histogram(h) = chart.payload else { panic!() };
        assert_eq!(h.buckets.len(), 5);
        assert_eq!(h.buckets[0].lower, 0.0);
        assert_eq!(h.buckets[4].upper, 10.0);
        let counts: Vec<usize> = h.buckets.iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![2, 2, 1, 0, 1]);
    }

    #[test]
    fn histogram_of_identical_values_has_one_full_bucket() {
        let t = table("v\n5.0\n5.0\n5.0\n5.0\n");
        let chart = build_chart(&t, &hist("v", DEFAULT_BIN_COUNT)).unwrap();
        let ChartPayload::Histogram(h) = chart.payload else { panic!() };
        let non_empty: Vec<&HistogramBucket> = h.buckets.iter().filter(|b| b.count > 0).collect();
        assert_eq!(non_empty.len(), 1);
        assert_eq!(non_empty[0].count, 4);
        assert!(non_empty[0].lower - 1e-9 <= 5.0 && 5.0 <= non_empty[0].upper + 1e-9);
    }

    #[test]
    fn histogram_ignores_infinite_values() {
        let t = table("v\n0\ninf\n1\n-inf\n2\n");
        let ChartPayload::Histogram(h) = build_chart(&t, &hist("v", 2)).unwrap().payload else {
            panic!()
        };
        assert_eq!(h.buckets[0].lower, 0.0);
        assert_eq!(h.buckets[1].upper, 2.0);
        assert!(h.buckets.iter().all(|b| b.lower.is_finite() && b.upper.is_finite()));
        assert_eq!(h.buckets.iter().map(|b| b.count).sum::<usize>(), 3);
    }

    #[test]
    fn histogram_of_all_missing_is_flagged_empty() {
        let t = table("v,w\n,1\n,2\n");
        let chart = build_chart(&t, &hist("v", 30)).unwrap();
        assert!(chart.is_empty());
    }

    #[test]
    fn histogram_rejects_zero_bins_and_text_columns() {
        let t = table("v,c\n1,a\n");
        assert_eq!(build_chart(&t, &hist("v", 0)), Err(AnalysisError::InvalidBinCount));
        assert_eq!(
            build_chart(&t, &hist("c", 30)),
            Err(AnalysisError::invalid_column("c", ColumnKind::Numeric))
        );
        assert_eq!(
            build_chart(&t, &hist("nope", 30)),
            Err(AnalysisError::invalid_column("nope", ColumnKind::Numeric))
        );
    }

    #[test]
    fn box_plot_five_number_summary() {
        let t = table("v\n1\n2\n3\n4\n5\n6\n7\n8\n9\n10\n");
        let chart = build_chart(&t, &ChartRequest::BoxPlot { column: "v".into() }).unwrap();
        let ChartPayload::BoxPlot(b) = chart.payload else { panic!() };
        assert_eq!((b.min, b.q1, b.median, b.q3, b.max), (1.0, 3.25, 5.5, 7.75, 10.0));
        assert_eq!(b.iqr(), 4.5);
        assert_eq!(b.lower_fence, 3.25 - 6.75);
        assert_eq!(b.upper_fence, 7.75 + 6.75);
        assert!(b.outliers.is_empty());
        assert_eq!((b.lower_whisker, b.upper_whisker), (1.0, 10.0));
    }

    #[test]
    fn box_plot_reports_outliers_beyond_fences() {
        let t = table("v\n1\n2\n3\n4\n100\n");
        let chart = build_chart(&t, &ChartRequest::BoxPlot { column: "v".into() }).unwrap();
        let ChartPayload::BoxPlot(b) = chart.payload else { panic!() };
        assert_eq!(b.outliers, vec![100.0]);
        assert_eq!(b.upper_whisker, 4.0);
        assert_eq!(b.max, 100.0);
    }

    #[test]
    fn scatter_drops_incomplete_rows_and_groups_by_color() {
        let t = table("x,y,g\n1,2,a\n2,,b\n3,4,b\n,5,a\n5,6,a\n7,8,\n");
        let request = ChartRequest::Scatter {
            x: "x".into(),
            y: "y".into(),
            color: Some("g".into()),
        };
        let chart = build_chart(&t, &request).unwrap();
        assert_eq!(chart.title, "Scatter Plot: x vs y");
        let ChartPayload::Scatter(s) = chart.payload else { panic!() };
        let labels: Vec<Option<&str>> = s.groups.iter().map(|g| g.label.as_deref()).collect();
        assert_eq!(labels, vec![Some("a"), Some("b"), None]);
        assert_eq!(s.groups[0].points, vec![[1.0, 2.0], [5.0, 6.0]]);
        assert_eq!(s.groups[1].points, vec![[3.0, 4.0]]);
        assert_eq!(s.groups[2].points, vec![[7.0, 8.0]]);
    }

    #[test]
    fn scatter_without_color_is_one_series() {
        let t = table("x,y\n1,2\n3,4\n");
        let request = ChartRequest::Scatter {
            x: "x".into(),
            y: "y".into(),
            color: None,
        };
        let ChartPayload::Scatter(s) = build_chart(&t, &request).unwrap().payload else {
            panic!()
        };
        assert_eq!(s.groups.len(), 1);
        assert_eq!(s.groups[0].label, None);
    }

    #[test]
    fn scatter_with_numeric_color_names_the_color_column() {
        let t = table("x,y,z\n1,2,3\n");
        let request = ChartRequest::Scatter {
            x: "x".into(),
            y: "y".into(),
            color: Some("z".into()),
        };
        assert_eq!(
            build_chart(&t, &request),
            Err(AnalysisError::InvalidColumn {
                column: "z".into(),
                expected: ColumnKind::Categorical,
            })
        );
    }

    #[test]
    fn categorical_bar_orders_by_frequency_then_first_appearance() {
        let t = table("c\na\nb\na\nc\nb\na\n");
        let chart = build_chart(&t, &ChartRequest::CategoricalBar { column: "c".into() }).unwrap();
        assert_eq!(chart.title, "Distribution of c");
        let ChartPayload::CategoricalBar(bar) = chart.payload else { panic!() };
        assert_eq!(
            bar.counts,
            vec![("a".to_string(), 3), ("b".to_string(), 2), ("c".to_string(), 1)]
        );
    }

    #[test]
    fn categorical_bar_ties_keep_table_order() {
        let t = table("c\nz\ny\ny\nz\nx\n");
        let chart = build_chart(&t, &ChartRequest::CategoricalBar { column: "c".into() }).unwrap();
        let ChartPayload::CategoricalBar(bar) = chart.payload else { panic!() };
        let order: Vec<&str> = bar.counts.iter().map(|(v, _)| v.as_str()).collect();
        assert_eq!(order, vec!["z", "y", "x"]);
    }

    #[test]
    fn categorical_bar_rejects_numeric_column() {
        let t = table("n\n1\n");
        assert_eq!(
            build_chart(&t, &ChartRequest::CategoricalBar { column: "n".into() }),
            Err(AnalysisError::invalid_column("n", ColumnKind::Categorical))
        );
    }
}
