//! Navigation: maps the active section and widget selections to what the UI
//! should show. `render` is pure; the UI calls it again whenever either input
//! changes.

use std::fmt;

use crate::analysis::chart::{build_chart, ChartRequest, ChartResult, DEFAULT_BIN_COUNT};
use crate::analysis::summary::{summarize, SummaryReport};
use crate::data::dataset::Dataset;
use crate::data::export::{csv_download, CsvDownload};
use crate::data::schema::ColumnKind;
use crate::error::AnalysisError;

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Section {
    #[default]
    DatasetInfo,
    Statistics,
    Visualizations,
    Download,
}

impl Section {
    pub const ALL: [Section; 4] = [
        Section::DatasetInfo,
        Section::Statistics,
        Section::Visualizations,
        Section::Download,
    ];
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Section::DatasetInfo => write!(f, "Dataset Info"),
            Section::Statistics => write!(f, "Statistics"),
            Section::Visualizations => write!(f, "Visualizations"),
            Section::Download => write!(f, "Download"),
        }
    }
}

/// Current widget selections. `None` means "not chosen yet", which falls
/// back to the first column of the relevant group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selections {
    pub histogram_column: Option<String>,
    pub bin_count: usize,
    pub box_column: Option<String>,
    pub scatter_x: Option<String>,
    pub scatter_y: Option<String>,
    pub scatter_color: Option<String>,
    pub bar_column: Option<String>,
}

impl Default for Selections {
    fn default() -> Self {
        Self::with_bins(DEFAULT_BIN_COUNT)
    }
}

impl Selections {
    pub fn with_bins(bin_count: usize) -> Self {
        Self {
            histogram_column: None,
            bin_count,
            box_column: None,
            scatter_x: None,
            scatter_y: None,
            scatter_color: None,
            bar_column: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnInfo {
    pub name: String,
    pub dtype: String,
    pub missing: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DatasetInfo {
    pub rows: usize,
    pub columns: usize,
    pub column_names: Vec<String>,
    pub column_info: Vec<ColumnInfo>,
}

/// One chart slot: the request that was built and its outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSection {
    pub request: ChartRequest,
    pub result: Result<ChartResult, AnalysisError>,
}

/// Chart slots; a slot is `None` when the group it needs is empty.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Visualizations {
    pub histogram: Option<ChartSection>,
    pub box_plot: Option<ChartSection>,
    pub scatter: Option<ChartSection>,
    pub categorical_bar: Option<ChartSection>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SectionView {
    DatasetInfo(DatasetInfo),
    Statistics(SummaryReport),
    Visualizations(Visualizations),
    Download(Result<CsvDownload, String>),
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn render(dataset: &Dataset, section: Section, selections: &Selections) -> SectionView {
    match section {
        Section::DatasetInfo => SectionView::DatasetInfo(dataset_info(dataset)),
        Section::Statistics => SectionView::Statistics(summarize(dataset)),
        Section::Visualizations => SectionView::Visualizations(visualizations(dataset, selections)),
        Section::Download => SectionView::Download(csv_download(dataset).map_err(|e| format!("{e:#}"))),
    }
}

pub fn dataset_info(dataset: &Dataset) -> DatasetInfo {
    let table = &dataset.table;
    DatasetInfo {
        rows: table.num_rows(),
        columns: table.num_columns(),
        column_names: table.column_names(),
        column_info: table
            .columns()
            .iter()
            .map(|c| ColumnInfo {
                name: c.name.clone(),
                dtype: c.dtype_label(),
                missing: c.missing_count(),
            })
            .collect(),
    }
}

pub fn visualizations(dataset: &Dataset, selections: &Selections) -> Visualizations {
    let groups = &dataset.groups;
    let pick = |chosen: &Option<String>, kind: ColumnKind| -> Result<String, AnalysisError> {
        match chosen {
            Some(c) => Ok(c.clone()),
            None => groups.first(kind).map(str::to_string),
        }
    };

    let histogram = pick(&selections.histogram_column, ColumnKind::Numeric).map(|column| {
        ChartRequest::Histogram {
            column,
            bin_count: selections.bin_count,
        }
    });
    let box_plot = pick(&selections.box_column, ColumnKind::Numeric)
        .map(|column| ChartRequest::BoxPlot { column });
    let scatter = pick(&selections.scatter_x, ColumnKind::Numeric).and_then(|x| {
        let y = pick(&selections.scatter_y, ColumnKind::Numeric)?;
        Ok(ChartRequest::Scatter {
            x,
            y,
            color: selections.scatter_color.clone(),
        })
    });
    let categorical_bar = pick(&selections.bar_column, ColumnKind::Categorical)
        .map(|column| ChartRequest::CategoricalBar { column });

    Visualizations {
        histogram: chart_section(dataset, histogram),
        box_plot: chart_section(dataset, box_plot),
        scatter: chart_section(dataset, scatter),
        categorical_bar: chart_section(dataset, categorical_bar),
    }
}

fn chart_section(
    dataset: &Dataset,
    request: Result<ChartRequest, AnalysisError>,
) -> Option<ChartSection> {
    match request {
        Ok(request) => {
            let result = build_chart(&dataset.table, &request);
            if let Err(e) = &result {
                log::warn!("chart request {request:?} rejected: {e}");
            }
            Some(ChartSection { request, result })
        }
        Err(e) => {
            log::debug!("chart section omitted: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::chart::ChartPayload;
    use crate::data::loader::load_csv_reader;

    fn dataset(csv: &str) -> Dataset {
        Dataset::new("StressLevelDataset.csv", load_csv_reader(csv.as_bytes()).unwrap())
    }

    #[test]
    fn dataset_info_reports_shape_missing_and_types() {
        let ds = dataset("a,b,c\n1,x,\n2,,1.5\n3,y,\n");
        let SectionView::DatasetInfo(info) = render(&ds, Section::DatasetInfo, &Selections::default())
        else {
            panic!()
        };
        assert_eq!((info.rows, info.columns), (3, 3));
        assert_eq!(info.column_names, vec!["a", "b", "c"]);
        let missing: Vec<usize> = info.column_info.iter().map(|c| c.missing).collect();
        assert_eq!(missing, vec![0, 1, 2]);
        let dtypes: Vec<&str> = info.column_info.iter().map(|c| c.dtype.as_str()).collect();
        assert_eq!(dtypes, vec!["int64", "object", "float64"]);

        let ds = dataset("a,b\n1,x\n,y\n");
        let SectionView::DatasetInfo(info) = render(&ds, Section::DatasetInfo, &Selections::default())
        else {
            panic!()
        };
        assert_eq!(info.column_info[0].dtype, "float64");
    }

    #[test]
    fn statistics_section_runs_summary_engine() {
        let ds = dataset("a,b\n1,2\n2,4\n3,7\n");
        let SectionView::Statistics(report) = render(&ds, Section::Statistics, &Selections::default())
        else {
            panic!()
        };
        assert_eq!(report.statistics.len(), 2);
        assert_eq!(report.correlation.columns.len(), 2);
    }

    #[test]
    fn visualizations_default_to_first_column_of_each_group() {
        let ds = dataset("n,m,c\n1,2,a\n3,4,b\n");
        let viz = visualizations(&ds, &Selections::default());

        let hist = viz.histogram.unwrap();
        assert_eq!(
            hist.request,
            ChartRequest::Histogram {
                column: "n".into(),
                bin_count: 30
            }
        );
        assert!(hist.result.is_ok());
        assert_eq!(
            viz.scatter.unwrap().request,
            ChartRequest::Scatter {
                x: "n".into(),
                y: "n".into(),
                color: None
            }
        );
        let bar = viz.categorical_bar.unwrap().result.unwrap();
        assert!(matches!(bar.payload, ChartPayload::CategoricalBar(_)));
    }

    #[test]
    fn empty_groups_omit_their_sections() {
        let ds = dataset("c\na\nb\n");
        let viz = visualizations(&ds, &Selections::default());
        assert!(viz.histogram.is_none());
        assert!(viz.box_plot.is_none());
        assert!(viz.scatter.is_none());
        assert!(viz.categorical_bar.is_some());

        let ds = dataset("n\n1\n2\n");
        let viz = visualizations(&ds, &Selections::default());
        assert!(viz.histogram.is_some());
        assert!(viz.categorical_bar.is_none());
    }

    #[test]
    fn invalid_selection_is_scoped_to_its_chart() {
        let ds = dataset("n,m,c\n1,2,a\n3,4,b\n");
        let selections = Selections {
            scatter_x: Some("n".into()),
            scatter_y: Some("m".into()),
            scatter_color: Some("m".into()),
            ..Selections::default()
        };
        let viz = visualizations(&ds, &selections);
        assert_eq!(
            viz.scatter.unwrap().result,
            Err(AnalysisError::invalid_column("m", ColumnKind::Categorical))
        );
        assert!(viz.histogram.unwrap().result.is_ok());
        assert!(viz.box_plot.unwrap().result.is_ok());
    }

    #[test]
    fn download_section_encodes_csv() {
        let ds = dataset("a,b\n1,x\n");
        let SectionView::Download(Ok(download)) = render(&ds, Section::Download, &Selections::default())
        else {
            panic!()
        };
        assert_eq!(download.file_name, "StressLevelDataset.csv");
        assert_eq!(download.bytes, b"a,b\n1,x\n".to_vec());
    }

    #[test]
    fn section_labels_match_navigation() {
        let labels: Vec<String> = Section::ALL.iter().map(|s| s.to_string()).collect();
        assert_eq!(labels, vec!["Dataset Info", "Statistics", "Visualizations", "Download"]);
    }
}
