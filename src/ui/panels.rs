use std::path::Path;

use eframe::egui::{self, Color32, RichText, Ui};
use egui_extras::{Column as TableColumn, TableBuilder};

use crate::analysis::summary::{report_json, StatisticsDetail, SummaryReport};
use crate::color::coolwarm;
use crate::dashboard::{DatasetInfo, Section, SectionView};
use crate::data::dataset::Dataset;
use crate::data::export::CsvDownload;
use crate::state::AppState;
use crate::ui::plot;

// ---------------------------------------------------------------------------
// Left side panel – navigation
// ---------------------------------------------------------------------------

/// Render the left navigation panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("🔍 Navigation");
    ui.separator();

    ui.label("Go to:");
    let mut section = state.section;
    for s in Section::ALL {
        ui.radio_value(&mut section, s, s.to_string());
    }
    if section != state.section {
        state.set_section(section);
    }

    if let Some(ds) = &state.dataset {
        ui.separator();
        ui.strong(&ds.name);
        ui.label(format!("{} numeric columns", ds.groups.numeric.len()));
        ui.label(format!("{} categorical columns", ds.groups.categorical.len()));
        if !ds.groups.excluded.is_empty() {
            ui.label(
                RichText::new(format!("{} columns excluded", ds.groups.excluded.len()))
                    .color(Color32::YELLOW),
            )
            .on_hover_text(
                ds.groups
                    .excluded
                    .iter()
                    .map(|e| e.to_string())
                    .collect::<Vec<_>>()
                    .join("\n"),
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{}: {} rows, {} columns",
                ds.name,
                ds.table.num_rows(),
                ds.table.num_columns()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Central panel – active section
// ---------------------------------------------------------------------------

/// Render the page header, the dataset overview and the active section.
pub fn central_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading(format!("📊 {}", state.config.page_title));

    let Some(dataset) = &state.dataset else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a file to explore it  (File → Open…)");
        });
        return;
    };
    ui.label(format!(
        "This dashboard provides visual insights into {}.",
        dataset.name
    ));

    ui.add_space(8.0);
    ui.strong("Dataset Overview");
    dataset_preview(ui, dataset, state.config.preview_rows);
    ui.separator();

    let Some(view) = state.view.take() else {
        return;
    };
    let mut selections = state.selections.clone();
    let mut pending_save: Option<PendingSave> = None;

    match &view {
        SectionView::DatasetInfo(info) => dataset_info_section(ui, info),
        SectionView::Statistics(report) => {
            statistics_section(ui, report, &mut pending_save);
        }
        SectionView::Visualizations(viz) => {
            plot::visualizations_section(ui, dataset, viz, &mut selections);
        }
        SectionView::Download(download) => download_section(ui, download, &mut pending_save),
    }

    state.view = Some(view);
    state.update_selections(selections);

    if let Some(save) = pending_save {
        if let Err(msg) = save.run() {
            log::error!("{msg}");
            state.status_message = Some(msg);
        }
    }
}

/// First rows of the table, like `df.head()`.
fn dataset_preview(ui: &mut Ui, dataset: &Dataset, rows: usize) {
    let names = dataset.table.column_names();
    let preview = dataset.table.preview(rows);

    egui::ScrollArea::horizontal()
        .id_salt("preview_scroll")
        .show(ui, |ui: &mut Ui| {
            ui.push_id("preview_table", |ui: &mut Ui| {
                TableBuilder::new(ui)
                    .striped(true)
                    .vscroll(false)
                    .columns(TableColumn::auto().at_least(60.0), names.len())
                    .header(20.0, |mut header| {
                        for name in &names {
                            header.col(|ui| {
                                ui.strong(name);
                            });
                        }
                    })
                    .body(|mut body| {
                        for cells in &preview {
                            body.row(18.0, |mut row| {
                                for cell in cells {
                                    row.col(|ui| {
                                        ui.label(cell);
                                    });
                                }
                            });
                        }
                    });
            });
        });
}

// ---------------------------------------------------------------------------
// Dataset Info
// ---------------------------------------------------------------------------

fn dataset_info_section(ui: &mut Ui, info: &DatasetInfo) {
    ui.heading("📊 Dataset Information");
    ui.label(format!("Number of Rows: {}", info.rows));
    ui.label(format!("Number of Columns: {}", info.columns));
    ui.label(format!("Column Names: {}", info.column_names.join(", ")));

    ui.add_space(8.0);
    ui.strong("Missing Values and Data Types");
    egui::Grid::new("column_info")
        .striped(true)
        .num_columns(3)
        .show(ui, |ui: &mut Ui| {
            ui.strong("Column");
            ui.strong("Missing");
            ui.strong("Type");
            ui.end_row();
            for col in &info.column_info {
                ui.label(&col.name);
                ui.label(col.missing.to_string());
                ui.label(&col.dtype);
                ui.end_row();
            }
        });
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

/// Describe cells after "column" and "count".
const DETAIL_CELLS: usize = 9;

const DESCRIBE_HEADERS: [&str; DETAIL_CELLS + 2] = [
    "column", "count", "mean", "std", "min", "25%", "50%", "75%", "max", "unique", "top (freq)",
];

fn fmt_opt(v: Option<f64>) -> String {
    v.map(|v| format!("{v:.4}")).unwrap_or_else(|| "–".to_string())
}

fn statistics_section(ui: &mut Ui, report: &SummaryReport, pending: &mut Option<PendingSave>) {
    ui.horizontal(|ui: &mut Ui| {
        ui.heading("📈 Dataset Statistics");
        if ui.button("Save JSON…").clicked() {
            *pending = Some(PendingSave::Report(report.clone()));
        }
    });

    egui::Grid::new("describe")
        .striped(true)
        .num_columns(DESCRIBE_HEADERS.len())
        .show(ui, |ui: &mut Ui| {
            for h in DESCRIBE_HEADERS {
                ui.strong(h);
            }
            ui.end_row();

            for stats in &report.statistics {
                ui.label(&stats.column);
                ui.label(stats.count.to_string());
                let excluded = matches!(stats.detail, StatisticsDetail::Excluded { .. });
                for cell in detail_cells(&stats.detail) {
                    if excluded {
                        ui.label(RichText::new(cell).italics());
                    } else {
                        ui.label(cell);
                    }
                }
                ui.end_row();
            }
        });

    ui.add_space(8.0);
    ui.strong("Correlation Matrix");
    if report.correlation.is_empty() {
        ui.label("At least two numeric columns are needed for a correlation matrix.");
        return;
    }
    correlation_heatmap(ui, report);
}

fn detail_cells(detail: &StatisticsDetail) -> [String; DETAIL_CELLS] {
    let mut cells: [String; DETAIL_CELLS] = Default::default();
    match detail {
        StatisticsDetail::Numeric(n) => {
            for (cell, v) in cells
                .iter_mut()
                .zip([n.mean, n.std, n.min, n.p25, n.p50, n.p75, n.max])
            {
                *cell = fmt_opt(v);
            }
        }
        StatisticsDetail::Categorical(c) => {
            cells[7] = c.unique.to_string();
            cells[8] = match &c.top {
                Some(top) => format!("{top} ({})", c.freq),
                None => "–".to_string(),
            };
        }
        StatisticsDetail::Excluded { dtype } => cells[0] = format!("excluded ({dtype})"),
    }
    cells
}

/// Annotated heatmap of the correlation matrix.
fn correlation_heatmap(ui: &mut Ui, report: &SummaryReport) {
    let matrix = &report.correlation;
    egui::Grid::new("correlation")
        .spacing([2.0, 2.0])
        .show(ui, |ui: &mut Ui| {
            ui.label("");
            for name in &matrix.columns {
                ui.strong(name);
            }
            ui.end_row();

            for (name, row) in matrix.columns.iter().zip(&matrix.cells) {
                ui.strong(name);
                for cell in row {
                    let (text, fill) = match cell.value() {
                        Some(r) => (format!("{r:.2}"), coolwarm(r)),
                        None => ("n/a".to_string(), Color32::DARK_GRAY),
                    };
                    ui.label(
                        RichText::new(format!(" {text} "))
                            .monospace()
                            .color(Color32::BLACK)
                            .background_color(fill),
                    );
                }
                ui.end_row();
            }
        });
}

// ---------------------------------------------------------------------------
// Download
// ---------------------------------------------------------------------------

fn download_section(
    ui: &mut Ui,
    download: &Result<CsvDownload, String>,
    pending: &mut Option<PendingSave>,
) {
    ui.heading("📥 Download Dataset");
    match download {
        Ok(csv) => {
            ui.label(format!("{} ({}, {} bytes)", csv.file_name, csv.mime, csv.bytes.len()));
            if ui.button("📥 Download CSV").clicked() {
                *pending = Some(PendingSave::Csv(csv.clone()));
            }
        }
        Err(e) => {
            ui.label(RichText::new(format!("Error: {e}")).color(Color32::RED));
        }
    }
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

/// A save requested during rendering, run once the frame's borrows end.
enum PendingSave {
    Csv(CsvDownload),
    Report(SummaryReport),
}

impl PendingSave {
    fn run(self) -> Result<(), String> {
        let (title, file_name, filter, bytes) = match self {
            PendingSave::Csv(csv) => ("Save CSV", csv.file_name, "csv", csv.bytes),
            PendingSave::Report(report) => {
                let json = report_json(&report).map_err(|e| format!("Error: {e:#}"))?;
                ("Save summary", "summary.json".to_string(), "json", json.into_bytes())
            }
        };

        let Some(path) = rfd::FileDialog::new()
            .set_title(title)
            .set_file_name(&file_name)
            .add_filter(filter, &[filter])
            .save_file()
        else {
            return Ok(());
        };

        std::fs::write(&path, bytes)
            .map_err(|e| format!("Error: writing {}: {e}", path.display()))?;
        log::info!("Saved {}", path.display());
        Ok(())
    }
}

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open dataset")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        load_dataset(state, &path);
    }
}

/// Load a dataset into the state, reporting failures in the status bar.
pub fn load_dataset(state: &mut AppState, path: &Path) {
    match crate::data::loader::load_file(path) {
        Ok(dataset) => {
            log::info!(
                "Loaded {} with columns {:?}",
                dataset.name,
                dataset.table.column_names()
            );
            state.set_dataset(dataset);
        }
        Err(e) => {
            log::error!("Failed to load file: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::summary::{CategoricalStatistics, NumericStatistics};

    #[test]
    fn every_describe_row_fills_the_grid() {
        let excluded = detail_cells(&StatisticsDetail::Excluded { dtype: "bool".into() });
        assert_eq!(excluded.len() + 2, DESCRIBE_HEADERS.len());
        assert_eq!(excluded[0], "excluded (bool)");
        assert!(excluded[1..].iter().all(String::is_empty));

        let categorical = detail_cells(&StatisticsDetail::Categorical(CategoricalStatistics {
            unique: 2,
            top: Some("a".into()),
            freq: 3,
        }));
        assert_eq!(categorical[8], "a (3)");

        let numeric = detail_cells(&StatisticsDetail::Numeric(NumericStatistics {
            mean: Some(1.0),
            std: None,
            min: Some(1.0),
            p25: Some(1.0),
            p50: Some(1.0),
            p75: Some(1.0),
            max: Some(1.0),
        }));
        assert_eq!(numeric[0], "1.0000");
        assert_eq!(numeric[1], "–");
    }
}
