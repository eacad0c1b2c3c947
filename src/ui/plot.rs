use eframe::egui::{self, Color32, RichText, Ui};
use egui_plot::{Bar, BarChart, BoxElem, BoxPlot, BoxSpread, Legend, Plot, Points};

use crate::analysis::chart::{
    BoxPlotSummary, CategoryCounts, ChartPayload, ChartRequest, Histogram, ScatterChart,
};
use crate::color::{generate_palette, ColorMap};
use crate::dashboard::{ChartSection, Selections, Visualizations};
use crate::data::dataset::Dataset;

const PLOT_HEIGHT: f32 = 280.0;

// ---------------------------------------------------------------------------
// Visualizations section
// ---------------------------------------------------------------------------

/// Render the selectors and the four chart slots. Selector changes are
/// written into `selections`; the caller re-renders the view when they differ.
pub fn visualizations_section(
    ui: &mut Ui,
    dataset: &Dataset,
    viz: &Visualizations,
    selections: &mut Selections,
) {
    ui.heading("📊 Data Visualizations");
    let numeric = &dataset.groups.numeric;
    let categorical = &dataset.groups.categorical;

    if let Some(section) = &viz.histogram {
        ui.strong("Histogram");
        ui.horizontal(|ui: &mut Ui| {
            column_selector(
                ui,
                "hist_col",
                "Select a column for histogram:",
                numeric,
                &mut selections.histogram_column,
                section_column(section, 0),
            );
            ui.add(egui::Slider::new(&mut selections.bin_count, 1..=100).text("bins"));
        });
        chart_slot(ui, "histogram_plot", section);
        ui.separator();
    }

    if let Some(section) = &viz.box_plot {
        ui.strong("Box Plot");
        column_selector(
            ui,
            "box_col",
            "Select a column for box plot:",
            numeric,
            &mut selections.box_column,
            section_column(section, 0),
        );
        chart_slot(ui, "box_plot", section);
        ui.separator();
    }

    if let Some(section) = &viz.scatter {
        ui.strong("Scatter Plot");
        ui.horizontal(|ui: &mut Ui| {
            column_selector(
                ui,
                "scatter_x",
                "Select X-axis:",
                numeric,
                &mut selections.scatter_x,
                section_column(section, 0),
            );
            column_selector(
                ui,
                "scatter_y",
                "Select Y-axis:",
                numeric,
                &mut selections.scatter_y,
                section_column(section, 1),
            );
        });
        ui.horizontal(|ui: &mut Ui| {
            ui.label("Select a categorical column for color (optional):");
            let current = selections.scatter_color.clone().unwrap_or_else(|| "None".to_string());
            egui::ComboBox::from_id_salt("scatter_color")
                .selected_text(current)
                .show_ui(ui, |ui: &mut Ui| {
                    ui.selectable_value(&mut selections.scatter_color, None, "None");
                    for col in categorical {
                        ui.selectable_value(&mut selections.scatter_color, Some(col.clone()), col);
                    }
                });
        });
        chart_slot(ui, "scatter_plot", section);
        ui.separator();
    }

    if let Some(section) = &viz.categorical_bar {
        ui.strong("Categorical Column Distribution");
        column_selector(
            ui,
            "bar_col",
            "Select a categorical column:",
            categorical,
            &mut selections.bar_column,
            section_column(section, 0),
        );
        chart_slot(ui, "bar_plot", section);
    }
}

/// The column the dispatcher actually used, shown when nothing was picked yet.
fn section_column(section: &ChartSection, index: usize) -> String {
    match &section.request {
        ChartRequest::Histogram { column, .. }
        | ChartRequest::BoxPlot { column }
        | ChartRequest::CategoricalBar { column } => column.clone(),
        ChartRequest::Scatter { x, .. } if index == 0 => x.clone(),
        ChartRequest::Scatter { y, .. } => y.clone(),
    }
}

fn column_selector(
    ui: &mut Ui,
    id: &str,
    label: &str,
    options: &[String],
    selected: &mut Option<String>,
    current: String,
) {
    ui.label(label);
    egui::ComboBox::from_id_salt(id)
        .selected_text(current)
        .show_ui(ui, |ui: &mut Ui| {
            for col in options {
                ui.selectable_value(selected, Some(col.clone()), col);
            }
        });
}

/// Show a chart, the "nothing to plot" notice, or the validation error.
fn chart_slot(ui: &mut Ui, id: &str, section: &ChartSection) {
    let chart = match &section.result {
        Ok(chart) => chart,
        Err(e) => {
            ui.label(RichText::new(format!("⚠ {e}")).color(Color32::RED));
            return;
        }
    };

    ui.label(RichText::new(&chart.title).strong());
    match &chart.payload {
        ChartPayload::Empty => {
            ui.label("No values to plot: every selected value is missing.");
        }
        ChartPayload::Histogram(h) => histogram_plot(ui, id, h),
        ChartPayload::BoxPlot(b) => box_plot(ui, id, b),
        ChartPayload::Scatter(s) => scatter_plot(ui, id, s),
        ChartPayload::CategoricalBar(c) => category_bar_plot(ui, id, c),
    }
}

// ---------------------------------------------------------------------------
// Individual charts
// ---------------------------------------------------------------------------

fn histogram_plot(ui: &mut Ui, id: &str, hist: &Histogram) {
    let bars: Vec<Bar> = hist
        .buckets
        .iter()
        .map(|b| {
            Bar::new((b.lower + b.upper) / 2.0, b.count as f64)
                .width(b.upper - b.lower)
                .name(format!("[{:.3}, {:.3}]", b.lower, b.upper))
        })
        .collect();

    Plot::new(id)
        .height(PLOT_HEIGHT)
        .x_axis_label(&hist.column)
        .y_axis_label("count")
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).color(Color32::LIGHT_BLUE).name(&hist.column));
        });
}

fn box_plot(ui: &mut Ui, id: &str, summary: &BoxPlotSummary) {
    let spread = BoxSpread::new(
        summary.lower_whisker,
        summary.q1,
        summary.median,
        summary.q3,
        summary.upper_whisker,
    );
    let elem = BoxElem::new(0.0, spread).name(&summary.column).box_width(0.5);
    let outliers: Vec<[f64; 2]> = summary.outliers.iter().map(|v| [0.0, *v]).collect();

    Plot::new(id)
        .height(PLOT_HEIGHT)
        .y_axis_label(&summary.column)
        .show(ui, |plot_ui| {
            plot_ui.box_plot(BoxPlot::new(vec![elem]).name(&summary.column));
            if !outliers.is_empty() {
                plot_ui.points(Points::new(outliers).radius(3.0).name("outliers"));
            }
        });

    ui.label(format!(
        "min {:.3}  Q1 {:.3}  median {:.3}  Q3 {:.3}  max {:.3}  (IQR {:.3}, {} outliers)",
        summary.min,
        summary.q1,
        summary.median,
        summary.q3,
        summary.max,
        summary.iqr(),
        summary.outliers.len()
    ));
}

fn scatter_plot(ui: &mut Ui, id: &str, chart: &ScatterChart) {
    let color_map = ColorMap::new(chart.groups.iter().map(|g| g.label.as_deref()));

    Plot::new(id)
        .height(PLOT_HEIGHT)
        .legend(Legend::default())
        .x_axis_label(&chart.x)
        .y_axis_label(&chart.y)
        .show(ui, |plot_ui| {
            for group in &chart.groups {
                let name = match (&group.label, &chart.color) {
                    (Some(label), _) => label.clone(),
                    (None, Some(color)) => format!("{color}: missing"),
                    (None, None) => format!("{} vs {}", chart.x, chart.y),
                };
                plot_ui.points(
                    Points::new(group.points.clone())
                        .radius(2.5)
                        .color(color_map.color_for(group.label.as_deref()))
                        .name(name),
                );
            }
        });
}

fn category_bar_plot(ui: &mut Ui, id: &str, counts: &CategoryCounts) {
    let palette = generate_palette(counts.counts.len());
    let bars: Vec<Bar> = counts
        .counts
        .iter()
        .zip(palette)
        .enumerate()
        .map(|(i, ((value, n), color))| {
            Bar::new(i as f64, *n as f64).name(value).fill(color).width(0.8)
        })
        .collect();

    Plot::new(id)
        .height(PLOT_HEIGHT)
        .x_axis_label(&counts.column)
        .y_axis_label("count")
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name(&counts.column));
        });

    ui.label(
        counts
            .counts
            .iter()
            .map(|(value, n)| format!("{value}: {n}"))
            .collect::<Vec<_>>()
            .join("   "),
    );
}
