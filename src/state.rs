use crate::config::DashboardConfig;
use crate::dashboard::{render, Section, SectionView, Selections};
use crate::data::dataset::Dataset;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// Loaded dataset (None until a file is loaded).
    pub dataset: Option<Dataset>,

    /// Active navigation section.
    pub section: Section,

    /// Widget selections feeding the chart requests.
    pub selections: Selections,

    /// Output of the dispatcher for the current section and selections (cached).
    pub view: Option<SectionView>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        let selections = Selections::with_bins(config.histogram_bins);
        Self {
            config,
            dataset: None,
            section: Section::default(),
            selections,
            view: None,
            status_message: None,
        }
    }

    /// Ingest a newly loaded dataset, reset selections and render the active section.
    pub fn set_dataset(&mut self, dataset: Dataset) {
        self.selections = Selections::with_bins(self.config.histogram_bins);
        self.dataset = Some(dataset);
        self.status_message = None;
        self.refresh();
    }

    /// Switch section; every section is rendered fresh.
    pub fn set_section(&mut self, section: Section) {
        self.section = section;
        self.refresh();
    }

    /// Replace the selections, re-rendering only when something changed.
    pub fn update_selections(&mut self, selections: Selections) {
        if selections != self.selections {
            self.selections = selections;
            self.refresh();
        }
    }

    /// Recompute `view` from the dataset, section and selections.
    pub fn refresh(&mut self) {
        self.view = self
            .dataset
            .as_ref()
            .map(|ds| render(ds, self.section, &self.selections));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::load_csv_reader;

    fn state_with_data() -> AppState {
        let mut state = AppState::new(DashboardConfig::default());
        let table = load_csv_reader("n,c\n1,a\n2,b\n".as_bytes()).unwrap();
        state.set_dataset(Dataset::new("t.csv", table));
        state
    }

    #[test]
    fn no_view_without_dataset() {
        let mut state = AppState::new(DashboardConfig::default());
        state.set_section(Section::Statistics);
        assert!(state.view.is_none());
    }

    #[test]
    fn switching_section_re_renders() {
        let mut state = state_with_data();
        assert!(matches!(state.view, Some(SectionView::DatasetInfo(_))));
        state.set_section(Section::Download);
        assert!(matches!(state.view, Some(SectionView::Download(Ok(_)))));
    }

    #[test]
    fn selection_change_updates_chart() {
        let mut state = state_with_data();
        state.set_section(Section::Visualizations);
        let selections = Selections {
            bin_count: 0,
            ..state.selections.clone()
        };
        state.update_selections(selections);
        let Some(SectionView::Visualizations(viz)) = &state.view else { panic!() };
        assert!(viz.histogram.as_ref().unwrap().result.is_err());
    }
}
