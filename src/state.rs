use std::path::{Path, PathBuf};

use crate::data::filter::LotQuery;
use crate::data::model::GeoRecordSet;
use crate::lots::select_lots;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Records on screen.
    pub lots: GeoRecordSet,

    /// Heading shown above the plot.
    pub title: String,

    /// Query re-applied when another file is opened from the window.
    pub query: LotQuery,

    /// File the current records came from, if known.
    pub source: Option<PathBuf>,

    /// Index into `lots` of the row picked in the attribute table.
    pub selected: Option<usize>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(lots: GeoRecordSet, title: impl Into<String>, query: LotQuery) -> Self {
        Self {
            lots,
            title: title.into(),
            query,
            source: None,
            selected: None,
            status_message: None,
        }
    }

    /// Replace the records on screen and clear selection and errors.
    pub fn set_lots(&mut self, lots: GeoRecordSet, source: Option<PathBuf>) {
        self.lots = lots;
        self.source = source;
        self.selected = None;
        self.status_message = None;
    }

    /// Run the current query against `path`. On failure the previous records
    /// stay on screen and the error goes to `status_message`.
    pub fn reload(&mut self, path: &Path) {
        match select_lots(path, &self.query) {
            Ok(lots) => self.set_lots(lots, Some(path.to_path_buf())),
            Err(e) => {
                log::error!("Failed to load {}: {e}", path.display());
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Select row `idx`, or clear the selection if it is already selected.
    pub fn toggle_selected(&mut self, idx: usize) {
        self.selected = if self.selected == Some(idx) {
            None
        } else {
            Some(idx)
        };
    }
}
