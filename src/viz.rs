use eframe::egui;

use crate::app::VacantLotsApp;
use crate::data::filter::LotQuery;
use crate::data::model::GeoRecordSet;
use crate::state::AppState;

/// Window options for the lot viewer.
fn native_options(title: &str) -> eframe::NativeOptions {
    eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(title)
            .with_inner_size([1000.0, 1000.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    }
}

/// Show `lots` in a native window titled `title`, with light grey fills and
/// black outlines. Blocks until the window is closed.
///
/// A windowing failure is logged and printed; it is never returned.
pub fn visualize(lots: GeoRecordSet, title: &str, query: LotQuery) {
    let state = AppState::new(lots, title, query);

    let result = eframe::run_native(
        title,
        native_options(title),
        Box::new(move |_cc| Ok(Box::new(VacantLotsApp::new(state)))),
    );

    if let Err(e) = result {
        log::error!("Failed to render plot: {e}");
        eprintln!("Error: {e}");
    }
}
