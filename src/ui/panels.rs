use eframe::egui::{self, Color32, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::model::GEOMETRY_COLUMN;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – attribute table
// ---------------------------------------------------------------------------

/// Render the attribute table of the lots on screen. Clicking a row selects
/// that lot in the plot.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Attributes");
    ui.separator();

    if state.lots.is_empty() {
        ui.label("No records.");
        return;
    }

    let columns: Vec<String> = state.lots.column_names().to_vec();
    let mut clicked = None;

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .sense(egui::Sense::click())
        .column(Column::auto())
        .columns(Column::auto().at_least(60.0), columns.len())
        .column(Column::remainder())
        .header(20.0, |mut header| {
            header.col(|ui| {
                ui.strong("#");
            });
            for col in &columns {
                header.col(|ui| {
                    ui.strong(col);
                });
            }
            header.col(|ui| {
                ui.strong(GEOMETRY_COLUMN);
            });
        })
        .body(|body| {
            body.rows(18.0, state.lots.len(), |mut row| {
                let idx = row.index();
                let lot = &state.lots.records()[idx];
                row.set_selected(state.selected == Some(idx));

                row.col(|ui| {
                    ui.label(idx.to_string());
                });
                for col in &columns {
                    row.col(|ui| {
                        ui.label(lot.attribute(col).to_string());
                    });
                }
                row.col(|ui| {
                    let kind = lot
                        .geometry
                        .as_ref()
                        .map(crate::data::geometry::kind)
                        .unwrap_or("None");
                    ui.label(kind);
                });

                if row.response().clicked() {
                    clicked = Some(idx);
                }
            });
        });

    if let Some(idx) = clicked {
        state.toggle_selected(idx);
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

        ui.label(format!(
            "{} lots with {} == {:?}",
            state.lots.len(),
            state.query.status_column,
            state.query.status_value
        ));

        if let Some(path) = &state.source {
            ui.separator();
            ui.label(path.display().to_string());
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    if let Some(path) = pick_vector_file() {
        state.reload(&path);
    }
}

/// Native picker restricted to the formats the loader understands.
pub fn pick_vector_file() -> Option<std::path::PathBuf> {
    rfd::FileDialog::new()
        .set_title("Open lot data")
        .add_filter(
            "Supported files",
            &["geojson", "json", "shp", "csv", "parquet", "pq"],
        )
        .add_filter("GeoJSON", &["geojson", "json"])
        .add_filter("Shapefile", &["shp"])
        .add_filter("CSV (WKT geometry)", &["csv"])
        .add_filter("GeoParquet", &["parquet", "pq"])
        .pick_file()
}
