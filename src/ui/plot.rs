use eframe::egui::Ui;
use egui_plot::{Line, MarkerShape, Plot, PlotPoints, PlotUi, Points, Polygon};
use geo::{CoordsIter, Geometry, LineString};

use crate::color::LotStyle;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Lot plot (central panel)
// ---------------------------------------------------------------------------

fn ring_points(ring: &LineString<f64>) -> PlotPoints<'static> {
    ring.coords().map(|c| [c.x, c.y]).collect()
}

fn draw_polygon(plot_ui: &mut PlotUi, polygon: &geo::Polygon<f64>, name: &str, style: LotStyle) {
    plot_ui.polygon(
        Polygon::new(ring_points(polygon.exterior()))
            .name(name)
            .fill_color(style.fill)
            .stroke(style.outline),
    );
    // Holes are outlined only.
    for hole in polygon.interiors() {
        plot_ui.line(
            Line::new(ring_points(hole))
                .name(name)
                .color(style.outline.color)
                .width(style.outline.width),
        );
    }
}

fn draw_line(plot_ui: &mut PlotUi, line: &LineString<f64>, name: &str, style: LotStyle) {
    plot_ui.line(
        Line::new(ring_points(line))
            .name(name)
            .color(style.outline.color)
            .width(style.outline.width),
    );
}

/// Draw one geometry, recursing into collections.
fn draw_geometry(plot_ui: &mut PlotUi, geometry: &Geometry<f64>, name: &str, style: LotStyle) {
    match geometry {
        Geometry::Polygon(p) => draw_polygon(plot_ui, p, name, style),
        Geometry::MultiPolygon(mp) => {
            for p in mp {
                draw_polygon(plot_ui, p, name, style);
            }
        }
        Geometry::Rect(r) => draw_polygon(plot_ui, &r.to_polygon(), name, style),
        Geometry::Triangle(t) => draw_polygon(plot_ui, &t.to_polygon(), name, style),
        Geometry::LineString(ls) => draw_line(plot_ui, ls, name, style),
        Geometry::Line(l) => draw_line(plot_ui, &LineString::from(*l), name, style),
        Geometry::MultiLineString(mls) => {
            for ls in mls {
                draw_line(plot_ui, ls, name, style);
            }
        }
        Geometry::Point(_) | Geometry::MultiPoint(_) => {
            let points: PlotPoints = geometry.coords_iter().map(|c| [c.x, c.y]).collect();
            plot_ui.points(
                Points::new(points)
                    .name(name)
                    .shape(MarkerShape::Circle)
                    .filled(true)
                    .radius(style.point_radius)
                    .color(style.outline.color),
            );
        }
        Geometry::GeometryCollection(gc) => {
            for g in gc {
                draw_geometry(plot_ui, g, name, style);
            }
        }
    }
}

/// Render the lot plot in the central panel.
pub fn lots_plot(ui: &mut Ui, state: &AppState) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.heading(&state.title);
    });

    if state.lots.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.label("No lots to show.");
        });
        return;
    }

    let style = LotStyle::default();

    let mut plot = Plot::new("lots_plot")
        .data_aspect(1.0)
        .x_axis_label("x")
        .y_axis_label("y")
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true);

    // Start zoomed to the lots.
    if let Some(bounds) = state.lots.bounds() {
        plot = plot
            .include_x(bounds.min().x)
            .include_x(bounds.max().x)
            .include_y(bounds.min().y)
            .include_y(bounds.max().y);
    }

    plot.show(ui, |plot_ui| {
        for (idx, lot) in state.lots.iter().enumerate() {
            let Some(geometry) = &lot.geometry else {
                continue;
            };
            let lot_style = if state.selected == Some(idx) {
                style.highlighted()
            } else {
                style
            };
            draw_geometry(plot_ui, geometry, &format!("lot {idx}"), lot_style);
        }
    });
}
