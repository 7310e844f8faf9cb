use eframe::egui::{Color32, Stroke};

// ---------------------------------------------------------------------------
// Fixed lot styling
// ---------------------------------------------------------------------------

/// Fill for every lot ("lightgrey", #D3D3D3).
pub const LOT_FILL: Color32 = Color32::from_rgb(0xD3, 0xD3, 0xD3);

/// Outline for every lot.
pub const LOT_OUTLINE: Color32 = Color32::BLACK;

/// How a single geometry is painted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LotStyle {
    pub fill: Color32,
    pub outline: Stroke,
    /// Marker radius for point geometries.
    pub point_radius: f32,
}

impl Default for LotStyle {
    fn default() -> Self {
        Self {
            fill: LOT_FILL,
            outline: Stroke::new(1.0, LOT_OUTLINE),
            point_radius: 3.0,
        }
    }
}

impl LotStyle {
    /// The same style with a heavier outline, for the selected lot.
    pub fn highlighted(self) -> Self {
        Self {
            outline: Stroke::new(self.outline.width * 3.0, self.outline.color),
            point_radius: self.point_radius * 2.0,
            ..self
        }
    }
}
