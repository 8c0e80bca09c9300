use foundation::math::Cartographic;

use crate::components::Color;
use crate::property::Property;

#[derive(Debug, Clone)]
pub enum PolylineMaterial {
    Solid(Color),
    /// Alternating bands along the line; `offset` slides them to suggest flow.
    Stripe {
        even: Color,
        odd: Color,
        repeat: f64,
        offset: Property<f64>,
    },
}

#[derive(Debug, Clone)]
pub struct PolylineGraphic {
    pub positions: Vec<Cartographic>,
    pub width_px: f64,
    pub material: PolylineMaterial,
    pub clamp_to_ground: bool,
}

impl PolylineGraphic {
    pub fn new(positions: Vec<Cartographic>, width_px: f64, material: PolylineMaterial) -> Self {
        Self {
            positions,
            width_px,
            material,
            clamp_to_ground: true,
        }
    }
}
