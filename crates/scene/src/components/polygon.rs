use foundation::math::Cartographic;

use crate::components::Color;

/// Filled area; the first ring is the outer boundary, the rest are holes.
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonGraphic {
    pub rings: Vec<Vec<Cartographic>>,
    pub fill: Color,
    pub outline: Option<Color>,
}

impl PolygonGraphic {
    pub fn new(rings: Vec<Vec<Cartographic>>, fill: Color) -> Self {
        Self {
            rings,
            fill,
            outline: None,
        }
    }

    pub fn with_outline(mut self, color: Color) -> Self {
        self.outline = Some(color);
        self
    }

    pub fn vertex_count(&self) -> usize {
        self.rings.iter().map(Vec::len).sum()
    }
}
