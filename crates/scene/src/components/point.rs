use crate::components::Color;
use crate::property::Property;

/// Screen-space dot drawn at the entity position.
#[derive(Debug, Clone)]
pub struct PointGraphic {
    pub pixel_size: Property<f64>,
    pub color: Color,
    pub outline_color: Color,
    pub outline_width: f64,
}

impl PointGraphic {
    pub fn new(pixel_size: impl Into<Property<f64>>, color: Color) -> Self {
        Self {
            pixel_size: pixel_size.into(),
            color,
            outline_color: Color::WHITE,
            outline_width: 0.0,
        }
    }

    pub fn with_outline(mut self, color: Color, width: f64) -> Self {
        self.outline_color = color;
        self.outline_width = width;
        self
    }
}
