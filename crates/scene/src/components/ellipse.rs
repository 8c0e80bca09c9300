use crate::components::Color;
use crate::property::Property;

/// Ground ellipse centered on the entity position. Axes are in meters.
#[derive(Debug, Clone)]
pub struct EllipseGraphic {
    pub semi_major_m: Property<f64>,
    pub semi_minor_m: Property<f64>,
    pub fill: Property<Color>,
    pub outline: Option<Property<Color>>,
}

impl EllipseGraphic {
    pub fn circle(radius_m: impl Into<Property<f64>>, fill: impl Into<Property<Color>>) -> Self {
        let radius = radius_m.into();
        Self {
            semi_major_m: radius.clone(),
            semi_minor_m: radius,
            fill: fill.into(),
            outline: None,
        }
    }
}
