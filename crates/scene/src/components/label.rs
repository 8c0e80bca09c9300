use serde::Serialize;

/// Camera-distance window in which a graphic is drawn.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct DistanceDisplayCondition {
    pub near_m: f64,
    pub far_m: f64,
}

impl DistanceDisplayCondition {
    pub fn new(near_m: f64, far_m: f64) -> Self {
        Self { near_m, far_m }
    }

    pub fn contains(&self, distance_m: f64) -> bool {
        distance_m >= self.near_m && distance_m <= self.far_m
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabelGraphic {
    pub text: String,
    pub font: String,
    pub outline_width: f64,
    /// Offset from the anchor in pixels; negative y is up.
    pub pixel_offset: (f64, f64),
    pub display: Option<DistanceDisplayCondition>,
}

impl LabelGraphic {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            font: "14pt sans-serif".to_string(),
            outline_width: 2.0,
            pixel_offset: (0.0, 0.0),
            display: None,
        }
    }

    pub fn visible_at(&self, camera_distance_m: f64) -> bool {
        self.display
            .map(|d| d.contains(camera_distance_m))
            .unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::{DistanceDisplayCondition, LabelGraphic};

    #[test]
    fn display_condition_gates_visibility() {
        let mut label = LabelGraphic::new("Kolkata");
        assert!(label.visible_at(1.0e9));
        label.display = Some(DistanceDisplayCondition::new(0.0, 5_000_000.0));
        assert!(label.visible_at(4_999_999.0));
        assert!(!label.visible_at(5_000_001.0));
    }
}
