use foundation::math::Rectangle;
use serde::{Deserialize, Serialize};

/// Host-side switch for the simulation overlay.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationControl {
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub frame_index: usize,
    #[serde(default)]
    pub session_id: Option<String>,
}

impl SimulationControl {
    /// The session to display, if the overlay should be on.
    pub fn active_session(&self) -> Option<&str> {
        if !self.is_active {
            return None;
        }
        self.session_id.as_deref().filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationBounds {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl SimulationBounds {
    pub fn to_rectangle(self) -> Rectangle {
        Rectangle::from_degrees(self.west, self.south, self.east, self.north)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationFrame {
    pub time_offset: i32,
    pub time_label: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub water_level: f64,
    #[serde(default)]
    pub depth: f64,
    #[serde(default)]
    pub affected_area: f64,
    pub image_url: String,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub is_peak: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationInfo {
    pub source: String,
    pub resolution: String,
    pub total_duration: u32,
    pub frame_count: usize,
    #[serde(rename = "recommendedFPS")]
    pub recommended_fps: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationMetadata {
    pub peak_frame: usize,
    pub peak_depth: f64,
    pub peak_area: f64,
    pub recession_time: u32,
}

/// `GET /simulations/{id}` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResponse {
    pub prediction_id: String,
    pub bounds: SimulationBounds,
    pub frames: Vec<SimulationFrame>,
    #[serde(default)]
    pub simulation: Option<SimulationInfo>,
    #[serde(default)]
    pub metadata: Option<SimulationMetadata>,
}
