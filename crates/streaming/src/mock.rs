//! Offline simulation source used when no API base URL is configured.

use formats::{
    Feature, FeatureCollection, GeoPoint, Geometry, SimulationBounds, SimulationFrame, SimulationInfo,
    SimulationMetadata, SimulationResponse,
};
use futures::future::{LocalBoxFuture, ready};
use serde_json::{Map, Value, json};

use crate::error::SourceError;
use crate::source::SimulationSource;

/// Frame offsets in hours after the forecast start.
pub const MOCK_FRAME_OFFSETS: [i32; 7] = [0, 6, 12, 18, 24, 36, 48];
pub const MOCK_PEAK_OFFSET: i32 = 18;
pub const MOCK_BOUNDS: SimulationBounds = SimulationBounds {
    west: 88.1,
    south: 21.5,
    east: 89.2,
    north: 22.6,
};

const PEAK_DEPTH_M: f64 = 6.0;
const PEAK_AREA_KM2: f64 = 1500.0;
const RECESSION_HOURS: f64 = 30.0;
const EXTENT_VERTICES: usize = 24;

#[derive(Debug, Clone, Default)]
pub struct MockSimulationSource {
    fail: bool,
}

impl MockSimulationSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// A source whose every request fails, for exercising degraded paths.
    pub fn failing() -> Self {
        Self { fail: true }
    }

    pub fn response(session_id: &str) -> SimulationResponse {
        let frames: Vec<SimulationFrame> = MOCK_FRAME_OFFSETS
            .iter()
            .map(|&offset| mock_frame(session_id, offset))
            .collect();
        let peak_frame = MOCK_FRAME_OFFSETS
            .iter()
            .position(|&o| o == MOCK_PEAK_OFFSET)
            .unwrap_or(0);
        SimulationResponse {
            prediction_id: session_id.to_string(),
            bounds: MOCK_BOUNDS,
            simulation: Some(SimulationInfo {
                source: "mock".to_string(),
                resolution: "500m".to_string(),
                total_duration: 48,
                frame_count: frames.len(),
                recommended_fps: 1,
            }),
            metadata: Some(SimulationMetadata {
                peak_frame,
                peak_depth: PEAK_DEPTH_M,
                peak_area: PEAK_AREA_KM2,
                recession_time: RECESSION_HOURS as u32,
            }),
            frames,
        }
    }

    /// Two nested rings around the centre of [`MOCK_BOUNDS`]: the peak extent and its core.
    pub fn extent(session_id: &str) -> FeatureCollection {
        let features = [("peak", 0.42), ("core", 0.2)]
            .into_iter()
            .map(|(zone, scale)| {
                let mut properties = Map::new();
                properties.insert("session".to_string(), Value::String(session_id.to_string()));
                properties.insert("zone".to_string(), json!(zone));
                Feature {
                    id: Some(format!("{session_id}-{zone}")),
                    properties,
                    geometry: Geometry::Polygon(vec![ellipse_ring(scale)]),
                }
            })
            .collect();
        FeatureCollection { features }
    }

    fn unavailable(session_id: &str) -> SourceError {
        SourceError::NotFound(format!("mock simulation {session_id}"))
    }
}

/// Normalised water level: rising to 1 at the peak, then receding.
pub fn water_level(offset_h: i32) -> f64 {
    let t = f64::from(offset_h);
    let peak = f64::from(MOCK_PEAK_OFFSET);
    if t <= peak {
        (t / peak).max(0.0)
    } else {
        (1.0 - (t - peak) / RECESSION_HOURS).max(0.0)
    }
}

fn mock_frame(session_id: &str, offset: i32) -> SimulationFrame {
    let level = water_level(offset);
    let is_peak = offset == MOCK_PEAK_OFFSET;
    let time_label = if is_peak {
        format!("T+{offset}h (Peak)")
    } else {
        format!("T+{offset}h")
    };
    SimulationFrame {
        time_offset: offset,
        time_label,
        timestamp: None,
        water_level: level,
        depth: (PEAK_DEPTH_M * level * 100.0).round() / 100.0,
        affected_area: (PEAK_AREA_KM2 * level).round(),
        image_url: format!("mock://simulations/{session_id}/frame_{offset:02}.png"),
        thumbnail_url: None,
        is_peak,
    }
}

fn ellipse_ring(scale: f64) -> Vec<GeoPoint> {
    let b = MOCK_BOUNDS;
    let cx = (b.west + b.east) * 0.5;
    let cy = (b.south + b.north) * 0.5;
    let rx = (b.east - b.west) * 0.5 * scale * 2.0;
    let ry = (b.north - b.south) * 0.5 * scale * 2.0;
    let mut ring: Vec<GeoPoint> = (0..EXTENT_VERTICES)
        .map(|i| {
            let a = std::f64::consts::TAU * i as f64 / EXTENT_VERTICES as f64;
            GeoPoint::new(cx + rx * a.cos(), cy + ry * a.sin())
        })
        .collect();
    if let Some(first) = ring.first().copied() {
        ring.push(first);
    }
    ring
}

impl SimulationSource for MockSimulationSource {
    fn frames<'a>(&'a self, session_id: &'a str) -> LocalBoxFuture<'a, Result<SimulationResponse, SourceError>> {
        let result = if self.fail {
            Err(Self::unavailable(session_id))
        } else {
            Ok(Self::response(session_id))
        };
        Box::pin(ready(result))
    }

    fn flood_extent<'a>(&'a self, session_id: &'a str) -> LocalBoxFuture<'a, Result<FeatureCollection, SourceError>> {
        let result = if self.fail {
            Err(Self::unavailable(session_id))
        } else {
            Ok(Self::extent(session_id))
        };
        Box::pin(ready(result))
    }
}

#[cfg(test)]
mod tests {
    use super::{MOCK_BOUNDS, MockSimulationSource, water_level};
    use crate::source::SimulationSource;
    use futures::executor::block_on;

    #[test]
    fn seven_frames_with_a_single_peak_at_eighteen_hours() {
        let resp = block_on(MockSimulationSource::new().frames("s1")).unwrap();
        let offsets: Vec<i32> = resp.frames.iter().map(|f| f.time_offset).collect();
        assert_eq!(offsets, vec![0, 6, 12, 18, 24, 36, 48]);
        let peaks: Vec<i32> = resp.frames.iter().filter(|f| f.is_peak).map(|f| f.time_offset).collect();
        assert_eq!(peaks, vec![18]);
        assert_eq!(resp.metadata.map(|m| m.peak_frame), Some(3));
        assert_eq!(resp.bounds, MOCK_BOUNDS);
        assert!(resp.frames[3].time_label.contains("Peak"));
    }

    #[test]
    fn water_level_rises_then_recedes() {
        assert_eq!(water_level(0), 0.0);
        assert_eq!(water_level(18), 1.0);
        assert!(water_level(12) < water_level(18));
        assert!(water_level(36) < water_level(24));
        assert_eq!(water_level(48), 0.0);
    }

    #[test]
    fn extent_rings_are_closed_and_inside_bounds() {
        let fc = block_on(MockSimulationSource::new().flood_extent("s1")).unwrap();
        assert_eq!(fc.len(), 2);
        let rect = MOCK_BOUNDS.to_rectangle();
        for feature in &fc.features {
            for polygon in feature.geometry.polygons() {
                let ring = &polygon[0];
                assert_eq!(ring.first(), ring.last());
                assert!(ring.iter().all(|p| rect.contains(p.lon_deg, p.lat_deg)));
            }
        }
    }

    #[test]
    fn failing_source_reports_not_found() {
        let source = MockSimulationSource::failing();
        assert!(block_on(source.frames("s1")).is_err());
        assert!(block_on(source.flood_extent("s1")).is_err());
    }
}
