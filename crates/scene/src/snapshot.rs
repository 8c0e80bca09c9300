//! Serializable evaluation of the scene at one instant.
//!
//! Renderers and replay tooling consume this instead of the live scene, so
//! every sampled property is resolved here.

use foundation::math::Cartographic;
use foundation::time::Timestamp;
use serde::Serialize;

use crate::camera::HeadingPitchRoll;
use crate::components::{Color, PolylineMaterial};
use crate::imagery::{ImageryProvider, LayerState};
use crate::input::CursorStyle;
use crate::property::PropertyContext;
use crate::tag::EntityTag;
use crate::viewer::{Atmosphere, TerrainState, Viewer};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneSnapshot {
    pub time_ms: f64,
    pub camera: CameraSnapshot,
    pub cursor: CursorStyle,
    pub terrain: TerrainState,
    pub atmosphere: Atmosphere,
    pub imagery: Vec<LayerSnapshot>,
    pub entities: Vec<EntitySnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CameraSnapshot {
    pub position: Cartographic,
    pub orientation: HeadingPitchRoll,
    pub flying: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerSnapshot {
    pub id: String,
    pub provider: ImageryProvider,
    pub alpha: f64,
    pub show: bool,
    pub state: LayerState,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntitySnapshot {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<EntityTag>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Cartographic>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point: Option<PointSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ellipse: Option<EllipseSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub polyline: Option<PolylineSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub polygon: Option<PolygonSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointSnapshot {
    pub pixel_size: f64,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EllipseSnapshot {
    pub semi_major_m: f64,
    pub semi_minor_m: f64,
    pub fill: Color,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolylineSnapshot {
    pub vertices: usize,
    pub width_px: f64,
    /// Stripe offset for flowing materials.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stripe_offset: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolygonSnapshot {
    pub rings: usize,
    pub vertices: usize,
    pub fill: Color,
}

impl Viewer {
    /// Resolves the scene at `time`. Hidden entities and labels outside
    /// their display distance are omitted.
    pub fn snapshot(&self, time: Timestamp) -> SceneSnapshot {
        let entities = self
            .world
            .entities()
            .into_iter()
            .map(|e| {
                let position = self.world.position(e);
                let distance = position
                    .map(|p| self.camera.distance_to(p))
                    .unwrap_or_else(|| self.camera.position().height_m);
                let ctx = PropertyContext::at(time).with_camera_distance(distance);

                EntitySnapshot {
                    id: e.to_string(),
                    name: self.world.name(e).map(str::to_string),
                    tag: self.world.tag(e).cloned(),
                    position,
                    point: self.world.point(e).map(|p| PointSnapshot {
                        pixel_size: p.pixel_size.evaluate(&ctx),
                        color: p.color,
                    }),
                    label: self
                        .world
                        .label(e)
                        .filter(|l| l.visible_at(distance))
                        .map(|l| l.text.clone()),
                    ellipse: self.world.ellipse(e).map(|el| EllipseSnapshot {
                        semi_major_m: el.semi_major_m.evaluate(&ctx),
                        semi_minor_m: el.semi_minor_m.evaluate(&ctx),
                        fill: el.fill.evaluate(&ctx),
                    }),
                    polyline: self.world.polyline(e).map(|pl| PolylineSnapshot {
                        vertices: pl.positions.len(),
                        width_px: pl.width_px,
                        stripe_offset: match &pl.material {
                            PolylineMaterial::Stripe { offset, .. } => Some(offset.evaluate(&ctx)),
                            PolylineMaterial::Solid(_) => None,
                        },
                    }),
                    polygon: self.world.polygon(e).map(|pg| PolygonSnapshot {
                        rings: pg.rings.len(),
                        vertices: pg.vertex_count(),
                        fill: pg.fill,
                    }),
                }
            })
            .collect();

        SceneSnapshot {
            time_ms: time.as_millis(),
            camera: CameraSnapshot {
                position: self.camera.position(),
                orientation: self.camera.orientation(),
                flying: self.camera.is_flying(),
            },
            cursor: self.cursor,
            terrain: self.terrain.clone(),
            atmosphere: self.atmosphere,
            imagery: self
                .imagery
                .iter()
                .map(|l| LayerSnapshot {
                    id: l.id().to_string(),
                    provider: l.provider.clone(),
                    alpha: l.alpha,
                    show: l.show,
                    state: l.state,
                })
                .collect(),
            entities,
        }
    }
}
