use foundation::time::Timestamp;

use crate::World;
use crate::camera::{Camera, Viewport};
use crate::entity::EntityId;
use crate::property::PropertyContext;

/// Extra slack around point graphics, in pixels.
pub const PICK_TOLERANCE_PX: f64 = 4.0;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PickKind {
    Point,
    Ellipse,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PickHit {
    pub entity: EntityId,
    pub kind: PickKind,
    pub depth_m: f64,
    pub distance_px: f64,
}

/// Screen-space picking of point and ellipse entities at `time`.
///
/// Ordering contract:
/// - The hit closest to the camera wins.
/// - Equal depths are broken by the lower `EntityId::index()`.
///
/// Hidden entities and entities without a position are never hit.
pub fn pick(
    world: &World,
    camera: &Camera,
    viewport: Viewport,
    x_px: f64,
    y_px: f64,
    time: Timestamp,
) -> Option<PickHit> {
    if !x_px.is_finite() || !y_px.is_finite() {
        return None;
    }
    let focal = camera.focal_px(viewport);
    let mut best: Option<PickHit> = None;

    for entity in world.entities() {
        let Some(position) = world.position(entity) else {
            continue;
        };
        let Some(screen) = camera.project(position, viewport) else {
            continue;
        };
        let ctx = PropertyContext::at(time).with_camera_distance(camera.distance_to(position));
        let distance_px = (screen.x - x_px).hypot(screen.y - y_px);

        let hit_kind = if let Some(point) = world.point(entity) {
            let radius = point.pixel_size.evaluate(&ctx).max(0.0) * 0.5
                + point.outline_width.max(0.0)
                + PICK_TOLERANCE_PX;
            (distance_px <= radius).then_some(PickKind::Point)
        } else if let Some(ellipse) = world.ellipse(entity) {
            let radius = ellipse.semi_major_m.evaluate(&ctx).max(0.0) * focal / screen.depth_m;
            (distance_px <= radius).then_some(PickKind::Ellipse)
        } else {
            None
        };
        let Some(kind) = hit_kind else {
            continue;
        };

        let candidate = PickHit {
            entity,
            kind,
            depth_m: screen.depth_m,
            distance_px,
        };
        best = match best {
            None => Some(candidate),
            Some(current) => {
                let ord = candidate
                    .depth_m
                    .total_cmp(&current.depth_m)
                    .then_with(|| entity.index().cmp(&current.entity.index()));
                if ord.is_lt() {
                    Some(candidate)
                } else {
                    Some(current)
                }
            }
        };
    }

    best
}
