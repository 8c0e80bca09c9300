//! Static and session vector overlays: rivers, the state border and flood
//! extents.

use foundation::math::{Cartographic, DEFAULT_SAMPLES_PER_POINT, smooth_path};
use foundation::time::Timestamp;
use formats::{FeatureCollection, GeoPoint};
use scene::World;
use scene::components::{Color, PolygonGraphic, PolylineGraphic, PolylineMaterial};
use scene::entity::EntityId;
use scene::property::Property;
use scene::tag::EntityTag;

use crate::symbology::{BorderStyle, ExtentStyle, RiverStyle};

/// Adds one spline-smoothed, flowing polyline per river line.
///
/// The stripe offset advances with wall-clock time measured from `epoch`.
pub fn add_rivers(world: &mut World, rivers: &FeatureCollection, style: RiverStyle, epoch: Timestamp) -> Vec<EntityId> {
    let mut out = Vec::new();
    for (i, feature) in rivers.features.iter().enumerate() {
        let name = feature
            .name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("river-{i}"));
        let color = feature
            .property_str("color")
            .and_then(Color::from_css_hex)
            .unwrap_or(style.default_color);

        for line in feature.geometry.lines() {
            if line.len() < 2 {
                tracing::debug!(river = %name, "skipping degenerate river line");
                continue;
            }
            let control: Vec<(f64, f64)> = line.iter().map(GeoPoint::as_pair).collect();
            let positions = smooth_path(&control, DEFAULT_SAMPLES_PER_POINT)
                .into_iter()
                .map(|(lon, lat)| Cartographic::new(lon, lat, 0.0))
                .collect();

            let flow = style.flow_per_ms;
            let material = PolylineMaterial::Stripe {
                even: color,
                odd: color.with_alpha(style.gap_alpha),
                repeat: style.repeat,
                offset: Property::sampled(move |ctx| ctx.time.millis_since(epoch) * flow),
            };

            let entity = world.spawn_tagged(EntityTag::River { name: name.clone() });
            world.set_name(entity, name.clone());
            world.set_polyline(entity, PolylineGraphic::new(positions, style.width_px, material));
            out.push(entity);
        }
    }
    out
}

/// Outlines every polygon's outer ring as-is (no smoothing).
pub fn add_border(world: &mut World, boundary: &FeatureCollection, style: BorderStyle) -> Vec<EntityId> {
    let mut out = Vec::new();
    for feature in &boundary.features {
        for rings in feature.geometry.polygons() {
            let Some(outer) = rings.first() else {
                continue;
            };
            let entity = world.spawn_tagged(EntityTag::Border);
            if let Some(name) = feature.name() {
                world.set_name(entity, name);
            }
            world.set_polyline(
                entity,
                PolylineGraphic::new(ring_positions(outer), style.width_px, PolylineMaterial::Solid(style.color)),
            );
            out.push(entity);
        }
    }
    out
}

/// Adds filled, outlined flood-extent polygons tagged to `session_id`.
pub fn add_flood_extent(
    world: &mut World,
    extent: &FeatureCollection,
    session_id: &str,
    style: ExtentStyle,
) -> Vec<EntityId> {
    let mut out = Vec::new();
    for feature in &extent.features {
        for rings in feature.geometry.polygons() {
            if rings.first().is_none_or(|outer| outer.len() < 3) {
                continue;
            }
            let entity = world.spawn_tagged(EntityTag::FloodExtent {
                session_id: session_id.to_string(),
            });
            let rings = rings.iter().map(|r| ring_positions(r)).collect();
            world.set_polygon(entity, PolygonGraphic::new(rings, style.fill).with_outline(style.outline));
            out.push(entity);
        }
    }
    out
}

fn ring_positions(ring: &[GeoPoint]) -> Vec<Cartographic> {
    ring.iter()
        .map(|p| Cartographic::new(p.lon_deg, p.lat_deg, 0.0))
        .collect()
}
