//! Alert markers, their labels and the ripple rings around high-severity alerts.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use foundation::math::Cartographic;
use formats::{Alert, Severity};
use layers::symbology::severity_color;
use scene::components::{Color, DistanceDisplayCondition, EllipseGraphic, LabelGraphic, PointGraphic};
use scene::property::Property;
use scene::tag::{EntityTag, TagNamespace};
use scene::World;
use scene::entity::EntityId;

use crate::markers::{
    LABEL_MAX_DISTANCE_M, LABEL_OFFSET_PX, MARKER_OUTLINE_PX, RIPPLE_COUNT, marker_size_px, ripple_alpha,
    ripple_phase, ripple_semi_major_m, ripple_semi_minor_m,
};

/// Alerts currently on the globe, by id. Shared with the click handler.
pub type AlertIndex = Rc<RefCell<HashMap<String, Alert>>>;

#[derive(Debug)]
pub struct AlertController {
    index: AlertIndex,
    /// The list the scene currently reflects.
    applied: Vec<Alert>,
}

impl AlertController {
    pub fn new(index: AlertIndex) -> Self {
        Self {
            index,
            applied: Vec::new(),
        }
    }

    pub fn index(&self) -> &AlertIndex {
        &self.index
    }

    /// Rebuilds markers and ripples when `alerts` differs from the last list.
    ///
    /// Returns whether the scene changed.
    pub fn sync(&mut self, world: &mut World, alerts: &[Alert]) -> bool {
        if self.applied == alerts {
            return false;
        }
        let removed = world.remove_namespace(TagNamespace::AlertMarkers) + world.remove_namespace(TagNamespace::RippleRings);

        let mut index = self.index.borrow_mut();
        index.clear();
        for alert in alerts {
            if !alert.has_finite_position() {
                tracing::warn!(alert_id = %alert.id, lat = alert.lat, lng = alert.lng, "skipping alert with invalid position");
                continue;
            }
            if index.contains_key(&alert.id) {
                tracing::debug!(alert_id = %alert.id, "duplicate alert id; keeping the first");
                continue;
            }
            add_marker(world, alert);
            if alert.severity == Severity::High {
                add_ripples(world, alert);
            }
            index.insert(alert.id.clone(), alert.clone());
        }
        tracing::debug!(removed, markers = index.len(), "alert markers rebuilt");
        drop(index);

        self.applied = alerts.to_vec();
        true
    }
}

fn position(alert: &Alert) -> Cartographic {
    Cartographic::new(alert.lng, alert.lat, 0.0)
}

fn add_marker(world: &mut World, alert: &Alert) -> EntityId {
    let entity = world.spawn_tagged(EntityTag::AlertMarker {
        alert_id: alert.id.clone(),
    });
    world.set_name(entity, alert.name.clone());
    world.set_position(entity, position(alert));

    let size = Property::sampled(|ctx| marker_size_px(ctx.time.as_millis(), ctx.camera_distance_m));
    world.set_point(
        entity,
        PointGraphic::new(size, severity_color(alert.severity)).with_outline(Color::WHITE, MARKER_OUTLINE_PX),
    );

    let mut label = LabelGraphic::new(alert.name.clone());
    label.pixel_offset = LABEL_OFFSET_PX;
    label.display = Some(DistanceDisplayCondition::new(0.0, LABEL_MAX_DISTANCE_M));
    world.set_label(entity, label);
    entity
}

fn add_ripples(world: &mut World, alert: &Alert) -> Vec<EntityId> {
    (0..RIPPLE_COUNT)
        .map(|ring| {
            let entity = world.spawn_tagged(EntityTag::RippleRing {
                alert_id: alert.id.clone(),
                ring,
            });
            world.set_position(entity, position(alert));
            world.set_ellipse(
                entity,
                EllipseGraphic {
                    semi_major_m: Property::sampled(move |ctx| {
                        ripple_semi_major_m(ripple_phase(ctx.time.as_millis(), ring))
                    }),
                    semi_minor_m: Property::sampled(move |ctx| {
                        ripple_semi_minor_m(ripple_phase(ctx.time.as_millis(), ring))
                    }),
                    fill: Property::sampled(move |ctx| {
                        let alpha = ripple_alpha(ripple_phase(ctx.time.as_millis(), ring));
                        Color::RED.with_alpha(alpha as f32)
                    }),
                    outline: Some(Property::sampled(move |ctx| {
                        let phase = ripple_phase(ctx.time.as_millis(), ring);
                        Color::RED.with_alpha((1.0 - phase).clamp(0.0, 1.0) as f32)
                    })),
                },
            );
            entity
        })
        .collect()
}
