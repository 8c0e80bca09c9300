use foundation::handles::HandleAllocator;
use foundation::math::Cartographic;

use crate::components::{
    EllipseGraphic, LabelGraphic, PointGraphic, PolygonGraphic, PolylineGraphic,
};
use crate::entity::EntityId;
use crate::tag::{EntityTag, TagNamespace};

/// Entity store. Components live in parallel slot vectors indexed by the
/// entity's handle index; a slot is only meaningful while its handle is live.
#[derive(Debug, Default)]
pub struct World {
    alloc: HandleAllocator,
    ids: Vec<Option<EntityId>>,
    names: Vec<Option<String>>,
    tags: Vec<Option<EntityTag>>,
    positions: Vec<Option<Cartographic>>,
    points: Vec<Option<PointGraphic>>,
    labels: Vec<Option<LabelGraphic>>,
    ellipses: Vec<Option<EllipseGraphic>>,
    polylines: Vec<Option<PolylineGraphic>>,
    polygons: Vec<Option<PolygonGraphic>>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self) -> EntityId {
        let id = EntityId(self.alloc.allocate());
        self.ensure_capacity(id.index() as usize);
        self.ids[id.index() as usize] = Some(id);
        id
    }

    /// Spawns an entity that carries `tag`.
    pub fn spawn_tagged(&mut self, tag: EntityTag) -> EntityId {
        let id = self.spawn();
        self.tags[id.index() as usize] = Some(tag);
        id
    }

    /// Removes `entity` and all of its components. Stale ids are ignored.
    pub fn despawn(&mut self, entity: EntityId) -> bool {
        if !self.alloc.free(entity.0) {
            return false;
        }
        let idx = entity.index() as usize;
        self.ids[idx] = None;
        self.names[idx] = None;
        self.tags[idx] = None;
        self.positions[idx] = None;
        self.points[idx] = None;
        self.labels[idx] = None;
        self.ellipses[idx] = None;
        self.polylines[idx] = None;
        self.polygons[idx] = None;
        true
    }

    pub fn contains(&self, entity: EntityId) -> bool {
        self.alloc.is_live(entity.0)
    }

    pub fn len(&self) -> usize {
        self.alloc.live_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Live entities in slot order.
    pub fn entities(&self) -> Vec<EntityId> {
        self.ids.iter().flatten().copied().collect()
    }

    pub fn clear(&mut self) {
        for entity in self.entities() {
            self.despawn(entity);
        }
    }

    pub fn set_name(&mut self, entity: EntityId, name: impl Into<String>) {
        if self.contains(entity) {
            self.names[entity.index() as usize] = Some(name.into());
        }
    }

    pub fn set_position(&mut self, entity: EntityId, position: Cartographic) {
        if self.contains(entity) {
            self.positions[entity.index() as usize] = Some(position);
        }
    }

    pub fn set_point(&mut self, entity: EntityId, point: PointGraphic) {
        if self.contains(entity) {
            self.points[entity.index() as usize] = Some(point);
        }
    }

    pub fn set_label(&mut self, entity: EntityId, label: LabelGraphic) {
        if self.contains(entity) {
            self.labels[entity.index() as usize] = Some(label);
        }
    }

    pub fn set_ellipse(&mut self, entity: EntityId, ellipse: EllipseGraphic) {
        if self.contains(entity) {
            self.ellipses[entity.index() as usize] = Some(ellipse);
        }
    }

    pub fn set_polyline(&mut self, entity: EntityId, polyline: PolylineGraphic) {
        if self.contains(entity) {
            self.polylines[entity.index() as usize] = Some(polyline);
        }
    }

    pub fn set_polygon(&mut self, entity: EntityId, polygon: PolygonGraphic) {
        if self.contains(entity) {
            self.polygons[entity.index() as usize] = Some(polygon);
        }
    }

    pub fn name(&self, entity: EntityId) -> Option<&str> {
        self.slot(&self.names, entity).map(String::as_str)
    }

    pub fn tag(&self, entity: EntityId) -> Option<&EntityTag> {
        self.slot(&self.tags, entity)
    }

    pub fn position(&self, entity: EntityId) -> Option<Cartographic> {
        self.slot(&self.positions, entity).copied()
    }

    pub fn point(&self, entity: EntityId) -> Option<&PointGraphic> {
        self.slot(&self.points, entity)
    }

    pub fn label(&self, entity: EntityId) -> Option<&LabelGraphic> {
        self.slot(&self.labels, entity)
    }

    pub fn ellipse(&self, entity: EntityId) -> Option<&EllipseGraphic> {
        self.slot(&self.ellipses, entity)
    }

    pub fn polyline(&self, entity: EntityId) -> Option<&PolylineGraphic> {
        self.slot(&self.polylines, entity)
    }

    pub fn polygon(&self, entity: EntityId) -> Option<&PolygonGraphic> {
        self.slot(&self.polygons, entity)
    }

    /// Live entities whose tag belongs to `namespace`, in slot order.
    pub fn tagged(&self, namespace: TagNamespace) -> Vec<EntityId> {
        self.entities()
            .into_iter()
            .filter(|e| self.tag(*e).is_some_and(|t| t.namespace() == namespace))
            .collect()
    }

    pub fn find_tag(&self, tag: &EntityTag) -> Option<EntityId> {
        self.entities()
            .into_iter()
            .find(|e| self.tag(*e) == Some(tag))
    }

    /// Despawns every entity in `namespace`; returns how many were removed.
    pub fn remove_namespace(&mut self, namespace: TagNamespace) -> usize {
        let doomed = self.tagged(namespace);
        for entity in &doomed {
            self.despawn(*entity);
        }
        doomed.len()
    }

    fn slot<'a, T>(&self, slots: &'a [Option<T>], entity: EntityId) -> Option<&'a T> {
        if !self.contains(entity) {
            return None;
        }
        slots.get(entity.index() as usize).and_then(Option::as_ref)
    }

    fn ensure_capacity(&mut self, idx: usize) {
        if self.ids.len() <= idx {
            let new_len = idx + 1;
            self.ids.resize(new_len, None);
            self.names.resize(new_len, None);
            self.tags.resize(new_len, None);
            self.positions.resize(new_len, None);
            self.points.resize(new_len, None);
            self.labels.resize(new_len, None);
            self.ellipses.resize(new_len, None);
            self.polylines.resize(new_len, None);
            self.polygons.resize(new_len, None);
        }
    }
}
