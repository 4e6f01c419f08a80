//! The world: authoritative owner of the live entity set.
//!
//! Entity mutation is frame-aligned: [`World::add_entity`] and
//! [`World::remove_entity`] only enqueue requests, and [`World::update`]
//! applies them between frames — never mid-iteration. Reconciliation applies
//! **removals first, then additions**, so an entity removed and (re)added
//! within the same frame survives.
//!
//! The world also owns the named [`Camera`]s (exactly one active at a time)
//! and the world-space bounds. Bounds are advisory: boundary behavior is
//! application logic, the core never enforces them.

use std::collections::{HashMap, HashSet};

use glam::Vec2;

use crate::camera::Camera;
use crate::entity::{ComponentKind, Entity, EntityId};

/// Name of the camera every world starts with.
pub const DEFAULT_CAMERA: &str = "main";

/// Live entity set, pending add/remove queues, cameras, and bounds.
pub struct World {
    bounds: Vec2,
    entities: Vec<Entity>,
    pending_add: Vec<Entity>,
    pending_remove: HashSet<EntityId>,
    cameras: HashMap<String, Camera>,
    active_camera: String,
    next_id: u64,
}

impl World {
    /// Creates a world with the given bounds and a default orthographic
    /// camera (named [`DEFAULT_CAMERA`]) covering them.
    pub fn new(bounds: Vec2) -> Self {
        let mut cameras = HashMap::new();
        cameras.insert(DEFAULT_CAMERA.to_owned(), Camera::orthographic_2d(bounds));
        Self {
            bounds,
            entities: Vec::new(),
            pending_add: Vec::new(),
            pending_remove: HashSet::new(),
            cameras,
            active_camera: DEFAULT_CAMERA.to_owned(),
            next_id: 1,
        }
    }

    pub fn bounds(&self) -> Vec2 {
        self.bounds
    }

    // ------------------------------------------------------------------
    // Entity lifecycle
    // ------------------------------------------------------------------

    /// Enqueues an entity for addition at the next [`update`](Self::update).
    ///
    /// The returned id is assigned immediately, but the entity does not join
    /// the live set (and is not rendered) until reconciliation runs.
    pub fn add_entity(&mut self, mut entity: Entity) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        entity.id = Some(id);
        self.pending_add.push(entity);
        id
    }

    /// Enqueues several entities; see [`add_entity`](Self::add_entity).
    pub fn add_entities(&mut self, entities: impl IntoIterator<Item = Entity>) -> Vec<EntityId> {
        entities.into_iter().map(|e| self.add_entity(e)).collect()
    }

    /// Enqueues an entity for removal at the next [`update`](Self::update).
    ///
    /// Removing an id that is not (or no longer) live is a no-op, not an
    /// error.
    pub fn remove_entity(&mut self, id: EntityId) {
        self.pending_remove.insert(id);
    }

    pub fn remove_entities(&mut self, ids: impl IntoIterator<Item = EntityId>) {
        self.pending_remove.extend(ids);
    }

    /// Enqueues every currently-live entity for removal.
    pub fn clear_entities(&mut self) {
        let ids: Vec<EntityId> = self.entities.iter().filter_map(|e| e.id).collect();
        self.pending_remove.extend(ids);
    }

    /// The reconciliation point, called once per frame before rendering.
    ///
    /// Applies pending removals against the live set, then pending additions,
    /// then runs each live entity's update hook with `frame_delta`. Removals
    /// never touch the pending-add queue, which is what makes same-frame
    /// remove-then-add safe.
    pub fn update(&mut self, frame_delta: f32) {
        if !self.pending_remove.is_empty() {
            let doomed = std::mem::take(&mut self.pending_remove);
            self.entities
                .retain(|e| e.id.map(|id| !doomed.contains(&id)).unwrap_or(true));
        }
        self.entities.append(&mut self.pending_add);

        for index in 0..self.entities.len() {
            // Detach the hook while it runs so it can borrow the components.
            if let Some(mut hook) = self.entities[index].update.take() {
                hook(&mut self.entities[index].components, frame_delta);
                self.entities[index].update = Some(hook);
            }
        }
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// The live set, in encounter order. Pending additions are not included.
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn entities_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.iter_mut()
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == Some(id))
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id == Some(id))
    }

    /// Live entities carrying the given tag. Returns a fresh list; do not
    /// assume stability across frames.
    pub fn filter_by_tag(&self, tag: &str) -> Vec<&Entity> {
        self.entities.iter().filter(|e| e.tag() == tag).collect()
    }

    /// Live entities carrying any of the given tags.
    pub fn filter_by_tags(&self, tags: &[&str]) -> Vec<&Entity> {
        self.entities
            .iter()
            .filter(|e| tags.contains(&e.tag()))
            .collect()
    }

    /// Live entities that have a component of the given kind.
    pub fn filter_by_component(&self, kind: ComponentKind) -> Vec<&Entity> {
        self.entities
            .iter()
            .filter(|e| e.components.has(kind))
            .collect()
    }

    // ------------------------------------------------------------------
    // Cameras
    // ------------------------------------------------------------------

    /// Registers a camera under `name`, replacing any existing one.
    pub fn add_camera(&mut self, name: impl Into<String>, camera: Camera) {
        self.cameras.insert(name.into(), camera);
    }

    /// Looks up a camera by name.
    ///
    /// # Panics
    ///
    /// Panics if no camera with that name was registered — asking for an
    /// unknown camera is a programming mistake, not a runtime condition.
    pub fn camera(&self, name: &str) -> &Camera {
        self.cameras
            .get(name)
            .unwrap_or_else(|| panic!("camera '{name}' is not registered"))
    }

    /// Mutable access to a named camera.
    ///
    /// # Panics
    ///
    /// Panics if no camera with that name was registered.
    pub fn camera_mut(&mut self, name: &str) -> &mut Camera {
        self.cameras
            .get_mut(name)
            .unwrap_or_else(|| panic!("camera '{name}' is not registered"))
    }

    /// Makes a registered camera the active one.
    ///
    /// # Panics
    ///
    /// Panics if no camera with that name was registered.
    pub fn set_active_camera(&mut self, name: &str) {
        assert!(
            self.cameras.contains_key(name),
            "camera '{name}' is not registered"
        );
        self.active_camera = name.to_owned();
    }

    /// The camera the render pass reads view/projection matrices from.
    pub fn active_camera(&self) -> &Camera {
        &self.cameras[&self.active_camera]
    }

    pub fn active_camera_mut(&mut self) -> &mut Camera {
        let name = self.active_camera.clone();
        self.camera_mut(&name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> World {
        World::new(Vec2::new(100.0, 100.0))
    }

    #[test]
    fn additions_are_buffered_until_update() {
        let mut w = world();
        w.add_entity(Entity::new("a"));
        assert!(w.entities().is_empty());

        w.update(0.016);
        assert_eq!(w.entities().len(), 1);
    }

    #[test]
    fn removal_applies_before_addition() {
        let mut w = world();
        let old = w.add_entity(Entity::new("respawning"));
        w.update(0.016);

        // Same frame: remove the live entity and enqueue a replacement.
        w.remove_entity(old);
        w.add_entity(Entity::new("respawning"));
        w.update(0.016);

        let survivors = w.filter_by_tag("respawning");
        assert_eq!(survivors.len(), 1);
        assert_ne!(survivors[0].id(), Some(old));
    }

    #[test]
    fn removing_unknown_id_is_a_no_op() {
        let mut w = world();
        let id = w.add_entity(Entity::new("a"));
        w.update(0.016);
        w.remove_entity(id);
        w.remove_entity(EntityId(9999));
        w.update(0.016);
        assert!(w.entities().is_empty());
    }

    #[test]
    fn clear_entities_empties_the_live_set() {
        let mut w = world();
        w.add_entities([Entity::new("a"), Entity::new("b"), Entity::new("c")]);
        w.update(0.016);
        assert_eq!(w.entities().len(), 3);

        w.clear_entities();
        w.update(0.016);
        assert!(w.entities().is_empty());
    }

    #[test]
    fn clear_does_not_drop_entities_added_afterwards() {
        let mut w = world();
        w.add_entity(Entity::new("old"));
        w.update(0.016);

        w.clear_entities();
        w.add_entity(Entity::new("new"));
        w.update(0.016);

        assert_eq!(w.entities().len(), 1);
        assert_eq!(w.entities()[0].tag(), "new");
    }

    #[test]
    fn tag_and_component_filters() {
        use crate::entity::Model;

        let mut w = world();
        w.add_entity(Entity::new("rock").with_model(Model::new("square")));
        w.add_entity(Entity::new("rock"));
        w.add_entity(Entity::new("ship"));
        w.update(0.016);

        assert_eq!(w.filter_by_tag("rock").len(), 2);
        assert_eq!(w.filter_by_tags(&["rock", "ship"]).len(), 3);
        assert_eq!(w.filter_by_component(ComponentKind::Model).len(), 1);
    }

    #[test]
    fn update_hooks_run_each_frame() {
        use crate::transform::Transform;
        use glam::Vec3;

        let mut w = world();
        let id = w.add_entity(
            Entity::new("mover")
                .with_transform(Transform::new())
                .with_update(|c, dt| {
                    if let Some(t) = c.transform.as_mut() {
                        t.translate(Vec3::new(10.0 * dt, 0.0, 0.0));
                    }
                }),
        );

        w.update(0.5);
        w.update(0.5);

        let entity = w.entity(id).unwrap();
        let position = entity.components.transform.as_ref().unwrap().get_position();
        assert_eq!(position.x, 10.0);
    }

    #[test]
    #[should_panic(expected = "camera 'chase' is not registered")]
    fn unknown_camera_is_fatal() {
        let w = world();
        w.camera("chase");
    }

    #[test]
    fn default_camera_is_active() {
        let w = world();
        // The default camera exists and is orthographic over the bounds.
        let _ = w.active_camera().projection_matrix();
        let _ = w.camera(DEFAULT_CAMERA);
    }
}
