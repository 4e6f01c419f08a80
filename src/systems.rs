//! System passes that run between the state tick and reconciliation.

use crate::world::World;

/// Integrates every transform's velocity over the frame delta.
///
/// Runs once per frame, after the state tick has had its chance to change
/// velocities and before the render pass reads positions. Entities without a
/// transform, or with zero velocity, are untouched.
pub fn integrate_velocities(world: &mut World, dt: f32) {
    for entity in world.entities_mut() {
        if let Some(transform) = entity.components.transform.as_mut() {
            let velocity = transform.velocity;
            if velocity != glam::Vec3::ZERO {
                transform.translate(velocity * dt);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Entity;
    use crate::transform::Transform;
    use glam::{Vec2, Vec3};

    #[test]
    fn velocity_moves_the_transform() {
        let mut world = World::new(Vec2::new(100.0, 100.0));
        let id = world.add_entity(
            Entity::new("drifter")
                .with_transform(Transform::new().velocity(Vec3::new(4.0, -2.0, 0.0))),
        );
        world.update(0.0);

        integrate_velocities(&mut world, 0.5);

        let t = world.entity(id).unwrap().components.transform.as_ref().unwrap();
        assert_eq!(t.get_position(), Vec3::new(2.0, -1.0, 0.0));
    }

    #[test]
    fn stationary_entities_are_untouched() {
        let mut world = World::new(Vec2::new(100.0, 100.0));
        let id = world.add_entity(Entity::new("statue").with_transform(Transform::new()));
        world.update(0.0);

        integrate_velocities(&mut world, 1.0);

        let t = world.entity(id).unwrap().components.transform.as_ref().unwrap();
        assert_eq!(t.get_position(), Vec3::ZERO);
    }
}
