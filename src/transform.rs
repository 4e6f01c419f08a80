//! Spatial transforms for placing entities in the world.
//!
//! [`Transform`] stores translation, rotation (as a quaternion), and scale
//! separately, and combines them into a 4×4 matrix on demand. The matrix is
//! cached: it is recomputed only after a mutator has run, so reading it every
//! frame for an entity that did not move is free.
//!
//! # Builder pattern
//!
//! ```
//! use aura::{Transform, Vec3, Quat};
//!
//! let transform = Transform::new()
//!     .position(Vec3::new(0.0, 2.0, -5.0))
//!     .rotation(Quat::from_rotation_y(0.5))
//!     .uniform_scale(2.0);
//! ```
//!
//! # Composition order
//!
//! [`Transform::matrix`] applies **Scale → Rotate → Translate** (SRT), the
//! standard order for model matrices: the shape is scaled around its local
//! origin, rotated around it, then moved to its world position.

use std::cell::Cell;

use glam::{Mat4, Quat, Vec2, Vec3};

/// Position, rotation, and scale with a lazily cached model matrix.
///
/// The transform also carries a `velocity` vector consumed by the physics
/// pass ([`crate::systems::integrate_velocities`]); entities that never move
/// leave it at `Vec3::ZERO`.
///
/// 2D entities use the same type: [`Transform::from_2d`] places the entity on
/// the z = 0 plane with rotation about the Z axis, and the orthographic
/// camera does the rest.
#[derive(Clone, Debug)]
pub struct Transform {
    position: Vec3,
    rotation: Quat,
    scale: Vec3,
    /// Velocity in world units per second, integrated by the physics pass.
    pub velocity: Vec3,
    cached: Cell<Option<Mat4>>,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            velocity: Vec3::ZERO,
            cached: Cell::new(None),
        }
    }
}

impl Transform {
    /// Identity transform: origin, no rotation, unit scale.
    pub fn new() -> Self {
        Self::default()
    }

    /// A transform on the z = 0 plane, rotated about the Z axis.
    ///
    /// This is the 2D entry point; `angle` is in radians.
    pub fn from_2d(position: Vec2, angle: f32) -> Self {
        Self {
            position: position.extend(0.0),
            rotation: Quat::from_rotation_z(angle),
            ..Default::default()
        }
    }

    /// A transform positioned at `position` with no rotation or scaling.
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    // Builder-style constructors. These consume and return `self` so they can
    // be chained off `Transform::new()`.

    pub fn position(mut self, position: Vec3) -> Self {
        self.position = position;
        self.cached.set(None);
        self
    }

    pub fn rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self.cached.set(None);
        self
    }

    pub fn scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self.cached.set(None);
        self
    }

    /// Equal scale on all three axes.
    pub fn uniform_scale(self, scale: f32) -> Self {
        self.scale(Vec3::splat(scale))
    }

    pub fn velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    // Mutators. Every one of these invalidates the cached matrix; the next
    // `matrix()` call recomputes it.

    /// Moves by `offset` in world space.
    pub fn translate(&mut self, offset: Vec3) {
        self.position += offset;
        self.cached.set(None);
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.cached.set(None);
    }

    /// Applies `rotation` on top of the current orientation.
    pub fn rotate(&mut self, rotation: Quat) {
        self.rotation = (rotation * self.rotation).normalize();
        self.cached.set(None);
    }

    /// Rotates about the Z axis; the 2D spin operation.
    pub fn rotate_z(&mut self, angle: f32) {
        self.rotate(Quat::from_rotation_z(angle));
    }

    pub fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation;
        self.cached.set(None);
    }

    pub fn set_scale(&mut self, scale: Vec3) {
        self.scale = scale;
        self.cached.set(None);
    }

    /// Multiplies the current scale per axis.
    pub fn scale_by(&mut self, factor: Vec3) {
        self.scale *= factor;
        self.cached.set(None);
    }

    /// Moves along the local forward axis (-Z rotated by the orientation).
    pub fn move_forward(&mut self, distance: f32) {
        let forward = self.rotation * Vec3::NEG_Z;
        self.translate(forward * distance);
    }

    /// Moves along the local right axis (+X rotated by the orientation).
    pub fn move_right(&mut self, distance: f32) {
        let right = self.rotation * Vec3::X;
        self.translate(right * distance);
    }

    /// Moves along the local up axis (+Y rotated by the orientation).
    pub fn move_up(&mut self, distance: f32) {
        let up = self.rotation * Vec3::Y;
        self.translate(up * distance);
    }

    // Accessors.

    pub fn get_position(&self) -> Vec3 {
        self.position
    }

    pub fn get_rotation(&self) -> Quat {
        self.rotation
    }

    pub fn get_scale(&self) -> Vec3 {
        self.scale
    }

    /// The model matrix (SRT composition).
    ///
    /// Recomputed only when a mutation has happened since the last call, so
    /// this is safe to read from the hot per-entity uniform path.
    pub fn matrix(&self) -> Mat4 {
        if let Some(m) = self.cached.get() {
            return m;
        }
        let m = Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position);
        self.cached.set(Some(m));
        m
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn matrix_round_trips_through_decomposition() {
        let position = Vec3::new(3.0, -1.0, 7.5);
        let rotation = Quat::from_euler(glam::EulerRot::YXZ, 0.7, -0.3, 1.2);
        let scale = Vec3::new(2.0, 0.5, 1.5);

        let transform = Transform::new()
            .position(position)
            .rotation(rotation)
            .scale(scale);

        let (s, r, t) = transform.matrix().to_scale_rotation_translation();
        assert_relative_eq!(s.x, scale.x, epsilon = 1e-5);
        assert_relative_eq!(s.y, scale.y, epsilon = 1e-5);
        assert_relative_eq!(s.z, scale.z, epsilon = 1e-5);
        assert_relative_eq!(t.x, position.x, epsilon = 1e-5);
        assert_relative_eq!(t.y, position.y, epsilon = 1e-5);
        assert_relative_eq!(t.z, position.z, epsilon = 1e-5);
        // Quaternions q and -q encode the same rotation.
        assert!(r.dot(rotation).abs() > 1.0 - 1e-5);
    }

    #[test]
    fn mutation_invalidates_cached_matrix() {
        let mut transform = Transform::from_position(Vec3::new(1.0, 0.0, 0.0));
        let before = transform.matrix();

        transform.translate(Vec3::new(4.0, 0.0, 0.0));
        let after = transform.matrix();

        assert_eq!(before.w_axis.x, 1.0);
        assert_eq!(after.w_axis.x, 5.0);
    }

    #[test]
    fn move_forward_follows_orientation() {
        let mut transform = Transform::new().rotation(Quat::from_rotation_y(std::f32::consts::FRAC_PI_2));
        transform.move_forward(2.0);
        // Facing -Z rotated 90° about Y looks down -X.
        let p = transform.get_position();
        assert_relative_eq!(p.x, -2.0, epsilon = 1e-5);
        assert_relative_eq!(p.z, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn from_2d_sits_on_the_z_plane() {
        let transform = Transform::from_2d(Vec2::new(10.0, 20.0), 0.0);
        assert_eq!(transform.get_position(), Vec3::new(10.0, 20.0, 0.0));
    }
}
