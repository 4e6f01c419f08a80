//! Cameras: the source of the per-frame view and projection matrices.
//!
//! A [`Camera`] is an offset (position + orientation) plus a [`Projection`].
//! The render batcher reads `view_matrix()` and `projection_matrix()` once per
//! frame and uploads them as batch-static uniforms; nothing else in the core
//! consumes the camera.
//!
//! Cameras live in the [`World`](crate::World), keyed by name, with exactly
//! one active at a time.

use glam::{Mat4, Quat, Vec2, Vec3};

/// Projection configuration for a [`Camera`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Projection {
    /// Axis-aligned box mapped to clip space; the 2D mode.
    Orthographic {
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        near: f32,
        far: f32,
    },
    /// Standard perspective frustum; the 3D mode.
    Perspective {
        /// Vertical field of view in radians.
        fov_y: f32,
        aspect: f32,
        near: f32,
        far: f32,
    },
}

/// A positionable camera producing view and projection matrices.
#[derive(Clone, Copy, Debug)]
pub struct Camera {
    pub position: Vec3,
    pub rotation: Quat,
    projection: Projection,
}

impl Camera {
    /// An orthographic camera covering `(0,0)..bounds`, for 2D worlds whose
    /// origin is the bottom-left corner.
    pub fn orthographic_2d(bounds: Vec2) -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            projection: Projection::Orthographic {
                left: 0.0,
                right: bounds.x,
                bottom: 0.0,
                top: bounds.y,
                near: -1.0,
                far: 1.0,
            },
        }
    }

    /// A perspective camera at the origin looking down -Z.
    ///
    /// `fov_y` is in radians.
    pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            projection: Projection::Perspective {
                fov_y,
                aspect,
                near,
                far,
            },
        }
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Orients the camera so its forward axis points at `target`.
    pub fn looking_at(mut self, target: Vec3, up: Vec3) -> Self {
        // The view matrix is the inverse of the camera's world transform, so
        // derive the rotation from the inverse look-at.
        let view = Mat4::look_at_rh(self.position, target, up);
        let (_, rotation, _) = view.inverse().to_scale_rotation_translation();
        self.rotation = rotation;
        self
    }

    pub fn projection(&self) -> Projection {
        self.projection
    }

    /// Updates the aspect ratio after a window resize; no-op for orthographic
    /// cameras.
    pub fn set_aspect(&mut self, aspect: f32) {
        if let Projection::Perspective {
            aspect: ref mut a, ..
        } = self.projection
        {
            *a = aspect;
        }
    }

    /// Camera-relative movement, mirroring the transform conveniences.
    pub fn move_forward(&mut self, distance: f32) {
        self.position += self.rotation * Vec3::NEG_Z * distance;
    }

    pub fn move_right(&mut self, distance: f32) {
        self.position += self.rotation * Vec3::X * distance;
    }

    pub fn move_up(&mut self, distance: f32) {
        self.position += self.rotation * Vec3::Y * distance;
    }

    /// World-to-camera matrix: the inverse of the camera's own transform.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position).inverse()
    }

    /// Camera-to-clip matrix for the configured projection.
    pub fn projection_matrix(&self) -> Mat4 {
        match self.projection {
            Projection::Orthographic {
                left,
                right,
                bottom,
                top,
                near,
                far,
            } => Mat4::orthographic_rh(left, right, bottom, top, near, far),
            Projection::Perspective {
                fov_y,
                aspect,
                near,
                far,
            } => Mat4::perspective_rh(fov_y, aspect, near, far),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn identity_camera_has_identity_view() {
        let camera = Camera::orthographic_2d(Vec2::new(100.0, 100.0));
        assert_eq!(camera.view_matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn view_matrix_undoes_camera_motion() {
        let mut camera = Camera::perspective(1.0, 16.0 / 9.0, 0.1, 100.0);
        camera.position = Vec3::new(0.0, 0.0, 10.0);

        // A point at the camera's position maps to the view-space origin.
        let eye = camera.view_matrix().transform_point3(camera.position);
        assert_relative_eq!(eye.length(), 0.0, epsilon = 1e-5);
    }

    #[test]
    fn orthographic_maps_bounds_to_clip_corners() {
        let camera = Camera::orthographic_2d(Vec2::new(200.0, 100.0));
        let proj = camera.projection_matrix();

        let origin = proj.project_point3(Vec3::ZERO);
        let corner = proj.project_point3(Vec3::new(200.0, 100.0, 0.0));
        assert_relative_eq!(origin.x, -1.0, epsilon = 1e-5);
        assert_relative_eq!(origin.y, -1.0, epsilon = 1e-5);
        assert_relative_eq!(corner.x, 1.0, epsilon = 1e-5);
        assert_relative_eq!(corner.y, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn set_aspect_only_touches_perspective() {
        let mut ortho = Camera::orthographic_2d(Vec2::new(10.0, 10.0));
        let before = ortho.projection();
        ortho.set_aspect(2.0);
        assert_eq!(ortho.projection(), before);

        let mut persp = Camera::perspective(1.0, 1.0, 0.1, 10.0);
        persp.set_aspect(2.0);
        match persp.projection() {
            Projection::Perspective { aspect, .. } => assert_eq!(aspect, 2.0),
            _ => unreachable!(),
        }
    }
}
