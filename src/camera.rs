//! Perspective camera for viewing image planes.
//!
//! # Example
//!
//! ```
//! use panowipe::{Camera, Vec3};
//!
//! let camera = Camera::new().at(0.0, 0.0, 5.0).looking_at(0.0, 0.0, 0.0).with_fov(75.0);
//! let view_proj = camera.projection_matrix(16.0 / 9.0) * camera.view_matrix();
//! let clip = view_proj.project_point3(Vec3::ZERO);
//! assert!(clip.x.abs() < 1e-5 && clip.y.abs() < 1e-5);
//! ```

use glam::{Mat4, Vec3};

/// A perspective camera for viewing image planes.
///
/// Provides position, orientation, field of view and clip distances.
/// Passed to [`TransitionRenderer::render`](crate::TransitionRenderer::render).
#[derive(Clone, Copy, Debug)]
pub struct Camera {
    pub position: Vec3,
    pub forward: Vec3,
    pub up: Vec3,
    pub fov: f32, // radians
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            forward: Vec3::NEG_Z,
            up: Vec3::Y,
            fov: 60f32.to_radians(),
            near: 0.01,
            far: 1000.0,
        }
    }
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(mut self, x: f32, y: f32, z: f32) -> Self {
        self.position = Vec3::new(x, y, z);
        self
    }

    pub fn looking_at(mut self, target_x: f32, target_y: f32, target_z: f32) -> Self {
        let forward = Vec3::new(target_x, target_y, target_z) - self.position;
        self.forward = forward.normalize_or_zero();
        self
    }

    pub fn with_fov(mut self, fov_degrees: f32) -> Self {
        self.fov = fov_degrees.to_radians();
        self
    }

    /// Compute the right vector from forward and up.
    pub fn right(&self) -> Vec3 {
        self.forward.cross(self.up).normalize_or_zero()
    }

    /// World-to-view matrix, right-handed, looking along `forward`.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_to_rh(self.position, self.forward, self.up)
    }

    /// Right-handed perspective projection with a `[0, 1]` depth range.
    ///
    /// # Panics
    ///
    /// Only with glam's `debug-glam-assert` feature enabled, when `near` or
    /// `far` is not positive.
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov, aspect, self.near, self.far)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_looks_down_negative_z() {
        let camera = Camera::new();
        let p = camera.view_matrix().transform_point3(Vec3::new(0.0, 0.0, -2.0));
        assert!((p - Vec3::new(0.0, 0.0, -2.0)).length() < 1e-5);
        assert!((camera.right() - Vec3::X).length() < 1e-5);
    }

    #[test]
    fn looking_at_normalizes_forward() {
        let camera = Camera::new().at(0.0, 0.0, 5.0).looking_at(0.0, 0.0, 0.0);
        assert!((camera.forward - Vec3::NEG_Z).length() < 1e-5);
    }
}
