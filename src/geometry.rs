//! CPU-side geometry for image planes before GPU upload.
//!
//! Every builder works in the image transform's local space: the capturing
//! camera sits at the origin looking down -Z with +Y up. Texture coordinates
//! map the node's image with its origin at the top-left corner.
//!
//! | Builder | Used for | UV mapping |
//! |---------|----------|------------|
//! | [`RawGeometry::flat_plane`] | perspective images, motionless frames | full image across the quad |
//! | [`RawGeometry::sphere`] | full panoramas | equirectangular |
//! | [`RawGeometry::partial_sphere`] | cropped panoramas | cropped image across the patch |

use crate::error::{TransitionError, TransitionResult};
use crate::mesh::{Mesh, Vertex3d};
use glam::Vec3;
use std::f32::consts::PI;

/// Distance of flat image planes from the capturing camera.
pub const PLANE_DISTANCE: f32 = 1.0;

/// Raw geometry data before GPU upload.
#[derive(Clone, Debug)]
pub struct RawGeometry {
    pub vertices: Vec<Vertex3d>,
    pub indices: Vec<u32>,
}

impl RawGeometry {
    pub fn new(vertices: Vec<Vertex3d>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    /// A quad at [`PLANE_DISTANCE`] in front of the camera with the given half extents.
    pub fn flat_plane(half_width: f32, half_height: f32) -> TransitionResult<Self> {
        if half_width <= 0.0
            || half_height <= 0.0
            || !half_width.is_finite()
            || !half_height.is_finite()
        {
            return Err(TransitionError::invalid_geometry(format!(
                "flat plane extents must be positive, got {half_width}x{half_height}"
            )));
        }

        let z = -PLANE_DISTANCE;
        #[rustfmt::skip]
        let vertices = vec![
            Vertex3d::new([-half_width,  half_height, z], [0.0, 0.0]),
            Vertex3d::new([ half_width,  half_height, z], [1.0, 0.0]),
            Vertex3d::new([ half_width, -half_height, z], [1.0, 1.0]),
            Vertex3d::new([-half_width, -half_height, z], [0.0, 1.0]),
        ];
        let indices = vec![0, 3, 2, 2, 1, 0];

        Ok(Self::new(vertices, indices))
    }

    /// A complete sphere around the camera for a full equirectangular panorama.
    pub fn sphere(radius: f32, segments: u32, rings: u32) -> TransitionResult<Self> {
        Self::partial_sphere(radius, (-PI, 2.0 * PI), (0.0, PI), segments, rings)
    }

    /// A spherical patch covering `longitude = (start, length)` and
    /// `polar = (start, length)`, both in radians.
    ///
    /// Longitude 0 faces -Z and grows toward +X. Polar angle 0 is the zenith.
    pub fn partial_sphere(
        radius: f32,
        longitude: (f32, f32),
        polar: (f32, f32),
        segments: u32,
        rings: u32,
    ) -> TransitionResult<Self> {
        if radius <= 0.0 || !radius.is_finite() {
            return Err(TransitionError::invalid_geometry(format!(
                "sphere radius must be positive, got {radius}"
            )));
        }
        if segments < 3 || rings < 2 {
            return Err(TransitionError::invalid_geometry(format!(
                "sphere needs at least 3 segments and 2 rings, got {segments}x{rings}"
            )));
        }
        let (lon_start, lon_len) = longitude;
        let (polar_start, polar_len) = polar;
        if !lon_len.is_finite()
            || !polar_len.is_finite()
            || lon_len <= 0.0
            || lon_len > 2.0 * PI + 1e-4
            || polar_len <= 0.0
            || polar_len > PI + 1e-4
            || polar_start < 0.0
        {
            return Err(TransitionError::invalid_geometry(format!(
                "invalid spherical range lon=({lon_start}, {lon_len}) polar=({polar_start}, {polar_len})"
            )));
        }

        let mut vertices = Vec::with_capacity(((segments + 1) * (rings + 1)) as usize);
        let mut indices = Vec::with_capacity((segments * rings * 6) as usize);

        for ring in 0..=rings {
            let v = ring as f32 / rings as f32;
            let theta = polar_start + polar_len * v;
            let y = theta.cos();
            let ring_radius = theta.sin();

            for seg in 0..=segments {
                let u = seg as f32 / segments as f32;
                let phi = lon_start + lon_len * u;
                let x = ring_radius * phi.sin();
                let z = -ring_radius * phi.cos();

                vertices.push(Vertex3d::new([x * radius, y * radius, z * radius], [u, v]));
            }
        }

        for ring in 0..rings {
            for seg in 0..segments {
                let current = ring * (segments + 1) + seg;
                let next = current + segments + 1;

                indices.push(current);
                indices.push(current + 1);
                indices.push(next);

                indices.push(current + 1);
                indices.push(next + 1);
                indices.push(next);
            }
        }

        Ok(Self::new(vertices, indices))
    }

    /// Computes the axis-aligned bounding box as `(min, max)`.
    pub fn bounds(&self) -> (Vec3, Vec3) {
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);

        for v in &self.vertices {
            let p = Vec3::from(v.position);
            min = min.min(p);
            max = max.max(p);
        }

        (min, max)
    }

    /// Uploads this geometry to the GPU as a [`Mesh`].
    pub fn upload(&self, device: &wgpu::Device) -> Mesh {
        Mesh::new(device, &self.vertices, &self.indices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_plane_bounds() {
        let geom = RawGeometry::flat_plane(0.5, 0.25).unwrap();
        assert_eq!(geom.vertices.len(), 4);
        assert_eq!(geom.indices.len(), 6);

        let (min, max) = geom.bounds();
        assert_eq!(min, Vec3::new(-0.5, -0.25, -PLANE_DISTANCE));
        assert_eq!(max, Vec3::new(0.5, 0.25, -PLANE_DISTANCE));
    }

    #[test]
    fn flat_plane_rejects_degenerate_extents() {
        assert!(RawGeometry::flat_plane(0.0, 0.5).is_err());
        assert!(RawGeometry::flat_plane(0.5, f32::NAN).is_err());
    }

    #[test]
    fn sphere_counts_and_radius() {
        let geom = RawGeometry::sphere(10.0, 16, 8).unwrap();
        assert_eq!(geom.vertices.len(), 17 * 9);
        assert_eq!(geom.indices.len(), 16 * 8 * 6);

        for v in &geom.vertices {
            let r = Vec3::from(v.position).length();
            assert!((r - 10.0).abs() < 1e-3);
        }
    }

    #[test]
    fn sphere_center_column_faces_forward() {
        let geom = RawGeometry::sphere(1.0, 4, 2).unwrap();
        // Ring 1 is the equator, segment 2 is u = 0.5.
        let v = geom.vertices[5 + 2];
        assert_eq!(v.uv, [0.5, 0.5]);
        assert!((Vec3::from(v.position) - Vec3::NEG_Z).length() < 1e-5);
    }

    #[test]
    fn partial_sphere_stays_inside_its_range() {
        let geom =
            RawGeometry::partial_sphere(1.0, (-PI / 2.0, PI), (PI / 4.0, PI / 2.0), 8, 4).unwrap();
        let (min, max) = geom.bounds();
        // Only the front hemisphere is covered.
        assert!(max.z <= 1e-5);
        assert!(min.y >= -(PI / 4.0).cos() - 1e-5);
        assert!(max.y <= (PI / 4.0).cos() + 1e-5);
    }

    #[test]
    fn indices_reference_existing_vertices() {
        let geom = RawGeometry::sphere(1.0, 12, 6).unwrap();
        let count = geom.vertices.len() as u32;
        assert!(geom.indices.iter().all(|&i| i < count));
    }

    #[test]
    fn sphere_rejects_low_tessellation() {
        assert!(RawGeometry::sphere(1.0, 2, 8).is_err());
        assert!(RawGeometry::sphere(-1.0, 8, 8).is_err());
    }
}
