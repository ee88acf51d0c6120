//! wgpu-backed image planes and the factory that builds them.
//!
//! [`GpuPlaneFactory`] resolves a node's projection into [`RawGeometry`],
//! uploads it, and wraps the result in a [`GpuImagePlane`] carrying everything
//! [`ImagePlanePass`](crate::ImagePlanePass) needs to draw it.

use crate::error::{TransitionError, TransitionResult};
use crate::geometry::RawGeometry;
use crate::mesh::Mesh;
use crate::node::{ImageTransform, Node};
use crate::plane::{ImagePlane, MeshFactory, PlaneProjection, PlaneShader};
use crate::texture::Texture;
use glam::Mat4;
use std::sync::Arc;

/// Tessellation and placement of generated geometry.
#[derive(Clone, Copy, Debug)]
pub struct FactoryConfig {
    /// Radius of panorama spheres around the capturing camera.
    pub sphere_radius: f32,
    pub sphere_segments: u32,
    pub sphere_rings: u32,
    /// Longitude segments of a partial sphere. Rings are half of this.
    pub partial_segments: u32,
}

impl Default for FactoryConfig {
    fn default() -> Self {
        Self {
            sphere_radius: 10.0,
            sphere_segments: 64,
            sphere_rings: 32,
            partial_segments: 32,
        }
    }
}

impl FactoryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sphere_radius(mut self, radius: f32) -> Self {
        self.sphere_radius = radius;
        self
    }

    pub fn sphere_tessellation(mut self, segments: u32, rings: u32) -> Self {
        self.sphere_segments = segments;
        self.sphere_rings = rings;
        self
    }

    pub fn partial_segments(mut self, segments: u32) -> Self {
        self.partial_segments = segments;
        self
    }

    /// Geometry for a node's own projection.
    pub fn geometry(
        &self,
        node: &Node,
        transform: &ImageTransform,
    ) -> TransitionResult<(RawGeometry, PlaneProjection)> {
        if node.full_pano {
            let geometry =
                RawGeometry::sphere(self.sphere_radius, self.sphere_segments, self.sphere_rings)?;
            return Ok((geometry, PlaneProjection::Sphere));
        }

        if node.pano {
            let crop = transform.pano_crop.ok_or_else(|| {
                TransitionError::invalid_geometry(format!(
                    "partial panorama {} has no crop",
                    node.key
                ))
            })?;
            let geometry = RawGeometry::partial_sphere(
                self.sphere_radius,
                crop.longitude_range()?,
                crop.polar_range()?,
                self.partial_segments,
                (self.partial_segments / 2).max(2),
            )?;
            return Ok((geometry, PlaneProjection::PartialSphere));
        }

        let (width, height) = transform.plane_size()?;
        let geometry = RawGeometry::flat_plane(width / 2.0, height / 2.0)?;
        Ok((geometry, PlaneProjection::Flat))
    }
}

/// Per-plane uniforms (group 1).
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PlaneUniforms {
    /// Camera-to-world matrix of the node's image.
    pub model: [[f32; 4]; 4],
    /// Wipe position in texture u. Always 1 for plain planes.
    pub curtain: f32,
    pub _pad: [f32; 3],
}

/// One drawable image mesh on the GPU.
pub struct GpuImagePlane {
    pub(crate) mesh: Mesh,
    pub(crate) model: Mat4,
    pub(crate) shader: PlaneShader,
    pub(crate) projection: PlaneProjection,
    pub(crate) uniform_buffer: wgpu::Buffer,
    pub(crate) curtain: f32,
    pub(crate) texture: Option<Arc<Texture>>,
    disposed: bool,
}

impl GpuImagePlane {
    pub fn shader(&self) -> PlaneShader {
        self.shader
    }

    pub fn projection(&self) -> PlaneProjection {
        self.projection
    }

    pub fn curtain(&self) -> f32 {
        self.curtain
    }

    pub fn texture(&self) -> Option<&Arc<Texture>> {
        self.texture.as_ref()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn uniforms(&self) -> PlaneUniforms {
        PlaneUniforms {
            model: self.model.to_cols_array_2d(),
            curtain: match self.shader {
                PlaneShader::Plain => 1.0,
                PlaneShader::Curtain => self.curtain,
            },
            _pad: [0.0; 3],
        }
    }
}

impl ImagePlane for GpuImagePlane {
    type Image = Arc<Texture>;

    fn set_curtain(&mut self, curtain: f32) {
        if self.shader == PlaneShader::Curtain {
            self.curtain = curtain;
        }
    }

    fn set_texture(&mut self, image: &Arc<Texture>) {
        self.texture = Some(Arc::clone(image));
    }

    fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.mesh.destroy();
        self.uniform_buffer.destroy();
        self.texture = None;
        self.disposed = true;
    }
}

/// [`MeshFactory`] producing [`GpuImagePlane`]s.
pub struct GpuPlaneFactory {
    device: wgpu::Device,
    config: FactoryConfig,
}

impl GpuPlaneFactory {
    pub fn new(device: &wgpu::Device, config: FactoryConfig) -> Self {
        Self {
            device: device.clone(),
            config,
        }
    }

    pub fn config(&self) -> &FactoryConfig {
        &self.config
    }

    fn build(
        &self,
        geometry: RawGeometry,
        projection: PlaneProjection,
        shader: PlaneShader,
        transform: &ImageTransform,
    ) -> GpuImagePlane {
        let uniform_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Image Plane Uniforms"),
            size: std::mem::size_of::<PlaneUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        GpuImagePlane {
            mesh: geometry.upload(&self.device),
            model: transform.model_matrix(),
            shader,
            projection,
            uniform_buffer,
            curtain: 1.0,
            texture: None,
            disposed: false,
        }
    }
}

impl MeshFactory for GpuPlaneFactory {
    type Mesh = GpuImagePlane;

    fn create_mesh(
        &mut self,
        node: &Node,
        transform: &ImageTransform,
    ) -> TransitionResult<GpuImagePlane> {
        let (geometry, projection) = self.config.geometry(node, transform)?;
        Ok(self.build(geometry, projection, PlaneShader::Plain, transform))
    }

    fn create_scaled_flat_mesh(
        &mut self,
        _node: &Node,
        transform: &ImageTransform,
        half_width: f32,
        half_height: f32,
    ) -> TransitionResult<GpuImagePlane> {
        let geometry = RawGeometry::flat_plane(half_width, half_height)?;
        Ok(self.build(geometry, PlaneProjection::Flat, PlaneShader::Plain, transform))
    }

    fn create_curtain_mesh(
        &mut self,
        node: &Node,
        transform: &ImageTransform,
    ) -> TransitionResult<GpuImagePlane> {
        let (geometry, projection) = self.config.geometry(node, transform)?;
        Ok(self.build(geometry, projection, PlaneShader::Curtain, transform))
    }
}
