//! Seams between the transition core and a graphics backend.
//!
//! The core never touches GPU objects directly. It talks to three traits:
//!
//! - [`ImagePlane`]: what a drawable image mesh can do (curtain, texture, dispose)
//! - [`MeshFactory`]: how image meshes get built for a node
//! - [`RenderTarget`]: where a generation's meshes get drawn
//!
//! The wgpu implementations are [`GpuPlaneFactory`](crate::GpuPlaneFactory) and
//! [`PlaneFrame`](crate::PlaneFrame).

use crate::camera::Camera;
use crate::error::TransitionResult;
use crate::node::{ImageTransform, Node};

/// Which fragment program an image plane is drawn with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaneShader {
    /// Always fully visible.
    Plain,
    /// Fragments past the curtain position are discarded.
    Curtain,
}

/// How a node's image is projected onto geometry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaneProjection {
    Flat,
    Sphere,
    PartialSphere,
}

/// Capability interface of a drawable image mesh.
pub trait ImagePlane {
    /// Decoded image data accepted by [`set_texture`](Self::set_texture).
    type Image;

    /// Set the wipe position. Meshes without a curtain uniform ignore this.
    fn set_curtain(&mut self, curtain: f32);

    /// Bind the node's image as the projected texture.
    fn set_texture(&mut self, image: &Self::Image);

    /// Release GPU-side resources. Called once when the mesh leaves the scene.
    fn dispose(&mut self);
}

/// Builds image meshes for nodes.
///
/// Construction failures are reported, never swallowed: a generation left
/// without geometry would render blank.
pub trait MeshFactory {
    type Mesh: ImagePlane;

    /// Geometry matching the node's projection (flat, sphere or partial sphere).
    fn create_mesh(
        &mut self,
        node: &Node,
        transform: &ImageTransform,
    ) -> TransitionResult<Self::Mesh>;

    /// A flat plane with explicit half extents, in world units at unit distance.
    fn create_scaled_flat_mesh(
        &mut self,
        node: &Node,
        transform: &ImageTransform,
        half_width: f32,
        half_height: f32,
    ) -> TransitionResult<Self::Mesh>;

    /// Geometry matching the node's projection, drawn with the curtain shader.
    fn create_curtain_mesh(
        &mut self,
        node: &Node,
        transform: &ImageTransform,
    ) -> TransitionResult<Self::Mesh>;
}

/// Destination for one draw pass over a generation's meshes.
pub trait RenderTarget<M> {
    fn draw_scene(&mut self, planes: &[M], camera: &Camera);
}
