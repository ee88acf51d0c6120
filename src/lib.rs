//! # Panowipe
//!
//! **Curtain-wipe transitions between photos and panoramas, on wgpu.**
//!
//! A [`TransitionRenderer`] keeps two generations of image geometry, the node
//! being navigated away from and the node being navigated to, and composites
//! them under a scalar curtain. Feed it navigation [`Frame`]s, hand it decoded
//! images as they arrive, move the curtain, and render when it asks to.
//!
//! ## Quick Start
//!
//! ```ignore
//! use panowipe::*;
//!
//! let factory = GpuPlaneFactory::new(&gpu.device, FactoryConfig::default());
//! let mut renderer = TransitionRenderer::new(factory, RendererConfig::default());
//!
//! let state = CurrentState::new()
//!     .current(Node::flat("b"), ImageTransform::new(1600, 1200))
//!     .previous(Node::flat("a"), ImageTransform::new(1920, 1080));
//! renderer.update(&Frame::new(1, state))?;
//! renderer.update_texture(&texture_b, &Node::flat("b"))?;
//! renderer.update_curtain(0.5)?;
//! ```
//!
//! The core is generic over [`MeshFactory`] and [`RenderTarget`], so it runs
//! without a GPU. The wgpu backend is [`GpuPlaneFactory`] and [`PlaneFrame`].

mod app;
mod camera;
mod error;
mod geometry;
mod gpu;
mod input;
mod mesh;
mod node;
mod plane;
mod plane_factory;
mod plane_pass;
pub mod scene;
mod texture;

pub use app::{ViewerConfig, ViewerImage, ViewerScene, run_viewer};
pub use camera::Camera;
pub use error::{TransitionError, TransitionResult};
pub use geometry::{PLANE_DISTANCE, RawGeometry};
pub use gpu::GpuContext;
pub use input::{Input, curtain_at};
pub use mesh::{Mesh, Vertex3d};
pub use node::{CurrentState, Frame, ImageTransform, Node, NodeKey, PanoCrop};
pub use plane::{ImagePlane, MeshFactory, PlaneProjection, PlaneShader, RenderTarget};
pub use plane_factory::{FactoryConfig, GpuImagePlane, GpuPlaneFactory, PlaneUniforms};
pub use plane_pass::{CameraUniforms, ImagePlanePass, PlaneFrame};
pub use scene::{Generation, RendererConfig, TransitionRenderer, TransitionScene, flat_extents};
pub use texture::Texture;

// Re-export glam math types for convenience
pub use glam::{Mat4, Quat, Vec2, Vec3};
