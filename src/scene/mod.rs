//! Two-generation transition scene and its renderer.
//!
//! # Overview
//!
//! A transition always involves exactly two nodes: the one being navigated
//! away from (the *previous* generation) and the one being navigated to (the
//! *current* generation). [`TransitionScene`] owns the meshes of both.
//! [`TransitionRenderer`] keeps them in sync with incoming navigation frames
//! and draws them:
//!
//! 1. the previous generation, fully visible, unless the pair is incompatible
//! 2. the current generation on top, clipped by the curtain
//!
//! Moving the curtain from 0 to 1 wipes the current image in over the previous.
//!
//! # Example
//!
//! ```ignore
//! use panowipe::*;
//!
//! let factory = GpuPlaneFactory::new(&gpu.device, FactoryConfig::default());
//! let mut renderer = TransitionRenderer::new(factory, RendererConfig::default());
//!
//! renderer.update(&Frame::new(1, state))?;
//! renderer.update_texture(&texture, &node)?;
//! renderer.update_curtain(0.5)?;
//!
//! if renderer.needs_render() {
//!     let mut frame = PlaneFrame::new(&gpu, &pass, &mut encoder, &view);
//!     renderer.render(&camera, &mut frame)?;
//! }
//! ```

mod letterbox;
mod renderer;
#[allow(clippy::module_inception)]
mod scene;

pub use letterbox::flat_extents;
pub use renderer::{RendererConfig, TransitionRenderer};
pub use scene::{Generation, TransitionScene};
