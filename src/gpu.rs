//! Core GPU context and device management.
//!
//! [`GpuContext`] holds the wgpu objects every backend type needs: the device
//! for creating buffers and pipelines, the queue for uploads, and the window
//! surface the transition is presented to.
//!
//! The transition core never reaches for a global context. The context is
//! passed explicitly into the factory, the pass and each frame.
//!
//! # Initialization
//!
//! Create the context once the event loop has resumed and a window exists.
//! The surface keeps the window alive through the `Arc`.
//!
//! # Example
//!
//! ```no_run
//! # fn demo(window: std::sync::Arc<winit::window::Window>) -> panowipe::TransitionResult<()> {
//! use panowipe::{FactoryConfig, GpuContext, GpuPlaneFactory, ImagePlanePass};
//!
//! let gpu = GpuContext::new(window)?;
//! let pass = ImagePlanePass::new(&gpu);
//! let factory = GpuPlaneFactory::new(&gpu.device, FactoryConfig::default());
//! println!("{}x{} at aspect {}", gpu.width(), gpu.height(), gpu.aspect());
//! # Ok(())
//! # }
//! ```

use crate::error::{TransitionError, TransitionResult};
use std::sync::Arc;
use winit::window::Window;

/// Core GPU context holding wgpu resources.
///
/// All fields are public to allow direct access to wgpu APIs when needed.
pub struct GpuContext {
    /// The surface for presenting rendered frames to the window.
    pub surface: wgpu::Surface<'static>,
    /// The logical GPU device for creating resources and pipelines.
    pub device: wgpu::Device,
    /// The command queue for submitting work to the GPU.
    pub queue: wgpu::Queue,
    /// Current surface configuration (format, size, present mode).
    pub config: wgpu::SurfaceConfiguration,
}

impl GpuContext {
    /// Create a new GPU context from a winit window.
    ///
    /// Requests an adapter compatible with the window surface, creates the
    /// device and queue, and configures the surface with an sRGB format and
    /// Fifo present mode.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError::Gpu`] when the surface cannot be created, no
    /// adapter is compatible with it, device creation fails, or the surface
    /// reports no formats.
    pub fn new(window: Arc<Window>) -> TransitionResult<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window)
            .map_err(|e| TransitionError::gpu(format!("failed to create surface: {e}")))?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .map_err(|e| TransitionError::gpu(format!("no suitable adapter: {e}")))?;

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("Panowipe Device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            memory_hints: Default::default(),
            trace: Default::default(),
            experimental_features: Default::default(),
        }))
        .map_err(|e| TransitionError::gpu(format!("failed to create device: {e}")))?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or_else(|| TransitionError::gpu("surface reports no formats"))?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        log::info!(
            "gpu ready: {:?} {}x{}",
            adapter.get_info().backend,
            config.width,
            config.height
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
        })
    }

    /// Resize the surface to new dimensions.
    ///
    /// Ignores zero-sized dimensions, which occur while the window is minimized.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Reconfigure the surface at its current size after it was lost or outdated.
    pub fn reconfigure(&self) {
        self.surface.configure(&self.device, &self.config);
    }

    pub fn width(&self) -> u32 {
        self.config.width
    }

    pub fn height(&self) -> u32 {
        self.config.height
    }

    /// Returns the current aspect ratio (width / height).
    ///
    /// Never divides by zero: the configured height is at least 1.
    pub fn aspect(&self) -> f32 {
        self.config.width as f32 / self.config.height as f32
    }
}
