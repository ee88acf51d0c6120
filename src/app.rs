//! Windowed demo: wipe between two images with the mouse.

use std::path::PathBuf;
use std::sync::Arc;
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::KeyCode;
use winit::window::{Window, WindowAttributes, WindowId};

use crate::camera::Camera;
use crate::error::{TransitionError, TransitionResult};
use crate::gpu::GpuContext;
use crate::input::Input;
use crate::node::{CurrentState, Frame, ImageTransform, Node};
use crate::plane_factory::{FactoryConfig, GpuPlaneFactory};
use crate::plane_pass::{ImagePlanePass, PlaneFrame};
use crate::scene::{RendererConfig, TransitionRenderer};
use crate::texture::Texture;

pub struct ViewerConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            title: "Panowipe".to_string(),
            width: 1280,
            height: 720,
        }
    }
}

impl ViewerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }
}

/// One side of the demo transition.
pub struct ViewerImage {
    pub path: PathBuf,
    /// Equirectangular 360° image.
    pub full_pano: bool,
}

impl ViewerImage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            full_pano: false,
        }
    }

    pub fn full_pano(mut self, full_pano: bool) -> Self {
        self.full_pano = full_pano;
        self
    }

    fn node(&self) -> Node {
        let key = self.path.display().to_string();
        if self.full_pano {
            Node::full_pano(key)
        } else {
            Node::flat(key)
        }
    }
}

/// The pair being wiped between.
pub struct ViewerScene {
    pub previous: ViewerImage,
    pub current: ViewerImage,
    /// Build every plane flat, as if the camera were not moving.
    pub motionless: bool,
}

struct Decoded {
    node: Node,
    transform: ImageTransform,
    image: image::DynamicImage,
}

impl Decoded {
    fn open(source: &ViewerImage) -> TransitionResult<Self> {
        let image = image::open(&source.path)?;
        log::info!(
            "loaded {} ({}x{})",
            source.path.display(),
            image.width(),
            image.height()
        );
        Ok(Self {
            node: source.node(),
            transform: ImageTransform::new(image.width(), image.height()),
            image,
        })
    }
}

/// Open a window and run the wipe demo until it is closed.
pub fn run_viewer(config: ViewerConfig, scene: ViewerScene) -> TransitionResult<()> {
    let previous = Decoded::open(&scene.previous)?;
    let current = Decoded::open(&scene.current)?;

    let event_loop =
        EventLoop::new().map_err(|e| TransitionError::gpu(format!("event loop: {e}")))?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = ViewerApp::Pending {
        config,
        images: Some((previous, current)),
        motionless: scene.motionless,
    };
    event_loop
        .run_app(&mut app)
        .map_err(|e| TransitionError::gpu(format!("event loop: {e}")))?;

    match app {
        ViewerApp::Failed(e) => Err(e),
        _ => Ok(()),
    }
}

enum ViewerApp {
    Pending {
        config: ViewerConfig,
        images: Option<(Decoded, Decoded)>,
        motionless: bool,
    },
    Running(Box<Running>),
    Failed(TransitionError),
}

struct Running {
    window: Arc<Window>,
    gpu: GpuContext,
    pass: ImagePlanePass,
    renderer: TransitionRenderer<GpuPlaneFactory>,
    camera: Camera,
    input: Input,
}

impl Running {
    fn start(
        event_loop: &ActiveEventLoop,
        config: &ViewerConfig,
        (previous, current): (Decoded, Decoded),
        motionless: bool,
    ) -> TransitionResult<Self> {
        let window_attrs = WindowAttributes::default()
            .with_title(&config.title)
            .with_inner_size(winit::dpi::LogicalSize::new(config.width, config.height));
        let window = Arc::new(
            event_loop
                .create_window(window_attrs)
                .map_err(|e| TransitionError::gpu(format!("window: {e}")))?,
        );

        let gpu = GpuContext::new(window.clone())?;
        let pass = ImagePlanePass::new(&gpu);
        let factory = GpuPlaneFactory::new(&gpu.device, FactoryConfig::default());
        let mut renderer = TransitionRenderer::new(factory, RendererConfig::default());

        let previous_texture = Arc::new(Texture::from_image(
            &gpu,
            &previous.image,
            previous.node.key.as_str(),
        ));
        let current_texture = Arc::new(Texture::from_image(
            &gpu,
            &current.image,
            current.node.key.as_str(),
        ));

        // Arrive at the previous image first, then navigate to the current one.
        let arrival = CurrentState::new()
            .current(previous.node.clone(), previous.transform.clone())
            .motionless(motionless);
        renderer.update(&Frame::new(0, arrival))?;
        renderer.update_texture(&previous_texture, &previous.node)?;

        let navigation = CurrentState::new()
            .current(current.node.clone(), current.transform)
            .previous(previous.node.clone(), previous.transform)
            .motionless(motionless);
        renderer.update(&Frame::new(1, navigation))?;
        renderer.update_texture(&current_texture, &current.node)?;
        renderer.update_texture(&previous_texture, &previous.node)?;

        if renderer.disabled() {
            log::warn!("this image pair cannot be wiped between; showing the current image");
        }

        window.request_redraw();

        Ok(Self {
            window,
            gpu,
            pass,
            renderer,
            camera: Camera::new(),
            input: Input::new(),
        })
    }

    fn redraw(&mut self) -> TransitionResult<()> {
        let output = match self.gpu.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("surface lost, reconfiguring");
                self.gpu.reconfigure();
                self.window.request_redraw();
                return Ok(());
            }
            Err(e) => {
                log::warn!("skipping frame: {e}");
                return Ok(());
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.pass.ensure_depth_size(&self.gpu);

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Transition Encoder"),
            });
        {
            let mut frame = PlaneFrame::new(&self.gpu, &self.pass, &mut encoder, &view);
            self.renderer.render(&self.camera, &mut frame)?;
        }

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    fn handle(&mut self, event_loop: &ActiveEventLoop, event: WindowEvent) -> TransitionResult<()> {
        if self.renderer.is_disposed() {
            return Ok(());
        }
        self.input.handle_event(&event);

        match event {
            WindowEvent::CloseRequested => {
                self.renderer.dispose()?;
                event_loop.exit();
                return Ok(());
            }
            WindowEvent::Resized(size) => {
                self.gpu.resize(size.width, size.height);
                self.window.request_redraw();
            }
            WindowEvent::RedrawRequested => self.redraw()?,
            _ => {}
        }

        if self.input.key_pressed(KeyCode::Escape) {
            self.renderer.dispose()?;
            event_loop.exit();
            return Ok(());
        }
        if let Some(curtain) = self.input.dragged_curtain(self.gpu.width()) {
            self.renderer.update_curtain(curtain)?;
        }
        if self.renderer.needs_render() {
            self.window.request_redraw();
        }

        self.input.end_frame();
        Ok(())
    }
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let ViewerApp::Pending {
            config,
            images,
            motionless,
        } = self
        else {
            return;
        };
        let Some(images) = images.take() else {
            return;
        };

        *self = match Running::start(event_loop, config, images, *motionless) {
            Ok(running) => ViewerApp::Running(Box::new(running)),
            Err(e) => {
                event_loop.exit();
                ViewerApp::Failed(e)
            }
        };
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let ViewerApp::Running(running) = self else {
            return;
        };

        if let Err(e) = running.handle(event_loop, event) {
            event_loop.exit();
            *self = ViewerApp::Failed(e);
        }
    }
}
