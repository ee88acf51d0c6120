//! Image plane rendering pass with depth testing and the curtain wipe.
//!
//! [`ImagePlanePass`] owns the pipelines and long-lived GPU resources.
//! [`PlaneFrame`] borrows it for one frame and implements
//! [`RenderTarget`], so a [`TransitionRenderer`](crate::TransitionRenderer)
//! can draw straight into a command encoder.
//!
//! # Bind Groups
//!
//! - **Group 0**: camera uniforms (view-projection matrix)
//! - **Group 1**: plane uniforms (model matrix, curtain), one buffer per plane
//! - **Group 2**: the node's image texture and sampler
//!
//! # Example
//!
//! ```ignore
//! let mut pass = ImagePlanePass::new(&gpu);
//!
//! pass.ensure_depth_size(&gpu);
//! let mut encoder = gpu.device.create_command_encoder(&Default::default());
//! {
//!     let mut frame = PlaneFrame::new(&gpu, &pass, &mut encoder, &view);
//!     renderer.render(&camera, &mut frame)?;
//! }
//! gpu.queue.submit(std::iter::once(encoder.finish()));
//! ```

use crate::camera::Camera;
use crate::gpu::GpuContext;
use crate::mesh::Vertex3d;
use crate::plane::{PlaneShader, RenderTarget};
use crate::plane_factory::{GpuImagePlane, PlaneUniforms};
use crate::texture::Texture;

/// Camera uniforms (group 0).
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniforms {
    pub view_proj: [[f32; 4]; 4],
}

/// GPU resources for drawing image planes.
///
/// Pipeline configuration:
/// - no face culling, so spheres are visible from inside
/// - alpha blending
/// - Depth32Float, depth write with Less-than comparison
pub struct ImagePlanePass {
    plain_pipeline: wgpu::RenderPipeline,
    curtain_pipeline: wgpu::RenderPipeline,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    plane_bind_group_layout: wgpu::BindGroupLayout,
    texture_bind_group_layout: wgpu::BindGroupLayout,
    placeholder: Texture,
    pub(crate) depth_texture: wgpu::Texture,
    pub(crate) depth_view: wgpu::TextureView,
    depth_size: (u32, u32),
}

impl ImagePlanePass {
    pub fn new(gpu: &GpuContext) -> Self {
        let device = &gpu.device;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Image Plane Shader"),
            source: wgpu::ShaderSource::Wgsl(IMAGE_PLANE_SHADER.into()),
        });

        // Camera uniform buffer (group 0)
        let camera_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Camera Uniforms"),
            size: std::mem::size_of::<CameraUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let camera_bind_group_layout = uniform_layout(device, "Camera Bind Group Layout");

        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Camera Bind Group"),
            layout: &camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        // Plane uniforms (group 1), bound per plane at draw time
        let plane_bind_group_layout = uniform_layout(device, "Plane Bind Group Layout");

        // Texture bind group layout (group 2)
        let texture_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Image Texture Bind Group Layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Image Plane Pipeline Layout"),
            bind_group_layouts: &[
                &camera_bind_group_layout,
                &plane_bind_group_layout,
                &texture_bind_group_layout,
            ],
            push_constant_ranges: &[],
        });

        let plain_pipeline = create_pipeline(gpu, &pipeline_layout, &shader, "fs_plain");
        let curtain_pipeline = create_pipeline(gpu, &pipeline_layout, &shader, "fs_curtain");

        let (depth_texture, depth_view) = Self::create_depth_texture(gpu);

        Self {
            plain_pipeline,
            curtain_pipeline,
            camera_buffer,
            camera_bind_group,
            plane_bind_group_layout,
            texture_bind_group_layout,
            placeholder: Texture::placeholder(gpu),
            depth_texture,
            depth_view,
            depth_size: (gpu.width(), gpu.height()),
        }
    }

    fn create_depth_texture(gpu: &GpuContext) -> (wgpu::Texture, wgpu::TextureView) {
        let texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Image Plane Depth Texture"),
            size: wgpu::Extent3d {
                width: gpu.width(),
                height: gpu.height(),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Depth32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        (texture, view)
    }

    /// Recreate the depth buffer if the surface was resized.
    pub fn ensure_depth_size(&mut self, gpu: &GpuContext) {
        if self.depth_size != (gpu.width(), gpu.height()) {
            let (texture, view) = Self::create_depth_texture(gpu);
            self.depth_texture = texture;
            self.depth_view = view;
            self.depth_size = (gpu.width(), gpu.height());
        }
    }

    fn create_texture_bind_group(&self, gpu: &GpuContext, texture: &Texture) -> wgpu::BindGroup {
        gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Image Texture Bind Group"),
            layout: &self.texture_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&texture.sampler),
                },
            ],
        })
    }

    /// Draw one generation's planes into an active render pass.
    ///
    /// Disposed planes are skipped. Planes without an image yet are drawn with
    /// the placeholder texture.
    pub fn draw_planes(
        &self,
        gpu: &GpuContext,
        render_pass: &mut wgpu::RenderPass,
        planes: &[GpuImagePlane],
        camera: &Camera,
    ) {
        if planes.is_empty() {
            return;
        }

        let view_proj = camera.projection_matrix(gpu.aspect()) * camera.view_matrix();
        gpu.queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::cast_slice(&[CameraUniforms {
                view_proj: view_proj.to_cols_array_2d(),
            }]),
        );
        render_pass.set_bind_group(0, &self.camera_bind_group, &[]);

        for plane in planes.iter().filter(|p| !p.is_disposed()) {
            let uniforms: PlaneUniforms = plane.uniforms();
            gpu.queue
                .write_buffer(&plane.uniform_buffer, 0, bytemuck::cast_slice(&[uniforms]));

            let plane_bind_group = gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Plane Bind Group"),
                layout: &self.plane_bind_group_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: plane.uniform_buffer.as_entire_binding(),
                }],
            });

            let texture = plane.texture.as_deref().unwrap_or(&self.placeholder);
            let texture_bind_group = self.create_texture_bind_group(gpu, texture);

            render_pass.set_pipeline(match plane.shader {
                PlaneShader::Plain => &self.plain_pipeline,
                PlaneShader::Curtain => &self.curtain_pipeline,
            });
            render_pass.set_bind_group(1, &plane_bind_group, &[]);
            render_pass.set_bind_group(2, &texture_bind_group, &[]);
            render_pass.set_vertex_buffer(0, plane.mesh.vertex_buffer.slice(..));
            render_pass
                .set_index_buffer(plane.mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..plane.mesh.index_count, 0, 0..1);
        }
    }
}

fn uniform_layout(device: &wgpu::Device, label: &str) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    })
}

fn create_pipeline(
    gpu: &GpuContext,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    fragment_entry: &str,
) -> wgpu::RenderPipeline {
    gpu.device
        .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(fragment_entry),
            layout: Some(layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: Some("vs"),
                buffers: &[Vertex3d::LAYOUT],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: Some(fragment_entry),
                targets: &[Some(wgpu::ColorTargetState {
                    format: gpu.config.format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: wgpu::TextureFormat::Depth32Float,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        })
}

/// One frame's worth of render passes into a surface view.
///
/// Each [`draw_scene`](RenderTarget::draw_scene) call records its own render
/// pass. The first clears color; every pass clears depth, so a later
/// generation always lands on top of an earlier one.
pub struct PlaneFrame<'a> {
    gpu: &'a GpuContext,
    pass: &'a ImagePlanePass,
    encoder: &'a mut wgpu::CommandEncoder,
    view: &'a wgpu::TextureView,
    clear_color: wgpu::Color,
    passes: u32,
}

impl<'a> PlaneFrame<'a> {
    pub fn new(
        gpu: &'a GpuContext,
        pass: &'a ImagePlanePass,
        encoder: &'a mut wgpu::CommandEncoder,
        view: &'a wgpu::TextureView,
    ) -> Self {
        Self {
            gpu,
            pass,
            encoder,
            view,
            clear_color: wgpu::Color::BLACK,
            passes: 0,
        }
    }

    pub fn with_clear_color(mut self, color: wgpu::Color) -> Self {
        self.clear_color = color;
        self
    }

    /// Number of passes recorded so far.
    pub fn passes(&self) -> u32 {
        self.passes
    }
}

impl RenderTarget<GpuImagePlane> for PlaneFrame<'_> {
    fn draw_scene(&mut self, planes: &[GpuImagePlane], camera: &Camera) {
        let load = if self.passes == 0 {
            wgpu::LoadOp::Clear(self.clear_color)
        } else {
            wgpu::LoadOp::Load
        };

        let mut render_pass = self.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Image Plane Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: self.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.pass.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        self.pass
            .draw_planes(self.gpu, &mut render_pass, planes, camera);
        self.passes += 1;
    }
}

/// Shared vertex stage with a plain and a curtain fragment stage.
const IMAGE_PLANE_SHADER: &str = r#"
struct Camera {
    view_proj: mat4x4f,
}

struct Plane {
    model: mat4x4f,
    curtain: f32,
}

@group(0) @binding(0) var<uniform> camera: Camera;
@group(1) @binding(0) var<uniform> plane: Plane;
@group(2) @binding(0) var image: texture_2d<f32>;
@group(2) @binding(1) var image_sampler: sampler;

struct VertexOut {
    @builtin(position) position: vec4f,
    @location(0) uv: vec2f,
}

@vertex
fn vs(@location(0) position: vec3f, @location(1) uv: vec2f) -> VertexOut {
    var out: VertexOut;
    out.position = camera.view_proj * plane.model * vec4f(position, 1.0);
    out.uv = uv;
    return out;
}

@fragment
fn fs_plain(in: VertexOut) -> @location(0) vec4f {
    return textureSample(image, image_sampler, in.uv);
}

@fragment
fn fs_curtain(in: VertexOut) -> @location(0) vec4f {
    let color = textureSample(image, image_sampler, in.uv);
    // Everything right of the curtain shows the previous generation.
    if in.uv.x > plane.curtain {
        discard;
    }
    return color;
}
"#;
