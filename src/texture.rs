use crate::error::TransitionResult;
use crate::gpu::GpuContext;

/// A GPU texture holding a node's decoded image.
#[derive(Debug)]
pub struct Texture {
    pub(crate) texture: wgpu::Texture,
    pub(crate) view: wgpu::TextureView,
    pub(crate) sampler: wgpu::Sampler,
    pub width: u32,
    pub height: u32,
}

impl Texture {
    /// Create a texture from raw RGBA data.
    pub fn from_rgba(gpu: &GpuContext, data: &[u8], width: u32, height: u32, label: &str) -> Self {
        use wgpu::util::DeviceExt;

        let texture = gpu.device.create_texture_with_data(
            &gpu.queue,
            &wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            data,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        // Photos are sampled smoothly; panorama seams wrap horizontally.
        let sampler = gpu.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(&format!("{} Sampler", label)),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
            width,
            height,
        }
    }

    /// Upload a decoded image, downscaled to fit the device's texture limit.
    pub fn from_image(gpu: &GpuContext, image: &image::DynamicImage, label: &str) -> Self {
        let max = gpu.device.limits().max_texture_dimension_2d;
        let rgba = if image.width() > max || image.height() > max {
            log::warn!(
                "{label}: {}x{} exceeds the {max}px texture limit, downscaling",
                image.width(),
                image.height()
            );
            image.resize(max, max, image::imageops::FilterType::Triangle).to_rgba8()
        } else {
            image.to_rgba8()
        };
        let (width, height) = rgba.dimensions();
        Self::from_rgba(gpu, &rgba, width, height, label)
    }

    /// Load a texture from an image file.
    pub fn from_file(gpu: &GpuContext, path: &str) -> TransitionResult<Self> {
        let img = image::open(path)?;
        Ok(Self::from_image(gpu, &img, path))
    }

    /// Single-pixel texture bound to planes whose image has not arrived yet.
    pub fn placeholder(gpu: &GpuContext) -> Self {
        Self::from_rgba(gpu, &[0, 0, 0, 255], 1, 1, "Placeholder Texture")
    }

    /// Release the GPU allocation ahead of drop.
    pub fn destroy(&self) {
        self.texture.destroy();
    }
}
