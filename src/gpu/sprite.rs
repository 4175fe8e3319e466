//! Star sprite texture.

use image::{Rgba, RgbaImage};
use wgpu::{Device, Queue};

/// Edge length of the sprite in pixels.
pub const SPRITE_SIZE: u32 = 64;

/// Alpha stops of the radial falloff as `(radius, alpha)`, radius in `[0, 1]`.
const STOPS: [(f32, f32); 4] = [(0.0, 1.0), (0.2, 0.8), (0.5, 0.3), (1.0, 0.0)];

/// Alpha at normalised distance `r` from the sprite centre.
pub fn sprite_alpha(r: f32) -> f32 {
    if r <= 0.0 {
        return STOPS[0].1;
    }
    for pair in STOPS.windows(2) {
        let (r0, a0) = pair[0];
        let (r1, a1) = pair[1];
        if r <= r1 {
            let t = (r - r0) / (r1 - r0);
            return a0 + (a1 - a0) * t;
        }
    }
    0.0
}

/// White radial-gradient disc with the falloff in the alpha channel.
pub fn star_sprite(size: u32) -> RgbaImage {
    let half = size as f32 * 0.5;
    RgbaImage::from_fn(size, size, |x, y| {
        let dx = x as f32 + 0.5 - half;
        let dy = y as f32 + 0.5 - half;
        let r = (dx * dx + dy * dy).sqrt() / half;
        let alpha = (sprite_alpha(r) * 255.0).round() as u8;
        Rgba([255, 255, 255, alpha])
    })
}

/// Sprite uploaded to the GPU with a sampling view.
pub struct SpriteTexture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    sampler: wgpu::Sampler,
}

impl SpriteTexture {
    pub fn new(device: &Device, queue: &Queue) -> Self {
        let image = star_sprite(SPRITE_SIZE);
        let size = wgpu::Extent3d {
            width: image.width(),
            height: image.height(),
            depth_or_array_layers: 1,
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("star_sprite"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            image.as_raw(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * image.width()),
                rows_per_image: Some(image.height()),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("star_sprite_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
        }
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }

    pub fn destroy(&self) {
        self.texture.destroy();
    }
}
