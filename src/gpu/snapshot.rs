//! Headless still-frame rendering.

use super::context::{GpuContext, GpuError};
use super::renderer::ParticleRenderer;
use super::textures::{ReadbackBuffer, RenderTarget};
use crate::scene::ParticleScene;
use image::RgbaImage;

const OUTPUT_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// Renders scenes offscreen and reads the result back as an image.
pub struct SnapshotRenderer {
    ctx: GpuContext,
    renderer: ParticleRenderer,
    output: RenderTarget,
    readback: ReadbackBuffer,
    width: u32,
    height: u32,
}

impl SnapshotRenderer {
    /// Create a renderer sized for `scene`, producing `width` x `height` images.
    pub async fn new(scene: &ParticleScene, width: u32, height: u32) -> Result<Self, GpuError> {
        let (width, height) = (width.max(1), height.max(1));
        let ctx = GpuContext::new().await?;
        let config = scene.config();
        let renderer = ParticleRenderer::new(
            &ctx.device,
            &ctx.queue,
            config,
            config.particle_count,
            OUTPUT_FORMAT,
            (width, height),
        );
        let output = RenderTarget::for_output(&ctx.device, "snapshot_output", width, height, OUTPUT_FORMAT);
        let readback = ReadbackBuffer::new(&ctx.device, width, height);

        Ok(Self {
            ctx,
            renderer,
            output,
            readback,
            width,
            height,
        })
    }

    /// Draw the scene's current particle state.
    pub fn render(&mut self, scene: &mut ParticleScene) -> Result<RgbaImage, GpuError> {
        self.renderer
            .upload(&self.ctx.queue, scene.controller_mut().buffers_mut());

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("snapshot_encoder"),
            });
        self.renderer
            .encode(&mut encoder, &self.ctx.queue, scene.camera(), self.output.view());
        self.readback.copy_from(&mut encoder, self.output.texture());
        self.ctx.queue.submit(std::iter::once(encoder.finish()));

        let pixels = self.readback.read_pixels(&self.ctx.device)?;
        RgbaImage::from_raw(self.width, self.height, pixels)
            .ok_or_else(|| GpuError::Readback("pixel buffer size mismatch".into()))
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn adapter_info(&self) -> wgpu::AdapterInfo {
        self.ctx.adapter_info()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BrainConfig, DeviceProfile};

    #[tokio::test]
    async fn test_snapshot_draws_particles() {
        let config = BrainConfig {
            particle_count: 400,
            seed: Some(1),
            ..Default::default()
        }
        .resolve(&DeviceProfile::default());
        let mut scene = ParticleScene::new(config).unwrap();
        scene.resize(160, 90, 1.0);

        let mut snapshot = match SnapshotRenderer::new(&scene, 160, 90).await {
            Ok(snapshot) => snapshot,
            Err(_) => return, // Skip if no GPU
        };
        let image = snapshot.render(&mut scene).unwrap();
        assert_eq!(image.dimensions(), (160, 90));

        let lit = image.pixels().filter(|p| p[0] > 40 || p[2] > 40).count();
        assert!(lit > 0, "snapshot should contain visible particles");
    }
}
