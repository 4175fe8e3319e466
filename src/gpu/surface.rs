//! Presenting to a window surface.

use super::context::{GpuContext, GpuError};
use super::renderer::ParticleRenderer;
use crate::config::ResolvedConfig;
use crate::scene::ParticleScene;
use std::sync::Arc;
use winit::window::Window;

/// Result of one presentation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    Presented,
    /// Surface was stale or busy; try again next frame.
    Skipped,
    /// The device is gone and the renderer must be rebuilt.
    DeviceLost,
}

/// Window-backed renderer: surface, context and particle passes.
pub struct SurfaceRenderer {
    ctx: GpuContext,
    surface: wgpu::Surface<'static>,
    surface_config: wgpu::SurfaceConfiguration,
    renderer: ParticleRenderer,
    window: Arc<Window>,
}

impl SurfaceRenderer {
    pub async fn new(
        window: Arc<Window>,
        config: &ResolvedConfig,
        render_size: (u32, u32),
    ) -> Result<Self, GpuError> {
        let size = window.inner_size();
        let (ctx, surface) = GpuContext::for_window(Arc::clone(&window)).await?;

        let caps = surface.get_capabilities(&ctx.adapter);
        // Prefer an sRGB format so the encode happens on store.
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .ok_or(GpuError::IncompatibleSurface)?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            desired_maximum_frame_latency: 2,
            alpha_mode,
            view_formats: vec![],
        };
        surface.configure(&ctx.device, &surface_config);

        let renderer = ParticleRenderer::new(
            &ctx.device,
            &ctx.queue,
            config,
            config.particle_count,
            format,
            render_size,
        );

        log::info!(
            "Surface configured: {}x{} {:?}, scene {}x{}",
            surface_config.width,
            surface_config.height,
            format,
            render_size.0,
            render_size.1
        );

        Ok(Self {
            ctx,
            surface,
            surface_config,
            renderer,
            window,
        })
    }

    /// Reconfigure for a new window size and scene render size.
    pub fn resize(&mut self, width: u32, height: u32, render_size: (u32, u32)) {
        if width == 0 || height == 0 {
            return;
        }
        self.surface_config.width = width;
        self.surface_config.height = height;
        self.surface.configure(&self.ctx.device, &self.surface_config);
        self.renderer.resize(&self.ctx.device, render_size);
    }

    fn reconfigure(&self) {
        self.surface.configure(&self.ctx.device, &self.surface_config);
    }

    /// Upload dirty particle data and present one frame.
    pub fn render(&mut self, scene: &mut ParticleScene) -> Result<FrameStatus, GpuError> {
        if self.ctx.is_lost() {
            return Ok(FrameStatus::DeviceLost);
        }

        self.renderer
            .upload(&self.ctx.queue, scene.controller_mut().buffers_mut());

        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost) | Err(wgpu::SurfaceError::Outdated) => {
                log::warn!("Surface lost or outdated, reconfiguring");
                self.reconfigure();
                scene.controller_mut().mark_all_dirty();
                return Ok(FrameStatus::Skipped);
            }
            Err(wgpu::SurfaceError::OutOfMemory) => return Err(GpuError::OutOfMemory),
            Err(wgpu::SurfaceError::Timeout) => return Ok(FrameStatus::Skipped),
            Err(e) => {
                log::warn!("Skipping frame: {}", e);
                return Ok(FrameStatus::Skipped);
            }
        };

        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        self.renderer
            .render(&self.ctx.device, &self.ctx.queue, scene.camera(), &view);
        self.window.pre_present_notify();
        frame.present();
        Ok(FrameStatus::Presented)
    }

    pub fn is_lost(&self) -> bool {
        self.ctx.is_lost()
    }

    pub fn adapter_info(&self) -> wgpu::AdapterInfo {
        self.ctx.adapter_info()
    }

    /// Release GPU resources. Safe to call more than once.
    pub fn destroy(&mut self) {
        self.renderer.destroy();
    }
}

impl Drop for SurfaceRenderer {
    fn drop(&mut self) {
        self.destroy();
    }
}
