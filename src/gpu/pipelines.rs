//! Render pipelines for the particle and tone-mapping passes.

use super::shader::{particle_shader, tonemap_shader, ShaderConstants};
use super::textures::DEPTH_FORMAT;
use wgpu::{
    BindGroupLayout, ColorTargetState, Device, PipelineLayout, RenderPipeline, ShaderModule,
    TextureFormat, VertexBufferLayout,
};

/// Additive blending: `src * src_alpha + dst`.
pub const ADDITIVE_BLEND: wgpu::BlendState = wgpu::BlendState {
    color: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::SrcAlpha,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
    alpha: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::SrcAlpha,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
};

/// Builder for render pipelines that use `vs_main` / `fs_main`.
pub struct RenderPipelineBuilder<'a> {
    label: &'static str,
    layout: &'a PipelineLayout,
    shader: &'a ShaderModule,
    vertex_buffers: Vec<VertexBufferLayout<'static>>,
    format: TextureFormat,
    blend: Option<wgpu::BlendState>,
    topology: wgpu::PrimitiveTopology,
    depth_stencil: Option<wgpu::DepthStencilState>,
    sample_count: u32,
}

impl<'a> RenderPipelineBuilder<'a> {
    pub fn new(label: &'static str, layout: &'a PipelineLayout, shader: &'a ShaderModule) -> Self {
        Self {
            label,
            layout,
            shader,
            vertex_buffers: Vec::new(),
            format: TextureFormat::Rgba8Unorm,
            blend: Some(wgpu::BlendState::REPLACE),
            topology: wgpu::PrimitiveTopology::TriangleList,
            depth_stencil: None,
            sample_count: 1,
        }
    }

    pub fn vertex_buffers(mut self, buffers: Vec<VertexBufferLayout<'static>>) -> Self {
        self.vertex_buffers = buffers;
        self
    }

    pub fn format(mut self, format: TextureFormat) -> Self {
        self.format = format;
        self
    }

    pub fn blend(mut self, blend: wgpu::BlendState) -> Self {
        self.blend = Some(blend);
        self
    }

    pub fn topology(mut self, topology: wgpu::PrimitiveTopology) -> Self {
        self.topology = topology;
        self
    }

    /// Test against depth without writing it.
    pub fn depth_read_only(mut self) -> Self {
        self.depth_stencil = Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: false,
            depth_compare: wgpu::CompareFunction::LessEqual,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        });
        self
    }

    pub fn sample_count(mut self, count: u32) -> Self {
        self.sample_count = count.max(1);
        self
    }

    pub fn build(self, device: &Device) -> RenderPipeline {
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(self.label),
            layout: Some(self.layout),
            vertex: wgpu::VertexState {
                module: self.shader,
                entry_point: Some("vs_main"),
                buffers: &self.vertex_buffers,
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: self.shader,
                entry_point: Some("fs_main"),
                targets: &[Some(ColorTargetState {
                    format: self.format,
                    blend: self.blend,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: self.topology,
                ..Default::default()
            },
            depth_stencil: self.depth_stencil,
            multisample: wgpu::MultisampleState {
                count: self.sample_count,
                ..Default::default()
            },
            multiview_mask: None,
            cache: None,
        })
    }
}

/// Create a pipeline layout from bind group layouts.
pub fn create_pipeline_layout(
    device: &Device,
    label: &'static str,
    layouts: &[&BindGroupLayout],
) -> PipelineLayout {
    device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(label),
        bind_group_layouts: layouts,
        immediate_size: 0,
    })
}

fn create_shader(device: &Device, label: &'static str, source: String) -> ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    })
}

/// Instanced camera-facing quads, additive, depth-tested but not written.
pub fn create_particle_pipeline(
    device: &Device,
    layout: &BindGroupLayout,
    constants: &ShaderConstants,
    format: TextureFormat,
    sample_count: u32,
    instance_layout: VertexBufferLayout<'static>,
) -> RenderPipeline {
    let shader = create_shader(device, "particle_shader", particle_shader(constants));
    let pipeline_layout = create_pipeline_layout(device, "particle_pipeline_layout", &[layout]);
    RenderPipelineBuilder::new("particle_pipeline", &pipeline_layout, &shader)
        .vertex_buffers(vec![instance_layout])
        .format(format)
        .blend(ADDITIVE_BLEND)
        .topology(wgpu::PrimitiveTopology::TriangleStrip)
        .depth_read_only()
        .sample_count(sample_count)
        .build(device)
}

/// Fullscreen triangle (3 vertices, no buffers) that tone-maps into `format`.
pub fn create_tonemap_pipeline(
    device: &Device,
    layout: &BindGroupLayout,
    constants: &ShaderConstants,
    format: TextureFormat,
) -> RenderPipeline {
    let shader = create_shader(device, "tonemap_shader", tonemap_shader(constants));
    let pipeline_layout = create_pipeline_layout(device, "tonemap_pipeline_layout", &[layout]);
    RenderPipelineBuilder::new("tonemap_pipeline", &pipeline_layout, &shader)
        .format(format)
        .build(device)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::layouts::create_tonemap_layout;
    use crate::gpu::GpuContext;

    #[tokio::test]
    async fn test_tonemap_pipeline_creation() {
        let ctx = match GpuContext::new().await {
            Ok(ctx) => ctx,
            Err(_) => return,
        };

        let layout = create_tonemap_layout(&ctx.device);
        let _pipeline = create_tonemap_pipeline(
            &ctx.device,
            &layout,
            &ShaderConstants::default(),
            TextureFormat::Rgba8Unorm,
        );
    }
}
