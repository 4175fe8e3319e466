//! Particle renderer.
//!
//! Two passes per frame: instanced sprites are drawn additively into an
//! HDR scene target sized by the capped pixel ratio, then a fullscreen
//! pass tone-maps that target into the caller's output view.

use super::layouts::{create_particle_layout, create_tonemap_layout};
use super::pipelines::{create_particle_pipeline, create_tonemap_pipeline};
use super::shader::ShaderConstants;
use super::sprite::SpriteTexture;
use super::textures::{RenderTarget, SCENE_FORMAT};
use crate::camera::PerspectiveCamera;
use crate::color::to_linear;
use crate::config::{ResolvedConfig, BACKGROUND};
use crate::morph::ParticleBuffers;
use wgpu::{
    BindGroup, BindGroupLayout, Buffer, Device, Queue, RenderPipeline, TextureFormat, TextureView,
    VertexBufferLayout,
};

/// Per-particle instance data.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ParticleInstance {
    pub position: [f32; 3],
    pub size: f32,
    pub color: [f32; 3],
    pub opacity: f32,
    pub effect: f32,
}

impl ParticleInstance {
    const ATTRIBUTES: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32,
        2 => Float32x3,
        3 => Float32,
        4 => Float32
    ];

    pub fn layout() -> VertexBufferLayout<'static> {
        VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Camera data for the particle pass.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniforms {
    pub view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
    /// Scene target size in pixels.
    pub viewport: [f32; 2],
    pub _padding: [f32; 2],
}

impl CameraUniforms {
    pub fn new(camera: &PerspectiveCamera, size: (u32, u32)) -> Self {
        Self {
            view: camera.view().to_cols_array_2d(),
            proj: camera.projection().to_cols_array_2d(),
            viewport: [size.0.max(1) as f32, size.1.max(1) as f32],
            _padding: [0.0; 2],
        }
    }
}

/// Copy the GPU-visible particle arrays into `out`.
pub fn pack_instances(buffers: &ParticleBuffers, out: &mut [ParticleInstance]) {
    for (i, instance) in out.iter_mut().enumerate().take(buffers.len()) {
        *instance = ParticleInstance {
            position: buffers.current[i].to_array(),
            size: buffers.sizes[i],
            color: buffers.colors[i],
            opacity: buffers.opacities[i],
            effect: buffers.effect_strengths[i],
        };
    }
}

/// Offscreen targets that depend on the render size.
struct SceneTargets {
    msaa: Option<RenderTarget>,
    resolve: RenderTarget,
    depth: RenderTarget,
    tonemap_bind_group: BindGroup,
    size: (u32, u32),
}

impl SceneTargets {
    fn new(
        device: &Device,
        size: (u32, u32),
        sample_count: u32,
        layout: &BindGroupLayout,
        sampler: &wgpu::Sampler,
    ) -> Self {
        let (width, height) = (size.0.max(1), size.1.max(1));
        let msaa =
            (sample_count > 1).then(|| RenderTarget::for_msaa(device, width, height, sample_count));
        let resolve = RenderTarget::for_scene(device, "scene_resolve", width, height);
        let depth = RenderTarget::for_depth(device, width, height, sample_count);

        let tonemap_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("tonemap_bind_group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(resolve.view()),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });

        Self {
            msaa,
            resolve,
            depth,
            tonemap_bind_group,
            size: (width, height),
        }
    }

    fn destroy(&self) {
        if let Some(msaa) = &self.msaa {
            msaa.destroy();
        }
        self.resolve.destroy();
        self.depth.destroy();
    }
}

pub struct ParticleRenderer {
    particle_pipeline: RenderPipeline,
    tonemap_pipeline: RenderPipeline,
    particle_bind_group: BindGroup,
    tonemap_layout: BindGroupLayout,
    scene_sampler: wgpu::Sampler,
    uniform_buffer: Buffer,
    instance_buffer: Buffer,
    instances: Vec<ParticleInstance>,
    sprite: SpriteTexture,
    targets: SceneTargets,
    sample_count: u32,
    destroyed: bool,
}

impl ParticleRenderer {
    /// Build pipelines and buffers for `particle_count` particles.
    pub fn new(
        device: &Device,
        queue: &Queue,
        config: &ResolvedConfig,
        particle_count: usize,
        output_format: TextureFormat,
        render_size: (u32, u32),
    ) -> Self {
        let constants = ShaderConstants::from(config).for_output(output_format);
        let sample_count = config.sample_count.max(1);

        let particle_layout = create_particle_layout(device);
        let tonemap_layout = create_tonemap_layout(device);
        let particle_pipeline = create_particle_pipeline(
            device,
            &particle_layout,
            &constants,
            SCENE_FORMAT,
            sample_count,
            ParticleInstance::layout(),
        );
        let tonemap_pipeline =
            create_tonemap_pipeline(device, &tonemap_layout, &constants, output_format);

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("camera_uniforms"),
            size: std::mem::size_of::<CameraUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let instances = vec![ParticleInstance::default(); particle_count];
        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("particle_instances"),
            size: (std::mem::size_of::<ParticleInstance>() * particle_count.max(1)) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let sprite = SpriteTexture::new(device, queue);
        let particle_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("particle_bind_group"),
            layout: &particle_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(sprite.view()),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(sprite.sampler()),
                },
            ],
        });

        let scene_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("scene_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });
        let targets = SceneTargets::new(
            device,
            render_size,
            sample_count,
            &tonemap_layout,
            &scene_sampler,
        );

        log::debug!(
            "Particle renderer: {} instances, {}x MSAA, scene {}x{}",
            particle_count,
            sample_count,
            targets.size.0,
            targets.size.1
        );

        Self {
            particle_pipeline,
            tonemap_pipeline,
            particle_bind_group,
            tonemap_layout,
            scene_sampler,
            uniform_buffer,
            instance_buffer,
            instances,
            sprite,
            targets,
            sample_count,
            destroyed: false,
        }
    }

    /// Recreate the offscreen targets if the render size changed.
    pub fn resize(&mut self, device: &Device, render_size: (u32, u32)) {
        let size = (render_size.0.max(1), render_size.1.max(1));
        if self.destroyed || size == self.targets.size {
            return;
        }
        self.targets.destroy();
        self.targets = SceneTargets::new(
            device,
            size,
            self.sample_count,
            &self.tonemap_layout,
            &self.scene_sampler,
        );
    }

    /// Upload particle data if anything changed. Returns whether it did.
    pub fn upload(&mut self, queue: &Queue, buffers: &mut ParticleBuffers) -> bool {
        if self.destroyed {
            return false;
        }
        if !buffers.take_dirty().any() {
            return false;
        }
        pack_instances(buffers, &mut self.instances);
        queue.write_buffer(
            &self.instance_buffer,
            0,
            bytemuck::cast_slice(&self.instances),
        );
        true
    }

    /// Record both passes into `encoder`, ending in `output`.
    pub fn encode(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        queue: &Queue,
        camera: &PerspectiveCamera,
        output: &TextureView,
    ) {
        if self.destroyed {
            return;
        }
        let uniforms = CameraUniforms::new(camera, self.targets.size);
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        let background = to_linear(BACKGROUND);
        let (color_view, resolve_target) = match &self.targets.msaa {
            Some(msaa) => (msaa.view(), Some(self.targets.resolve.view())),
            None => (self.targets.resolve.view(), None),
        };

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("particle_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: color_view,
                    resolve_target,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: background.x as f64,
                            g: background.y as f64,
                            b: background.z as f64,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: self.targets.depth.view(),
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Discard,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            pass.set_pipeline(&self.particle_pipeline);
            pass.set_bind_group(0, &self.particle_bind_group, &[]);
            pass.set_vertex_buffer(0, self.instance_buffer.slice(..));
            pass.draw(0..4, 0..self.instances.len() as u32);
        }

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("tonemap_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: output,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            pass.set_pipeline(&self.tonemap_pipeline);
            pass.set_bind_group(0, &self.targets.tonemap_bind_group, &[]);
            pass.draw(0..3, 0..1);
        }
    }

    /// Encode and submit one frame into `output`.
    pub fn render(
        &self,
        device: &Device,
        queue: &Queue,
        camera: &PerspectiveCamera,
        output: &TextureView,
    ) {
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("particle_encoder"),
        });
        self.encode(&mut encoder, queue, camera, output);
        queue.submit(std::iter::once(encoder.finish()));
    }

    pub fn render_size(&self) -> (u32, u32) {
        self.targets.size
    }

    pub fn particle_count(&self) -> usize {
        self.instances.len()
    }

    /// Release GPU memory. Further calls do nothing.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        self.instance_buffer.destroy();
        self.uniform_buffer.destroy();
        self.sprite.destroy();
        self.targets.destroy();
        log::debug!("Particle renderer released");
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}
