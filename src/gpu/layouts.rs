//! Bind group layouts for the particle and tone-mapping passes.

use wgpu::{BindGroupLayout, BindGroupLayoutEntry, Device, ShaderStages};

/// Builder that numbers bindings in the order entries are added.
pub struct BindGroupLayoutBuilder {
    label: &'static str,
    entries: Vec<BindGroupLayoutEntry>,
}

impl BindGroupLayoutBuilder {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            entries: Vec::new(),
        }
    }

    fn push(mut self, visibility: ShaderStages, ty: wgpu::BindingType) -> Self {
        let binding = self.entries.len() as u32;
        self.entries.push(BindGroupLayoutEntry {
            binding,
            visibility,
            ty,
            count: None,
        });
        self
    }

    /// Append a uniform buffer.
    pub fn uniform(self, visibility: ShaderStages) -> Self {
        self.push(
            visibility,
            wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
        )
    }

    /// Append a filterable float 2D texture.
    pub fn texture_2d(self, visibility: ShaderStages) -> Self {
        self.push(
            visibility,
            wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
        )
    }

    /// Append a filtering sampler.
    pub fn sampler(self, visibility: ShaderStages) -> Self {
        self.push(
            visibility,
            wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        )
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn build(self, device: &Device) -> BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(self.label),
            entries: &self.entries,
        })
    }
}

/// Camera uniforms, sprite texture, sprite sampler.
pub fn create_particle_layout(device: &Device) -> BindGroupLayout {
    particle_layout_builder().build(device)
}

/// Scene texture, scene sampler.
pub fn create_tonemap_layout(device: &Device) -> BindGroupLayout {
    tonemap_layout_builder().build(device)
}

fn particle_layout_builder() -> BindGroupLayoutBuilder {
    BindGroupLayoutBuilder::new("particle_bind_group_layout")
        .uniform(ShaderStages::VERTEX)
        .texture_2d(ShaderStages::FRAGMENT)
        .sampler(ShaderStages::FRAGMENT)
}

fn tonemap_layout_builder() -> BindGroupLayoutBuilder {
    BindGroupLayoutBuilder::new("tonemap_bind_group_layout")
        .texture_2d(ShaderStages::FRAGMENT)
        .sampler(ShaderStages::FRAGMENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::GpuContext;

    #[test]
    fn test_bindings_are_sequential() {
        let builder = particle_layout_builder();
        assert_eq!(builder.len(), 3);
        let bindings: Vec<u32> = builder.entries.iter().map(|e| e.binding).collect();
        assert_eq!(bindings, vec![0, 1, 2]);
        assert_eq!(tonemap_layout_builder().len(), 2);
    }

    #[tokio::test]
    async fn test_layout_creation() {
        let ctx = match GpuContext::new().await {
            Ok(ctx) => ctx,
            Err(_) => return, // Skip if no GPU
        };

        let _particle = create_particle_layout(&ctx.device);
        let _tonemap = create_tonemap_layout(&ctx.device);
    }
}
