//! GPU rendering using wgpu.
//!
//! Particles are drawn as instanced point sprites into an HDR target and
//! tone-mapped to either a window surface or an offscreen texture.

pub mod context;
pub mod layouts;
pub mod pipelines;
pub mod renderer;
pub mod shader;
pub mod snapshot;
pub mod sprite;
pub mod surface;
pub mod textures;

pub use context::{GpuContext, GpuError};
pub use renderer::{CameraUniforms, ParticleInstance, ParticleRenderer};
pub use shader::ShaderConstants;
pub use snapshot::SnapshotRenderer;
pub use surface::{FrameStatus, SurfaceRenderer};
