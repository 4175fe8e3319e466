//! Particle Brain Core
//!
//! GPU particle-morphing visualisation. A few thousand glowing points hold
//! a procedural shape, swarm through a noisy swirl into the next one and
//! scatter away from the pointer.
//!
//! # Features
//!
//! - Procedural target shapes (sphere, galaxy, wave, cube)
//! - Eased morph transitions with swarm waypoints, swirl and simplex noise
//! - Idle flow and pointer/touch repulsion
//! - Device-aware particle budget, frame pacing and visibility gating
//! - Instanced HDR rendering via wgpu with additive blending and ACES tone mapping
//! - Native window host via winit, plus headless PNG snapshots

pub mod camera;
pub mod color;
pub mod config;
pub mod error;
pub mod gpu;
pub mod host;
pub mod interaction;
pub mod morph;
pub mod noise;
pub mod pacing;
pub mod scene;
pub mod scroll;
pub mod shapes;

// Re-export commonly used types
pub use camera::PerspectiveCamera;
pub use config::{BrainConfig, ConfigError, DeviceClass, DeviceProfile, ResolvedConfig};
pub use error::BrainError;
pub use gpu::{GpuContext, GpuError, ParticleRenderer, SnapshotRenderer, SurfaceRenderer};
pub use host::{run, HostEvent, ViewerOptions};
pub use interaction::{InteractionState, TouchPhase};
pub use morph::{MorphController, MorphParams};
pub use pacing::{FrameDecision, FramePacer, FrameTime};
pub use scene::{FrameOutcome, MorphHandle, ParticleScene, SharedScene, Viewport};
pub use scroll::SectionTracker;
pub use shapes::{create_shape, ShapeError, ShapeSet, ShapeType, DEFAULT_SEQUENCE};
