//! Crate-level error type.

use crate::config::ConfigError;
use crate::gpu::GpuError;
use crate::shapes::ShapeError;

/// Errors that can occur while setting up or running the visualisation.
#[derive(Debug, thiserror::Error)]
pub enum BrainError {
    #[error("Shape error: {0}")]
    Shape(#[from] ShapeError),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("GPU error: {0}")]
    Gpu(#[from] GpuError),
    #[error("Window error: {0}")]
    Window(#[from] winit::error::OsError),
    #[error("Event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
}
