//! Pointer-driven repulsion.
//!
//! The pointer is tracked as a world-space point. A smoothed engagement
//! value rises while the pointer is over the scene and falls once it
//! leaves, so the repulsion field fades in and out instead of popping.

use crate::config::BrainConfig;
use glam::Vec3;

/// Engagement below this produces no repulsion.
pub const ACTIVE_THRESHOLD: f32 = 0.01;

/// Particles closer than this to the pointer are left alone.
const MIN_DISTANCE: f32 = 0.01;

/// Touch lifecycle, mirrored from the windowing layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchPhase {
    Started,
    Moved,
    Ended,
    Cancelled,
}

impl From<winit::event::TouchPhase> for TouchPhase {
    fn from(phase: winit::event::TouchPhase) -> Self {
        match phase {
            winit::event::TouchPhase::Started => Self::Started,
            winit::event::TouchPhase::Moved => Self::Moved,
            winit::event::TouchPhase::Ended => Self::Ended,
            winit::event::TouchPhase::Cancelled => Self::Cancelled,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionParams {
    pub radius: f32,
    pub strength: f32,
    /// Engagement gained per step while interacting.
    pub rise: f32,
    /// Engagement lost per step otherwise.
    pub fall: f32,
}

impl From<&BrainConfig> for InteractionParams {
    fn from(config: &BrainConfig) -> Self {
        Self {
            radius: config.interaction_radius,
            strength: config.interaction_strength,
            rise: config.interaction_smoothness,
            fall: config.interaction_fade_speed,
        }
    }
}

/// World-space pointer plus smoothed engagement in `[0, 1]`.
#[derive(Debug, Clone)]
pub struct InteractionState {
    params: InteractionParams,
    pointer: Vec3,
    interacting: bool,
    strength: f32,
}

impl InteractionState {
    pub fn new(params: InteractionParams) -> Self {
        Self {
            params,
            pointer: Vec3::ZERO,
            interacting: false,
            strength: 0.0,
        }
    }

    pub fn pointer_moved(&mut self, world: Vec3) {
        self.pointer = world;
        self.interacting = true;
    }

    pub fn pointer_left(&mut self) {
        self.interacting = false;
    }

    /// Apply a touch event. `world` is `None` when the touch carries no
    /// usable position.
    pub fn touch(&mut self, phase: TouchPhase, world: Option<Vec3>) {
        match phase {
            TouchPhase::Started | TouchPhase::Moved => {
                if let Some(world) = world {
                    self.pointer_moved(world);
                }
            }
            TouchPhase::Ended | TouchPhase::Cancelled => self.pointer_left(),
        }
    }

    /// Advance the engagement ramp by one frame.
    pub fn step(&mut self) {
        let delta = if self.interacting {
            self.params.rise
        } else {
            -self.params.fall
        };
        self.strength = (self.strength + delta).clamp(0.0, 1.0);
    }

    /// Drop all pointer state.
    pub fn reset(&mut self) {
        self.interacting = false;
        self.strength = 0.0;
    }

    pub fn pointer(&self) -> Vec3 {
        self.pointer
    }

    pub fn is_interacting(&self) -> bool {
        self.interacting
    }

    pub fn strength(&self) -> f32 {
        self.strength
    }

    pub fn is_active(&self) -> bool {
        self.strength > ACTIVE_THRESHOLD
    }

    pub fn params(&self) -> &InteractionParams {
        &self.params
    }

    /// Push-away vector for a particle at `position`, if it is in range.
    ///
    /// Magnitude is `(1 - d / radius) * strength * engagement`.
    #[inline]
    pub fn repulsion(&self, position: Vec3) -> Option<Vec3> {
        if !self.is_active() {
            return None;
        }
        let offset = position - self.pointer;
        let distance = offset.length();
        if distance <= MIN_DISTANCE || distance >= self.params.radius {
            return None;
        }
        let force = (1.0 - distance / self.params.radius) * self.params.strength * self.strength;
        Some(offset / distance * force)
    }
}
