//! Shared fixtures for scene tests.
#![allow(dead_code)]

use particle_brain::{BrainConfig, DeviceProfile, FrameOutcome, ParticleScene, ResolvedConfig};
use std::time::Duration;

/// Host tick spacing. Slightly above the desktop frame interval so every
/// tick executes.
pub const TICK: Duration = Duration::from_millis(17);

/// A small, seeded desktop configuration.
pub fn test_config() -> ResolvedConfig {
    BrainConfig {
        particle_count: 300,
        seed: Some(11),
        ..Default::default()
    }
    .resolve(&DeviceProfile::default())
}

/// Same as [`test_config`] with swirl, noise and idle flow disabled.
pub fn calm_config() -> ResolvedConfig {
    BrainConfig {
        particle_count: 300,
        seed: Some(11),
        ..Default::default()
    }
    .resolve(&DeviceProfile {
        reduced_motion: true,
        ..Default::default()
    })
}

pub fn test_scene() -> ParticleScene {
    ParticleScene::new(test_config()).expect("scene")
}

/// Drives a scene with a monotonic host clock.
pub struct Clock {
    pub now: Duration,
}

impl Clock {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
        }
    }

    pub fn tick(&mut self, scene: &mut ParticleScene) -> FrameOutcome {
        let outcome = scene.frame(self.now);
        self.now += TICK;
        outcome
    }

    /// Tick until the running transition completes. Returns executed frames.
    pub fn run_until_settled(&mut self, scene: &mut ParticleScene) -> usize {
        let mut frames = 0;
        while scene.controller().is_morphing() {
            if let FrameOutcome::Updated(_) = self.tick(scene) {
                frames += 1;
            }
            assert!(frames < 10_000, "transition never completed");
        }
        frames
    }
}

pub fn max_distance(a: &[glam::Vec3], b: &[glam::Vec3]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(p, q)| p.distance(*q))
        .fold(0.0, f32::max)
}
