//! Morph controller.
//!
//! Owns the particle buffers and moves them either toward the resting shape
//! (idle mode) or along a quadratic Bezier path from a snapshot of the live
//! positions, through a noise-displaced swarm point, to the next shape
//! (morph mode). Exactly one of the two runs per executed frame.

mod buffers;
mod easing;
mod transition;

pub use buffers::{DirtyFlags, ParticleBuffers};
pub use easing::Easing;
pub use transition::Transition;

use crate::color::fill_radial_colors;
use crate::config::{BrainConfig, ResolvedConfig};
use crate::interaction::InteractionState;
use crate::noise::SimplexNoise;
use crate::pacing::FrameTime;
use crate::shapes::{ShapeError, ShapeSet, ShapeType};
use glam::{Quat, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::PI;
use std::time::Duration;

/// Per-frame pull of idle particles toward their target.
const IDLE_LERP: f32 = 0.05;
/// Spatial frequency of the idle flow field.
const IDLE_FLOW_FREQUENCY: f32 = 0.1;
/// Effect strength shed per idle frame once the pointer is gone.
const EFFECT_DECAY: f32 = 0.05;
/// Effect strength gained per unit of repulsion force.
const EFFECT_GAIN: f32 = 0.3;
/// Swirl angles below this (radians) are skipped.
const MIN_SWIRL_ANGLE: f32 = 0.01;
/// Jitter magnitudes below this are skipped.
const MIN_JITTER: f32 = 0.01;

/// The subset of [`BrainConfig`] the controller reads every frame.
#[derive(Debug, Clone, PartialEq)]
pub struct MorphParams {
    pub shape_size: f32,
    pub swarm_distance_factor: f32,
    pub swirl_factor: f32,
    pub noise_frequency: f32,
    pub noise_time_scale: f32,
    pub noise_max_strength: f32,
    pub duration: Duration,
    pub idle_flow_strength: f32,
    pub idle_flow_speed: f32,
}

impl From<&BrainConfig> for MorphParams {
    fn from(config: &BrainConfig) -> Self {
        Self {
            shape_size: config.shape_size,
            swarm_distance_factor: config.swarm_distance_factor,
            swirl_factor: config.swirl_factor,
            noise_frequency: config.noise_frequency,
            noise_time_scale: config.noise_time_scale,
            noise_max_strength: config.noise_max_strength,
            duration: config.morph_duration(),
            idle_flow_strength: config.idle_flow_strength,
            idle_flow_speed: config.idle_flow_speed,
        }
    }
}

pub struct MorphController {
    params: MorphParams,
    shapes: ShapeSet,
    buffers: ParticleBuffers,
    current_shape: usize,
    transition: Option<Transition>,
    progress: f32,
    /// Per-particle swirl multiplier in `[0.5, 1)`, redrawn per transition.
    swirl_weights: Vec<f32>,
    axis_noise: SimplexNoise,
    flow_noise: SimplexNoise,
    rng: StdRng,
}

impl MorphController {
    /// Generate all targets and place the particles at rest on the first.
    pub fn new(config: &ResolvedConfig, shapes: &[ShapeType]) -> Result<Self, ShapeError> {
        let brain = &config.brain;
        let mut rng = match brain.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let set = ShapeSet::new(shapes, config.particle_count, brain.shape_size, &mut rng)?;
        let axis_noise = SimplexNoise::new(&mut rng);
        let flow_noise = SimplexNoise::new(&mut rng);
        let buffers = ParticleBuffers::new(
            set.target(0),
            brain.particle_size_range,
            brain.shape_size,
            &mut rng,
        );

        log::info!(
            "Morph controller ready: {} particles, {} shapes",
            set.particle_count(),
            set.len()
        );

        Ok(Self {
            params: MorphParams::from(brain),
            swirl_weights: vec![0.5; set.particle_count()],
            shapes: set,
            buffers,
            current_shape: 0,
            transition: None,
            progress: 0.0,
            axis_noise,
            flow_noise,
            rng,
        })
    }

    /// Start a transition to shape `target`.
    ///
    /// Returns `false` without touching any state when `target` is out of
    /// range, or when it is already the resting shape. A running transition
    /// is dropped and the new one starts from the live positions.
    pub fn trigger_morph(&mut self, target: usize) -> bool {
        if target >= self.shapes.len() {
            log::warn!(
                "Ignoring morph to shape {} of {}",
                target,
                self.shapes.len()
            );
            return false;
        }
        if target == self.current_shape && self.transition.is_none() {
            return false;
        }
        if let Some(old) = self.transition.take() {
            log::debug!(
                "Interrupting morph to shape {} at progress {:.2}",
                old.target(),
                old.progress()
            );
        }

        let buffers = &mut self.buffers;
        buffers.source.copy_from_slice(&buffers.current);

        let goal = self.shapes.target(target);
        let size = self.params.shape_size;
        for (i, ((swarm, source), end)) in buffers
            .swarm
            .iter_mut()
            .zip(&buffers.source)
            .zip(goal)
            .enumerate()
        {
            let f = i as f32 * 0.05;
            let direction = Vec3::new(
                self.axis_noise.noise3(f, 10.0, 10.0),
                self.axis_noise.noise3(20.0, f, 20.0),
                self.axis_noise.noise3(30.0, 30.0, f),
            )
            .normalize_or_zero();
            let reach = (source.distance(*end) * 0.1 + size * self.params.swarm_distance_factor)
                * (0.5 + self.rng.random::<f32>() * 0.8);
            *swarm = source.lerp(*end, 0.5) + direction * reach;
        }
        for weight in &mut self.swirl_weights {
            *weight = 0.5 + self.rng.random::<f32>() * 0.5;
        }

        log::debug!(
            "Morphing from shape {} to shape {}",
            self.current_shape,
            target
        );
        self.current_shape = target;
        self.progress = 0.0;
        self.transition = Some(Transition::new(
            target,
            self.params.duration,
            Easing::STANDARD,
        ));
        true
    }

    /// Run the morph or idle step for one executed frame.
    pub fn update(&mut self, frame: FrameTime, interaction: &InteractionState) {
        if self.transition.is_some() {
            self.update_morph(frame, interaction);
        } else {
            self.update_idle(frame, interaction);
        }
    }

    /// Ease toward the resting shape with a breathing flow field on top.
    pub fn update_idle(&mut self, frame: FrameTime, interaction: &InteractionState) {
        let elapsed = frame.elapsed.as_secs_f32();
        let breath = 1.0 + (elapsed * 0.5).sin() * 0.015;
        let flow_time = elapsed * self.params.idle_flow_speed;
        let flow_strength = self.params.idle_flow_strength;
        let interacting = interaction.is_interacting();

        let buffers = &mut self.buffers;
        for i in 0..buffers.current.len() {
            let anchor = buffers.source[i] * breath;
            let mut target = anchor;
            if flow_strength > 0.0 {
                target += self.flow_noise.vec4_field(
                    anchor,
                    IDLE_FLOW_FREQUENCY,
                    flow_time,
                    [0.0, 10.0, 20.0],
                ) * flow_strength;
            }

            let current = buffers.current[i];
            let mut effect = buffers.effect_strengths[i];
            if let Some(force) = interaction.repulsion(current) {
                target += force;
                effect = (effect + force.length() * EFFECT_GAIN).min(1.0);
            }
            if !interacting {
                effect = (effect - EFFECT_DECAY).max(0.0);
            }

            buffers.current[i] = current.lerp(target, IDLE_LERP);
            buffers.effect_strengths[i] = effect;
        }

        buffers.mark_dirty(DirtyFlags {
            positions: true,
            effects: true,
            colors: false,
        });
    }

    /// Advance the active transition and place particles along their paths.
    pub fn update_morph(&mut self, frame: FrameTime, interaction: &InteractionState) {
        let Some(transition) = self.transition.as_mut() else {
            return;
        };
        let t = transition.advance(frame.delta);
        let target = transition.target();
        let complete = transition.is_complete();
        self.progress = t;

        let elapsed = frame.elapsed.as_secs_f32();
        let envelope = (t * PI).sin();
        let swirl = envelope * self.params.swirl_factor * frame.delta.as_secs_f32() * 50.0;
        let jitter = envelope * self.params.noise_max_strength;
        let noise_time = elapsed * self.params.noise_time_scale;
        let axis_time = elapsed * 0.1;
        let inv = 1.0 - t;
        let (w_source, w_swarm, w_goal) = (inv * inv, 2.0 * inv * t, t * t);

        let goal = self.shapes.target(target);
        let buffers = &mut self.buffers;
        for i in 0..buffers.current.len() {
            let source = buffers.source[i];
            let mut p = source * w_source + buffers.swarm[i] * w_swarm + goal[i] * w_goal;

            let angle = swirl * self.swirl_weights[i];
            if angle > MIN_SWIRL_ANGLE {
                let f = i as f32 * 0.02;
                let axis = Vec3::new(
                    self.axis_noise.noise3(f, axis_time, 0.0),
                    self.axis_noise.noise3(0.0, f, axis_time + 5.0),
                    self.axis_noise.noise3(axis_time + 10.0, 0.0, f),
                );
                if let Some(axis) = axis.try_normalize() {
                    p = source + Quat::from_axis_angle(axis, angle) * (p - source);
                }
            }

            if jitter > MIN_JITTER {
                p += self.flow_noise.vec4_field(
                    p,
                    self.params.noise_frequency,
                    noise_time,
                    [0.0, 100.0, 200.0],
                ) * jitter;
            }

            if let Some(force) = interaction.repulsion(p) {
                p += force;
            }

            buffers.current[i] = p;
            buffers.effect_strengths[i] = envelope;
        }

        buffers.mark_dirty(DirtyFlags {
            positions: true,
            effects: true,
            colors: false,
        });

        if complete {
            self.finish_transition(target);
        }
    }

    fn finish_transition(&mut self, target: usize) {
        self.transition = None;
        self.progress = 1.0;

        let goal = self.shapes.target(target);
        let buffers = &mut self.buffers;
        buffers.current.copy_from_slice(goal);
        buffers.source.copy_from_slice(goal);
        buffers.effect_strengths.fill(0.0);
        fill_radial_colors(&mut buffers.colors, &buffers.current, self.params.shape_size);
        buffers.mark_dirty(DirtyFlags::ALL);

        log::debug!("Morph to shape {} complete", target);
    }

    /// Drop any running transition, leaving particles where they are.
    pub fn cancel_transition(&mut self) {
        if self.transition.take().is_some() {
            self.buffers
                .source
                .copy_from_slice(&self.buffers.current);
        }
    }

    /// Force a full upload, e.g. after the GPU context was rebuilt.
    pub fn mark_all_dirty(&mut self) {
        self.buffers.mark_dirty(DirtyFlags::ALL);
    }

    pub fn buffers(&self) -> &ParticleBuffers {
        &self.buffers
    }

    pub(crate) fn buffers_mut(&mut self) -> &mut ParticleBuffers {
        &mut self.buffers
    }

    pub fn shapes(&self) -> &ShapeSet {
        &self.shapes
    }

    pub fn params(&self) -> &MorphParams {
        &self.params
    }

    /// Shape the particles rest on, or are heading to while morphing.
    pub fn current_shape(&self) -> usize {
        self.current_shape
    }

    pub fn is_morphing(&self) -> bool {
        self.transition.is_some()
    }

    /// Eased progress of the latest transition. 0 before any morph.
    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn transition(&self) -> Option<&Transition> {
        self.transition.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DeviceProfile;
    use crate::interaction::InteractionParams;
    use crate::shapes::DEFAULT_SEQUENCE;

    fn controller(count: u32) -> MorphController {
        let config = BrainConfig {
            particle_count: count,
            seed: Some(7),
            ..Default::default()
        }
        .resolve(&DeviceProfile::default());
        MorphController::new(&config, &DEFAULT_SEQUENCE).unwrap()
    }

    fn idle_pointer() -> InteractionState {
        InteractionState::new(InteractionParams::from(&BrainConfig::default()))
    }

    fn frame(elapsed_ms: u64, delta_ms: u64) -> FrameTime {
        FrameTime {
            elapsed: Duration::from_millis(elapsed_ms),
            delta: Duration::from_millis(delta_ms),
        }
    }

    #[test]
    fn test_trigger_to_resting_shape_is_noop() {
        let mut c = controller(64);
        let before = c.buffers().current.clone();
        assert!(!c.trigger_morph(0));
        assert!(!c.is_morphing());
        assert_eq!(c.buffers().current, before);
        assert_eq!(c.progress(), 0.0);
    }

    #[test]
    fn test_out_of_range_trigger_ignored() {
        let mut c = controller(64);
        assert!(!c.trigger_morph(4));
        assert!(!c.is_morphing());
    }

    #[test]
    fn test_trigger_snapshots_current() {
        let mut c = controller(64);
        let pointer = idle_pointer();
        assert!(c.trigger_morph(1));
        for step in 1..=30 {
            c.update(frame(step * 16, 16), &pointer);
        }
        let live = c.buffers().current.clone();

        assert!(c.trigger_morph(2));
        assert_eq!(c.buffers().source, live);
        assert_eq!(c.progress(), 0.0);
        assert_eq!(c.transition().map(Transition::target), Some(2));
    }

    #[test]
    fn test_retrigger_same_target_while_morphing_restarts() {
        let mut c = controller(32);
        let pointer = idle_pointer();
        c.trigger_morph(1);
        c.update(frame(500, 500), &pointer);
        assert!(c.progress() > 0.0);
        assert!(c.trigger_morph(1));
        assert_eq!(c.progress(), 0.0);
    }

    #[test]
    fn test_effect_follows_envelope() {
        let mut c = controller(32);
        let pointer = idle_pointer();
        c.trigger_morph(3);
        let mut last = 0.0;
        for step in 1..=20 {
            c.update(frame(step * 100, 100), &pointer);
            if !c.is_morphing() {
                break;
            }
            let t = c.progress();
            assert!(t >= last);
            last = t;
            let expected = (t * PI).sin();
            assert!(c
                .buffers()
                .effect_strengths
                .iter()
                .all(|e| (e - expected).abs() < 1e-6));
        }
    }

    #[test]
    fn test_completion_lands_exactly_on_target() {
        let mut c = controller(128);
        let pointer = idle_pointer();
        c.trigger_morph(2);
        let mut elapsed = 0;
        while c.is_morphing() {
            elapsed += 100;
            c.update(frame(elapsed, 100), &pointer);
        }
        assert_eq!(c.progress(), 1.0);
        assert_eq!(c.current_shape(), 2);
        assert_eq!(c.buffers().current, c.shapes().target(2));
        assert_eq!(c.buffers().source, c.shapes().target(2));
        assert!(c.buffers().effect_strengths.iter().all(|&e| e == 0.0));
        assert_eq!(c.buffers_mut().take_dirty(), DirtyFlags::ALL);
    }

    #[test]
    fn test_faint_jitter_is_skipped() {
        let config = BrainConfig {
            particle_count: 48,
            seed: Some(7),
            swirl_factor: 0.0,
            noise_max_strength: 0.009,
            ..Default::default()
        }
        .resolve(&DeviceProfile::default());
        let mut c = MorphController::new(&config, &DEFAULT_SEQUENCE).unwrap();
        let pointer = idle_pointer();
        c.trigger_morph(1);
        c.update(frame(2000, 100), &pointer);
        c.update(frame(2100, 100), &pointer);

        let t = c.progress();
        let inv = 1.0 - t;
        let goal = c.shapes().target(1);
        let buffers = c.buffers();
        for i in 0..buffers.len() {
            let on_path = buffers.source[i] * inv * inv
                + buffers.swarm[i] * 2.0 * inv * t
                + goal[i] * t * t;
            assert!(buffers.current[i].distance(on_path) < 1e-5);
        }
    }

    #[test]
    fn test_idle_stays_near_shape() {
        let mut c = controller(64);
        let pointer = idle_pointer();
        for step in 1..=120 {
            c.update(frame(step * 16, 16), &pointer);
        }
        let target = c.shapes().target(0);
        for (p, t) in c.buffers().current.iter().zip(target) {
            assert!(p.distance(*t) < 1.5, "{p} drifted from {t}");
        }
    }

    #[test]
    fn test_cancel_keeps_positions() {
        let mut c = controller(32);
        let pointer = idle_pointer();
        c.trigger_morph(1);
        c.update(frame(1000, 1000), &pointer);
        let live = c.buffers().current.clone();
        c.cancel_transition();
        assert!(!c.is_morphing());
        assert_eq!(c.buffers().source, live);
    }
}
