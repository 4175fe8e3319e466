//! The particle scene: one owner for simulation state, camera and pacing.
//!
//! Hosts drive it with [`ParticleScene::frame`] on every tick and feed it
//! pointer, viewport and visibility signals. Shape changes come in through
//! a [`MorphHandle`], which holds only a weak reference and so goes inert
//! once the scene is torn down or dropped.

use crate::camera::PerspectiveCamera;
use crate::config::ResolvedConfig;
use crate::error::BrainError;
use crate::interaction::{InteractionParams, InteractionState, TouchPhase};
use crate::morph::MorphController;
use crate::pacing::{FrameDecision, FramePacer, FrameTime};
use crate::shapes::{ShapeType, DEFAULT_SEQUENCE};
use glam::Vec2;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

pub type SharedScene = Rc<RefCell<ParticleScene>>;

/// Window size and effective pixel ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Physical width in pixels.
    pub width: u32,
    /// Physical height in pixels.
    pub height: u32,
    /// Host scale factor (device pixels per logical pixel).
    pub scale_factor: f64,
    /// Scale factor after the device cap.
    pub pixel_ratio: f64,
}

impl Viewport {
    pub fn new(width: u32, height: u32, scale_factor: f64, dpr_cap: f64) -> Self {
        let scale_factor = if scale_factor > 0.0 { scale_factor } else { 1.0 };
        Self {
            width,
            height,
            scale_factor,
            pixel_ratio: scale_factor.min(dpr_cap),
        }
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    /// Size of the offscreen scene target once the pixel-ratio cap applies.
    pub fn render_size(&self) -> (u32, u32) {
        let scale = self.pixel_ratio / self.scale_factor;
        let w = (self.width as f64 * scale).round().max(1.0) as u32;
        let h = (self.height as f64 * scale).round().max(1.0) as u32;
        (w, h)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280, 720, 1.0, 1.0)
    }
}

/// What a call to [`ParticleScene::frame`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// The scene was torn down.
    Inactive,
    /// Hidden, overridden off, or waiting for the GPU to come back.
    Paused,
    Throttled,
    /// One simulation step ran; the buffers need drawing.
    Updated(FrameTime),
}

pub struct ParticleScene {
    config: ResolvedConfig,
    controller: MorphController,
    interaction: InteractionState,
    camera: PerspectiveCamera,
    pacer: FramePacer,
    viewport: Viewport,
    host_visible: bool,
    visible_override: bool,
    suspended: bool,
    torn_down: bool,
}

impl ParticleScene {
    /// Build a scene over the default shape sequence.
    pub fn new(config: ResolvedConfig) -> Result<Self, BrainError> {
        Self::with_shapes(config, &DEFAULT_SEQUENCE)
    }

    pub fn with_shapes(config: ResolvedConfig, shapes: &[ShapeType]) -> Result<Self, BrainError> {
        let controller = MorphController::new(&config, shapes)?;
        let interaction = InteractionState::new(InteractionParams::from(&config.brain));
        let pacer = FramePacer::new(config.frame_interval);
        let viewport = Viewport::new(1280, 720, 1.0, config.dpr_cap);
        let mut camera = PerspectiveCamera::default();
        camera.set_aspect(viewport.width as f32, viewport.height as f32);

        log::info!(
            "Scene initialised: {} particles, {:?} device, frame interval {:.1} ms",
            config.particle_count,
            config.device.class(),
            config.frame_interval.as_secs_f64() * 1000.0
        );

        Ok(Self {
            config,
            controller,
            interaction,
            camera,
            pacer,
            viewport,
            host_visible: true,
            visible_override: true,
            suspended: false,
            torn_down: false,
        })
    }

    pub fn into_shared(self) -> SharedScene {
        Rc::new(RefCell::new(self))
    }

    /// A control handle that does not keep the scene alive.
    pub fn handle(this: &SharedScene) -> MorphHandle {
        MorphHandle {
            scene: Rc::downgrade(this),
        }
    }

    /// Run one host tick at monotonic time `now`.
    ///
    /// Interaction is sampled first, then exactly one morph or idle step.
    pub fn frame(&mut self, now: Duration) -> FrameOutcome {
        if self.torn_down {
            return FrameOutcome::Inactive;
        }
        match self.pacer.tick(now, self.is_visible()) {
            FrameDecision::Paused => FrameOutcome::Paused,
            FrameDecision::Throttled => FrameOutcome::Throttled,
            FrameDecision::Run(time) => {
                self.interaction.step();
                self.controller.update(time, &self.interaction);
                FrameOutcome::Updated(time)
            }
        }
    }

    /// Start a morph to `index`, wrapped into range. Ignored after teardown.
    pub fn morph_to_shape(&mut self, index: i64) -> bool {
        if self.torn_down {
            return false;
        }
        let target = self.controller.shapes().wrap_index(index);
        self.controller.trigger_morph(target)
    }

    pub fn pointer_moved(&mut self, px: Vec2) {
        let world = self.pointer_to_world(px);
        self.interaction.pointer_moved(world);
    }

    pub fn pointer_left(&mut self) {
        self.interaction.pointer_left();
    }

    pub fn touch(&mut self, phase: TouchPhase, px: Option<Vec2>) {
        let world = px.map(|px| self.pointer_to_world(px));
        self.interaction.touch(phase, world);
    }

    fn pointer_to_world(&self, px: Vec2) -> glam::Vec3 {
        self.camera
            .project_pointer(px, self.viewport.size(), self.config.brain.pointer_depth)
    }

    /// Apply a new window size. Returns the capped render size.
    pub fn resize(&mut self, width: u32, height: u32, scale_factor: f64) -> (u32, u32) {
        self.viewport = Viewport::new(width, height, scale_factor, self.config.dpr_cap);
        self.camera.set_aspect(width as f32, height as f32);
        let render = self.viewport.render_size();
        log::debug!(
            "Resized to {}x{} (render {}x{}, pixel ratio {:.2})",
            width,
            height,
            render.0,
            render.1,
            self.viewport.pixel_ratio
        );
        render
    }

    /// Apply a visibility change, restarting frame timing on resume.
    fn update_visibility(&mut self, apply: impl FnOnce(&mut Self)) {
        let was_visible = self.is_visible();
        apply(self);
        if !was_visible && self.is_visible() {
            self.pacer.resume();
        }
    }

    /// Whether the host currently shows the scene.
    pub fn set_host_visible(&mut self, visible: bool) {
        self.update_visibility(|scene| scene.host_visible = visible);
    }

    /// Explicit on/off switch layered on top of host visibility.
    pub fn set_visible_override(&mut self, visible: bool) {
        self.update_visibility(|scene| scene.visible_override = visible);
    }

    /// Stop stepping while the GPU context is unavailable.
    pub fn set_suspended(&mut self, suspended: bool) {
        if suspended != self.suspended {
            log::debug!("Scene {}", if suspended { "suspended" } else { "resumed" });
        }
        self.update_visibility(|scene| scene.suspended = suspended);
        if !suspended {
            self.controller.mark_all_dirty();
        }
    }

    pub fn is_visible(&self) -> bool {
        self.host_visible && self.visible_override && !self.suspended
    }

    pub fn visible_override(&self) -> bool {
        self.visible_override
    }

    /// Stop the scene for good. Safe to call more than once.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.controller.cancel_transition();
        self.interaction.reset();
        log::info!("Scene torn down");
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Earliest time the next frame may run.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.pacer.next_deadline()
    }

    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    pub fn controller(&self) -> &MorphController {
        &self.controller
    }

    pub(crate) fn controller_mut(&mut self) -> &mut MorphController {
        &mut self.controller
    }

    /// Force a full upload on the next draw.
    pub fn mark_all_dirty(&mut self) {
        self.controller.mark_all_dirty();
    }

    pub fn interaction(&self) -> &InteractionState {
        &self.interaction
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }
}

/// The one external control surface of a running scene.
///
/// Cloning is cheap. Calls made before a scene exists, after teardown or
/// while the scene is mid-frame are dropped.
#[derive(Debug, Clone, Default)]
pub struct MorphHandle {
    scene: Weak<RefCell<ParticleScene>>,
}

impl MorphHandle {
    /// Morph to shape `index`, wrapped modulo the number of shapes.
    pub fn morph_to_shape(&self, index: i64) {
        let Some(scene) = self.scene.upgrade() else {
            log::trace!("Morph request {} with no scene", index);
            return;
        };
        let Ok(mut scene) = scene.try_borrow_mut() else {
            log::debug!("Scene busy, dropping morph request {}", index);
            return;
        };
        scene.morph_to_shape(index);
    }

    pub fn is_attached(&self) -> bool {
        self.scene
            .upgrade()
            .is_some_and(|scene| scene.try_borrow().is_ok_and(|s| !s.is_torn_down()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BrainConfig, DeviceProfile};

    fn scene() -> ParticleScene {
        let config = BrainConfig {
            particle_count: 64,
            seed: Some(3),
            ..Default::default()
        }
        .resolve(&DeviceProfile::default());
        ParticleScene::new(config).unwrap()
    }

    #[test]
    fn test_handle_wraps_index() {
        let shared = scene().into_shared();
        let handle = ParticleScene::handle(&shared);
        handle.morph_to_shape(-1);
        assert_eq!(shared.borrow().controller().current_shape(), 3);
        handle.morph_to_shape(6);
        assert_eq!(shared.borrow().controller().current_shape(), 2);
    }

    #[test]
    fn test_detached_handle_is_inert() {
        let handle = MorphHandle::default();
        assert!(!handle.is_attached());
        handle.morph_to_shape(2);

        let shared = scene().into_shared();
        let handle = ParticleScene::handle(&shared);
        assert!(handle.is_attached());
        drop(shared);
        assert!(!handle.is_attached());
        handle.morph_to_shape(1);
    }

    #[test]
    fn test_teardown_is_idempotent_and_blocks_morphs() {
        let shared = scene().into_shared();
        let handle = ParticleScene::handle(&shared);
        handle.morph_to_shape(1);
        assert!(shared.borrow().controller().is_morphing());

        shared.borrow_mut().teardown();
        shared.borrow_mut().teardown();
        assert!(!shared.borrow().controller().is_morphing());
        assert!(!handle.is_attached());

        handle.morph_to_shape(2);
        assert!(!shared.borrow().controller().is_morphing());
        assert_eq!(
            shared.borrow_mut().frame(Duration::from_secs(1)),
            FrameOutcome::Inactive
        );
    }

    #[test]
    fn test_hidden_scene_pauses() {
        let mut s = scene();
        s.set_visible_override(false);
        assert_eq!(s.frame(Duration::ZERO), FrameOutcome::Paused);
        s.set_visible_override(true);
        s.set_host_visible(false);
        assert_eq!(s.frame(Duration::from_millis(20)), FrameOutcome::Paused);
        s.set_host_visible(true);
        assert!(matches!(
            s.frame(Duration::from_millis(40)),
            FrameOutcome::Updated(_)
        ));
    }

    #[test]
    fn test_resize_caps_pixel_ratio() {
        let mut s = scene();
        let render = s.resize(2000, 1000, 2.0);
        assert_eq!(render, (1500, 750));
        assert_eq!(s.camera().aspect, 2.0);
        assert_eq!(s.resize(800, 600, 1.0), (800, 600));
    }
}
