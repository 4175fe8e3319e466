//! Native window host.
//!
//! Maps window events onto scene signals: occlusion and minimising drive
//! host visibility, the cursor and touches drive repulsion, the mouse wheel
//! scrolls a virtual page whose sections pick the shape, and the keyboard
//! offers direct control. Other threads can steer the scene through an
//! [`EventLoopProxy`] carrying [`HostEvent`]s.

use crate::config::ResolvedConfig;
use crate::error::BrainError;
use crate::gpu::{FrameStatus, SurfaceRenderer};
use crate::scene::{FrameOutcome, MorphHandle, ParticleScene, SharedScene};
use crate::scroll::{page_progress, SectionTracker};
use glam::Vec2;
use std::sync::Arc;
use std::time::{Duration, Instant};
use winit::application::ApplicationHandler;
use winit::event::{ElementState, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop, EventLoopProxy};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowId};

/// Page scroll, in viewports, per wheel line.
const SCROLL_PER_LINE: f32 = 0.25;
/// Page scroll, in viewports, per wheel pixel.
const SCROLL_PER_PIXEL: f32 = 0.002;

/// Signals a host can send from outside the event loop.
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    MorphTo(i64),
    SetVisible(bool),
    /// Scroll progress of each page section.
    ScrollProgress(Vec<f32>),
}

#[derive(Debug, Clone)]
pub struct ViewerOptions {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Cycle to the next shape at this interval.
    pub autoplay: Option<Duration>,
}

impl Default for ViewerOptions {
    fn default() -> Self {
        Self {
            title: "Particle Brain".to_string(),
            width: 1280,
            height: 720,
            autoplay: None,
        }
    }
}

/// Keyboard actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    MorphTo(i64),
    Step(i64),
    ToggleVisible,
    Exit,
}

/// Digits 1-9 pick a shape, arrows step, `V` toggles, `Esc` exits.
pub fn key_command(key: &Key) -> Option<KeyCommand> {
    match key {
        Key::Named(NamedKey::ArrowRight) | Key::Named(NamedKey::ArrowDown) => {
            Some(KeyCommand::Step(1))
        }
        Key::Named(NamedKey::ArrowLeft) | Key::Named(NamedKey::ArrowUp) => {
            Some(KeyCommand::Step(-1))
        }
        Key::Named(NamedKey::Escape) => Some(KeyCommand::Exit),
        Key::Character(text) => match text.as_str() {
            "v" | "V" => Some(KeyCommand::ToggleVisible),
            digit => digit
                .parse::<i64>()
                .ok()
                .filter(|d| (1..=9).contains(d))
                .map(|d| KeyCommand::MorphTo(d - 1)),
        },
        _ => None,
    }
}

struct ViewerApp {
    config: ResolvedConfig,
    options: ViewerOptions,
    scene: SharedScene,
    handle: MorphHandle,
    tracker: SectionTracker,
    scroll: f32,
    progress: Vec<f32>,
    window: Option<Arc<Window>>,
    renderer: Option<SurfaceRenderer>,
    started: Instant,
    occluded: bool,
    error: Option<BrainError>,
}

impl ViewerApp {
    fn new(config: ResolvedConfig, options: ViewerOptions) -> Result<Self, BrainError> {
        let scene = ParticleScene::new(config.clone())?.into_shared();
        let handle = ParticleScene::handle(&scene);
        Ok(Self {
            config,
            options,
            scene,
            handle,
            tracker: SectionTracker::new(),
            scroll: 0.0,
            progress: Vec::new(),
            window: None,
            renderer: None,
            started: Instant::now(),
            occluded: false,
            error: None,
        })
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: BrainError) {
        log::error!("{}", error);
        self.error = Some(error);
        self.shutdown();
        event_loop.exit();
    }

    fn create_renderer(&mut self, window: Arc<Window>) -> Result<SurfaceRenderer, BrainError> {
        let size = window.inner_size();
        let render_size =
            self.scene
                .borrow_mut()
                .resize(size.width, size.height, window.scale_factor());
        let renderer =
            pollster::block_on(SurfaceRenderer::new(window, &self.config, render_size))?;
        Ok(renderer)
    }

    fn section_count(&self) -> usize {
        self.scene.borrow().controller().shapes().len()
    }

    fn scroll_by(&mut self, amount: f32) {
        let max = self.section_count().saturating_sub(1) as f32;
        self.scroll = (self.scroll + amount).clamp(0.0, max);
        page_progress(self.scroll, self.section_count(), &mut self.progress);
        if let Some(section) = self.tracker.update(&self.progress) {
            self.handle.morph_to_shape(section as i64);
        }
    }

    fn apply_host_visibility(&mut self) {
        let size_visible = match &self.window {
            Some(w) => {
                let size = w.inner_size();
                size.width > 0 && size.height > 0 && w.is_minimized() != Some(true)
            }
            None => true,
        };
        self.scene
            .borrow_mut()
            .set_host_visible(!self.occluded && size_visible);
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, command: KeyCommand) {
        match command {
            KeyCommand::MorphTo(index) => self.handle.morph_to_shape(index),
            KeyCommand::Step(step) => {
                let current = self.scene.borrow().controller().current_shape() as i64;
                self.handle.morph_to_shape(current + step);
            }
            KeyCommand::ToggleVisible => {
                let mut scene = self.scene.borrow_mut();
                let next = !scene.visible_override();
                scene.set_visible_override(next);
                log::info!("Animation {}", if next { "resumed" } else { "paused" });
            }
            KeyCommand::Exit => {
                self.shutdown();
                event_loop.exit();
            }
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let now = self.started.elapsed();
        let status = {
            let mut scene = self.scene.borrow_mut();
            match scene.frame(now) {
                FrameOutcome::Updated(_) => match self.renderer.as_mut() {
                    Some(renderer) => renderer.render(&mut scene),
                    None => Ok(FrameStatus::Skipped),
                },
                _ => Ok(FrameStatus::Skipped),
            }
        };

        match status {
            Ok(FrameStatus::DeviceLost) => self.recover_device(event_loop),
            Ok(_) => {}
            Err(e) => self.fail(event_loop, e.into()),
        }
    }

    /// Rebuild the GPU side after device loss. Particle state lives on the
    /// CPU and is uploaded again in full.
    fn recover_device(&mut self, event_loop: &ActiveEventLoop) {
        log::warn!("Rebuilding renderer after device loss");
        self.scene.borrow_mut().set_suspended(true);
        if let Some(mut renderer) = self.renderer.take() {
            renderer.destroy();
        }
        let Some(window) = self.window.clone() else {
            return;
        };
        match self.create_renderer(window) {
            Ok(renderer) => {
                self.renderer = Some(renderer);
                self.scene.borrow_mut().set_suspended(false);
            }
            Err(e) => self.fail(event_loop, e),
        }
    }

    /// Stop animating and release the GPU. Safe to call more than once.
    fn shutdown(&mut self) {
        self.scene.borrow_mut().teardown();
        if let Some(mut renderer) = self.renderer.take() {
            renderer.destroy();
        }
    }
}

impl ApplicationHandler<HostEvent> for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = Window::default_attributes()
            .with_title(self.options.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.options.width,
                self.options.height,
            ));
        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => return self.fail(event_loop, e.into()),
        };
        self.window = Some(Arc::clone(&window));

        match self.create_renderer(Arc::clone(&window)) {
            Ok(renderer) => self.renderer = Some(renderer),
            Err(e) => return self.fail(event_loop, e),
        }

        if let Some(section) = self.tracker.initial() {
            self.handle.morph_to_shape(section as i64);
        }
        window.request_redraw();
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                self.shutdown();
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                let scale_factor = self.window.as_ref().map_or(1.0, |w| w.scale_factor());
                let render_size =
                    self.scene
                        .borrow_mut()
                        .resize(size.width, size.height, scale_factor);
                if let Some(renderer) = self.renderer.as_mut() {
                    renderer.resize(size.width, size.height, render_size);
                }
                self.apply_host_visibility();
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                if let Some(window) = &self.window {
                    let size = window.inner_size();
                    let render_size =
                        self.scene
                            .borrow_mut()
                            .resize(size.width, size.height, scale_factor);
                    if let Some(renderer) = self.renderer.as_mut() {
                        renderer.resize(size.width, size.height, render_size);
                    }
                }
            }
            WindowEvent::Occluded(occluded) => {
                self.occluded = occluded;
                self.apply_host_visibility();
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.scene
                    .borrow_mut()
                    .pointer_moved(Vec2::new(position.x as f32, position.y as f32));
            }
            WindowEvent::CursorLeft { .. } => {
                self.scene.borrow_mut().pointer_left();
            }
            WindowEvent::Touch(touch) => {
                let px = Vec2::new(touch.location.x as f32, touch.location.y as f32);
                self.scene
                    .borrow_mut()
                    .touch(touch.phase.into(), Some(px));
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let amount = match delta {
                    MouseScrollDelta::LineDelta(_, y) => -y * SCROLL_PER_LINE,
                    MouseScrollDelta::PixelDelta(pos) => -(pos.y as f32) * SCROLL_PER_PIXEL,
                };
                self.scroll_by(amount);
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed && !event.repeat {
                    if let Some(command) = key_command(&event.logical_key) {
                        self.handle_key(event_loop, command);
                    }
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: HostEvent) {
        match event {
            HostEvent::MorphTo(index) => self.handle.morph_to_shape(index),
            HostEvent::SetVisible(visible) => {
                self.scene.borrow_mut().set_visible_override(visible);
            }
            HostEvent::ScrollProgress(progress) => {
                if let Some(section) = self.tracker.update(&progress) {
                    self.handle.morph_to_shape(section as i64);
                }
            }
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let Some(window) = &self.window else {
            return;
        };
        let scene = self.scene.borrow();
        if scene.is_torn_down() || !scene.is_visible() {
            event_loop.set_control_flow(ControlFlow::Wait);
            return;
        }

        let now = self.started.elapsed();
        match scene.next_deadline() {
            Some(deadline) if deadline > now => {
                event_loop.set_control_flow(ControlFlow::WaitUntil(self.started + deadline));
            }
            _ => {
                window.request_redraw();
                event_loop.set_control_flow(ControlFlow::Wait);
            }
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.shutdown();
    }
}

/// Send the next shape index to the viewer every `interval` until it closes.
fn spawn_autoplay(proxy: EventLoopProxy<HostEvent>, interval: Duration) {
    std::thread::spawn(move || {
        let mut next = 1i64;
        loop {
            std::thread::sleep(interval);
            if proxy.send_event(HostEvent::MorphTo(next)).is_err() {
                break;
            }
            next += 1;
        }
    });
}

/// Open a window and run the visualisation until it is closed.
pub fn run(config: ResolvedConfig, options: ViewerOptions) -> Result<(), BrainError> {
    let event_loop = EventLoop::<HostEvent>::with_user_event().build()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    if let Some(interval) = options.autoplay {
        spawn_autoplay(event_loop.create_proxy(), interval);
    }

    let mut app = ViewerApp::new(config, options)?;
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(error) => Err(error),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digit_keys_pick_shapes() {
        assert_eq!(
            key_command(&Key::Character("1".into())),
            Some(KeyCommand::MorphTo(0))
        );
        assert_eq!(
            key_command(&Key::Character("4".into())),
            Some(KeyCommand::MorphTo(3))
        );
        assert_eq!(key_command(&Key::Character("0".into())), None);
        assert_eq!(key_command(&Key::Character("x".into())), None);
    }

    #[test]
    fn test_named_keys() {
        assert_eq!(
            key_command(&Key::Named(NamedKey::ArrowRight)),
            Some(KeyCommand::Step(1))
        );
        assert_eq!(
            key_command(&Key::Named(NamedKey::ArrowLeft)),
            Some(KeyCommand::Step(-1))
        );
        assert_eq!(
            key_command(&Key::Character("V".into())),
            Some(KeyCommand::ToggleVisible)
        );
        assert_eq!(
            key_command(&Key::Named(NamedKey::Escape)),
            Some(KeyCommand::Exit)
        );
    }
}
