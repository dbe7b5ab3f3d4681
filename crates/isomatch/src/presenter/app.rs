use std::sync::Arc;

use isomatch_render::{RenderEngine, RenderError, RenderResult, SceneResources};
use pollster::FutureExt;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, MouseScrollDelta, WindowEvent},
    event_loop::ActiveEventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use super::interaction::{self, DragMode, MouseState};
use super::DualViewportPresenter;
use crate::error::{AppError, Result};

/// Pixels of trackpad scrolling per wheel notch.
const PIXELS_PER_NOTCH: f32 = 50.0;

/// What the loop does after trying to draw a frame.
#[derive(Debug)]
enum FrameOutcome {
    Presented,
    /// Reconfigure the surface, then draw again.
    Reconfigure(RenderError),
    /// Drop this frame and draw again.
    Retry(RenderError),
    Fatal(RenderError),
}

impl FrameOutcome {
    /// Whether another frame must be requested so the window does not go stale.
    fn needs_redraw(&self) -> bool {
        matches!(self, FrameOutcome::Reconfigure(_) | FrameOutcome::Retry(_))
    }
}

impl From<RenderResult<()>> for FrameOutcome {
    fn from(result: RenderResult<()>) -> Self {
        match result {
            Ok(()) => FrameOutcome::Presented,
            Err(err) if err.needs_reconfigure() => FrameOutcome::Reconfigure(err),
            Err(err @ RenderError::OutOfMemory) => FrameOutcome::Fatal(err),
            Err(err) => FrameOutcome::Retry(err),
        }
    }
}

/// Window, GPU state and mouse tracking around a presenter.
pub(super) struct PresenterApp {
    presenter: DualViewportPresenter,
    window: Option<Arc<Window>>,
    engine: Option<RenderEngine>,
    resources: Vec<SceneResources>,
    close_requested: bool,
    error: Option<AppError>,
    mouse: MouseState,
}

impl PresenterApp {
    pub(super) fn new(presenter: DualViewportPresenter) -> Self {
        Self {
            presenter,
            window: None,
            engine: None,
            resources: Vec::new(),
            close_requested: false,
            error: None,
            mouse: MouseState::default(),
        }
    }

    /// Returns the error that ended the loop, if any.
    pub(super) fn finish(mut self) -> Result<()> {
        self.error.take().map_or(Ok(()), Err)
    }

    fn fail(&mut self, err: AppError) {
        log::error!("{err}");
        self.error = Some(err);
        self.close_requested = true;
    }

    fn init_graphics(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let [width, height] = self.presenter.options().window_size;
        let window_attributes = Window::default_attributes()
            .with_title(self.presenter.options().title.clone())
            .with_inner_size(PhysicalSize::new(width, height));
        let window = Arc::new(event_loop.create_window(window_attributes)?);

        let mut engine = RenderEngine::new_windowed(window.clone()).block_on()?;
        engine.background = self.presenter.options().background;
        self.resources = self
            .presenter
            .scenes()
            .iter()
            .map(|scene| engine.prepare_scene(scene))
            .collect();
        log::info!("window created ({}x{})", engine.width, engine.height);

        window.request_redraw();
        self.window = Some(window);
        self.engine = Some(engine);
        Ok(())
    }

    fn request_redraw(&self) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn render(&mut self) {
        let Some(engine) = &mut self.engine else {
            return;
        };
        let [left, right] = self.presenter.scenes();
        let (Some(left_gpu), Some(right_gpu)) = (self.resources.first(), self.resources.get(1))
        else {
            return;
        };
        let outcome = FrameOutcome::from(engine.render(&[(left, left_gpu), (right, right_gpu)]));
        let redraw = outcome.needs_redraw();
        match outcome {
            FrameOutcome::Presented => {}
            FrameOutcome::Reconfigure(err) => {
                log::warn!("{err}, reconfiguring surface");
                engine.reconfigure();
            }
            FrameOutcome::Retry(err) => log::warn!("skipping frame: {err}"),
            FrameOutcome::Fatal(err) => self.fail(err.into()),
        }
        if redraw {
            self.request_redraw();
        }
    }

    /// Index of the scene whose viewport contains the cursor.
    fn scene_under_cursor(&self) -> Option<usize> {
        let engine = self.engine.as_ref()?;
        let (x, y) = self.mouse.position();
        let viewports = self.presenter.scenes().map(|scene| scene.viewport());
        interaction::viewport_at(&viewports, x, y, engine.width, engine.height)
    }

    fn viewport_size(&self, scene: usize) -> Option<[f32; 2]> {
        let engine = self.engine.as_ref()?;
        let [_, _, w, h] = self
            .presenter
            .scene(scene)?
            .viewport()
            .pixel_rect(engine.width, engine.height);
        Some([w, h])
    }

    fn drag(&mut self, mode: DragMode, dx: f32, dy: f32) {
        let Some(scene) = self.mouse.target(self.scene_under_cursor()) else {
            return;
        };
        let (Some(size), Some(target)) = (self.viewport_size(scene), self.presenter.scene(scene))
        else {
            return;
        };
        interaction::apply_drag(&mut target.active_camera().borrow_mut(), mode, dx, dy, size);
        log::debug!("{mode:?} drag ({dx}, {dy}) in scene {scene}");
        self.presenter.reset_clipping_range();
        self.request_redraw();
    }

    fn wheel(&mut self, notches: f32) {
        let Some(target) = self
            .scene_under_cursor()
            .and_then(|scene| self.presenter.scene(scene))
        else {
            return;
        };
        interaction::apply_wheel(&mut target.active_camera().borrow_mut(), notches);
        self.presenter.reset_clipping_range();
        self.request_redraw();
    }
}

impl ApplicationHandler for PresenterApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(err) = self.init_graphics(event_loop) {
            self.fail(err);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                self.close_requested = true;
            }
            WindowEvent::Resized(size) => {
                if let Some(engine) = &mut self.engine {
                    engine.resize(size.width, size.height);
                }
                self.request_redraw();
            }
            WindowEvent::RedrawRequested => {
                self.render();
            }
            WindowEvent::ModifiersChanged(modifiers) => {
                self.mouse.set_shift(modifiers.state().shift_key());
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let hovered = self.scene_under_cursor();
                self.mouse.set_button(button, state == ElementState::Pressed, hovered);
            }
            WindowEvent::CursorMoved { position, .. } => {
                let (dx, dy) = self.mouse.move_to(position.x, position.y);
                if let Some(mode) = self.mouse.drag_mode() {
                    self.drag(mode, dx, dy);
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                #[allow(clippy::cast_possible_truncation)]
                let notches = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / PIXELS_PER_NOTCH,
                };
                self.wheel(notches);
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state != ElementState::Pressed {
                    return;
                }
                match event.physical_key {
                    PhysicalKey::Code(KeyCode::KeyR) => {
                        self.presenter.reset_camera();
                        self.request_redraw();
                    }
                    PhysicalKey::Code(KeyCode::KeyQ | KeyCode::KeyE | KeyCode::Escape) => {
                        self.close_requested = true;
                    }
                    _ => {}
                }
            }
            _ => {}
        }

        if self.close_requested {
            event_loop.exit();
        }
    }
}
