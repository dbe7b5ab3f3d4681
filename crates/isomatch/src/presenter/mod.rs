//! Two scenes side by side in one window, driven by one camera.

mod app;
pub mod interaction;

use std::rc::Rc;

use glam::Vec3;
use isomatch_core::DemoConfig;
use isomatch_render::{axes_actor, union_bounds, Scene, Viewport};
use winit::event_loop::EventLoop;

use crate::error::Result;
use app::PresenterApp;

/// Window settings of the presenter.
#[derive(Debug, Clone, PartialEq)]
pub struct PresenterOptions {
    /// Window title.
    pub title: String,
    /// Window size in physical pixels.
    pub window_size: [u32; 2],
    /// Clear color.
    pub background: Vec3,
}

impl Default for PresenterOptions {
    fn default() -> Self {
        Self {
            title: "isomatch".to_string(),
            window_size: [1280, 480],
            background: Vec3::splat(0.1),
        }
    }
}

impl From<&DemoConfig> for PresenterOptions {
    fn from(config: &DemoConfig) -> Self {
        Self {
            window_size: config.window_size,
            background: config.background,
            ..Self::default()
        }
    }
}

/// Left and right scenes sharing the left scene's camera.
#[derive(Debug)]
pub struct DualViewportPresenter {
    left: Scene,
    right: Scene,
    options: PresenterOptions,
}

impl DualViewportPresenter {
    /// Lays out both scenes and prepares the shared camera.
    ///
    /// The left scene takes the left half of the window and the right scene
    /// the right half. The left camera is reset to the union of both scenes'
    /// visible bounds before the right scene is bound to it, and both scenes
    /// get an axes actor at the origin.
    pub fn new(mut left: Scene, mut right: Scene, options: PresenterOptions) -> Self {
        left.set_viewport(Viewport::new(0.0, 0.0, 0.5, 1.0));
        right.set_viewport(Viewport::new(0.5, 0.0, 1.0, 1.0));

        let mut presenter = Self {
            left,
            right,
            options,
        };
        presenter.reset_camera();
        presenter
            .right
            .set_active_camera(Rc::clone(presenter.left.active_camera()));
        presenter.left.add_lines(axes_actor());
        presenter.right.add_lines(axes_actor());
        presenter
    }

    /// The left scene.
    pub fn left(&self) -> &Scene {
        &self.left
    }

    /// The right scene.
    pub fn right(&self) -> &Scene {
        &self.right
    }

    /// Window settings.
    pub fn options(&self) -> &PresenterOptions {
        &self.options
    }

    /// Scene by drawing order: 0 is left, 1 is right.
    pub fn scene(&self, index: usize) -> Option<&Scene> {
        match index {
            0 => Some(&self.left),
            1 => Some(&self.right),
            _ => None,
        }
    }

    /// Both scenes in drawing order.
    pub fn scenes(&self) -> [&Scene; 2] {
        [&self.left, &self.right]
    }

    /// Union of the visible bounds of both scenes.
    pub fn visible_bounds(&self) -> Option<(Vec3, Vec3)> {
        match (self.left.visible_bounds(), self.right.visible_bounds()) {
            (Some(a), Some(b)) => Some(union_bounds(a, b)),
            (a, b) => a.or(b),
        }
    }

    /// Frames both scenes with the left camera.
    pub fn reset_camera(&mut self) {
        if let Some((min, max)) = self.visible_bounds() {
            self.left.active_camera().borrow_mut().reset_to_bounds(min, max);
            log::debug!("camera reset to bounds {min} .. {max}");
        }
    }

    /// Refits the clipping planes of both cameras after an interaction.
    pub fn reset_clipping_range(&mut self) {
        if let Some((min, max)) = self.visible_bounds() {
            self.left.active_camera().borrow_mut().reset_clipping_range(min, max);
            if !self.right.shares_camera_with(&self.left) {
                self.right.active_camera().borrow_mut().reset_clipping_range(min, max);
            }
        }
    }

    /// Opens the window and blocks until the user closes it.
    pub fn run(self) -> Result<()> {
        let event_loop = EventLoop::new()?;
        let mut app = PresenterApp::new(self);
        event_loop.run_app(&mut app)?;
        app.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use isomatch_core::{StripMesh, SurfaceMaterial};
    use isomatch_render::SurfaceActor;

    fn scene_with_box(min: Vec3, max: Vec3) -> Scene {
        let mesh = StripMesh {
            positions: vec![min, Vec3::new(max.x, min.y, min.z), max],
            normals: vec![Vec3::Z; 3],
            strips: vec![vec![0, 1, 2]],
        };
        let mut scene = Scene::new(Viewport::FULL);
        scene.add_surface(SurfaceActor::new("box", mesh, SurfaceMaterial::default()));
        scene
    }

    #[test]
    fn test_layout_and_binding() {
        let presenter = DualViewportPresenter::new(
            scene_with_box(Vec3::splat(-0.5), Vec3::splat(0.5)),
            scene_with_box(Vec3::splat(-0.4), Vec3::splat(0.6)),
            PresenterOptions::default(),
        );
        assert_eq!(presenter.left().viewport(), Viewport::new(0.0, 0.0, 0.5, 1.0));
        assert_eq!(presenter.right().viewport(), Viewport::new(0.5, 0.0, 1.0, 1.0));
        assert!(presenter.right().shares_camera_with(presenter.left()));
        assert_eq!(presenter.left().lines().len(), 1);
        assert_eq!(presenter.right().lines().len(), 1);

        // Framed on the union of both surfaces, before the axes were added.
        let camera = presenter.left().active_camera().borrow();
        assert!(camera.target.abs_diff_eq(Vec3::splat(0.05), 1e-5));
        assert!(camera.forward().abs_diff_eq(Vec3::NEG_Z, 1e-5));
    }

    #[test]
    fn test_left_camera_motion_shows_on_the_right() {
        let presenter = DualViewportPresenter::new(
            scene_with_box(Vec3::splat(-1.0), Vec3::splat(1.0)),
            scene_with_box(Vec3::splat(-1.0), Vec3::splat(1.0)),
            PresenterOptions::default(),
        );
        {
            let mut camera = presenter.left().active_camera().borrow_mut();
            interaction::apply_drag(
                &mut camera,
                interaction::DragMode::Rotate,
                50.0,
                -30.0,
                [640.0, 480.0],
            );
        }
        let left = presenter.left().active_camera().borrow().clone();
        let right = presenter.right().active_camera().borrow().clone();
        assert_eq!(left, right);
        assert!(!left.position.abs_diff_eq(Vec3::Z * left.distance(), 1e-3));
    }

    #[test]
    fn test_options_from_config() {
        let config = DemoConfig {
            window_size: [800, 300],
            ..DemoConfig::default()
        };
        let options = PresenterOptions::from(&config);
        assert_eq!(options.window_size, [800, 300]);
        assert_eq!(options.background, Vec3::splat(0.1));
    }
}
