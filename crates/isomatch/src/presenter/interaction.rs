//! Mouse-to-camera mapping in the trackball-camera style.
//!
//! Pixel deltas follow the window convention (y grows downwards).

use isomatch_render::{Camera, Viewport};
use winit::event::MouseButton;

/// Scales every mouse motion.
pub const MOTION_FACTOR: f32 = 10.0;

/// What a mouse drag does to the camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragMode {
    /// Azimuth and elevation about the focal point.
    Rotate,
    /// Translate along the view plane.
    Pan,
    /// Move towards or away from the focal point.
    Dolly,
}

/// Picks the drag mode from the held buttons and modifiers.
pub fn drag_mode(left: bool, middle: bool, right: bool, shift: bool) -> Option<DragMode> {
    match (left, middle, right) {
        (true, _, _) if shift => Some(DragMode::Pan),
        (true, _, _) => Some(DragMode::Rotate),
        (false, true, _) => Some(DragMode::Pan),
        (false, false, true) => Some(DragMode::Dolly),
        (false, false, false) => None,
    }
}

/// Cursor position, held buttons and the scene the current drag belongs to.
///
/// A drag stays with the scene it started in until every button is released,
/// even if the cursor crosses into the other viewport.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MouseState {
    position: (f64, f64),
    left: bool,
    middle: bool,
    right: bool,
    shift: bool,
    drag_scene: Option<usize>,
}

impl MouseState {
    /// Last cursor position in window pixels.
    pub fn position(&self) -> (f64, f64) {
        self.position
    }

    /// Records the shift modifier.
    pub fn set_shift(&mut self, shift: bool) {
        self.shift = shift;
    }

    /// Records a button press or release; `hovered` is the scene under the cursor.
    pub fn set_button(&mut self, button: MouseButton, pressed: bool, hovered: Option<usize>) {
        match button {
            MouseButton::Left => self.left = pressed,
            MouseButton::Middle => self.middle = pressed,
            MouseButton::Right => self.right = pressed,
            _ => return,
        }
        if pressed && self.drag_scene.is_none() {
            self.drag_scene = hovered;
        }
        if !(self.left || self.middle || self.right) {
            self.drag_scene = None;
        }
    }

    /// Moves the cursor and returns the motion in pixels.
    #[allow(clippy::cast_possible_truncation)]
    pub fn move_to(&mut self, x: f64, y: f64) -> (f32, f32) {
        let delta = ((x - self.position.0) as f32, (y - self.position.1) as f32);
        self.position = (x, y);
        delta
    }

    /// Drag mode for the held buttons, if any.
    pub fn drag_mode(&self) -> Option<DragMode> {
        drag_mode(self.left, self.middle, self.right, self.shift)
    }

    /// Scene a motion applies to: the drag's scene, else the hovered one.
    pub fn target(&self, hovered: Option<usize>) -> Option<usize> {
        self.drag_scene.or(hovered)
    }
}

/// Index of the first viewport containing the window pixel `(x, y)`.
pub fn viewport_at(viewports: &[Viewport], x: f64, y: f64, width: u32, height: u32) -> Option<usize> {
    viewports
        .iter()
        .position(|viewport| viewport.contains_pixel(x, y, width, height))
}

/// Applies a drag of `(dx, dy)` pixels inside a viewport of `size` pixels.
pub fn apply_drag(camera: &mut Camera, mode: DragMode, dx: f32, dy: f32, size: [f32; 2]) {
    let [width, height] = size.map(|s| s.max(1.0));
    match mode {
        DragMode::Rotate => {
            camera.azimuth(-20.0 / width * dx * MOTION_FACTOR);
            camera.elevation(20.0 / height * dy * MOTION_FACTOR);
            camera.orthogonalize_up();
        }
        DragMode::Pan => {
            let scale = camera.world_per_pixel(height);
            camera.pan(-dx * scale, dy * scale);
        }
        DragMode::Dolly => {
            let amount = MOTION_FACTOR * -dy / (0.5 * height);
            camera.dolly(1.1_f32.powf(amount));
        }
    }
}

/// Applies `notches` of mouse wheel; positive moves closer.
pub fn apply_wheel(camera: &mut Camera, notches: f32) {
    camera.dolly(1.1_f32.powf(MOTION_FACTOR * 0.2 * notches));
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn camera() -> Camera {
        let mut camera = Camera::new();
        camera.position = Vec3::new(0.0, 0.0, 5.0);
        camera
    }

    #[test]
    fn test_drag_mode_bindings() {
        assert_eq!(drag_mode(true, false, false, false), Some(DragMode::Rotate));
        assert_eq!(drag_mode(true, false, false, true), Some(DragMode::Pan));
        assert_eq!(drag_mode(false, true, false, false), Some(DragMode::Pan));
        assert_eq!(drag_mode(false, false, true, false), Some(DragMode::Dolly));
        assert_eq!(drag_mode(false, false, false, true), None);
    }

    #[test]
    fn test_drag_sticks_to_the_scene_it_started_in() {
        let mut mouse = MouseState::default();
        assert_eq!(mouse.target(Some(1)), Some(1));

        mouse.set_button(MouseButton::Left, true, Some(0));
        assert_eq!(mouse.drag_mode(), Some(DragMode::Rotate));
        // Crossing into the right viewport keeps driving the left scene.
        assert_eq!(mouse.target(Some(1)), Some(0));

        // A second button joins the drag without retargeting it.
        mouse.set_button(MouseButton::Right, true, Some(1));
        assert_eq!(mouse.target(Some(1)), Some(0));
        mouse.set_button(MouseButton::Left, false, Some(1));
        assert_eq!(mouse.drag_mode(), Some(DragMode::Dolly));
        assert_eq!(mouse.target(Some(1)), Some(0));

        mouse.set_button(MouseButton::Right, false, Some(1));
        assert_eq!(mouse.drag_mode(), None);
        assert_eq!(mouse.target(Some(1)), Some(1));
    }

    #[test]
    fn test_drag_started_outside_viewports_follows_cursor() {
        let mut mouse = MouseState::default();
        mouse.set_button(MouseButton::Middle, true, None);
        assert_eq!(mouse.drag_mode(), Some(DragMode::Pan));
        assert_eq!(mouse.target(Some(1)), Some(1));

        mouse.set_button(MouseButton::Back, true, Some(0));
        assert_eq!(mouse.target(Some(1)), Some(1));
    }

    #[test]
    fn test_shift_turns_rotate_into_pan() {
        let mut mouse = MouseState::default();
        mouse.set_button(MouseButton::Left, true, Some(0));
        mouse.set_shift(true);
        assert_eq!(mouse.drag_mode(), Some(DragMode::Pan));
    }

    #[test]
    fn test_move_to_reports_deltas() {
        let mut mouse = MouseState::default();
        mouse.move_to(10.0, 20.0);
        assert_eq!(mouse.move_to(13.0, 15.0), (3.0, -5.0));
        assert_eq!(mouse.position(), (13.0, 15.0));
    }

    #[test]
    fn test_viewport_hit_test() {
        let halves = [
            Viewport::new(0.0, 0.0, 0.5, 1.0),
            Viewport::new(0.5, 0.0, 1.0, 1.0),
        ];
        assert_eq!(viewport_at(&halves, 100.0, 240.0, 1280, 480), Some(0));
        assert_eq!(viewport_at(&halves, 639.0, 10.0, 1280, 480), Some(0));
        assert_eq!(viewport_at(&halves, 640.0, 10.0, 1280, 480), Some(1));
        assert_eq!(viewport_at(&halves, 1300.0, 10.0, 1280, 480), None);
        assert_eq!(viewport_at(&halves, 100.0, -1.0, 1280, 480), None);
    }

    #[test]
    fn test_horizontal_rotate_orbits_in_plane() {
        let mut cam = camera();
        apply_drag(&mut cam, DragMode::Rotate, 32.0, 0.0, [640.0, 480.0]);
        assert!((cam.distance() - 5.0).abs() < 1e-4);
        assert!(cam.position.y.abs() < 1e-4);
        // 32 px of a 640 px viewport is 10 degrees.
        let angle = cam.position.normalize().dot(Vec3::Z).acos().to_degrees();
        assert!((angle - 10.0).abs() < 1e-2, "{angle}");
    }

    #[test]
    fn test_pan_follows_cursor_scale() {
        let mut cam = camera();
        let per_pixel = cam.world_per_pixel(480.0);
        apply_drag(&mut cam, DragMode::Pan, 10.0, 0.0, [640.0, 480.0]);
        assert!((cam.target.x + 10.0 * per_pixel).abs() < 1e-5);
        assert!((cam.distance() - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_dolly_up_moves_closer() {
        let mut cam = camera();
        apply_drag(&mut cam, DragMode::Dolly, 0.0, -24.0, [640.0, 480.0]);
        assert!((cam.distance() - 5.0 / 1.1).abs() < 1e-4);

        let mut cam = camera();
        apply_wheel(&mut cam, -1.0);
        assert!((cam.distance() - 5.0 * 1.21).abs() < 1e-3);
    }
}
