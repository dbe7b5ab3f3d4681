//! Scenes: viewport rectangles, actors and camera handles.
//!
//! A [`Scene`] is everything one viewport draws. Cameras are held through a
//! shared [`CameraHandle`] so that several scenes can be driven by the same
//! camera; binding a scene to another scene's camera is a handle clone.

use std::cell::RefCell;
use std::rc::Rc;

use glam::{Vec2, Vec3};
use isomatch_core::{StripMesh, SurfaceMaterial};

use crate::camera::Camera;

/// Shared, mutable camera.
pub type CameraHandle = Rc<RefCell<Camera>>;

/// Rectangle in normalized window coordinates, origin at the bottom left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Lower-left corner.
    pub min: Vec2,
    /// Upper-right corner.
    pub max: Vec2,
}

impl Viewport {
    /// The whole window.
    pub const FULL: Self = Self {
        min: Vec2::ZERO,
        max: Vec2::ONE,
    };

    /// Creates a viewport from `[xmin, ymin, xmax, ymax]`.
    #[must_use]
    pub fn new(xmin: f32, ymin: f32, xmax: f32, ymax: f32) -> Self {
        Self {
            min: Vec2::new(xmin, ymin),
            max: Vec2::new(xmax, ymax),
        }
    }

    /// Returns `(x, y, width, height)` in pixels with y measured from the top.
    #[must_use]
    pub fn pixel_rect(&self, width: u32, height: u32) -> [f32; 4] {
        let (w, h) = (width as f32, height as f32);
        let x = self.min.x * w;
        let y = (1.0 - self.max.y) * h;
        [x, y, (self.max.x - self.min.x) * w, (self.max.y - self.min.y) * h]
    }

    /// Width over height of this viewport inside a window of the given size.
    #[must_use]
    pub fn aspect_ratio(&self, width: u32, height: u32) -> f32 {
        let [_, _, w, h] = self.pixel_rect(width, height);
        if h > 0.0 {
            w / h
        } else {
            1.0
        }
    }

    /// Whether a window position (pixels, y down) falls inside this viewport.
    #[must_use]
    pub fn contains_pixel(&self, x: f64, y: f64, width: u32, height: u32) -> bool {
        let [vx, vy, vw, vh] = self.pixel_rect(width, height);
        let (x, y) = (x as f32, y as f32);
        x >= vx && x < vx + vw && y >= vy && y < vy + vh
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::FULL
    }
}

/// A shaded surface drawn as triangle strips.
#[derive(Debug, Clone)]
pub struct SurfaceActor {
    /// Display name, used in logs.
    pub name: String,
    /// Geometry.
    pub mesh: StripMesh,
    /// Shading parameters.
    pub material: SurfaceMaterial,
    /// Whether the actor is drawn and counted in the visible bounds.
    pub visible: bool,
}

impl SurfaceActor {
    /// Creates a visible surface actor.
    pub fn new(name: impl Into<String>, mesh: StripMesh, material: SurfaceMaterial) -> Self {
        Self {
            name: name.into(),
            mesh,
            material,
            visible: true,
        }
    }

    /// Axis-aligned bounds of the vertices, or `None` when empty.
    #[must_use]
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        point_bounds(&self.mesh.positions)
    }
}

/// Unlit colored line segments. Consecutive vertex pairs form segments.
#[derive(Debug, Clone)]
pub struct LineActor {
    /// Display name, used in logs.
    pub name: String,
    /// Segment endpoints.
    pub positions: Vec<Vec3>,
    /// Per-vertex colors.
    pub colors: Vec<Vec3>,
    /// Whether the actor is drawn and counted in the visible bounds.
    pub visible: bool,
}

impl LineActor {
    /// Number of segments.
    #[must_use]
    pub fn num_segments(&self) -> usize {
        self.positions.len() / 2
    }

    /// Axis-aligned bounds of the vertices, or `None` when empty.
    #[must_use]
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        point_bounds(&self.positions)
    }
}

/// What one viewport shows, and through which camera.
#[derive(Debug)]
pub struct Scene {
    viewport: Viewport,
    camera: CameraHandle,
    surfaces: Vec<SurfaceActor>,
    lines: Vec<LineActor>,
}

impl Scene {
    /// Creates an empty scene with its own default camera.
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            camera: Rc::new(RefCell::new(Camera::new())),
            surfaces: Vec::new(),
            lines: Vec::new(),
        }
    }

    /// Returns the viewport.
    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Moves the scene to another part of the window.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Returns the camera handle this scene renders through.
    #[must_use]
    pub fn active_camera(&self) -> &CameraHandle {
        &self.camera
    }

    /// Renders through `camera` from now on.
    pub fn set_active_camera(&mut self, camera: CameraHandle) {
        self.camera = camera;
    }

    /// Whether both scenes render through the same camera object.
    #[must_use]
    pub fn shares_camera_with(&self, other: &Scene) -> bool {
        Rc::ptr_eq(&self.camera, &other.camera)
    }

    /// Adds a surface actor.
    pub fn add_surface(&mut self, actor: SurfaceActor) {
        self.surfaces.push(actor);
    }

    /// Adds a line actor.
    pub fn add_lines(&mut self, actor: LineActor) {
        self.lines.push(actor);
    }

    /// Surface actors in insertion order.
    #[must_use]
    pub fn surfaces(&self) -> &[SurfaceActor] {
        &self.surfaces
    }

    /// Line actors in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[LineActor] {
        &self.lines
    }

    /// Union of the bounds of all visible actors.
    #[must_use]
    pub fn visible_bounds(&self) -> Option<(Vec3, Vec3)> {
        let surfaces = self.surfaces.iter().filter(|a| a.visible).map(SurfaceActor::bounds);
        let lines = self.lines.iter().filter(|a| a.visible).map(LineActor::bounds);
        surfaces.chain(lines).flatten().reduce(union_bounds)
    }

    /// Frames the visible bounds with this scene's camera.
    ///
    /// Returns false, leaving the camera alone, if nothing is visible.
    pub fn reset_camera(&self) -> bool {
        match self.visible_bounds() {
            Some((min, max)) => {
                self.camera.borrow_mut().reset_to_bounds(min, max);
                true
            }
            None => false,
        }
    }
}

/// Smallest box containing both boxes.
#[must_use]
pub fn union_bounds(a: (Vec3, Vec3), b: (Vec3, Vec3)) -> (Vec3, Vec3) {
    (a.0.min(b.0), a.1.max(b.1))
}

fn point_bounds(points: &[Vec3]) -> Option<(Vec3, Vec3)> {
    let first = *points.first()?;
    Some(
        points
            .iter()
            .fold((first, first), |(lo, hi), &p| (lo.min(p), hi.max(p))),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle_actor(offset: Vec3) -> SurfaceActor {
        let mesh = StripMesh {
            positions: vec![offset, offset + Vec3::X, offset + Vec3::Y],
            normals: vec![Vec3::Z; 3],
            strips: vec![vec![0, 1, 2]],
        };
        SurfaceActor::new("tri", mesh, SurfaceMaterial::default())
    }

    #[test]
    fn test_viewport_pixel_rect() {
        let left = Viewport::new(0.0, 0.0, 0.5, 1.0);
        let right = Viewport::new(0.5, 0.0, 1.0, 1.0);
        assert_eq!(left.pixel_rect(1280, 480), [0.0, 0.0, 640.0, 480.0]);
        assert_eq!(right.pixel_rect(1280, 480), [640.0, 0.0, 640.0, 480.0]);
        assert!((right.aspect_ratio(1280, 480) - 640.0 / 480.0).abs() < 1e-6);
        assert!(right.contains_pixel(700.0, 10.0, 1280, 480));
        assert!(!right.contains_pixel(100.0, 10.0, 1280, 480));
    }

    #[test]
    fn test_bottom_viewport_is_at_bottom_of_window() {
        let bottom = Viewport::new(0.0, 0.0, 1.0, 0.25);
        assert_eq!(bottom.pixel_rect(100, 100), [0.0, 75.0, 100.0, 25.0]);
    }

    #[test]
    fn test_visible_bounds_union() {
        let mut scene = Scene::new(Viewport::FULL);
        assert_eq!(scene.visible_bounds(), None);
        scene.add_surface(triangle_actor(Vec3::ZERO));
        scene.add_surface(triangle_actor(Vec3::new(0.0, 0.0, 2.0)));
        let mut hidden = triangle_actor(Vec3::splat(10.0));
        hidden.visible = false;
        scene.add_surface(hidden);
        assert_eq!(
            scene.visible_bounds(),
            Some((Vec3::ZERO, Vec3::new(1.0, 1.0, 2.0)))
        );
    }

    #[test]
    fn test_bound_camera_follows_left_camera() {
        let mut left = Scene::new(Viewport::new(0.0, 0.0, 0.5, 1.0));
        let mut right = Scene::new(Viewport::new(0.5, 0.0, 1.0, 1.0));
        left.add_surface(triangle_actor(Vec3::ZERO));
        right.add_surface(triangle_actor(Vec3::ZERO));
        assert!(!left.shares_camera_with(&right));

        right.set_active_camera(Rc::clone(left.active_camera()));
        assert!(right.shares_camera_with(&left));

        assert!(left.reset_camera());
        left.active_camera().borrow_mut().azimuth(40.0);
        left.active_camera().borrow_mut().dolly(1.5);
        let left_pose = left.active_camera().borrow().clone();
        assert_eq!(*right.active_camera().borrow(), left_pose);
    }
}
