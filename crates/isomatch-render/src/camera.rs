//! Camera and view management.
//!
//! The camera follows the trackball conventions of classic scientific
//! visualization toolkits: it orbits a focal point (`target`), angles are in
//! degrees at the API surface, and resetting frames a bounding box while
//! keeping the current viewing direction.

use glam::{Mat4, Quat, Vec3};

/// Default vertical field of view in degrees.
pub const DEFAULT_VIEW_ANGLE: f32 = 30.0;

/// A perspective camera orbiting a focal point.
///
/// The aspect ratio is not part of the camera: one camera may be shared by
/// several viewports of different shapes, so each viewport supplies its own.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Camera position in world space.
    pub position: Vec3,
    /// Focal point the camera looks at and orbits around.
    pub target: Vec3,
    /// Up vector.
    pub up: Vec3,
    /// Vertical field of view in radians.
    pub fov: f32,
    /// Near clipping plane.
    pub near: f32,
    /// Far clipping plane.
    pub far: f32,
}

impl Camera {
    /// Creates a camera at `(0, 0, 1)` looking down -z with +y up.
    #[must_use]
    pub fn new() -> Self {
        Self {
            position: Vec3::Z,
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov: DEFAULT_VIEW_ANGLE.to_radians(),
            near: 0.01,
            far: 1000.01,
        }
    }

    /// Returns the view matrix.
    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    /// Returns the projection matrix for a viewport of the given aspect ratio.
    #[must_use]
    pub fn projection_matrix(&self, aspect_ratio: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov, aspect_ratio.max(1e-6), self.near, self.far)
    }

    /// Returns the combined view-projection matrix.
    #[must_use]
    pub fn view_projection_matrix(&self, aspect_ratio: f32) -> Mat4 {
        self.projection_matrix(aspect_ratio) * self.view_matrix()
    }

    /// Returns the camera's forward direction.
    #[must_use]
    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize()
    }

    /// Returns the camera's right direction.
    #[must_use]
    pub fn right(&self) -> Vec3 {
        self.forward().cross(self.up).normalize()
    }

    /// Distance from the camera to its focal point.
    #[must_use]
    pub fn distance(&self) -> f32 {
        self.position.distance(self.target)
    }

    /// Field of view in degrees.
    #[must_use]
    pub fn view_angle(&self) -> f32 {
        self.fov.to_degrees()
    }

    /// Rotates the camera about the up vector, centered at the focal point.
    pub fn azimuth(&mut self, degrees: f32) {
        let rotation = Quat::from_axis_angle(self.up.normalize(), degrees.to_radians());
        self.position = self.target + rotation * (self.position - self.target);
    }

    /// Rotates the camera about the right axis, centered at the focal point.
    ///
    /// The up vector is left untouched; call [`Camera::orthogonalize_up`]
    /// afterwards.
    pub fn elevation(&mut self, degrees: f32) {
        let axis = (-self.forward()).cross(self.up);
        if axis.length_squared() < 1e-12 {
            return;
        }
        let rotation = Quat::from_axis_angle(axis.normalize(), degrees.to_radians());
        self.position = self.target + rotation * (self.position - self.target);
    }

    /// Makes the up vector perpendicular to the viewing direction.
    pub fn orthogonalize_up(&mut self) {
        let forward = self.forward();
        let right = forward.cross(self.up);
        if right.length_squared() < 1e-12 {
            return;
        }
        self.up = right.normalize().cross(forward).normalize();
    }

    /// Moves the camera towards the focal point by `factor` (> 1 moves closer).
    pub fn dolly(&mut self, factor: f32) {
        if !(factor.is_finite() && factor > 0.0) {
            return;
        }
        let distance = self.distance() / factor;
        self.position = self.target - self.forward() * distance;
    }

    /// Translates camera and focal point along the view plane.
    pub fn pan(&mut self, delta_right: f32, delta_up: f32) {
        let offset = self.right() * delta_right + self.up.normalize() * delta_up;
        self.position += offset;
        self.target += offset;
    }

    /// World-space length of one pixel at the focal point.
    #[must_use]
    pub fn world_per_pixel(&self, viewport_height: f32) -> f32 {
        2.0 * self.distance() * (self.fov * 0.5).tan() / viewport_height.max(1.0)
    }

    /// Frames the bounding box while keeping the current viewing direction.
    ///
    /// The focal point moves to the box center and the camera backs off far
    /// enough for the box's bounding sphere to fit the field of view.
    pub fn reset_to_bounds(&mut self, min: Vec3, max: Vec3) {
        let center = (min + max) * 0.5;
        let mut radius = (max - min).length() * 0.5;
        if radius <= 0.0 {
            radius = 1.0;
        }
        let distance = radius / (self.fov * 0.5).sin();

        let mut direction = self.position - self.target;
        if direction.length_squared() < 1e-12 {
            direction = Vec3::Z;
        }
        let direction = direction.normalize();
        if direction.cross(self.up).length_squared() < 1e-12 {
            self.up = if direction.y.abs() < 0.9 { Vec3::Y } else { Vec3::Z };
        }

        self.target = center;
        self.position = center + direction * distance;
        self.orthogonalize_up();
        self.reset_clipping_range(min, max);
    }

    /// Fits the near and far planes tightly around the bounding box.
    pub fn reset_clipping_range(&mut self, min: Vec3, max: Vec3) {
        let forward = self.forward();
        let (mut near, mut far) = (f32::INFINITY, f32::NEG_INFINITY);
        for corner in 0..8 {
            let p = Vec3::new(
                if corner & 1 == 0 { min.x } else { max.x },
                if corner & 2 == 0 { min.y } else { max.y },
                if corner & 4 == 0 { min.z } else { max.z },
            );
            let depth = (p - self.position).dot(forward);
            near = near.min(depth);
            far = far.max(depth);
        }
        let pad = (far - near).max(1e-3) * 0.01;
        far += pad;
        near -= pad;
        self.far = far.max(1e-3);
        self.near = near.max(self.far * 1e-3);
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}
