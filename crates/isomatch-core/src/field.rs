//! The scalar field capability shared by every surface source.

use glam::Vec3;

/// A scalar field that can be evaluated at any point in space.
///
/// Both the closed-form [`Quadric`](crate::Quadric) and the buffer-backed
/// [`ImplicitVolume`](crate::ImplicitVolume) implement this, so sampling,
/// contouring and comparison are written once.
pub trait ScalarField {
    /// Evaluates the field at `p`.
    fn evaluate(&self, p: Vec3) -> f32;

    /// Returns the field gradient at `p`.
    ///
    /// The default uses central differences with a step of `1e-3`.
    fn gradient(&self, p: Vec3) -> Vec3 {
        central_gradient(|q| self.evaluate(q), p, 1e-3)
    }
}

impl<F: ScalarField + ?Sized> ScalarField for &F {
    fn evaluate(&self, p: Vec3) -> f32 {
        (**self).evaluate(p)
    }

    fn gradient(&self, p: Vec3) -> Vec3 {
        (**self).gradient(p)
    }
}

impl<F: ScalarField + ?Sized> ScalarField for Box<F> {
    fn evaluate(&self, p: Vec3) -> f32 {
        (**self).evaluate(p)
    }

    fn gradient(&self, p: Vec3) -> Vec3 {
        (**self).gradient(p)
    }
}

/// Central-difference gradient of `field` at `p` with total step `delta`.
pub fn central_gradient(field: impl Fn(Vec3) -> f32, p: Vec3, delta: f32) -> Vec3 {
    let h = 0.5 * delta;
    let dx = Vec3::new(h, 0.0, 0.0);
    let dy = Vec3::new(0.0, h, 0.0);
    let dz = Vec3::new(0.0, 0.0, h);
    Vec3::new(
        field(p + dx) - field(p - dx),
        field(p + dy) - field(p - dy),
        field(p + dz) - field(p - dz),
    ) / delta
}
