//! General second-degree scalar field in three coordinates.

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

use crate::field::ScalarField;

/// Number of coefficients of a general quadric.
pub const NUM_COEFFICIENTS: usize = 10;

/// A quadric `F(x,y,z) = a0 x² + a1 y² + a2 z² + a3 xy + a4 yz + a5 xz + a6 x + a7 y + a8 z + a9`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quadric {
    coefficients: [f32; NUM_COEFFICIENTS],
}

impl Quadric {
    /// Creates a quadric from its ten coefficients.
    #[must_use]
    pub fn new(coefficients: [f32; NUM_COEFFICIENTS]) -> Self {
        Self { coefficients }
    }

    /// Draws all ten coefficients from a standard normal distribution.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut coefficients = [0.0; NUM_COEFFICIENTS];
        for c in &mut coefficients {
            *c = rng.sample::<f32, _>(StandardNormal);
        }
        Self { coefficients }
    }

    /// Draws a reproducible random quadric from `seed`.
    #[must_use]
    pub fn from_seed(seed: u64) -> Self {
        let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
        Self::random(&mut rng)
    }

    /// Returns the coefficients.
    #[must_use]
    pub fn coefficients(&self) -> &[f32; NUM_COEFFICIENTS] {
        &self.coefficients
    }
}

impl ScalarField for Quadric {
    fn evaluate(&self, p: Vec3) -> f32 {
        let a = &self.coefficients;
        let (x, y, z) = (p.x, p.y, p.z);
        a[0] * x * x
            + a[1] * y * y
            + a[2] * z * z
            + a[3] * x * y
            + a[4] * y * z
            + a[5] * x * z
            + a[6] * x
            + a[7] * y
            + a[8] * z
            + a[9]
    }

    fn gradient(&self, p: Vec3) -> Vec3 {
        let a = &self.coefficients;
        let (x, y, z) = (p.x, p.y, p.z);
        Vec3::new(
            2.0 * a[0] * x + a[3] * y + a[5] * z + a[6],
            2.0 * a[1] * y + a[3] * x + a[4] * z + a[7],
            2.0 * a[2] * z + a[4] * y + a[5] * x + a[8],
        )
    }
}
