//! Seeded simplex noise in three and four dimensions.
//!
//! Thin `f32` front end over [`::noise::Simplex`]. The seed is drawn from a
//! caller-supplied RNG, so two fields built from equally seeded generators
//! produce identical values. Output is roughly in `[-1, 1]`.

use ::noise::{NoiseFn, Simplex};
use glam::Vec3;
use rand::Rng;

/// Simplex noise field with its own seed.
#[derive(Clone)]
pub struct SimplexNoise {
    inner: Simplex,
    seed: u32,
}

impl std::fmt::Debug for SimplexNoise {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimplexNoise")
            .field("seed", &self.seed)
            .finish()
    }
}

impl SimplexNoise {
    /// Build a field seeded from `rng`.
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let seed: u32 = rng.random();
        Self {
            inner: Simplex::new(seed),
            seed,
        }
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// 3D simplex noise.
    #[inline]
    pub fn noise3(&self, x: f32, y: f32, z: f32) -> f32 {
        self.inner.get([x as f64, y as f64, z as f64]) as f32
    }

    /// 4D simplex noise.
    #[inline]
    pub fn noise4(&self, x: f32, y: f32, z: f32, w: f32) -> f32 {
        self.inner.get([x as f64, y as f64, z as f64, w as f64]) as f32
    }

    /// Three decorrelated 4D samples around `p`, one per axis.
    ///
    /// Channel `n` samples at `p * frequency + offsets[n]`.
    #[inline]
    pub fn vec4_field(&self, p: Vec3, frequency: f32, w: f32, offsets: [f32; 3]) -> Vec3 {
        let q = p * frequency;
        Vec3::new(
            self.noise4(q.x + offsets[0], q.y + offsets[0], q.z + offsets[0], w),
            self.noise4(q.x + offsets[1], q.y + offsets[1], q.z + offsets[1], w),
            self.noise4(q.x + offsets[2], q.y + offsets[2], q.z + offsets[2], w),
        )
    }
}
