//! Fibonacci-lattice sphere.

use super::{ShapeGenerator, ShapeType};
use glam::Vec3;
use rand::RngCore;

/// Golden angle in radians, `π(√5 − 1)`.
pub const GOLDEN_ANGLE: f32 = 2.399_963_3;

/// Sphere surface with near-uniform point density and no pole clustering.
pub struct SphereShape;

impl ShapeGenerator for SphereShape {
    fn shape_type(&self) -> ShapeType {
        ShapeType::Sphere
    }

    fn generate(&self, count: usize, size: f32, _rng: &mut dyn RngCore) -> Vec<Vec3> {
        match count {
            0 => Vec::new(),
            // The lattice spacing divides by `count - 1`.
            1 => vec![Vec3::new(0.0, size, 0.0)],
            _ => {
                let last = (count - 1) as f32;
                (0..count)
                    .map(|i| {
                        let y = 1.0 - (i as f32 / last) * 2.0;
                        let radius = (1.0 - y * y).max(0.0).sqrt();
                        let theta = GOLDEN_ANGLE * i as f32;
                        Vec3::new(theta.cos() * radius, y, theta.sin() * radius) * size
                    })
                    .collect()
            }
        }
    }
}
