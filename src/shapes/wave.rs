//! Radial ripple height field.

use super::{ShapeGenerator, ShapeType};
use glam::Vec3;
use rand::{Rng, RngCore};
use std::f32::consts::PI;

const FREQUENCY: f32 = 3.0;
const AMPLITUDE: f32 = 0.4;

/// Square sheet whose height is `sin(d·3π)·cos(2θ)`, fading to zero at the
/// unit radius.
pub struct WaveShape;

/// Height of the ripple at normalised coordinates `u, v ∈ [-1, 1]`.
#[inline]
pub fn wave_height(u: f32, v: f32, size: f32) -> f32 {
    let dist = (u * u + v * v).sqrt();
    let angle = v.atan2(u);
    (dist * PI * FREQUENCY).sin() * (angle * 2.0).cos() * size * AMPLITUDE * (1.0 - dist)
}

impl ShapeGenerator for WaveShape {
    fn shape_type(&self) -> ShapeType {
        ShapeType::Wave
    }

    fn generate(&self, count: usize, size: f32, rng: &mut dyn RngCore) -> Vec<Vec3> {
        (0..count)
            .map(|_| {
                let u = rng.random::<f32>() * 2.0 - 1.0;
                let v = rng.random::<f32>() * 2.0 - 1.0;
                Vec3::new(u * size, wave_height(u, v, size), v * size)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_points_follow_height_field() {
        let mut rng = StdRng::seed_from_u64(8);
        let size = 14.0;
        for p in WaveShape.generate(500, size, &mut rng) {
            let expected = wave_height(p.x / size, p.z / size, size);
            assert!((p.y - expected).abs() < 1e-3);
            assert!(p.x.abs() <= size && p.z.abs() <= size);
        }
    }

    #[test]
    fn test_center_is_flat() {
        assert_eq!(wave_height(0.0, 0.0, 14.0), 0.0);
    }
}
