//! Cube surface sampling.

use super::{ShapeGenerator, ShapeType};
use glam::Vec3;
use rand::{Rng, RngCore};

/// Points scattered uniformly over the six faces of an axis-aligned cube
/// with edge length `size`.
pub struct CubeShape;

impl ShapeGenerator for CubeShape {
    fn shape_type(&self) -> ShapeType {
        ShapeType::Cube
    }

    fn generate(&self, count: usize, size: f32, rng: &mut dyn RngCore) -> Vec<Vec3> {
        let half = size / 2.0;
        (0..count)
            .map(|_| {
                let face = rng.random_range(0..6u8);
                let u = rng.random::<f32>() * size - half;
                let v = rng.random::<f32>() * size - half;
                match face {
                    0 => Vec3::new(half, u, v),
                    1 => Vec3::new(-half, u, v),
                    2 => Vec3::new(u, half, v),
                    3 => Vec3::new(u, -half, v),
                    4 => Vec3::new(u, v, half),
                    _ => Vec3::new(u, v, -half),
                }
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
    fn test_points_on_faces() {
        let mut rng = StdRng::seed_from_u64(9);
        let size = 14.0;
        let points = CubeShape.generate(1000, size, &mut rng);
        assert_eq!(points.len(), 1000);
        for p in &points {
            let on_face = p.to_array().iter().any(|c| (c.abs() - size / 2.0).abs() < 1e-4);
            assert!(on_face, "point {p} not on a face");
            assert!(p.abs().max_element() <= size / 2.0 + 1e-4);
        }
    }

    #[test]
    fn test_all_faces_used() {
        let mut rng = StdRng::seed_from_u64(2);
        let points = CubeShape.generate(600, 2.0, &mut rng);
        let faces = [
            points.iter().any(|p| p.x == 1.0),
            points.iter().any(|p| p.x == -1.0),
            points.iter().any(|p| p.y == 1.0),
            points.iter().any(|p| p.y == -1.0),
            points.iter().any(|p| p.z == 1.0),
            points.iter().any(|p| p.z == -1.0),
        ];
        assert!(faces.iter().all(|&f| f));
    }
}
