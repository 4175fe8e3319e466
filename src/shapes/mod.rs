//! Procedural target shapes.
//!
//! Each shape produces a fixed-size point cloud the particles morph toward:
//! - Sphere: Fibonacci lattice, even density over the surface
//! - Galaxy: four logarithmic spiral arms around a flattened bulge
//! - Wave: radially decaying ripple over a square
//! - Cube: points sampled uniformly on the six faces

mod cube;
mod galaxy;
mod registry;
mod sphere;
mod wave;

pub use cube::CubeShape;
pub use galaxy::GalaxyShape;
pub use registry::{create_shape, generate_targets, ShapeSet, DEFAULT_SEQUENCE};
pub use sphere::SphereShape;
pub use wave::WaveShape;

use glam::Vec3;
use rand::RngCore;

/// Errors raised when building target shapes.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ShapeError {
    #[error("Particle count must be at least 2, got {0}")]
    InvalidCount(usize),
    #[error("Shape size must be positive and finite, got {0}")]
    InvalidSize(f32),
    #[error("At least one shape is required")]
    NoShapes,
}

/// Available shape types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeType {
    Sphere,
    Galaxy,
    Wave,
    Cube,
}

impl ShapeType {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "sphere" | "ball" => Some(Self::Sphere),
            "galaxy" | "spiral" => Some(Self::Galaxy),
            "wave" | "ripple" => Some(Self::Wave),
            "cube" | "box" => Some(Self::Cube),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Sphere => "sphere",
            Self::Galaxy => "galaxy",
            Self::Wave => "wave",
            Self::Cube => "cube",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Sphere => "Evenly distributed points on a sphere surface",
            Self::Galaxy => "Four-armed spiral galaxy with a central bulge",
            Self::Wave => "Radial ripple height field",
            Self::Cube => "Points scattered over the faces of a cube",
        }
    }

    pub fn all() -> &'static [Self] {
        &[Self::Sphere, Self::Galaxy, Self::Wave, Self::Cube]
    }
}

/// Trait for point cloud generators.
pub trait ShapeGenerator: Send + Sync {
    /// Get the shape type.
    fn shape_type(&self) -> ShapeType;

    /// Generate `count` points for a shape of the given `size`.
    ///
    /// Shapes that want organic texture draw from `rng`; the rest ignore it.
    fn generate(&self, count: usize, size: f32, rng: &mut dyn RngCore) -> Vec<Vec3>;
}

/// Flatten points into `x, y, z` triples.
pub fn flatten_positions(points: &[Vec3]) -> Vec<f32> {
    points.iter().flat_map(|p| p.to_array()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_every_shape_yields_count_finite_triples() {
        let mut rng = StdRng::seed_from_u64(42);
        for shape_type in ShapeType::all() {
            let shape = create_shape(*shape_type);
            for count in [2, 3, 1000] {
                let flat = flatten_positions(&shape.generate(count, 14.0, &mut rng));
                assert_eq!(
                    flat.len(),
                    count * 3,
                    "{} with {} points",
                    shape_type.name(),
                    count
                );
                assert!(
                    flat.iter().all(|v| v.is_finite()),
                    "{} with {} points produced NaN or infinity",
                    shape_type.name(),
                    count
                );
            }
        }
    }

    #[test]
    fn test_flatten_positions_order() {
        let flat = flatten_positions(&[Vec3::new(1.0, 2.0, 3.0), Vec3::new(4.0, 5.0, 6.0)]);
        assert_eq!(flat, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_from_str_round_trips_names() {
        for shape_type in ShapeType::all() {
            assert_eq!(ShapeType::from_str(shape_type.name()), Some(*shape_type));
        }
        assert_eq!(ShapeType::from_str("Spiral"), Some(ShapeType::Galaxy));
        assert_eq!(ShapeType::from_str("torus"), None);
    }
}
