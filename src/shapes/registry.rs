//! Shape registry and precomputed target sets.

use super::{
    CubeShape, GalaxyShape, ShapeError, ShapeGenerator, ShapeType, SphereShape, WaveShape,
};
use glam::Vec3;
use rand::RngCore;

/// Shape order used by the scroll-driven page: sphere, galaxy, wave, cube.
pub const DEFAULT_SEQUENCE: [ShapeType; 4] = [
    ShapeType::Sphere,
    ShapeType::Galaxy,
    ShapeType::Wave,
    ShapeType::Cube,
];

/// Create a shape generator from type.
///
/// # Example
/// ```
/// use particle_brain::shapes::{create_shape, ShapeType};
///
/// let shape = create_shape(ShapeType::Sphere);
/// assert_eq!(shape.shape_type(), ShapeType::Sphere);
/// ```
pub fn create_shape(shape_type: ShapeType) -> Box<dyn ShapeGenerator> {
    match shape_type {
        ShapeType::Sphere => Box::new(SphereShape),
        ShapeType::Galaxy => Box::new(GalaxyShape),
        ShapeType::Wave => Box::new(WaveShape),
        ShapeType::Cube => Box::new(CubeShape),
    }
}

/// Generate one target point cloud per entry of `shapes`, in order.
pub fn generate_targets(
    shapes: &[ShapeType],
    count: usize,
    size: f32,
    rng: &mut dyn RngCore,
) -> Vec<Vec<Vec3>> {
    shapes
        .iter()
        .map(|&shape| create_shape(shape).generate(count, size, rng))
        .collect()
}

/// Immutable target point clouds, one per shape, all of the same length.
#[derive(Debug, Clone)]
pub struct ShapeSet {
    shapes: Vec<ShapeType>,
    targets: Vec<Vec<Vec3>>,
    count: usize,
    size: f32,
}

impl ShapeSet {
    /// Generate every target in `shapes` for `count` particles.
    pub fn new(
        shapes: &[ShapeType],
        count: usize,
        size: f32,
        rng: &mut dyn RngCore,
    ) -> Result<Self, ShapeError> {
        if shapes.is_empty() {
            return Err(ShapeError::NoShapes);
        }
        if count < 2 {
            return Err(ShapeError::InvalidCount(count));
        }
        if !(size.is_finite() && size > 0.0) {
            return Err(ShapeError::InvalidSize(size));
        }

        let targets = generate_targets(shapes, count, size, rng);

        log::debug!(
            "Generated {} target shapes with {} points each",
            shapes.len(),
            count
        );

        Ok(Self {
            shapes: shapes.to_vec(),
            targets,
            count,
            size,
        })
    }

    /// Whether a set built for `count` points of `size` would differ.
    pub fn is_stale(&self, count: usize, size: f32) -> bool {
        self.count != count || self.size != size
    }

    /// Wrap any integer into a valid shape index.
    pub fn wrap_index(&self, index: i64) -> usize {
        index.rem_euclid(self.targets.len() as i64) as usize
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn particle_count(&self) -> usize {
        self.count
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn shape_type(&self, index: usize) -> Option<ShapeType> {
        self.shapes.get(index).copied()
    }

    pub fn index_of(&self, shape: ShapeType) -> Option<usize> {
        self.shapes.iter().position(|&s| s == shape)
    }

    pub fn target(&self, index: usize) -> &[Vec3] {
        &self.targets[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_create_every_shape() {
        for shape in ShapeType::all() {
            assert_eq!(create_shape(*shape).shape_type(), *shape);
        }
    }

    #[test]
    fn test_shape_set_generation() {
        let mut rng = StdRng::seed_from_u64(42);
        let set = ShapeSet::new(&DEFAULT_SEQUENCE, 128, 14.0, &mut rng).unwrap();
        assert_eq!(set.len(), 4);
        for i in 0..set.len() {
            assert_eq!(set.target(i).len(), 128);
        }
        assert_eq!(set.shape_type(2), Some(ShapeType::Wave));
        assert_eq!(set.index_of(ShapeType::Cube), Some(3));
    }

    #[test]
    fn test_shape_set_rejects_bad_input() {
        let mut rng = StdRng::seed_from_u64(42);
        assert_eq!(
            ShapeSet::new(&DEFAULT_SEQUENCE, 1, 14.0, &mut rng).unwrap_err(),
            ShapeError::InvalidCount(1)
        );
        assert_eq!(
            ShapeSet::new(&[], 10, 14.0, &mut rng).unwrap_err(),
            ShapeError::NoShapes
        );
        assert!(ShapeSet::new(&DEFAULT_SEQUENCE, 10, 0.0, &mut rng).is_err());
    }

    #[test]
    fn test_wrap_index() {
        let mut rng = StdRng::seed_from_u64(42);
        let set = ShapeSet::new(&DEFAULT_SEQUENCE, 8, 1.0, &mut rng).unwrap();
        assert_eq!(set.wrap_index(-1), 3);
        assert_eq!(set.wrap_index(6), 2);
        assert_eq!(set.wrap_index(4), 0);
        assert_eq!(set.wrap_index(i64::MIN), (i64::MIN).rem_euclid(4) as usize);
    }

    #[test]
    fn test_staleness() {
        let mut rng = StdRng::seed_from_u64(42);
        let set = ShapeSet::new(&DEFAULT_SEQUENCE, 8, 1.0, &mut rng).unwrap();
        assert!(!set.is_stale(8, 1.0));
        assert!(set.is_stale(16, 1.0));
        assert!(set.is_stale(8, 2.0));
    }
}
