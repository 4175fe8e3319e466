//! Per-particle state, stored as parallel index-aligned arrays.

use crate::color::fill_radial_colors;
use glam::Vec3;
use rand::Rng;

/// Which GPU-visible arrays changed since the last upload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirtyFlags {
    pub positions: bool,
    pub effects: bool,
    pub colors: bool,
}

impl DirtyFlags {
    pub const ALL: Self = Self {
        positions: true,
        effects: true,
        colors: true,
    };

    pub fn any(&self) -> bool {
        self.positions || self.effects || self.colors
    }
}

/// Allocated once for a fixed particle count and mutated in place.
///
/// Outside the crate the arrays are read-only slices, so their lengths
/// always match.
#[derive(Debug, Clone)]
pub struct ParticleBuffers {
    /// Rendered positions.
    pub(crate) current: Vec<Vec3>,
    /// Anchor of the active transition, or the resting shape when idle.
    pub(crate) source: Vec<Vec3>,
    /// Bezier control points of the active transition.
    pub(crate) swarm: Vec<Vec3>,
    pub(crate) sizes: Vec<f32>,
    pub(crate) opacities: Vec<f32>,
    pub(crate) effect_strengths: Vec<f32>,
    pub(crate) colors: Vec<[f32; 3]>,
    dirty: DirtyFlags,
}

impl ParticleBuffers {
    /// Start every particle at rest on `initial`.
    pub fn new<R: Rng + ?Sized>(
        initial: &[Vec3],
        size_range: [f32; 2],
        shape_size: f32,
        rng: &mut R,
    ) -> Self {
        let count = initial.len();
        let [min, max] = size_range;
        let sizes = (0..count)
            .map(|_| {
                if max > min {
                    rng.random_range(min..max)
                } else {
                    min
                }
            })
            .collect();

        let mut colors = vec![[0.0; 3]; count];
        fill_radial_colors(&mut colors, initial, shape_size);

        Self {
            current: initial.to_vec(),
            source: initial.to_vec(),
            swarm: vec![Vec3::ZERO; count],
            sizes,
            opacities: vec![1.0; count],
            effect_strengths: vec![0.0; count],
            colors,
            dirty: DirtyFlags::ALL,
        }
    }

    pub fn len(&self) -> usize {
        self.current.len()
    }

    /// Rendered positions.
    pub fn current(&self) -> &[Vec3] {
        &self.current
    }

    /// Anchor of the active transition, or the resting shape when idle.
    pub fn source(&self) -> &[Vec3] {
        &self.source
    }

    /// Bezier control points of the active transition.
    pub fn swarm(&self) -> &[Vec3] {
        &self.swarm
    }

    pub fn sizes(&self) -> &[f32] {
        &self.sizes
    }

    pub fn opacities(&self) -> &[f32] {
        &self.opacities
    }

    pub fn effect_strengths(&self) -> &[f32] {
        &self.effect_strengths
    }

    pub fn colors(&self) -> &[[f32; 3]] {
        &self.colors
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    pub fn dirty(&self) -> DirtyFlags {
        self.dirty
    }

    pub fn mark_dirty(&mut self, flags: DirtyFlags) {
        self.dirty.positions |= flags.positions;
        self.dirty.effects |= flags.effects;
        self.dirty.colors |= flags.colors;
    }

    /// Return and clear the pending dirty flags.
    pub fn take_dirty(&mut self) -> DirtyFlags {
        std::mem::take(&mut self.dirty)
    }
}
