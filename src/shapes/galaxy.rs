//! Spiral galaxy.

use super::{ShapeGenerator, ShapeType};
use glam::Vec3;
use rand::{Rng, RngCore};
use std::f32::consts::TAU;

const ARMS: u32 = 4;
const ARM_WIDTH: f32 = 0.6;
const BULGE_FACTOR: f32 = 0.3;
/// Radians of winding from the core to the rim.
const WINDING: f32 = 6.0;
const THICKNESS: f32 = 0.1;

/// Four-armed spiral disk.
///
/// Radii are biased toward the core (`t^1.5`), arms wind further the
/// farther out a point sits, and both arm spread and disk height taper
/// with radius.
pub struct GalaxyShape;

impl ShapeGenerator for GalaxyShape {
    fn shape_type(&self) -> ShapeType {
        ShapeType::Galaxy
    }

    fn generate(&self, count: usize, size: f32, rng: &mut dyn RngCore) -> Vec<Vec3> {
        (0..count)
            .map(|_| {
                let t = rng.random::<f32>().powf(1.5);
                let radius = t * size;
                let arm = rng.random_range(0..ARMS);
                let arm_offset = arm as f32 / ARMS as f32 * TAU;
                let angle = arm_offset + t * WINDING;
                let spread = (rng.random::<f32>() - 0.5) * ARM_WIDTH * (1.0 - t);
                let theta = angle + spread;
                let y = (rng.random::<f32>() - 0.5) * size * THICKNESS * (1.0 - t * BULGE_FACTOR);
                Vec3::new(radius * theta.cos(), y, radius * theta.sin())
            })
            .collect()
    }
}
