//! Particle colouring.
//!
//! Particles are tinted along a cyan to violet gradient keyed on their
//! distance from the origin. Brand colours are authored in sRGB; the
//! gradient and everything sent to the GPU is linear.

use glam::Vec3;

/// Brand cyan (`#4CC9F0`), sRGB.
pub const CYAN: [f32; 3] = [76.0 / 255.0, 201.0 / 255.0, 240.0 / 255.0];
/// Brand violet (`#7B2CBF`), sRGB.
pub const VIOLET: [f32; 3] = [123.0 / 255.0, 44.0 / 255.0, 191.0 / 255.0];

/// Gradients reach full violet at this multiple of the shape size.
pub const GRADIENT_REACH: f32 = 1.2;

/// sRGB transfer function, inverse direction.
#[inline]
pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// sRGB transfer function.
#[inline]
pub fn linear_to_srgb(c: f32) -> f32 {
    if c <= 0.003_130_8 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

/// Convert an sRGB triple to linear.
#[inline]
pub fn to_linear(rgb: [f32; 3]) -> Vec3 {
    Vec3::new(
        srgb_to_linear(rgb[0]),
        srgb_to_linear(rgb[1]),
        srgb_to_linear(rgb[2]),
    )
}

/// Linear colour for a particle at `position`, given the nominal shape size.
#[inline]
pub fn radial_color(position: Vec3, shape_size: f32) -> [f32; 3] {
    let max_radius = shape_size * GRADIENT_REACH;
    let t = (position.length() / max_radius).clamp(0.0, 1.0);
    // Weighted form so both ends reproduce the stops exactly.
    (to_linear(CYAN) * (1.0 - t) + to_linear(VIOLET) * t).to_array()
}

/// Recolour every particle in place.
pub fn fill_radial_colors(colors: &mut [[f32; 3]], positions: &[Vec3], shape_size: f32) {
    for (color, position) in colors.iter_mut().zip(positions) {
        *color = radial_color(*position, shape_size);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: [f32; 3], b: Vec3) {
        assert!(
            Vec3::from_array(a).distance(b) < 1e-6,
            "{a:?} != {b}"
        );
    }

    #[test]
    fn test_center_is_cyan() {
        assert_close(radial_color(Vec3::ZERO, 14.0), to_linear(CYAN));
    }

    #[test]
    fn test_far_points_clamp_to_violet() {
        assert_close(radial_color(Vec3::new(100.0, 0.0, 0.0), 14.0), to_linear(VIOLET));
        assert_close(radial_color(Vec3::new(0.0, 0.0, -500.0), 14.0), to_linear(VIOLET));
    }

    #[test]
    fn test_gradient_midpoint() {
        let c = radial_color(Vec3::new(0.0, 14.0 * GRADIENT_REACH * 0.5, 0.0), 14.0);
        let expected = (to_linear(CYAN) + to_linear(VIOLET)) * 0.5;
        assert_close(c, expected);
    }

    #[test]
    fn test_transfer_functions_invert() {
        for i in 0..=20 {
            let c = i as f32 / 20.0;
            assert!((linear_to_srgb(srgb_to_linear(c)) - c).abs() < 1e-5);
        }
        assert_eq!(srgb_to_linear(0.0), 0.0);
        assert!((srgb_to_linear(1.0) - 1.0).abs() < 1e-6);
        // Mid grey is darker in linear light.
        assert!(srgb_to_linear(0.5) < 0.25);
    }
}
