//! WGSL source generation.
//!
//! Tunables that never change during a session are baked into the shader
//! text as `const` declarations instead of travelling in a uniform buffer.

use crate::config::ResolvedConfig;

const PARTICLE_BODY: &str = include_str!("shaders/particle.wgsl");
const TONEMAP_BODY: &str = include_str!("shaders/tonemap.wgsl");

/// Sprite fragments below this alpha are discarded.
pub const ALPHA_CUTOFF: f32 = 0.05;

/// Pixel diameter of a unit-size sprite one world unit from the camera.
pub const POINT_SCALE: f32 = 400.0;

/// Values baked into the generated shaders.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShaderConstants {
    /// Sprite shrink at full effect strength.
    pub morph_size_factor: f32,
    /// Extra brightness at full effect strength.
    pub morph_brightness_factor: f32,
    pub brightness: f32,
    pub exposure: f32,
    pub point_scale: f32,
    pub alpha_cutoff: f32,
    /// Apply the sRGB transfer in the tonemap pass. Off when the output
    /// format encodes on store.
    pub encode_srgb: bool,
}

impl ShaderConstants {
    /// Adjust for the texture format the tonemap pass writes to.
    pub fn for_output(self, format: wgpu::TextureFormat) -> Self {
        Self {
            encode_srgb: !format.is_srgb(),
            ..self
        }
    }
}

impl From<&ResolvedConfig> for ShaderConstants {
    fn from(config: &ResolvedConfig) -> Self {
        Self {
            morph_size_factor: config.brain.morph_size_factor,
            morph_brightness_factor: config.brain.morph_brightness_factor,
            brightness: config.brightness,
            exposure: config.exposure,
            point_scale: POINT_SCALE,
            alpha_cutoff: ALPHA_CUTOFF,
            encode_srgb: true,
        }
    }
}

impl Default for ShaderConstants {
    fn default() -> Self {
        Self::from(&ResolvedConfig::default())
    }
}

/// Format a float as a WGSL `f32` literal.
fn literal(value: f32) -> String {
    if value.is_finite() {
        format!("{value:?}")
    } else {
        "0.0".to_string()
    }
}

fn declare(out: &mut String, name: &str, value: f32) {
    out.push_str("const ");
    out.push_str(name);
    out.push_str(": f32 = ");
    out.push_str(&literal(value));
    out.push_str(";\n");
}

fn declare_bool(out: &mut String, name: &str, value: bool) {
    out.push_str("const ");
    out.push_str(name);
    out.push_str(": bool = ");
    out.push_str(if value { "true" } else { "false" });
    out.push_str(";\n");
}

/// Point-sprite shader for the particle pass.
pub fn particle_shader(constants: &ShaderConstants) -> String {
    let mut source = String::with_capacity(PARTICLE_BODY.len() + 256);
    declare(&mut source, "MORPH_SIZE_FACTOR", constants.morph_size_factor);
    declare(
        &mut source,
        "MORPH_BRIGHTNESS_FACTOR",
        constants.morph_brightness_factor,
    );
    declare(&mut source, "BRIGHTNESS", constants.brightness);
    declare(&mut source, "POINT_SCALE", constants.point_scale);
    declare(&mut source, "ALPHA_CUTOFF", constants.alpha_cutoff);
    source.push('\n');
    source.push_str(PARTICLE_BODY);
    source
}

/// Fullscreen tone-mapping shader that resolves the scene to the output.
pub fn tonemap_shader(constants: &ShaderConstants) -> String {
    let mut source = String::with_capacity(TONEMAP_BODY.len() + 64);
    declare(&mut source, "EXPOSURE", constants.exposure);
    declare_bool(&mut source, "ENCODE_SRGB", constants.encode_srgb);
    source.push('\n');
    source.push_str(TONEMAP_BODY);
    source
}
