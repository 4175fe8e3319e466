//! Particle system configuration.
//!
//! [`BrainConfig`] holds every tunable of the visualisation. A host describes
//! itself once with a [`DeviceProfile`], and [`BrainConfig::resolve`] turns the
//! pair into the immutable [`ResolvedConfig`] the scene reads for the rest of
//! the session.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Background colour of the scene (`#030304`), sRGB.
pub const BACKGROUND: [f32; 3] = [3.0 / 255.0, 3.0 / 255.0, 4.0 / 255.0];

/// Environment variable that requests reduced motion.
pub const REDUCED_MOTION_ENV: &str = "PARTICLE_BRAIN_REDUCED_MOTION";

/// Errors that can occur while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid config value: {0}")]
    Invalid(String),
}

/// Tunables for shapes, transitions, idle flow and pointer interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrainConfig {
    /// Nominal particle count before device scaling.
    pub particle_count: u32,
    /// Radius of the sphere and half-extent of the other shapes.
    pub shape_size: f32,
    /// How far swarm waypoints bow out, relative to `shape_size`.
    pub swarm_distance_factor: f32,
    pub swirl_factor: f32,
    pub noise_frequency: f32,
    pub noise_time_scale: f32,
    pub noise_max_strength: f32,
    pub morph_duration_ms: u64,
    /// Min/max point sprite size in world units.
    pub particle_size_range: [f32; 2],
    pub idle_flow_strength: f32,
    pub idle_flow_speed: f32,
    /// Shrink applied to sprites at peak effect strength.
    pub morph_size_factor: f32,
    /// Extra brightness applied at peak effect strength.
    pub morph_brightness_factor: f32,
    pub interaction_radius: f32,
    pub interaction_strength: f32,
    /// Engagement gained per frame while the pointer is active.
    pub interaction_smoothness: f32,
    /// Engagement lost per frame once the pointer leaves.
    pub interaction_fade_speed: f32,
    /// Distance along the camera ray at which the pointer is placed.
    pub pointer_depth: f32,
    /// Seed for shapes, noise and jitter. `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for BrainConfig {
    fn default() -> Self {
        Self {
            particle_count: 6000,
            shape_size: 14.0,
            swarm_distance_factor: 1.5,
            swirl_factor: 4.0,
            noise_frequency: 0.1,
            noise_time_scale: 0.04,
            noise_max_strength: 2.8,
            morph_duration_ms: 4000,
            particle_size_range: [0.12, 0.35],
            idle_flow_strength: 0.25,
            idle_flow_speed: 0.08,
            morph_size_factor: 0.5,
            morph_brightness_factor: 0.6,
            interaction_radius: 8.0,
            interaction_strength: 2.5,
            interaction_smoothness: 0.15,
            interaction_fade_speed: 0.05,
            pointer_depth: 20.0,
            seed: None,
        }
    }
}

impl BrainConfig {
    /// Load a config from a JSON file. Missing fields take their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the config as pretty JSON.
    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), text)?;
        Ok(())
    }

    pub fn morph_duration(&self) -> Duration {
        Duration::from_millis(self.morph_duration_ms)
    }

    /// Reject values the simulation cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.particle_count < 2 {
            return Err(ConfigError::Invalid(format!(
                "particle_count must be at least 2, got {}",
                self.particle_count
            )));
        }
        if !(self.shape_size.is_finite() && self.shape_size > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "shape_size must be positive, got {}",
                self.shape_size
            )));
        }
        if self.morph_duration_ms == 0 {
            return Err(ConfigError::Invalid("morph_duration_ms must be non-zero".into()));
        }
        let [min, max] = self.particle_size_range;
        if !(min > 0.0 && min <= max) {
            return Err(ConfigError::Invalid(format!(
                "particle_size_range must satisfy 0 < min <= max, got [{min}, {max}]"
            )));
        }
        if !(self.interaction_radius > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "interaction_radius must be positive, got {}",
                self.interaction_radius
            )));
        }
        if self.interaction_smoothness <= 0.0 || self.interaction_fade_speed <= 0.0 {
            return Err(ConfigError::Invalid(
                "interaction_smoothness and interaction_fade_speed must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Combine with host capabilities into the session configuration.
    pub fn resolve(&self, device: &DeviceProfile) -> ResolvedConfig {
        let class = device.class();
        let scale = match class {
            DeviceClass::LowEnd => 0.3,
            DeviceClass::Mobile => 0.5,
            DeviceClass::Desktop => 1.0,
        };
        let particle_count = ((self.particle_count as f32 * scale).floor() as usize).max(2);

        let frame_interval = match class {
            DeviceClass::LowEnd => Duration::from_secs_f64(1.0 / 30.0),
            DeviceClass::Mobile => Duration::from_secs_f64(1.0 / 45.0),
            DeviceClass::Desktop => Duration::from_secs_f64(1.0 / 60.0),
        };

        let mut brain = self.clone();
        brain.particle_count = particle_count as u32;
        if device.reduced_motion {
            brain.swirl_factor = 0.0;
            brain.noise_max_strength = 0.0;
            brain.idle_flow_strength = 0.0;
        }

        let touch_like = class != DeviceClass::Desktop;
        ResolvedConfig {
            brain,
            device: *device,
            particle_count,
            frame_interval,
            sample_count: if touch_like { 1 } else { 4 },
            dpr_cap: if touch_like { 1.0 } else { 1.5 },
            brightness: if touch_like { 1.25 } else { 1.55 },
            exposure: if touch_like { 1.2 } else { 1.35 },
        }
    }
}

/// Broad performance class derived from a [`DeviceProfile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceClass {
    Desktop,
    Mobile,
    LowEnd,
}

/// Host capability signals, sampled once at startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceProfile {
    pub mobile: bool,
    pub low_end: bool,
    pub reduced_motion: bool,
}

impl DeviceProfile {
    /// Probe the running machine.
    ///
    /// Two or fewer hardware threads count as low-end; Android and iOS
    /// builds count as mobile; reduced motion is requested through
    /// [`REDUCED_MOTION_ENV`].
    pub fn detect() -> Self {
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4);
        let reduced_motion = std::env::var(REDUCED_MOTION_ENV)
            .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let profile = Self {
            mobile: cfg!(any(target_os = "android", target_os = "ios")),
            low_end: cores <= 2,
            reduced_motion,
        };
        log::debug!("Detected device profile {:?} ({} cores)", profile, cores);
        profile
    }

    pub fn class(&self) -> DeviceClass {
        if self.low_end {
            DeviceClass::LowEnd
        } else if self.mobile {
            DeviceClass::Mobile
        } else {
            DeviceClass::Desktop
        }
    }
}

/// Session configuration. Produced once, read-only afterwards.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Effective tunables (device-scaled count, reduced-motion overrides).
    pub brain: BrainConfig,
    pub device: DeviceProfile,
    pub particle_count: usize,
    /// Minimum time between executed frames.
    pub frame_interval: Duration,
    /// MSAA sample count; 1 disables antialiasing.
    pub sample_count: u32,
    /// Upper bound for the device pixel ratio.
    pub dpr_cap: f64,
    pub brightness: f32,
    pub exposure: f32,
}

impl ResolvedConfig {
    pub fn antialias(&self) -> bool {
        self.sample_count > 1
    }
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        BrainConfig::default().resolve(&DeviceProfile::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(BrainConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = BrainConfig {
            particle_count: 1,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let config = BrainConfig {
            particle_size_range: [0.5, 0.1],
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = BrainConfig {
            shape_size: f32::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_resolve_desktop() {
        let resolved = BrainConfig::default().resolve(&DeviceProfile::default());
        assert_eq!(resolved.particle_count, 6000);
        assert!(resolved.antialias());
        assert_eq!(resolved.dpr_cap, 1.5);
        assert!((resolved.frame_interval.as_secs_f64() * 1000.0 - 16.67).abs() < 0.01);
    }

    #[test]
    fn test_resolve_mobile_and_low_end() {
        let mobile = DeviceProfile {
            mobile: true,
            ..Default::default()
        };
        let resolved = BrainConfig::default().resolve(&mobile);
        assert_eq!(resolved.particle_count, 3000);
        assert!(!resolved.antialias());
        assert_eq!(resolved.dpr_cap, 1.0);
        assert!((resolved.frame_interval.as_secs_f64() * 1000.0 - 22.22).abs() < 0.01);

        // Low-end wins over mobile.
        let low_end = DeviceProfile {
            mobile: true,
            low_end: true,
            ..Default::default()
        };
        let resolved = BrainConfig::default().resolve(&low_end);
        assert_eq!(resolved.particle_count, 1800);
        assert!((resolved.frame_interval.as_secs_f64() * 1000.0 - 33.33).abs() < 0.01);
    }

    #[test]
    fn test_reduced_motion_disables_perturbation() {
        let profile = DeviceProfile {
            reduced_motion: true,
            ..Default::default()
        };
        let resolved = BrainConfig::default().resolve(&profile);
        assert_eq!(resolved.brain.swirl_factor, 0.0);
        assert_eq!(resolved.brain.noise_max_strength, 0.0);
        assert_eq!(resolved.brain.idle_flow_strength, 0.0);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: BrainConfig =
            serde_json::from_str(r#"{ "particle_count": 800, "seed": 7 }"#).unwrap();
        assert_eq!(config.particle_count, 800);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.shape_size, 14.0);
    }
}
