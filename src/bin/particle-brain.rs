//! Interactive particle brain viewer.

use anyhow::{Context, Result};
use clap::Parser;
use particle_brain::{run, BrainConfig, DeviceProfile, ViewerOptions};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "particle-brain")]
#[command(about = "Morphing particle visualisation", long_about = None)]
struct Cli {
    /// JSON config file. Missing fields take their defaults.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the nominal particle count
    #[arg(short = 'n', long)]
    count: Option<u32>,

    /// Seed for shapes and noise
    #[arg(short, long)]
    seed: Option<u64>,

    /// Treat this machine as low-end
    #[arg(long)]
    low_end: bool,

    /// Treat this machine as mobile
    #[arg(long)]
    mobile: bool,

    /// Disable swirl, noise and idle flow
    #[arg(long)]
    reduced_motion: bool,

    /// Cycle to the next shape every N seconds
    #[arg(long, value_name = "SECONDS")]
    autoplay: Option<f64>,

    #[arg(long, default_value_t = 1280)]
    width: u32,

    #[arg(long, default_value_t = 720)]
    height: u32,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => BrainConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => BrainConfig::default(),
    };
    if let Some(count) = cli.count {
        config.particle_count = count;
    }
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    config.validate().context("Invalid configuration")?;

    let detected = DeviceProfile::detect();
    let profile = DeviceProfile {
        mobile: detected.mobile || cli.mobile,
        low_end: detected.low_end || cli.low_end,
        reduced_motion: detected.reduced_motion || cli.reduced_motion,
    };
    let resolved = config.resolve(&profile);

    let autoplay = match cli.autoplay {
        Some(secs) if secs.is_finite() && secs > 0.0 => Some(Duration::from_secs_f64(secs)),
        Some(secs) => anyhow::bail!("autoplay interval must be positive, got {}", secs),
        None => None,
    };

    let options = ViewerOptions {
        width: cli.width,
        height: cli.height,
        autoplay,
        ..Default::default()
    };

    run(resolved, options).context("Viewer failed")?;
    Ok(())
}
