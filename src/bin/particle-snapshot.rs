//! Render one settled shape to a PNG without opening a window.

use anyhow::{Context, Result};
use clap::Parser;
use particle_brain::{
    BrainConfig, DeviceProfile, FrameOutcome, ParticleScene, ShapeType, SnapshotRenderer,
};
use std::path::PathBuf;
use std::time::Duration;

/// Idle frames rendered after the morph settles.
const SETTLE_FRAMES: u32 = 30;

#[derive(Parser)]
#[command(name = "particle-snapshot")]
#[command(about = "Render a particle shape to PNG", long_about = None)]
struct Cli {
    /// Output PNG path
    output: PathBuf,

    /// Shape to settle on (sphere, galaxy, wave, cube)
    #[arg(long, default_value = "galaxy")]
    shape: String,

    /// JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(long, default_value_t = 1280)]
    width: u32,

    #[arg(long, default_value_t = 720)]
    height: u32,

    #[arg(short, long, default_value_t = 1)]
    seed: u64,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let shape = ShapeType::from_str(&cli.shape).with_context(|| {
        format!(
            "Unknown shape: {}. Available: sphere, galaxy, wave, cube",
            cli.shape
        )
    })?;

    let mut config = match &cli.config {
        Some(path) => BrainConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => BrainConfig::default(),
    };
    config.seed = Some(cli.seed);
    let resolved = config.resolve(&DeviceProfile::default());

    let mut scene = ParticleScene::new(resolved).context("Failed to build scene")?;
    scene.resize(cli.width, cli.height, 1.0);

    let index = scene
        .controller()
        .shapes()
        .index_of(shape)
        .context("Shape is not part of the sequence")?;
    scene.morph_to_shape(index as i64);

    let step = scene.config().frame_interval;
    let mut now = Duration::ZERO;
    let mut settled = 0;
    while settled < SETTLE_FRAMES {
        if let FrameOutcome::Updated(_) = scene.frame(now) {
            if !scene.controller().is_morphing() {
                settled += 1;
            }
        }
        now += step;
    }
    log::info!(
        "Settled on {} after {:.2} s of simulated time",
        shape.name(),
        now.as_secs_f64()
    );

    let image = pollster::block_on(async {
        let mut renderer = SnapshotRenderer::new(&scene, cli.width, cli.height).await?;
        log::info!("Rendering on {}", renderer.adapter_info().name);
        renderer.render(&mut scene)
    })
    .context("Failed to render snapshot")?;

    image
        .save(&cli.output)
        .with_context(|| format!("Failed to write {}", cli.output.display()))?;
    println!("Wrote {}", cli.output.display());
    Ok(())
}
