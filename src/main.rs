use anyhow::Result;
use clap::{Parser, ValueEnum};
use pose_snake::config::AppConfig;
use pose_snake::logging::init_file_logger;
use pose_snake::modes::PlayMode;
use pose_snake::pose::{EmitPolicy, PoseSource, ScriptedPoseSource, StreamPoseSource};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pose_snake")]
#[command(version, about = "Snake steered by raising your hands and knees")]
struct Cli {
    /// JSON configuration file; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Grid width in cells
    #[arg(long)]
    width: Option<u32>,

    /// Grid height in cells
    #[arg(long)]
    height: Option<u32>,

    /// Fit the grid to the terminal (overrides --width/--height)
    #[arg(long)]
    auto_grid: bool,

    /// Milliseconds between simulation steps
    #[arg(long)]
    tick_ms: Option<u64>,

    /// Where body poses come from
    #[arg(long, value_enum, default_value = "off")]
    pose: PoseInput,

    /// JSON Lines pose script, required with --pose script
    #[arg(long)]
    pose_script: Option<PathBuf>,

    /// Pose samples per second
    #[arg(long)]
    pose_fps: Option<u32>,

    /// Minimum keypoint confidence, 0..1
    #[arg(long)]
    threshold: Option<f32>,

    /// Milliseconds a posture must be held before it steers
    #[arg(long)]
    dwell_ms: Option<u64>,

    /// Emit one command per held posture instead of one per sample
    #[arg(long)]
    single_shot: bool,

    /// Seed for food placement
    #[arg(long)]
    seed: Option<u64>,

    /// Append logs to this file (level from RUST_LOG, default info)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PoseInput {
    /// Keyboard only
    Off,
    /// Replay a recorded JSON Lines file
    Script,
    /// Follow JSON Lines frames on standard input
    Stdin,
}

impl Cli {
    /// Load the config file (if any) and apply flag overrides
    fn app_config(&self) -> Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::load(path)?,
            None => AppConfig::default(),
        };

        if let Some(width) = self.width {
            config.game.grid_width = width;
        }
        if let Some(height) = self.height {
            config.game.grid_height = height;
        }
        if self.auto_grid {
            config.auto_grid = true;
        }
        if let Some(tick_ms) = self.tick_ms {
            config.tick_ms = tick_ms;
        }
        if let Some(pose_fps) = self.pose_fps {
            config.pose_fps = pose_fps;
        }
        if let Some(threshold) = self.threshold {
            config.classifier.confidence_threshold = threshold;
        }
        if let Some(dwell_ms) = self.dwell_ms {
            config.classifier.dwell_ms = dwell_ms;
        }
        if self.single_shot {
            config.classifier.emit_policy = EmitPolicy::Once;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }

        config.ensure_valid()?;
        Ok(config)
    }

    fn pose_source(&self, config: &AppConfig) -> Result<Option<Box<dyn PoseSource>>> {
        let source: Box<dyn PoseSource> = match self.pose {
            PoseInput::Off => return Ok(None),
            PoseInput::Script => {
                let path = self
                    .pose_script
                    .as_ref()
                    .ok_or_else(|| anyhow::anyhow!("--pose script needs --pose-script <FILE>"))?;
                Box::new(ScriptedPoseSource::load(path, config.loop_script)?)
            }
            PoseInput::Stdin => Box::new(StreamPoseSource::stdin()),
        };
        Ok(Some(source))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.log_file {
        init_file_logger(path)?;
    }

    let config = cli.app_config()?;
    let pose_source = cli.pose_source(&config)?;

    let mut play_mode = PlayMode::new(config, pose_source);
    play_mode.run().await?;

    Ok(())
}
