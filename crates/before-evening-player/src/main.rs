/// Before Evening player: pseudo-3D racer in a minifb window
///
/// Architecture:
///   assets/  PNG sprite sheets decoded to RGBA
///   engine/  Window loop, keyboard input and the software framebuffer

mod assets;
mod engine;

use anyhow::{Context, Result};
use before_evening_common::{AppConfig, TrackKind};
use before_evening_engine::BeforeEvening;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Drive the Before Evening road, or run it headless
#[derive(Parser, Debug)]
#[command(name = "before-evening", version)]
struct Args {
    /// TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory with background.png and sprites.png
    #[arg(long)]
    assets: Option<PathBuf>,

    /// Track layout (default, straight)
    #[arg(long)]
    track: Option<TrackKind>,

    /// Seed for road decorations, traffic and episode starts
    #[arg(long)]
    seed: Option<u64>,

    /// Number of traffic cars
    #[arg(long)]
    cars: Option<usize>,

    /// Simulate without opening a window
    #[arg(long)]
    headless: bool,

    /// Ticks to simulate in headless mode
    #[arg(long, default_value_t = 3600)]
    ticks: u64,

    #[arg(long)]
    width: Option<u32>,

    #[arg(long)]
    height: Option<u32>,
}

impl Args {
    /// Layer command-line overrides on top of the file config
    fn apply(&self, config: &mut AppConfig) {
        if let Some(dir) = &self.assets {
            config.assets_dir = dir.clone();
        }
        if let Some(track) = self.track {
            config.game.track = track;
        }
        if self.seed.is_some() {
            config.game.seed = self.seed;
        }
        if let Some(cars) = self.cars {
            config.game.total_cars = cars;
        }
        if let Some(width) = self.width {
            config.game.width = width;
        }
        if let Some(height) = self.height {
            config.game.height = height;
        }
        config.headless |= self.headless;
    }
}

fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => AppConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => AppConfig::default(),
    };
    args.apply(&mut config);
    config.game.validate().context("Invalid configuration")?;
    Ok(config)
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(&args)?;

    let default_directive = format!("before_evening={}", config.log_level);
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(default_directive.parse()?))
        .init();

    tracing::info!("Before Evening v{}", env!("CARGO_PKG_VERSION"));

    let game = BeforeEvening::new(config.game.clone()).context("Failed to start game")?;

    if config.headless {
        return run_headless(game, args.ticks);
    }

    let sheets = assets::SpriteSheets::load(&config.assets_dir)?;
    tracing::info!(
        "Loaded sprite sheets from {} ({}x{} background, {}x{} sprites)",
        config.assets_dir.display(),
        sheets.background.width,
        sheets.background.height,
        sheets.sprites.width,
        sheets.sprites.height
    );

    engine::run(game, sheets)
}

/// Hold accelerate for `ticks` physics steps and report where we ended up
fn run_headless(mut game: BeforeEvening, ticks: u64) -> Result<()> {
    tracing::info!("Headless run: {} ticks", ticks);
    game.toggle_skip_render(false);
    game.set_key(before_evening_engine::Key::Up, before_evening_engine::KeyMode::Down);

    let mut last = game.get_state();
    for _ in 0..ticks {
        last = game.simulate_state();
    }

    let stats = game.stats_readout();
    tracing::info!(
        "Final state: x {:.3}, speed {:.3}, next curves {:?}",
        last.player_x,
        last.speed,
        last.next5_curve
    );
    tracing::info!(
        "Speed {} | lap {} | last {} | best {}",
        stats.speed,
        stats.current_lap_time,
        stats.last_lap_time,
        stats.best_lap_time
    );
    Ok(())
}
