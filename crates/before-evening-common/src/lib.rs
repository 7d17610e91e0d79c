//! Configuration types shared across Before Evening crates

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Segment length must be positive, got {0}")]
    InvalidSegmentLength(f64),

    #[error("Rumble length must be at least one segment")]
    ZeroRumbleLength,

    #[error("Draw distance must be at least one segment")]
    ZeroDrawDistance,

    #[error("Field of view must be within (0, 180) degrees, got {0}")]
    InvalidFieldOfView(f64),

    #[error("Update rate must be at least 1 fps")]
    ZeroFps,

    #[error("Canvas size must be non-zero, got {0}x{1}")]
    InvalidCanvasSize(u32, u32),

    #[error("Lane count must be at least one")]
    ZeroLanes,

    #[error("{0} must be positive, got {1}")]
    NonPositive(&'static str, f64),

    #[error("Track has no segments")]
    EmptyTrack,

    #[error("Track segment length {track} does not match configured {config}")]
    SegmentLengthMismatch { track: f64, config: f64 },

    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Which lap layout the road builder lays out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    /// Hills, S-curves, bumps and a downhill run back to the start line
    #[default]
    Default,
    /// Flat straights around a block of bumps
    Straight,
}

impl TrackKind {
    pub fn name(&self) -> &str {
        match self {
            TrackKind::Default => "default",
            TrackKind::Straight => "straight",
        }
    }
}

impl std::str::FromStr for TrackKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "default" => Ok(TrackKind::Default),
            "straight" => Ok(TrackKind::Straight),
            other => Err(format!("unknown track kind '{}'", other)),
        }
    }
}

/// Camera, road and tuning options for one game instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Logical canvas width
    pub width: u32,
    /// Logical canvas height
    pub height: u32,
    /// Physics ticks per second
    pub fps: u32,
    pub lanes: u32,
    /// Half the road width, the road spans -road_width..+road_width
    pub road_width: f64,
    /// Camera height above the road surface
    pub camera_height: f64,
    /// Number of segments drawn ahead of the camera
    pub draw_distance: usize,
    /// Exponential fog density
    pub fog_density: f64,
    /// Field of view in degrees
    pub field_of_view: f64,
    pub segment_length: f64,
    /// Segments per light/dark rumble band
    pub rumble_length: usize,
    /// Centrifugal pull multiplier on curves
    pub centrifugal: f64,
    pub sky_speed: f64,
    pub hill_speed: f64,
    pub tree_speed: f64,
    /// Traffic cars seeded on road build
    pub total_cars: usize,
    pub track: TrackKind,
    /// Fixed RNG seed, entropy when absent
    pub seed: Option<u64>,
    /// Scatter billboards and plants along the road
    pub roadside_sprites: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 768,
            fps: 60,
            lanes: 3,
            road_width: 2000.0,
            camera_height: 1000.0,
            draw_distance: 300,
            fog_density: 5.0,
            field_of_view: 100.0,
            segment_length: 200.0,
            rumble_length: 3,
            centrifugal: 0.3,
            sky_speed: 0.001,
            hill_speed: 0.002,
            tree_speed: 0.003,
            total_cars: 0,
            track: TrackKind::Default,
            seed: None,
            roadside_sprites: false,
        }
    }
}

impl GameConfig {
    /// Reject configurations that would divide by zero or loop forever
    /// once the simulation starts ticking.
    pub fn validate(&self) -> Result<()> {
        if !(self.segment_length > 0.0) {
            return Err(ConfigError::InvalidSegmentLength(self.segment_length));
        }
        if self.rumble_length == 0 {
            return Err(ConfigError::ZeroRumbleLength);
        }
        if self.draw_distance == 0 {
            return Err(ConfigError::ZeroDrawDistance);
        }
        if !(self.field_of_view > 0.0 && self.field_of_view < 180.0) {
            return Err(ConfigError::InvalidFieldOfView(self.field_of_view));
        }
        if self.fps == 0 {
            return Err(ConfigError::ZeroFps);
        }
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::InvalidCanvasSize(self.width, self.height));
        }
        if self.lanes == 0 {
            return Err(ConfigError::ZeroLanes);
        }
        if !(self.road_width > 0.0) {
            return Err(ConfigError::NonPositive("Road width", self.road_width));
        }
        if !(self.camera_height > 0.0) {
            return Err(ConfigError::NonPositive("Camera height", self.camera_height));
        }
        Ok(())
    }

    /// Whether switching from `self` to `other` requires laying out the road
    /// again. Traffic speeds scale with top speed, so the tick rate counts.
    pub fn needs_road_rebuild(&self, other: &GameConfig) -> bool {
        self.segment_length != other.segment_length
            || self.fps != other.fps
            || self.rumble_length != other.rumble_length
            || self.track != other.track
            || self.total_cars != other.total_cars
            || self.roadside_sprites != other.roadside_sprites
            || self.seed != other.seed
    }
}

/// Application-wide configuration for the player binary
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub game: GameConfig,
    /// Directory holding background.png and sprites.png
    pub assets_dir: PathBuf,
    pub log_level: String,
    /// Simulate without opening a window
    pub headless: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            game: GameConfig::default(),
            assets_dir: PathBuf::from("images"),
            log_level: "info".to_string(),
            headless: false,
        }
    }
}

impl AppConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(text)?;
        config.game.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }
}
