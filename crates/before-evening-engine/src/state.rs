//! Simulation state and the fixed-timestep physics step
//!
//! `SimulationState::update` advances the player, traffic, lap clock and
//! parallax offsets by one tick. Rates are derived from
//! `max_speed = segment_length / step`, so one nominal tick can never move
//! the player more than one segment; collision checks only look at the
//! player's own segment and depend on that.

use before_evening_common::{ConfigError, GameConfig, Result};
use rand::Rng;
use serde::Serialize;

use crate::input::InputKeys;
use crate::road;
use crate::segment::Track;
use crate::sprites;
use crate::stats::{LapStats, LapTick};
use crate::traffic::{self, PlayerView};
use crate::util;

/// Timestep used while rendering is skipped to fast-forward training
pub const SKIP_RENDER_STEP: f64 = 0.0001;

/// The state exposed to outside consumers after every tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateUpdate {
    pub player_x: f64,
    /// Fraction of top speed, 0..1
    pub speed: f64,
    /// Curvature of the five segments ahead of the player
    pub next5_curve: [f64; 5],
}

/// Result of evaluating a hypothetical input without committing it
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionPreview {
    pub keys: InputKeys,
    pub player_x: f64,
    /// Fraction of top speed, 0..1
    pub speed: f64,
}

pub struct SimulationState {
    /// Physics ticks per second at the nominal step
    pub fps: u32,
    /// Length of one tick in seconds
    pub step: f64,
    pub width: f64,
    pub height: f64,
    /// Centrifugal pull multiplier on curves
    pub centrifugal: f64,
    pub sky_speed: f64,
    pub hill_speed: f64,
    pub tree_speed: f64,
    pub sky_offset: f64,
    pub hill_offset: f64,
    pub tree_offset: f64,
    /// Canvas height relative to a 480px reference
    pub resolution: f64,
    /// Half the road width
    pub road_width: f64,
    pub segment_length: f64,
    pub rumble_length: usize,
    pub lanes: u32,
    pub field_of_view: f64,
    pub camera_height: f64,
    /// Distance from the camera to the projection plane
    pub camera_depth: f64,
    pub draw_distance: usize,
    /// Player distance ahead of the camera
    pub player_z: f64,
    pub fog_density: f64,

    /// Lateral offset from the road center in half-widths, on-road within -1..1
    pub player_x: f64,
    /// Camera z along the track; the player is `player_z` further ahead
    pub position: f64,
    pub speed: f64,
    pub max_speed: f64,
    pub accel: f64,
    /// Braking rate (negative)
    pub breaking: f64,
    /// Natural deceleration while coasting (negative)
    pub decel: f64,
    pub off_road_decel: f64,
    /// Off-road deceleration stops applying below this speed
    pub off_road_limit: f64,
    /// Set once the player has started a timed lap
    pub passed_from_start_line: bool,
    pub keys: InputKeys,
    skip_render: bool,

    pub track: Track,
    pub stats: LapStats,
}

impl SimulationState {
    /// Validate `config`, derive the camera and speed constants, and lay out the road
    pub fn new<R: Rng + ?Sized>(config: &GameConfig, rng: &mut R) -> Result<Self> {
        config.validate()?;
        let mut state = Self::derive(config, Track::default());
        state.track = road::build_track(config, state.player_z, state.max_speed, rng);
        Ok(state)
    }

    /// Build around an already laid out track. The track must have segments
    /// of the configured length, or one tick at top speed could skip a segment.
    pub fn with_track(config: &GameConfig, track: Track) -> Result<Self> {
        config.validate()?;
        if track.is_empty() {
            return Err(ConfigError::EmptyTrack);
        }
        if track.segment_length != config.segment_length {
            return Err(ConfigError::SegmentLengthMismatch {
                track: track.segment_length,
                config: config.segment_length,
            });
        }
        Ok(Self::derive(config, track))
    }

    fn derive(config: &GameConfig, track: Track) -> Self {
        let step = 1.0 / config.fps as f64;
        let camera_depth = 1.0 / (config.field_of_view / 2.0).to_radians().tan();
        let max_speed = config.segment_length / step;

        Self {
            fps: config.fps,
            step,
            width: config.width as f64,
            height: config.height as f64,
            centrifugal: config.centrifugal,
            sky_speed: config.sky_speed,
            hill_speed: config.hill_speed,
            tree_speed: config.tree_speed,
            sky_offset: 0.0,
            hill_offset: 0.0,
            tree_offset: 0.0,
            resolution: config.height as f64 / 480.0,
            road_width: config.road_width,
            segment_length: config.segment_length,
            rumble_length: config.rumble_length,
            lanes: config.lanes,
            field_of_view: config.field_of_view,
            camera_height: config.camera_height,
            camera_depth,
            draw_distance: config.draw_distance,
            player_z: config.camera_height * camera_depth,
            fog_density: config.fog_density,
            player_x: 0.0,
            position: 0.0,
            speed: 0.0,
            max_speed,
            accel: max_speed / 5.0,
            breaking: -max_speed,
            decel: -max_speed / 5.0,
            off_road_decel: -max_speed / 2.0,
            off_road_limit: max_speed / 4.0,
            passed_from_start_line: false,
            keys: InputKeys::default(),
            skip_render: false,
            track,
            stats: LapStats::new(),
        }
    }

    /// Re-apply display and camera options to a running instance
    pub fn apply_view_options(&mut self, config: &GameConfig) {
        self.width = config.width as f64;
        self.height = config.height as f64;
        self.lanes = config.lanes;
        self.road_width = config.road_width;
        self.camera_height = config.camera_height;
        self.draw_distance = config.draw_distance;
        self.fog_density = config.fog_density;
        self.field_of_view = config.field_of_view;
        self.camera_depth = 1.0 / (config.field_of_view / 2.0).to_radians().tan();
        self.player_z = self.camera_height * self.camera_depth;
        self.resolution = self.height / 480.0;
        self.centrifugal = config.centrifugal;
        self.sky_speed = config.sky_speed;
        self.hill_speed = config.hill_speed;
        self.tree_speed = config.tree_speed;
    }

    pub fn skip_render(&self) -> bool {
        self.skip_render
    }

    /// Rendering off shrinks the timestep so headless training runs fast
    pub fn set_skip_render(&mut self, skip: bool) {
        self.skip_render = skip;
        self.step = if skip { SKIP_RENDER_STEP } else { 1.0 / self.fps as f64 };
    }

    pub fn speed_percent(&self) -> f64 {
        self.speed / self.max_speed
    }

    /// Speed after one tick of the given input, before off-road and collision effects
    fn integrate_speed(&self, keys: &InputKeys, speed: f64, dt: f64) -> f64 {
        let rate = if keys.faster {
            self.accel
        } else if keys.slower {
            self.breaking
        } else {
            self.decel
        };
        util::accelerate(speed, rate, dt)
    }

    /// Lateral position after steering input and centrifugal drift
    fn steer(&self, keys: &InputKeys, player_x: f64, speed: f64, curve: f64, dt: f64) -> f64 {
        let speed_percent = (speed / self.max_speed).min(1.0);
        // At top speed the car crosses from -1 to 1 in one second
        let dx = dt * 2.0 * speed_percent;
        let mut x = player_x;
        if keys.left {
            x -= dx;
        } else if keys.right {
            x += dx;
        }
        x - dx * speed_percent * curve * self.centrifugal
    }

    /// Curvature one to five segments ahead of the player
    pub fn next5_curve(&self) -> [f64; 5] {
        let base = self.position + self.player_z;
        std::array::from_fn(|i| {
            self.track
                .find_segment(base + (i + 1) as f64 * self.segment_length)
                .curve
        })
    }

    pub fn snapshot(&self) -> StateUpdate {
        StateUpdate {
            player_x: self.player_x,
            speed: self.speed_percent(),
            next5_curve: self.next5_curve(),
        }
    }

    /// Advance the simulation by `dt` seconds
    pub fn update(&mut self, dt: f64) -> StateUpdate {
        let track_length = self.track.track_length;
        let player_segment = self.track.segment_index(self.position + self.player_z);
        let player_w = sprites::PLAYER_STRAIGHT.road_width();
        let start_position = self.position;

        let player = PlayerView {
            segment: player_segment,
            x: self.player_x,
            speed: self.speed,
            width: player_w,
        };
        traffic::update_cars(&mut self.track, dt, &player, self.max_speed, self.draw_distance);

        self.position = util::increase(self.position, dt * self.speed, track_length);

        // Wrapping below the tick's starting point means the start line was crossed
        let crossed_line = self.position < start_position;
        let lap_was_running = self.passed_from_start_line;
        self.passed_from_start_line =
            self.passed_from_start_line || start_position == 0.0 || crossed_line;

        self.speed = self.integrate_speed(&self.keys, self.speed, dt);

        let curve = self.track.segments[player_segment].curve;
        self.player_x = self.steer(&self.keys, self.player_x, self.speed, curve, dt);

        let mut collided = false;
        if self.player_x < -1.0 || self.player_x > 1.0 {
            if self.speed > self.off_road_limit {
                self.speed = util::accelerate(self.speed, self.off_road_decel, dt);
            }

            let segment = &self.track.segments[player_segment];
            for sprite in &segment.sprites {
                let sprite_w = sprite.source.road_width();
                let side = if sprite.offset > 0.0 { 1.0 } else { -1.0 };
                if util::overlap(
                    self.player_x,
                    player_w,
                    sprite.offset + sprite_w / 2.0 * side,
                    sprite_w,
                    1.0,
                ) {
                    // Stop in front of the sprite, at the front of its segment
                    self.speed = self.max_speed / 5.0;
                    self.position = util::increase(segment.p1.z, -self.player_z, track_length);
                    collided = true;
                    tracing::debug!(segment = player_segment, "Hit roadside sprite");
                    break;
                }
            }
        }

        if !collided {
            let segment = &self.track.segments[player_segment];
            for &id in &segment.cars {
                let car = &self.track.cars[id];
                if self.speed > car.speed
                    && util::overlap(self.player_x, player_w, car.offset, car.sprite.road_width(), 0.8)
                {
                    self.speed = car.speed * (car.speed / self.speed);
                    self.position = util::increase(car.z, -self.player_z, track_length);
                    tracing::debug!(segment = player_segment, car = id, "Rear-ended traffic");
                    break;
                }
            }
        }

        self.player_x = util::limit(self.player_x, -3.0, 3.0);
        self.speed = util::limit(self.speed, 0.0, self.max_speed);

        let travelled = (self.position - start_position) / self.segment_length;
        self.sky_offset = util::increase(self.sky_offset, self.sky_speed * curve * travelled, 1.0);
        self.hill_offset = util::increase(self.hill_offset, self.hill_speed * curve * travelled, 1.0);
        self.tree_offset = util::increase(self.tree_offset, self.tree_speed * curve * travelled, 1.0);

        let tick = if !self.passed_from_start_line {
            LapTick { dt, increase_current_lap_time: false, refresh_lap: false }
        } else {
            LapTick {
                dt,
                increase_current_lap_time: true,
                refresh_lap: crossed_line && lap_was_running,
            }
        };
        self.stats.add_time(tick);
        self.stats.update_speed(self.speed);

        self.snapshot()
    }

    /// Evaluate the speed and steering a key combination would produce this
    /// tick, using the same formulas as `update`, without touching the state
    pub fn test_action(&self, keys: InputKeys) -> ActionPreview {
        let dt = self.step;
        let curve = self.track.find_segment(self.position + self.player_z).curve;
        let speed = self.integrate_speed(&keys, self.speed, dt);
        let player_x = self.steer(&keys, self.player_x, speed, curve, dt);
        ActionPreview {
            keys,
            player_x,
            speed: util::limit(speed, 0.0, self.max_speed) / self.max_speed,
        }
    }

    /// Reset the dynamic player, parallax and lap state. The road stays.
    pub fn randomize_state<R: Rng + ?Sized>(&mut self, randomize_start: bool, rng: &mut R) {
        self.sky_offset = 0.0;
        self.hill_offset = 0.0;
        self.tree_offset = 0.0;
        self.player_x = 0.0;
        self.position = 0.0;
        self.speed = 0.0;
        self.passed_from_start_line = false;
        self.keys = InputKeys::default();
        self.stats.reset();

        if randomize_start {
            self.player_x = rng.gen::<f64>() * 2.0 - 1.0;
            self.position = rng.gen::<f64>() * self.track.track_length;
            self.speed = rng.gen::<f64>() * self.max_speed;
        }
        tracing::debug!(
            randomize_start,
            position = self.position,
            "Simulation state reset"
        );
    }
}
