//! Game instance: simulation state, renderer, RNG and the frame loop
//!
//! This is the surface external collaborators talk to. A training harness
//! calls `dispatch_action`, `simulate_state`, `test_action` and
//! `reset_game`; an interactive host feeds key transitions and calls
//! `frame` once per displayed frame.

use before_evening_common::{GameConfig, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::input::{Action, ActionDispatcher, InputKeys, Key, KeyMode};
use crate::render::Renderer;
use crate::state::{ActionPreview, SimulationState, StateUpdate};
use crate::stats::{FrameCounter, StatsReadout};
use crate::surface::Surface;

/// Longest wall-clock gap one frame may catch up on
const MAX_FRAME_TIME: f64 = 1.0;

pub struct BeforeEvening {
    config: GameConfig,
    state: SimulationState,
    renderer: Renderer,
    rng: StdRng,
    /// Wall-clock time not yet consumed by physics ticks
    accumulator: f64,
    frames: FrameCounter,
    dispatcher: ActionDispatcher,
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// The renderer's bounce stream, kept apart from the simulation's
fn renderer_for(seed: Option<u64>) -> Renderer {
    Renderer::new(seed.map(|seed| seed.wrapping_add(1)))
}

impl BeforeEvening {
    pub fn new(config: GameConfig) -> Result<Self> {
        let mut rng = make_rng(config.seed);
        let state = SimulationState::new(&config, &mut rng)?;
        tracing::info!(
            "Game ready: {}x{}, {} segments, top speed {:.0}",
            config.width,
            config.height,
            state.track.len(),
            state.max_speed
        );
        let renderer = renderer_for(config.seed);
        Ok(Self {
            config,
            state,
            renderer,
            rng,
            accumulator: 0.0,
            frames: FrameCounter::new(),
            dispatcher: ActionDispatcher::new(),
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut SimulationState {
        &mut self.state
    }

    /// Re-apply options. The road is only rebuilt when its layout depends
    /// on something that changed; otherwise the existing lap is kept.
    pub fn reset(&mut self, config: GameConfig) -> Result<()> {
        config.validate()?;
        let skip_render = self.state.skip_render();

        let rebuild = self.state.track.is_empty() || self.config.needs_road_rebuild(&config);
        tracing::info!(rebuild, "Resetting game");
        if rebuild {
            self.rng = make_rng(config.seed);
            self.renderer = renderer_for(config.seed);
            let mut state = SimulationState::new(&config, &mut self.rng)?;
            state.stats = std::mem::take(&mut self.state.stats);
            self.state = state;
        } else {
            self.state.apply_view_options(&config);
            self.state.randomize_state(false, &mut self.rng);
        }

        self.state.stats.reset();
        self.state.set_skip_render(skip_render);
        self.accumulator = 0.0;
        self.dispatcher.clear();
        self.config = config;
        Ok(())
    }

    /// Reset dynamic state between episodes, keeping the road
    pub fn reset_game(&mut self, randomize_start: bool) {
        self.state.randomize_state(randomize_start, &mut self.rng);
        self.dispatcher.clear();
        self.accumulator = 0.0;
    }

    /// Snapshot of the observable state without ticking
    pub fn get_state(&self) -> StateUpdate {
        self.state.snapshot()
    }

    /// Advance exactly one timestep
    pub fn simulate_state(&mut self) -> StateUpdate {
        let step = self.state.step;
        self.state.update(step)
    }

    /// Evaluate a set of held keys without committing them
    pub fn test_action(&self, keys: &[Key]) -> ActionPreview {
        self.state.test_action(InputKeys::from_keys(keys))
    }

    /// Preview every discrete action from the current state
    pub fn test_all_actions(&self) -> Vec<(Action, ActionPreview)> {
        Action::ALL
            .iter()
            .map(|&action| (action, self.test_action(action.keys())))
            .collect()
    }

    pub fn set_key(&mut self, key: Key, mode: KeyMode) {
        self.state.keys.apply(key, mode);
    }

    /// Apply a raw key code. Returns `false` for keys the game ignores.
    pub fn change_direction_according_to_key(&mut self, code: u32, mode: KeyMode) -> bool {
        match Key::from_code(code) {
            Some(key) => {
                self.set_key(key, mode);
                true
            }
            None => false,
        }
    }

    pub fn dispatch_action(&mut self, action: Action) {
        self.dispatcher.dispatch(action, &mut self.state.keys);
    }

    /// Dispatch by numeric id. Unknown ids leave the input untouched.
    pub fn dispatch_action_id(&mut self, id: i32) -> Option<Action> {
        let action = Action::from_id(id)?;
        self.dispatch_action(action);
        Some(action)
    }

    pub fn skip_render(&self) -> bool {
        self.state.skip_render()
    }

    /// Flip rendering relative to what the caller believes the mode is now
    pub fn toggle_skip_render(&mut self, currently_skipping: bool) {
        self.state.set_skip_render(!currently_skipping);
        tracing::info!(
            skip_render = !currently_skipping,
            step = self.state.step,
            "Render mode changed"
        );
    }

    /// Run one displayed frame: catch up physics on `elapsed` seconds of
    /// wall time, handing every tick's update to `on_update`, then draw.
    pub fn frame<S, F>(&mut self, elapsed: f64, surface: &mut S, mut on_update: F)
    where
        S: Surface + ?Sized,
        F: FnMut(&StateUpdate),
    {
        self.frames.begin();
        let dt = elapsed.clamp(0.0, MAX_FRAME_TIME);
        self.accumulator += dt;

        let step = self.state.step;
        while self.accumulator > step {
            self.accumulator -= step;
            let update = self.state.update(step);
            on_update(&update);
        }

        if !self.state.skip_render() {
            self.renderer.render(&self.state, surface);
        }
        self.frames.update();
    }

    pub fn stats_readout(&self) -> StatsReadout {
        self.state.stats.readout()
    }

    pub fn frame_counter(&self) -> &FrameCounter {
        &self.frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{DrawCall, RecordingSurface};
    use before_evening_common::TrackKind;

    fn config() -> GameConfig {
        GameConfig {
            track: TrackKind::Straight,
            total_cars: 10,
            seed: Some(42),
            ..Default::default()
        }
    }

    #[test]
    fn frame_drains_accumulator_in_fixed_steps() {
        let mut game = BeforeEvening::new(config()).unwrap();
        let mut surface = RecordingSurface::new();
        let mut ticks = 0;
        game.frame(0.1, &mut surface, |_| ticks += 1);
        // 0.1 s at 60 Hz, strictly-greater drain
        assert!(ticks == 5 || ticks == 6, "ticks {}", ticks);
        assert_eq!(surface.calls.first(), Some(&DrawCall::Clear));
    }

    #[test]
    fn long_stalls_are_capped() {
        let mut game = BeforeEvening::new(config()).unwrap();
        let mut surface = RecordingSurface::new();
        let mut ticks = 0;
        game.frame(30.0, &mut surface, |_| ticks += 1);
        assert!(ticks <= 60);
    }

    #[test]
    fn skip_render_draws_nothing() {
        let mut game = BeforeEvening::new(config()).unwrap();
        game.toggle_skip_render(false);
        assert!(game.skip_render());
        let mut surface = RecordingSurface::new();
        let mut ticks = 0;
        game.frame(0.01, &mut surface, |_| ticks += 1);
        assert!(surface.calls.is_empty());
        assert!(ticks >= 99);
    }

    #[test]
    fn dispatch_and_simulate() {
        let mut game = BeforeEvening::new(config()).unwrap();
        assert_eq!(game.dispatch_action_id(3), Some(Action::LeftUp));
        let update = game.simulate_state();
        assert!(update.speed > 0.0);
        assert!(update.player_x <= 0.0);
        assert_eq!(game.dispatch_action_id(9), None);
    }

    #[test]
    fn unknown_key_codes_are_ignored() {
        let mut game = BeforeEvening::new(config()).unwrap();
        assert!(game.change_direction_according_to_key(87, KeyMode::Down));
        assert!(game.state().keys.faster);
        assert!(!game.change_direction_according_to_key(32, KeyMode::Down));
    }

    #[test]
    fn reset_keeps_road_when_layout_unchanged() {
        let mut game = BeforeEvening::new(config()).unwrap();
        let cars_before: Vec<f64> = game.state().track.cars.iter().map(|c| c.z).collect();
        for _ in 0..30 {
            game.simulate_state();
        }
        let moved: Vec<f64> = game.state().track.cars.iter().map(|c| c.z).collect();
        assert_ne!(cars_before, moved);

        let wider = GameConfig { width: 800, height: 600, ..config() };
        game.reset(wider).unwrap();
        let after: Vec<f64> = game.state().track.cars.iter().map(|c| c.z).collect();
        assert_eq!(moved, after);
        assert_eq!(game.state().width, 800.0);
        assert_eq!(game.state().position, 0.0);
    }

    #[test]
    fn reset_rebuilds_road_when_track_changes() {
        let mut game = BeforeEvening::new(config()).unwrap();
        let straight_len = game.state().track.len();
        game.reset(GameConfig { track: TrackKind::Default, ..config() }).unwrap();
        assert_ne!(game.state().track.len(), straight_len);
        assert_eq!(game.config().track, TrackKind::Default);
    }

    #[test]
    fn invalid_reset_is_rejected() {
        let mut game = BeforeEvening::new(config()).unwrap();
        let bad = GameConfig { draw_distance: 0, ..config() };
        assert!(game.reset(bad).is_err());
        assert_eq!(game.config().draw_distance, 300);
    }

    #[test]
    fn rendering_does_not_shift_episode_starts() {
        let mut rendered = BeforeEvening::new(config()).unwrap();
        let mut headless = BeforeEvening::new(config()).unwrap();
        let mut surface = RecordingSurface::new();
        for _ in 0..20 {
            rendered.frame(0.0, &mut surface, |_| {});
        }
        assert!(!surface.calls.is_empty());

        rendered.reset_game(true);
        headless.reset_game(true);
        assert_eq!(rendered.state().position, headless.state().position);
        assert_eq!(rendered.state().player_x, headless.state().player_x);
        assert_eq!(rendered.state().speed, headless.state().speed);
    }

    #[test]
    fn test_all_actions_covers_every_action() {
        let game = BeforeEvening::new(config()).unwrap();
        let previews = game.test_all_actions();
        assert_eq!(previews.len(), 8);
        let (_, up) = previews.iter().find(|(a, _)| *a == Action::Up).unwrap();
        let (_, down) = previews.iter().find(|(a, _)| *a == Action::Down).unwrap();
        assert!(up.speed > down.speed);
        assert_eq!(down.speed, 0.0);
    }
}
