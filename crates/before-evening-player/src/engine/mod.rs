//! Window loop: minifb input, frame timing and presentation
//!
//! The engine draws into a software framebuffer sized to the configured
//! canvas; minifb stretches it to the window.

pub mod framebuffer;

use anyhow::Result;
use before_evening_engine::{BeforeEvening, Key as GameKey, KeyMode};
use minifb::{Key, KeyRepeat, Window, WindowOptions};
use std::time::Instant;

use crate::assets::SpriteSheets;
use framebuffer::Framebuffer;

const TARGET_FPS: usize = 60;

/// Window keys that drive the car
const DRIVING_KEYS: [(Key, GameKey); 8] = [
    (Key::Left, GameKey::Left),
    (Key::Up, GameKey::Up),
    (Key::Right, GameKey::Right),
    (Key::Down, GameKey::Down),
    (Key::A, GameKey::A),
    (Key::D, GameKey::D),
    (Key::S, GameKey::S),
    (Key::W, GameKey::W),
];

/// Key-down/key-up transitions between two samples of held keys
fn key_transitions(previous: &[bool; 8], current: &[bool; 8]) -> Vec<(GameKey, KeyMode)> {
    DRIVING_KEYS
        .iter()
        .zip(previous.iter().zip(current.iter()))
        .filter(|(_, (was, is))| was != is)
        .map(|((_, key), (_, &is))| (*key, if is { KeyMode::Down } else { KeyMode::Up }))
        .collect()
}

fn window_title(game: &BeforeEvening) -> String {
    let stats = game.stats_readout();
    let frames = game.frame_counter();
    format!(
        "Before Evening | {} km/h | lap {} | last {} | best {} | {} fps{}",
        stats.speed,
        stats.current_lap_time,
        stats.last_lap_time,
        stats.best_lap_time,
        frames.fps,
        if game.skip_render() { " | rendering off" } else { "" },
    )
}

pub fn run(mut game: BeforeEvening, sheets: SpriteSheets) -> Result<()> {
    let width = game.config().width as usize;
    let height = game.config().height as usize;

    let options = WindowOptions {
        resize: true,
        scale_mode: minifb::ScaleMode::AspectRatioStretch,
        ..Default::default()
    };
    let mut window = Window::new("Before Evening", width, height, options)
        .map_err(|e| anyhow::anyhow!("Window creation failed: {}", e))?;
    window.set_target_fps(TARGET_FPS);

    let mut framebuffer = Framebuffer::new(width, height, Some(sheets));
    let mut held = [false; 8];
    let mut frame_count: u64 = 0;
    let mut last = Instant::now();

    tracing::info!("Engine initialized, entering game loop");
    tracing::info!("Controls: arrows/WASD=drive | F2=toggle rendering | R=reset | Esc=quit");

    while window.is_open() {
        if window.is_key_pressed(Key::Escape, KeyRepeat::No) {
            break;
        }
        if window.is_key_pressed(Key::F2, KeyRepeat::No) {
            let skipping = game.skip_render();
            game.toggle_skip_render(skipping);
        }
        if window.is_key_pressed(Key::R, KeyRepeat::No) {
            game.reset_game(false);
            held = [false; 8];
            tracing::info!("Game reset");
        }

        let mut current = [false; 8];
        for (slot, (key, _)) in current.iter_mut().zip(DRIVING_KEYS.iter()) {
            *slot = window.is_key_down(*key);
        }
        for (key, mode) in key_transitions(&held, &current) {
            game.set_key(key, mode);
        }
        held = current;

        let now = Instant::now();
        let elapsed = now.duration_since(last).as_secs_f64();
        last = now;
        game.frame(elapsed, &mut framebuffer, |_| {});

        frame_count += 1;
        if frame_count % 5 == 0 {
            window.set_title(&window_title(&game));
        }

        if game.skip_render() {
            // Keep the event pump alive without presenting a stale frame
            window.update();
        } else {
            window
                .update_with_buffer(&framebuffer.pixels, width, height)
                .map_err(|e| anyhow::anyhow!("Display error: {}", e))?;
        }
    }

    tracing::info!("Engine shutdown");
    Ok(())
}
