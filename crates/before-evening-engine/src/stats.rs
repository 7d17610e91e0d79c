//! Lap timing and frame-rate counters

use std::time::Instant;

/// What one physics tick contributes to the lap clock
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LapTick {
    pub dt: f64,
    /// Whether the player has crossed the start line and the lap is running
    pub increase_current_lap_time: bool,
    /// Whether this tick crossed the line and closed a lap
    pub refresh_lap: bool,
}

/// Accumulated lap times and the display speed
#[derive(Debug, Clone, Default)]
pub struct LapStats {
    pub total_time: f64,
    current_lap_time: f64,
    last_lap_time: f64,
    best_lap_time: Option<f64>,
    speed: f64,
}

impl LapStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_time(&mut self, tick: LapTick) {
        self.total_time += tick.dt;

        if tick.increase_current_lap_time {
            self.current_lap_time += tick.dt;
        }

        if tick.refresh_lap {
            self.last_lap_time = self.current_lap_time;
            self.current_lap_time = 0.0;
            let best = match self.best_lap_time {
                Some(best) => best.min(self.last_lap_time),
                None => self.last_lap_time,
            };
            self.best_lap_time = Some(best);
            tracing::info!(
                "Lap closed in {:.2}s (best {:.2}s)",
                self.last_lap_time,
                best
            );
        }
    }

    /// Convert simulation speed to the km/h-style display value
    pub fn update_speed(&mut self, speed: f64) {
        self.speed = 1.60934 * speed / 100.0;
    }

    pub fn current_lap_time(&self) -> f64 {
        self.current_lap_time
    }

    pub fn last_lap_time(&self) -> f64 {
        self.last_lap_time
    }

    pub fn best_lap_time(&self) -> Option<f64> {
        self.best_lap_time
    }

    pub fn display_speed(&self) -> f64 {
        self.speed
    }

    /// Clear the running clocks. The best lap survives resets.
    pub fn reset(&mut self) {
        self.total_time = 0.0;
        self.current_lap_time = 0.0;
        self.last_lap_time = 0.0;
    }

    pub fn readout(&self) -> StatsReadout {
        StatsReadout {
            speed: format!("{:.0}", self.speed),
            current_lap_time: format!("{:.2}", self.current_lap_time),
            last_lap_time: format!("{:.2}", self.last_lap_time),
            best_lap_time: format!("{:.2}", self.best_lap_time.unwrap_or(0.0)),
        }
    }
}

/// Display strings for the lap clock
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsReadout {
    pub speed: String,
    pub current_lap_time: String,
    pub last_lap_time: String,
    pub best_lap_time: String,
}

/// Frame time and once-per-second fps with running extremes
#[derive(Debug, Clone)]
pub struct FrameCounter {
    pub fps: u32,
    pub fps_min: u32,
    pub fps_max: u32,
    pub ms: u64,
    pub ms_min: u64,
    pub ms_max: u64,
    frames: u32,
    start_time: Instant,
    prev_time: Instant,
}

impl Default for FrameCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameCounter {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            fps: 0,
            fps_min: 1000,
            fps_max: 0,
            ms: 0,
            ms_min: 1000,
            ms_max: 0,
            frames: 0,
            start_time: now,
            prev_time: now,
        }
    }

    pub fn begin(&mut self) {
        self.start_time = Instant::now();
    }

    /// Close a frame started with `begin` (or the previous `update`)
    pub fn end(&mut self) -> Instant {
        let now = Instant::now();
        self.ms = now.duration_since(self.start_time).as_millis() as u64;
        self.ms_min = self.ms_min.min(self.ms);
        self.ms_max = self.ms_max.max(self.ms);
        self.frames += 1;

        let since = now.duration_since(self.prev_time);
        if since.as_millis() > 1000 {
            self.fps = (self.frames as f64 / since.as_secs_f64()).round() as u32;
            self.fps_min = self.fps_min.min(self.fps);
            self.fps_max = self.fps_max.max(self.fps);
            self.prev_time = now;
            self.frames = 0;
        }
        now
    }

    pub fn update(&mut self) {
        self.start_time = self.end();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tick(dt: f64, running: bool, refresh: bool) -> LapTick {
        LapTick { dt, increase_current_lap_time: running, refresh_lap: refresh }
    }

    #[test]
    fn lap_clock_only_runs_after_start() {
        let mut stats = LapStats::new();
        stats.add_time(tick(0.5, false, false));
        assert_eq!(stats.current_lap_time(), 0.0);
        assert_eq!(stats.total_time, 0.5);
        stats.add_time(tick(0.5, true, false));
        assert_eq!(stats.current_lap_time(), 0.5);
    }

    #[test]
    fn refresh_moves_current_to_last_and_tracks_best() {
        let mut stats = LapStats::new();
        stats.add_time(tick(10.0, true, false));
        stats.add_time(tick(1.0, true, true));
        assert_eq!(stats.last_lap_time(), 11.0);
        assert_eq!(stats.best_lap_time(), Some(11.0));
        assert_eq!(stats.current_lap_time(), 0.0);

        stats.add_time(tick(12.0, true, true));
        assert_eq!(stats.last_lap_time(), 12.0);
        assert_eq!(stats.best_lap_time(), Some(11.0));

        stats.add_time(tick(9.0, true, true));
        assert_eq!(stats.best_lap_time(), Some(9.0));
    }

    #[test]
    fn reset_keeps_best_lap() {
        let mut stats = LapStats::new();
        stats.add_time(tick(8.0, true, true));
        stats.reset();
        assert_eq!(stats.last_lap_time(), 0.0);
        assert_eq!(stats.total_time, 0.0);
        assert_eq!(stats.best_lap_time(), Some(8.0));
    }

    #[test]
    fn readout_formatting() {
        let mut stats = LapStats::new();
        stats.update_speed(12000.0);
        stats.add_time(tick(3.14159, true, false));
        let readout = stats.readout();
        assert_eq!(readout.speed, "193");
        assert_eq!(readout.current_lap_time, "3.14");
        assert_eq!(readout.best_lap_time, "0.00");
    }

    #[test]
    fn frame_counter_tracks_extremes() {
        let mut counter = FrameCounter::new();
        counter.begin();
        counter.update();
        counter.update();
        assert!(counter.ms_min <= counter.ms_max);
    }
}
