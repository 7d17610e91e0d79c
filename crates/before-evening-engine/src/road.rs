//! Road builder: lays out one closed lap from reusable shapes
//!
//! Every shape is a sequence of `add_road(enter, hold, leave, curve, y)`
//! calls: curvature eases in over `enter` segments, holds, then eases back
//! to zero over `leave`, while elevation eases in-out across all three.
//! Each appended segment starts at the previous segment's end elevation.

use before_evening_common::{GameConfig, TrackKind};
use rand::Rng;

use crate::colors;
use crate::segment::{Car, RoadSprite, Segment, Track, WorldPoint};
use crate::sprites::{self, SpriteRect};
use crate::util;

/// Shape lengths in segments
pub mod length {
    pub const NONE: usize = 0;
    pub const SHORT: usize = 25;
    pub const MEDIUM: usize = 50;
    pub const LONG: usize = 100;
}

/// Elevation deltas in segment lengths
pub mod hill {
    pub const NONE: f64 = 0.0;
    pub const LOW: f64 = 20.0;
    pub const MEDIUM: f64 = 40.0;
    pub const HIGH: f64 = 60.0;
}

pub mod curve {
    pub const NONE: f64 = 0.0;
    pub const EASY: f64 = 2.0;
    pub const MEDIUM: f64 = 4.0;
    pub const HARD: f64 = 6.0;
}

/// Accumulates segments for one lap
#[derive(Debug)]
pub struct RoadBuilder {
    segments: Vec<Segment>,
    segment_length: f64,
    rumble_length: usize,
}

impl RoadBuilder {
    pub fn new(segment_length: f64, rumble_length: usize) -> Self {
        Self {
            segments: Vec::new(),
            segment_length,
            rumble_length: rumble_length.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    fn last_y(&self) -> f64 {
        self.segments.last().map_or(0.0, |s| s.p2.y)
    }

    /// Append one segment ending at elevation `y`
    pub fn add_segment(&mut self, curve: f64, y: f64) {
        let n = self.segments.len();
        let color = if (n / self.rumble_length) % 2 == 1 {
            colors::DARK
        } else {
            colors::LIGHT
        };
        self.segments.push(Segment {
            index: n,
            p1: WorldPoint { y: self.last_y(), z: n as f64 * self.segment_length },
            p2: WorldPoint { y, z: (n + 1) as f64 * self.segment_length },
            curve,
            color,
            sprites: Vec::new(),
            cars: Vec::new(),
        });
    }

    /// The shape primitive. `y` is the elevation change in whole segment
    /// lengths; fractional parts are dropped.
    pub fn add_road(&mut self, enter: usize, hold: usize, leave: usize, curve: f64, y: f64) {
        let start_y = self.last_y();
        let end_y = start_y + y.trunc() * self.segment_length;
        let total = (enter + hold + leave) as f64;

        for n in 0..enter {
            self.add_segment(
                util::ease_in(0.0, curve, n as f64 / enter as f64),
                util::ease_in_out(start_y, end_y, n as f64 / total),
            );
        }
        for n in 0..hold {
            self.add_segment(
                curve,
                util::ease_in_out(start_y, end_y, (enter + n) as f64 / total),
            );
        }
        for n in 0..leave {
            self.add_segment(
                util::ease_in_out(curve, 0.0, n as f64 / leave as f64),
                util::ease_in_out(start_y, end_y, (enter + hold + n) as f64 / total),
            );
        }
    }

    pub fn add_straight(&mut self, num: usize) {
        self.add_road(num, num, num, 0.0, 0.0);
    }

    pub fn add_hill(&mut self, num: usize, height: f64) {
        self.add_road(num, num, num, 0.0, height);
    }

    pub fn add_curve(&mut self, num: usize, curve: f64, height: f64) {
        self.add_road(num, num, num, curve, height);
    }

    pub fn add_low_rolling_hills(&mut self, num: usize, height: f64) {
        self.add_road(num, num, num, 0.0, height / 2.0);
        self.add_road(num, num, num, 0.0, -height);
        self.add_road(num, num, num, curve::EASY, height);
        self.add_road(num, num, num, 0.0, 0.0);
        self.add_road(num, num, num, -curve::EASY, height / 2.0);
        self.add_road(num, num, num, 0.0, 0.0);
    }

    pub fn add_s_curves(&mut self) {
        let m = length::MEDIUM;
        self.add_road(m, m, m, -curve::EASY, hill::NONE);
        self.add_road(m, m, m, curve::MEDIUM, hill::MEDIUM);
        self.add_road(m, m, m, curve::EASY, -hill::LOW);
        self.add_road(m, m, m, -curve::EASY, hill::MEDIUM);
        self.add_road(m, m, m, -curve::MEDIUM, -hill::MEDIUM);
    }

    pub fn add_bumps(&mut self) {
        for height in [5.0, -2.0, -5.0, 8.0, 5.0, -7.0, 5.0, -2.0] {
            self.add_road(10, 10, 10, 0.0, height);
        }
    }

    /// Ease back down to elevation 0 so the lap closes
    pub fn add_downhill_to_end(&mut self, num: usize) {
        let height = -self.last_y() / self.segment_length;
        self.add_road(num, num, num, -curve::EASY, height);
    }

    pub fn add_default_road(&mut self) {
        self.add_straight(length::SHORT);
        self.add_low_rolling_hills(length::SHORT, hill::LOW);
        self.add_s_curves();
        self.add_curve(length::MEDIUM, curve::MEDIUM, hill::LOW);
        self.add_bumps();
        self.add_low_rolling_hills(length::SHORT, hill::LOW);
        self.add_curve(length::LONG * 2, curve::MEDIUM, hill::MEDIUM);
        self.add_straight(length::MEDIUM);
        self.add_hill(length::MEDIUM, hill::HIGH);
        self.add_s_curves();
        self.add_curve(length::LONG, -curve::MEDIUM, hill::NONE);
        self.add_hill(length::LONG, hill::HIGH);
        self.add_curve(length::LONG, curve::MEDIUM, -hill::LOW);
        self.add_bumps();
        self.add_hill(length::LONG, -hill::MEDIUM);
        self.add_straight(length::MEDIUM);
        self.add_s_curves();
        self.add_downhill_to_end(200);
    }

    pub fn add_straight_road(&mut self) {
        self.add_straight(length::LONG);
        self.add_bumps();
        self.add_straight(length::LONG);
        let height = -self.last_y() / self.segment_length;
        self.add_road(200, 200, 200, 0.0, height);
    }

    /// Close the lap: paint start and finish bands and compute its length
    pub fn finish(mut self, player_z: f64) -> Track {
        let count = self.segments.len();
        if count > 0 {
            let start =
                crate::segment::find_segment_index(count, self.segment_length, player_z);
            for n in [2, 3] {
                self.segments[(start + n) % count].color = colors::START;
            }
            for n in 0..self.rumble_length.min(count) {
                self.segments[count - 1 - n].color = colors::FINISH;
            }
        }
        Track::new(self.segments, self.segment_length)
    }
}

fn add_sprite(track: &mut Track, index: usize, source: SpriteRect, offset: f64) {
    let count = track.segments.len();
    if count == 0 {
        return;
    }
    track.segments[index % count].sprites.push(RoadSprite { source, offset });
}

/// Scatter billboards, trees and plants along the lap
pub fn reset_sprites<R: Rng + ?Sized>(track: &mut Track, rng: &mut R) {
    for segment in &mut track.segments {
        segment.sprites.clear();
    }
    let count = track.segments.len();

    add_sprite(track, 20, sprites::BILLBOARD07, -1.0);
    add_sprite(track, 40, sprites::BILLBOARD06, -1.0);
    add_sprite(track, 60, sprites::BILLBOARD08, -1.0);
    add_sprite(track, 80, sprites::BILLBOARD09, -1.0);
    add_sprite(track, 100, sprites::BILLBOARD01, -1.0);
    add_sprite(track, 120, sprites::BILLBOARD02, -1.0);
    add_sprite(track, 140, sprites::BILLBOARD03, -1.0);
    add_sprite(track, 160, sprites::BILLBOARD04, -1.0);
    add_sprite(track, 180, sprites::BILLBOARD05, -1.0);

    add_sprite(track, 240, sprites::BILLBOARD07, -1.2);
    add_sprite(track, 240, sprites::BILLBOARD06, 1.2);
    let near_end = count.saturating_sub(25);
    add_sprite(track, near_end, sprites::BILLBOARD07, -1.2);
    add_sprite(track, near_end, sprites::BILLBOARD06, 1.2);

    let mut n = 10;
    while n < 200 {
        add_sprite(track, n, sprites::PALM_TREE, 0.5 + rng.gen::<f64>() * 0.5);
        add_sprite(track, n, sprites::PALM_TREE, 1.0 + rng.gen::<f64>() * 2.0);
        n += 4 + n / 100;
    }

    for n in (250..1000).step_by(5) {
        add_sprite(track, n, sprites::COLUMN, 1.1);
        let i = n + util::random_int(rng, 0, 5) as usize;
        add_sprite(track, i, sprites::TREE1, -1.0 - rng.gen::<f64>() * 2.0);
        let i = n + util::random_int(rng, 0, 5) as usize;
        add_sprite(track, i, sprites::TREE2, -1.0 - rng.gen::<f64>() * 2.0);
    }

    for n in (200..count).step_by(3) {
        let plant = *util::random_choice(rng, &sprites::PLANTS);
        let side = *util::random_choice(rng, &[1.0, -1.0]);
        add_sprite(track, n, plant, side * (2.0 + rng.gen::<f64>() * 5.0));
    }

    for n in (1000..count.saturating_sub(50)).step_by(100) {
        let side = *util::random_choice(rng, &[1.0, -1.0]);
        let billboard = *util::random_choice(rng, &sprites::BILLBOARDS);
        let i = n + util::random_int(rng, 0, 50) as usize;
        add_sprite(track, i, billboard, -side);
        for _ in 0..20 {
            let plant = *util::random_choice(rng, &sprites::PLANTS);
            let offset = side * (1.5 + rng.gen::<f64>());
            let i = n + util::random_int(rng, 0, 50) as usize;
            add_sprite(track, i, plant, offset);
        }
    }
}

/// Seed `total` traffic cars at random segments, biased to one side of the road
pub fn reset_cars<R: Rng + ?Sized>(track: &mut Track, total: usize, max_speed: f64, rng: &mut R) {
    track.clear_cars();
    if track.is_empty() {
        return;
    }
    for _ in 0..total {
        let side = *util::random_choice(rng, &[-0.8, 0.8]);
        let offset = rng.gen::<f64>() * side;
        let z = (rng.gen::<f64>() * track.len() as f64).floor() * track.segment_length;
        let sprite = *util::random_choice(rng, &sprites::CARS);
        let class = if sprite == sprites::SEMI { 4.0 } else { 2.0 };
        let speed = max_speed / 4.0 + rng.gen::<f64>() * max_speed / class;
        track.add_car(Car { offset, z, sprite, speed, percent: 0.0 });
    }
}

/// Build the configured lap with its traffic and optional decorations
pub fn build_track<R: Rng + ?Sized>(
    config: &GameConfig,
    player_z: f64,
    max_speed: f64,
    rng: &mut R,
) -> Track {
    let mut builder = RoadBuilder::new(config.segment_length, config.rumble_length);
    match config.track {
        TrackKind::Default => builder.add_default_road(),
        TrackKind::Straight => builder.add_straight_road(),
    }
    let mut track = builder.finish(player_z);
    if config.roadside_sprites {
        reset_sprites(&mut track, rng);
    }
    reset_cars(&mut track, config.total_cars, max_speed, rng);

    tracing::info!(
        track = config.track.name(),
        segments = track.len(),
        cars = track.cars.len(),
        "Road rebuilt ({:.0} units per lap)",
        track.track_length
    );
    track
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn assert_continuous(track: &Track) {
        for pair in track.segments.windows(2) {
            assert_eq!(pair[0].p2.y, pair[1].p1.y, "elevation gap at {}", pair[1].index);
            assert_eq!(pair[0].p2.z, pair[1].p1.z, "z gap at {}", pair[1].index);
        }
    }

    #[test]
    fn default_road_is_continuous_and_closed() {
        let mut rng = StdRng::seed_from_u64(1);
        let track = build_track(&GameConfig::default(), 839.0, 12000.0, &mut rng);
        assert_continuous(&track);
        assert_eq!(track.track_length, track.len() as f64 * 200.0);
        for (i, segment) in track.segments.iter().enumerate() {
            assert_eq!(segment.index, i);
            assert_eq!(segment.p1.z, i as f64 * 200.0);
        }
    }

    #[test]
    fn default_road_returns_to_ground_level() {
        let mut builder = RoadBuilder::new(200.0, 3);
        builder.add_default_road();
        let track = builder.finish(0.0);
        let last = track.segments.last().unwrap();
        // Truncating the final height leaves at most about one segment of rise
        assert!(last.p2.y.abs() < 400.0, "ended at {}", last.p2.y);
    }

    #[test]
    fn straight_road_has_no_curvature() {
        let config = GameConfig { track: TrackKind::Straight, ..Default::default() };
        let mut rng = StdRng::seed_from_u64(1);
        let track = build_track(&config, 839.0, 12000.0, &mut rng);
        assert_continuous(&track);
        assert!(track.segments.iter().all(|s| s.curve == 0.0));
        assert_eq!(track.len(), 300 + 240 + 300 + 600);
    }

    #[test]
    fn rumble_bands_alternate() {
        let mut builder = RoadBuilder::new(200.0, 3);
        builder.add_straight(10);
        let track = builder.finish(0.0);
        assert_eq!(track.segments[0].color, colors::LIGHT);
        assert_eq!(track.segments[3].color, colors::DARK);
        assert_eq!(track.segments[6].color, colors::LIGHT);
    }

    #[test]
    fn start_and_finish_bands_marked() {
        let mut builder = RoadBuilder::new(200.0, 3);
        builder.add_straight(20);
        let track = builder.finish(839.0);
        // 839 / 200 lands in segment 4
        assert_eq!(track.segments[6].color, colors::START);
        assert_eq!(track.segments[7].color, colors::START);
        for n in 57..60 {
            assert_eq!(track.segments[n].color, colors::FINISH);
        }
        assert_ne!(track.segments[56].color, colors::FINISH);
    }

    #[test]
    fn curve_eases_in_and_out() {
        let mut builder = RoadBuilder::new(200.0, 3);
        builder.add_curve(10, curve::HARD, hill::NONE);
        let track = builder.finish(0.0);
        assert_eq!(track.segments[0].curve, 0.0);
        assert!(track.segments[5].curve < curve::HARD);
        assert_eq!(track.segments[15].curve, curve::HARD);
        assert!(track.segments[29].curve < track.segments[21].curve);
    }

    #[test]
    fn cars_registered_in_their_segments() {
        let config = GameConfig { total_cars: 50, ..Default::default() };
        let mut rng = StdRng::seed_from_u64(9);
        let track = build_track(&config, 839.0, 12000.0, &mut rng);
        assert_eq!(track.cars.len(), 50);
        let listed: usize = track.segments.iter().map(|s| s.cars.len()).sum();
        assert_eq!(listed, 50);
        for (id, car) in track.cars.iter().enumerate() {
            assert!(track.find_segment(car.z).cars.contains(&id));
            assert!(car.offset.abs() <= 0.8);
            assert!(car.speed >= 3000.0 && car.speed <= 9000.0);
        }
    }

    #[test]
    fn same_seed_same_traffic() {
        let config = GameConfig { total_cars: 20, ..Default::default() };
        let a = build_track(&config, 839.0, 12000.0, &mut StdRng::seed_from_u64(5));
        let b = build_track(&config, 839.0, 12000.0, &mut StdRng::seed_from_u64(5));
        assert_eq!(a.cars, b.cars);
    }

    #[test]
    fn roadside_sprites_only_when_enabled() {
        let mut rng = StdRng::seed_from_u64(2);
        let plain = build_track(&GameConfig::default(), 839.0, 12000.0, &mut rng);
        assert!(plain.segments.iter().all(|s| s.sprites.is_empty()));

        let config = GameConfig { roadside_sprites: true, ..Default::default() };
        let decorated = build_track(&config, 839.0, 12000.0, &mut rng);
        assert_eq!(decorated.segments[20].sprites[0].source, sprites::BILLBOARD07);
        assert!(decorated.segments.iter().map(|s| s.sprites.len()).sum::<usize>() > 300);
    }
}
