//! Traffic AI: per-car lookahead steering around the player and other cars

use crate::segment::{CarId, Track};
use crate::util;

/// Segments a car scans ahead for slower traffic
pub const LOOKAHEAD: usize = 20;

/// Where the player was at the start of the tick
#[derive(Debug, Clone, Copy)]
pub struct PlayerView {
    pub segment: usize,
    pub x: f64,
    pub speed: f64,
    /// Player footprint in road half-widths
    pub width: f64,
}

/// Steer, advance and re-bucket every car
pub fn update_cars(
    track: &mut Track,
    dt: f64,
    player: &PlayerView,
    max_speed: f64,
    draw_distance: usize,
) {
    let track_length = track.track_length;
    let segment_length = track.segment_length;

    for id in 0..track.cars.len() {
        let old_segment = track.segment_index(track.cars[id].z);
        let delta = offset_delta(track, id, old_segment, player, max_speed, draw_distance);

        let z = {
            let car = &mut track.cars[id];
            car.offset += delta;
            car.z = util::increase(car.z, dt * car.speed, track_length);
            car.percent = util::percent_remaining(car.z, segment_length);
            car.z
        };

        let new_segment = track.segment_index(z);
        track.transfer_car(id, old_segment, new_segment);
    }
}

/// Lateral nudge for one car this tick.
///
/// The nearer the obstacle and the larger the speed difference, the harder
/// the swerve. Cars far ahead of the player do not steer at all.
pub fn offset_delta(
    track: &Track,
    id: CarId,
    car_segment: usize,
    player: &PlayerView,
    max_speed: f64,
    draw_distance: usize,
) -> f64 {
    if car_segment as i64 - player.segment as i64 > draw_distance as i64 {
        return 0.0;
    }

    let car = &track.cars[id];
    let car_w = car.sprite.road_width();
    let count = track.len();

    for i in 1..LOOKAHEAD {
        let index = (car_segment + i) % count;

        if index == player.segment
            && car.speed > player.speed
            && util::overlap(player.x, player.width, car.offset, car_w, 1.2)
        {
            let dir = if player.x > 0.5 {
                -1.0
            } else if player.x < -0.5 {
                1.0
            } else if car.offset > player.x {
                1.0
            } else {
                -1.0
            };
            return dir / i as f64 * (car.speed - player.speed) / max_speed;
        }

        for &other_id in &track.segments[index].cars {
            if other_id == id {
                continue;
            }
            let other = &track.cars[other_id];
            if car.speed > other.speed
                && util::overlap(car.offset, car_w, other.offset, other.sprite.road_width(), 1.2)
            {
                let dir = if other.offset > 0.5 {
                    -1.0
                } else if other.offset < -0.5 {
                    1.0
                } else if car.offset > other.offset {
                    1.0
                } else {
                    -1.0
                };
                return dir / i as f64 * (car.speed - other.speed) / max_speed;
            }
        }
    }

    // Nothing ahead: drift back onto the road
    if car.offset < -0.9 {
        0.1
    } else if car.offset > 0.9 {
        -0.1
    } else {
        0.0
    }
}
