//! Math helpers shared by the road builder, physics step and renderer
//!
//! Interpolation and easing, wrap-around increments along the track,
//! exponential fog and single-point perspective projection.

use rand::Rng;

/// Clamp `value` to `[min, max]`
pub fn limit(value: f64, min: f64, max: f64) -> f64 {
    min.max(value.min(max))
}

/// Fraction of the way through the current `total`-sized slice
pub fn percent_remaining(n: f64, total: f64) -> f64 {
    n.rem_euclid(total) / total
}

/// Integrate a constant rate over one timestep: `v + accel * dt`
pub fn accelerate(v: f64, accel: f64, dt: f64) -> f64 {
    v + accel * dt
}

pub fn interpolate(a: f64, b: f64, percent: f64) -> f64 {
    a + (b - a) * percent
}

pub fn ease_in(a: f64, b: f64, percent: f64) -> f64 {
    a + (b - a) * percent.powi(2)
}

pub fn ease_in_out(a: f64, b: f64, percent: f64) -> f64 {
    a + (b - a) * (-(percent * std::f64::consts::PI).cos() / 2.0 + 0.5)
}

/// Fog visibility for a normalized distance: 1.0 is clear, 0.0 fully fogged
pub fn exponential_fog(distance: f64, density: f64) -> f64 {
    1.0 / std::f64::consts::E.powf(distance * distance * density)
}

/// Add `increment` to `start`, wrapping into `[0, max)`
pub fn increase(start: f64, increment: f64, max: f64) -> f64 {
    let result = (start + increment).rem_euclid(max);
    // rem_euclid can round up to `max` for tiny negative inputs
    if result >= max {
        0.0
    } else {
        result
    }
}

/// Whether two centered intervals intersect, each shrunk or grown by `percent`
pub fn overlap(x1: f64, w1: f64, x2: f64, w2: f64, percent: f64) -> bool {
    let half = percent / 2.0;
    let min1 = x1 - w1 * half;
    let max1 = x1 + w1 * half;
    let min2 = x2 - w2 * half;
    let max2 = x2 + w2 * half;
    !(max1 < min2 || min1 > max2)
}

/// Round to the nearest integer with halves going towards +∞
pub fn round_half_up(v: f64) -> f64 {
    (v + 0.5).floor()
}

/// Uniform integer in `[min, max]`, rounded from a continuous draw
pub fn random_int<R: Rng + ?Sized>(rng: &mut R, min: i64, max: i64) -> i64 {
    interpolate(min as f64, max as f64, rng.gen::<f64>()).round() as i64
}

/// Pick one element uniformly. `options` must not be empty.
pub fn random_choice<'a, T, R: Rng + ?Sized>(rng: &mut R, options: &'a [T]) -> &'a T {
    &options[rng.gen_range(0..options.len())]
}

/// Lap-clock formatting: `m.ss.t` above a minute, `s.t` below
pub fn format_time(dt: f64) -> String {
    let minutes = (dt / 60.0).floor();
    let seconds = (dt - minutes * 60.0).floor();
    let tenths = (10.0 * (dt - dt.floor())).floor();
    if minutes > 0.0 {
        format!("{}.{:02}.{}", minutes as i64, seconds as i64, tenths as i64)
    } else {
        format!("{}.{}", seconds as i64, tenths as i64)
    }
}

/// A point translated into camera space
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CameraPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl CameraPoint {
    pub fn relative(world: (f64, f64, f64), camera: (f64, f64, f64)) -> Self {
        Self {
            x: world.0 - camera.0,
            y: world.1 - camera.1,
            z: world.2 - camera.2,
        }
    }
}

/// A point projected onto the canvas
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScreenPoint {
    /// Perspective scale, `camera_depth / camera.z`
    pub scale: f64,
    pub x: f64,
    pub y: f64,
    /// Projected half road width in pixels
    pub w: f64,
}

/// Project a camera-space point to canvas pixels.
///
/// Returns `None` for points at or behind the camera plane, where the
/// perspective divide is undefined.
pub fn project(
    camera: &CameraPoint,
    camera_depth: f64,
    width: f64,
    height: f64,
    road_width: f64,
) -> Option<ScreenPoint> {
    if camera.z <= 0.0 {
        return None;
    }
    let scale = camera_depth / camera.z;
    Some(ScreenPoint {
        scale,
        x: round_half_up(width / 2.0 + scale * camera.x * width / 2.0),
        y: round_half_up(height / 2.0 - scale * camera.y * height / 2.0),
        w: round_half_up(scale * road_width * width / 2.0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn increase_wraps_both_directions() {
        assert_eq!(increase(90.0, 20.0, 100.0), 10.0);
        assert_eq!(increase(10.0, -20.0, 100.0), 90.0);
        assert_eq!(increase(0.0, 0.0, 100.0), 0.0);
        assert!(increase(0.0, -1e-18, 100.0) < 100.0);
    }

    #[test]
    fn easing_endpoints() {
        assert_eq!(ease_in(0.0, 4.0, 0.0), 0.0);
        assert_eq!(ease_in(0.0, 4.0, 1.0), 4.0);
        assert!((ease_in_out(10.0, 20.0, 0.5) - 15.0).abs() < 1e-9);
    }

    #[test]
    fn overlap_touching_edges_counts() {
        assert!(overlap(0.0, 1.0, 1.0, 1.0, 1.0));
        assert!(!overlap(0.0, 1.0, 1.01, 1.0, 1.0));
        // Shrinking footprints separates them
        assert!(!overlap(0.0, 1.0, 0.9, 1.0, 0.8));
    }

    #[test]
    fn fog_is_clear_up_close() {
        assert_eq!(exponential_fog(0.0, 5.0), 1.0);
        assert!(exponential_fog(1.0, 5.0) < 0.01);
    }

    #[test]
    fn projection_rejects_points_behind_camera() {
        let behind = CameraPoint { x: 0.0, y: -1000.0, z: 0.0 };
        assert!(project(&behind, 0.84, 1024.0, 768.0, 2000.0).is_none());
    }

    #[test]
    fn projection_centers_points_on_axis() {
        let ahead = CameraPoint { x: 0.0, y: 0.0, z: 1000.0 };
        let screen = project(&ahead, 1.0, 1024.0, 768.0, 2000.0).unwrap();
        assert_eq!(screen.x, 512.0);
        assert_eq!(screen.y, 384.0);
        assert_eq!(screen.scale, 0.001);
        assert_eq!(screen.w, 1024.0);
    }

    #[test]
    fn halves_round_up() {
        assert_eq!(round_half_up(2.5), 3.0);
        assert_eq!(round_half_up(-2.5), -2.0);
    }

    #[test]
    fn time_formatting() {
        assert_eq!(format_time(5.25), "5.2");
        assert_eq!(format_time(65.5), "1.05.5");
    }

    #[test]
    fn random_int_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            let v = random_int(&mut rng, 0, 5);
            assert!((0..=5).contains(&v));
        }
    }
}
