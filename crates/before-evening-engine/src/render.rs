//! Pseudo-3D projection renderer
//!
//! Pass one walks `draw_distance` segments front to back, projecting both
//! endpoints and painting road bands under a falling horizon clip line.
//! Pass two walks the same window back to front and paints traffic,
//! roadside sprites and the player, each clipped against the horizon that
//! was current when its segment was projected.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::colors::{self, ColorScheme};
use crate::sprites::{self, background, SpriteRect};
use crate::segment::Segment;
use crate::state::SimulationState;
use crate::surface::{ImageId, Rect, Surface};
use crate::util::{self, CameraPoint, ScreenPoint};

/// One projected segment endpoint
#[derive(Debug, Clone, Copy, Default)]
struct Projected {
    camera: CameraPoint,
    /// `None` when the endpoint is at or behind the camera plane
    screen: Option<ScreenPoint>,
}

/// Per-frame projection of one segment in the draw window
#[derive(Debug, Clone, Copy, Default)]
struct SegmentView {
    index: usize,
    p1: Projected,
    p2: Projected,
    fog: f64,
    /// Horizon clip line when this segment was reached
    clip: f64,
}

/// Draws a `SimulationState` onto a `Surface`.
///
/// Projection results live in a scratch buffer owned by the renderer and
/// reused every frame. The track itself is never written to. The player
/// bounce draws from the renderer's own RNG so rendering never shifts the
/// simulation's random sequence.
#[derive(Debug)]
pub struct Renderer {
    window: Vec<SegmentView>,
    rng: StdRng,
}

impl Renderer {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { window: Vec::new(), rng }
    }

    pub fn render<S: Surface + ?Sized>(&mut self, state: &SimulationState, surface: &mut S) {
        if !surface.image_loaded(ImageId::Background) || !surface.image_loaded(ImageId::Sprites) {
            return;
        }
        let track = &state.track;
        if track.is_empty() {
            return;
        }

        let base_index = track.segment_index(state.position);
        let base_percent = util::percent_remaining(state.position, state.segment_length);
        let player_index = track.segment_index(state.position + state.player_z);
        let player_percent =
            util::percent_remaining(state.position + state.player_z, state.segment_length);
        let player_segment = &track.segments[player_index];
        let player_y = util::interpolate(player_segment.p1.y, player_segment.p2.y, player_percent);

        surface.clear();
        let bob = state.resolution * player_y;
        draw_background(surface, state, background::SKY, state.sky_offset, bob * state.sky_speed);
        draw_background(surface, state, background::HILLS, state.hill_offset, bob * state.hill_speed);
        draw_background(surface, state, background::TREES, state.tree_offset, bob * state.tree_speed);

        let mut max_y = state.height;
        let mut x = 0.0;
        let mut dx = -(track.segments[base_index].curve * base_percent);
        let camera_x = state.player_x * state.road_width;
        let camera_y = player_y + state.camera_height;

        self.window.clear();
        for n in 0..state.draw_distance {
            let segment = track.segment_after(base_index, n);
            let looped = segment.index < base_index;
            let camera_z = state.position - if looped { track.track_length } else { 0.0 };

            let p1 = project_point(state, (0.0, segment.p1.y, segment.p1.z), (camera_x - x, camera_y, camera_z));
            let p2 =
                project_point(state, (0.0, segment.p2.y, segment.p2.z), (camera_x - x - dx, camera_y, camera_z));
            let view = SegmentView {
                index: segment.index,
                p1,
                p2,
                fog: util::exponential_fog(n as f64 / state.draw_distance as f64, state.fog_density),
                clip: max_y,
            };
            self.window.push(view);

            x += dx;
            dx += segment.curve;

            if p1.camera.z <= state.camera_depth {
                continue;
            }
            let (Some(s1), Some(s2)) = (p1.screen, p2.screen) else {
                continue;
            };
            // Back face, or hidden behind a hill already drawn
            if s2.y >= s1.y || s2.y >= max_y {
                continue;
            }

            draw_segment(surface, state, &s1, &s2, view.fog, &segment.color);
            max_y = s1.y;
        }

        for n in (0..self.window.len()).rev() {
            let view = &self.window[n];
            let segment = &track.segments[view.index];

            if let (Some(s1), Some(s2)) = (view.p1.screen, view.p2.screen) {
                draw_roadside(surface, state, segment, view.clip, &s1, &s2);
            }

            // Placed from camera space, so it does not need the segment to project
            if view.index == player_index {
                let camera_y = util::interpolate(view.p1.camera.y, view.p2.camera.y, player_percent);
                let scale = state.camera_depth / state.player_z;
                let dest_y = state.height / 2.0 - scale * camera_y * state.height / 2.0;
                let steer = state.speed * state.keys.steer_direction();
                let updown = player_segment.p2.y - player_segment.p1.y;
                draw_player(surface, state, &mut self.rng, scale, state.width / 2.0, dest_y, steer, updown);
            }
        }
    }
}

/// Traffic and roadside sprites of one projected segment
fn draw_roadside<S: Surface + ?Sized>(
    surface: &mut S,
    state: &SimulationState,
    segment: &Segment,
    clip: f64,
    s1: &ScreenPoint,
    s2: &ScreenPoint,
) {
    let track = &state.track;
    for &id in &segment.cars {
        let car = &track.cars[id];
        let scale = util::interpolate(s1.scale, s2.scale, car.percent);
        let dest_x = util::interpolate(s1.x, s2.x, car.percent)
            + scale * car.offset * state.road_width * state.width / 2.0;
        let dest_y = util::interpolate(s1.y, s2.y, car.percent);
        draw_sprite(surface, state, car.sprite, scale, dest_x, dest_y, -0.5, -1.0, Some(clip));
    }

    for sprite in &segment.sprites {
        let scale = s1.scale;
        let dest_x = s1.x + scale * sprite.offset * state.road_width * state.width / 2.0;
        let offset_x = if sprite.offset < 0.0 { -1.0 } else { 0.0 };
        draw_sprite(surface, state, sprite.source, scale, dest_x, s1.y, offset_x, -1.0, Some(clip));
    }
}

fn project_point(state: &SimulationState, world: (f64, f64, f64), camera: (f64, f64, f64)) -> Projected {
    let camera = CameraPoint::relative(world, camera);
    Projected {
        camera,
        screen: util::project(&camera, state.camera_depth, state.width, state.height, state.road_width),
    }
}

fn rumble_width(projected_road_width: f64, lanes: u32) -> f64 {
    projected_road_width / 6f64.max(2.0 * lanes as f64)
}

fn lane_marker_width(projected_road_width: f64, lanes: u32) -> f64 {
    projected_road_width / 32f64.max(8.0 * lanes as f64)
}

fn quad<S: Surface + ?Sized>(surface: &mut S, points: [(f64, f64); 4], color: colors::Color) {
    surface.fill_polygon(&points, color);
}

/// Grass, rumble strips, road surface, lane markers and fog for one band
fn draw_segment<S: Surface + ?Sized>(
    surface: &mut S,
    state: &SimulationState,
    near: &ScreenPoint,
    far: &ScreenPoint,
    fog: f64,
    color: &ColorScheme,
) {
    let (x1, y1, w1) = (near.x, near.y, near.w);
    let (x2, y2, w2) = (far.x, far.y, far.w);
    let r1 = rumble_width(w1, state.lanes);
    let r2 = rumble_width(w2, state.lanes);
    let l1 = lane_marker_width(w1, state.lanes);
    let l2 = lane_marker_width(w2, state.lanes);

    surface.fill_rect(Rect::new(0.0, y2, state.width, y1 - y2), color.grass, 1.0);

    quad(surface, [(x1 - w1 - r1, y1), (x1 - w1, y1), (x2 - w2, y2), (x2 - w2 - r2, y2)], color.rumble);
    quad(surface, [(x1 + w1 + r1, y1), (x1 + w1, y1), (x2 + w2, y2), (x2 + w2 + r2, y2)], color.rumble);
    quad(surface, [(x1 - w1, y1), (x1 + w1, y1), (x2 + w2, y2), (x2 - w2, y2)], color.road);

    if let Some(lane_color) = color.lane {
        let lanes = state.lanes as f64;
        let lane_w1 = w1 * 2.0 / lanes;
        let lane_w2 = w2 * 2.0 / lanes;
        let mut lane_x1 = x1 - w1 + lane_w1;
        let mut lane_x2 = x2 - w2 + lane_w2;
        for _ in 1..state.lanes {
            quad(
                surface,
                [
                    (lane_x1 - l1 / 2.0, y1),
                    (lane_x1 + l1 / 2.0, y1),
                    (lane_x2 + l2 / 2.0, y2),
                    (lane_x2 - l2 / 2.0, y2),
                ],
                lane_color,
            );
            lane_x1 += lane_w1;
            lane_x2 += lane_w2;
        }
    }

    if fog < 1.0 {
        surface.fill_rect(Rect::new(0.0, y2, state.width, y1 - y2), colors::FOG, 1.0 - fog);
    }
}

/// Full-width parallax layer. The source window is half the layer wide and
/// wraps around its right edge as `rotation` advances.
fn draw_background<S: Surface + ?Sized>(
    surface: &mut S,
    state: &SimulationState,
    layer: SpriteRect,
    rotation: f64,
    offset: f64,
) {
    let layer_x = layer.x as f64;
    let layer_w = layer.w as f64;
    let image_w = layer_w / 2.0;
    let image_h = layer.h as f64;

    let source_x = layer_x + (layer_w * rotation).floor();
    let source_w = image_w.min(layer_x + layer_w - source_x);
    let dest_w = (state.width * (source_w / image_w)).floor();

    surface.draw_image(
        ImageId::Background,
        Rect::new(source_x, layer.y as f64, source_w, image_h),
        Rect::new(0.0, offset, dest_w, state.height),
    );

    if source_w < image_w {
        surface.draw_image(
            ImageId::Background,
            Rect::new(layer_x, layer.y as f64, image_w - source_w, image_h),
            Rect::new(dest_w - 1.0, offset, state.width - dest_w, state.height),
        );
    }
}

/// Scale a sprite for projection and road width, anchor it by the given
/// fractions of its size, and cut off whatever falls below `clip_y`
#[allow(clippy::too_many_arguments)]
fn draw_sprite<S: Surface + ?Sized>(
    surface: &mut S,
    state: &SimulationState,
    sprite: SpriteRect,
    scale: f64,
    dest_x: f64,
    dest_y: f64,
    offset_x: f64,
    offset_y: f64,
    clip_y: Option<f64>,
) {
    let factor = scale * state.width / 2.0 * (sprites::SCALE * state.road_width);
    let dest_w = sprite.w as f64 * factor;
    let dest_h = sprite.h as f64 * factor;

    let dest_x = dest_x + dest_w * offset_x;
    let dest_y = dest_y + dest_h * offset_y;

    let clip_h = match clip_y {
        Some(clip) => (dest_y + dest_h - clip).max(0.0),
        None => 0.0,
    };
    if clip_h >= dest_h {
        return;
    }

    let source_h = sprite.h as f64;
    surface.draw_image(
        ImageId::Sprites,
        Rect::new(sprite.x as f64, sprite.y as f64, sprite.w as f64, source_h - source_h * clip_h / dest_h),
        Rect::new(dest_x, dest_y, dest_w, dest_h - clip_h),
    );
}

#[allow(clippy::too_many_arguments)]
fn draw_player<S: Surface + ?Sized, R: Rng + ?Sized>(
    surface: &mut S,
    state: &SimulationState,
    rng: &mut R,
    scale: f64,
    dest_x: f64,
    dest_y: f64,
    steer: f64,
    updown: f64,
) {
    let direction = *util::random_choice(rng, &[-1.0, 1.0]);
    let bounce = 1.5 * rng.gen::<f64>() * state.speed_percent() * state.resolution * direction;
    let sprite = sprites::player_sprite(steer, updown);
    draw_sprite(surface, state, sprite, scale, dest_x, dest_y + bounce, -0.5, -1.0, None);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::road::RoadBuilder;
    use crate::segment::Car;
    use crate::surface::{DrawCall, RecordingSurface};
    use before_evening_common::GameConfig;

    fn flat_state(config: &GameConfig) -> SimulationState {
        let mut builder = RoadBuilder::new(config.segment_length, config.rumble_length);
        builder.add_straight(200);
        let track = builder.finish(0.0);
        SimulationState::with_track(config, track).unwrap()
    }

    fn render(state: &SimulationState) -> RecordingSurface {
        let mut surface = RecordingSurface::new();
        Renderer::new(Some(3)).render(state, &mut surface);
        surface
    }

    #[test]
    fn nothing_drawn_until_images_load() {
        let state = flat_state(&GameConfig::default());
        let mut surface = RecordingSurface::unloaded();
        Renderer::new(Some(3)).render(&state, &mut surface);
        assert!(surface.calls.is_empty());
    }

    #[test]
    fn frame_starts_with_clear_and_three_layers() {
        let surface = render(&flat_state(&GameConfig::default()));
        assert_eq!(surface.calls[0], DrawCall::Clear);
        let layers: Vec<_> = surface.calls[1..4]
            .iter()
            .map(|call| match call {
                DrawCall::Image { image: ImageId::Background, src, .. } => src.y as u32,
                other => panic!("unexpected call {:?}", other),
            })
            .collect();
        assert_eq!(layers, vec![background::SKY.y, background::HILLS.y, background::TREES.y]);
    }

    #[test]
    fn road_bands_rise_towards_the_horizon() {
        let state = flat_state(&GameConfig::default());
        let surface = render(&state);
        let roads: Vec<_> = surface
            .polygons()
            .filter(|(_, color)| **color == colors::LIGHT.road || **color == colors::DARK.road)
            .map(|(points, _)| points[0].1)
            .collect();
        assert!(roads.len() > 10);
        assert!(roads.windows(2).all(|w| w[1] <= w[0]));
        assert!(roads.iter().all(|&y| y <= state.height));
    }

    #[test]
    fn light_bands_get_lane_markers() {
        let config = GameConfig::default();
        let surface = render(&flat_state(&config));
        let lanes = surface
            .polygons()
            .filter(|(_, color)| Some(**color) == colors::LIGHT.lane)
            .count();
        assert!(lanes > 0);
        assert_eq!(lanes % (config.lanes as usize - 1), 0);
    }

    #[test]
    fn player_drawn_centered_at_bottom() {
        let state = flat_state(&GameConfig::default());
        let surface = render(&state);
        let (_, _, dst) = surface
            .images()
            .filter(|(image, src, _)| {
                **image == ImageId::Sprites && src.x as u32 == sprites::PLAYER_STRAIGHT.x
            })
            .last()
            .expect("player sprite");
        assert!((dst.x + dst.w / 2.0 - state.width / 2.0).abs() < 1e-9);
        assert!(dst.y + dst.h <= state.height + 1e-6);
    }

    fn player_sprites(surface: &RecordingSurface) -> usize {
        surface
            .images()
            .filter(|(image, src, _)| {
                **image == ImageId::Sprites && src.x as u32 == sprites::PLAYER_STRAIGHT.x
            })
            .count()
    }

    #[test]
    fn player_drawn_when_its_segment_does_not_project() {
        // player_z shorter than one segment puts the player on the camera's own segment
        let config = GameConfig { camera_height: 100.0, ..Default::default() };
        let state = flat_state(&config);
        assert!(state.player_z < state.segment_length);
        assert_eq!(state.track.segment_index(state.player_z), state.track.segment_index(0.0));
        assert_eq!(player_sprites(&render(&state)), 1);
    }

    #[test]
    fn player_drawn_once_per_frame() {
        assert_eq!(player_sprites(&render(&flat_state(&GameConfig::default()))), 1);
    }

    #[test]
    fn traffic_ahead_is_drawn() {
        let mut state = flat_state(&GameConfig::default());
        state.track.add_car(Car {
            offset: 0.5,
            z: 20.0 * 200.0,
            sprite: sprites::TRUCK,
            speed: 3000.0,
            percent: 0.0,
        });
        let surface = render(&state);
        let truck = surface
            .images()
            .find(|(_, src, _)| src.x as u32 == sprites::TRUCK.x && src.y as u32 == sprites::TRUCK.y);
        let (_, _, dst) = truck.expect("truck drawn");
        assert!(dst.x > state.width / 2.0 - dst.w);
    }

    #[test]
    fn background_wraps_into_two_pieces() {
        let state = flat_state(&GameConfig::default());
        let mut surface = RecordingSurface::new();
        draw_background(&mut surface, &state, background::HILLS, 0.75, 0.0);
        assert_eq!(surface.calls.len(), 2);
        match (&surface.calls[0], &surface.calls[1]) {
            (DrawCall::Image { src: a, dst: da, .. }, DrawCall::Image { src: b, dst: db, .. }) => {
                assert_eq!(a.w, 320.0);
                assert_eq!(b.w, 320.0);
                assert_eq!(b.x, background::HILLS.x as f64);
                assert_eq!(da.w, 512.0);
                assert_eq!(db.x, 511.0);
            }
            other => panic!("unexpected calls {:?}", other),
        }
    }

    #[test]
    fn sprite_fully_below_clip_is_skipped() {
        let state = flat_state(&GameConfig::default());
        let mut surface = RecordingSurface::new();
        draw_sprite(&mut surface, &state, sprites::TREE1, 0.0001, 100.0, 500.0, 0.0, 0.0, Some(400.0));
        assert!(surface.calls.is_empty());

        draw_sprite(&mut surface, &state, sprites::TREE1, 0.0001, 100.0, 380.0, 0.0, 0.0, Some(400.0));
        match &surface.calls[0] {
            DrawCall::Image { src, dst, .. } => {
                assert!((dst.y + dst.h - 400.0).abs() < 1e-9);
                assert!(src.h < sprites::TREE1.h as f64);
            }
            other => panic!("unexpected call {:?}", other),
        }
    }
}
