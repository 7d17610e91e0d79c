//! Track model: a ring of fixed-length road segments
//!
//! Each segment spans `[index * segment_length, (index + 1) * segment_length)`
//! along z. Segments own the roadside sprites placed on them and the ids of
//! the traffic cars currently inside them; the cars themselves live in the
//! flat `Track::cars` list.

use crate::colors::ColorScheme;
use crate::sprites::SpriteRect;

/// World-space endpoint of a segment. Road x is always 0; curves are a
/// screen-space effect applied by the renderer.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WorldPoint {
    pub y: f64,
    pub z: f64,
}

/// A decoration placed beside the road
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoadSprite {
    pub source: SpriteRect,
    /// Lateral position in road half-widths, negative is left
    pub offset: f64,
}

/// Index into `Track::cars`
pub type CarId = usize;

/// A traffic car
#[derive(Debug, Clone, PartialEq)]
pub struct Car {
    /// Lateral position in road half-widths
    pub offset: f64,
    /// Absolute position along the track
    pub z: f64,
    pub sprite: SpriteRect,
    pub speed: f64,
    /// Progress through the current segment, used to interpolate when drawing
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub index: usize,
    pub p1: WorldPoint,
    pub p2: WorldPoint,
    pub curve: f64,
    pub color: ColorScheme,
    pub sprites: Vec<RoadSprite>,
    pub cars: Vec<CarId>,
}

/// Ring index of the segment containing `z`.
///
/// Total over all finite and non-finite inputs: negative positions and
/// positions beyond one lap wrap modulo `count`.
pub fn find_segment_index(count: usize, segment_length: f64, z: f64) -> usize {
    if count == 0 {
        return 0;
    }
    let n = (z / segment_length).floor();
    if !n.is_finite() {
        return 0;
    }
    let wrapped = n.rem_euclid(count as f64) as usize;
    wrapped.min(count - 1)
}

/// One built lap plus the traffic driving on it
#[derive(Debug, Clone, Default)]
pub struct Track {
    pub segments: Vec<Segment>,
    pub cars: Vec<Car>,
    pub segment_length: f64,
    /// `segments.len() * segment_length`
    pub track_length: f64,
}

impl Track {
    pub fn new(segments: Vec<Segment>, segment_length: f64) -> Self {
        let track_length = segments.len() as f64 * segment_length;
        Self {
            segments,
            cars: Vec::new(),
            segment_length,
            track_length,
        }
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segment_index(&self, z: f64) -> usize {
        find_segment_index(self.segments.len(), self.segment_length, z)
    }

    /// Segment containing `z`. Panics on an empty track.
    pub fn find_segment(&self, z: f64) -> &Segment {
        &self.segments[self.segment_index(z)]
    }

    /// Segment at a ring offset from `base`
    pub fn segment_after(&self, base: usize, n: usize) -> &Segment {
        &self.segments[(base + n) % self.segments.len()]
    }

    /// Place a car on the track, registering it with its segment
    pub fn add_car(&mut self, car: Car) -> CarId {
        let id = self.cars.len();
        let index = self.segment_index(car.z);
        self.cars.push(car);
        self.segments[index].cars.push(id);
        id
    }

    /// Move a car id from one segment's occupancy list to another
    pub fn transfer_car(&mut self, id: CarId, from: usize, to: usize) {
        if from == to {
            return;
        }
        let list = &mut self.segments[from].cars;
        if let Some(pos) = list.iter().position(|&c| c == id) {
            list.remove(pos);
        }
        self.segments[to].cars.push(id);
    }

    /// Clear every segment's occupancy and the car list
    pub fn clear_cars(&mut self) {
        for segment in &mut self.segments {
            segment.cars.clear();
        }
        self.cars.clear();
    }
}
