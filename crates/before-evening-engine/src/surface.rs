//! Drawing surface abstraction
//!
//! The renderer only issues rectangles, convex polygons and image blits.
//! Hosts provide a `Surface` (a software framebuffer in the player binary,
//! `RecordingSurface` in tests).

use crate::colors::Color;

/// The two sprite sheets the renderer draws from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageId {
    Background,
    Sprites,
}

/// Axis-aligned rectangle in pixels
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }
}

pub trait Surface {
    /// Whether an image is ready to draw. Rendering is skipped until both are.
    fn image_loaded(&self, image: ImageId) -> bool;

    fn clear(&mut self);

    /// Fill a rectangle with `alpha` in 0..=1
    fn fill_rect(&mut self, rect: Rect, color: Color, alpha: f64);

    /// Fill a convex polygon
    fn fill_polygon(&mut self, points: &[(f64, f64)], color: Color);

    /// Copy `src` from an image into `dst`, scaling as needed
    fn draw_image(&mut self, image: ImageId, src: Rect, dst: Rect);
}

/// A single recorded drawing operation
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    Clear,
    Rect { rect: Rect, color: Color, alpha: f64 },
    Polygon { points: Vec<(f64, f64)>, color: Color },
    Image { image: ImageId, src: Rect, dst: Rect },
}

/// Surface that remembers every call instead of drawing
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    pub calls: Vec<DrawCall>,
    pub loaded: bool,
}

impl Default for RecordingSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self { calls: Vec::new(), loaded: true }
    }

    /// A surface whose images never finish loading
    pub fn unloaded() -> Self {
        Self { calls: Vec::new(), loaded: false }
    }

    pub fn images(&self) -> impl Iterator<Item = (&ImageId, &Rect, &Rect)> {
        self.calls.iter().filter_map(|call| match call {
            DrawCall::Image { image, src, dst } => Some((image, src, dst)),
            _ => None,
        })
    }

    pub fn polygons(&self) -> impl Iterator<Item = (&[(f64, f64)], &Color)> {
        self.calls.iter().filter_map(|call| match call {
            DrawCall::Polygon { points, color } => Some((points.as_slice(), color)),
            _ => None,
        })
    }
}

impl Surface for RecordingSurface {
    fn image_loaded(&self, _image: ImageId) -> bool {
        self.loaded
    }

    fn clear(&mut self) {
        self.calls.push(DrawCall::Clear);
    }

    fn fill_rect(&mut self, rect: Rect, color: Color, alpha: f64) {
        self.calls.push(DrawCall::Rect { rect, color, alpha });
    }

    fn fill_polygon(&mut self, points: &[(f64, f64)], color: Color) {
        self.calls.push(DrawCall::Polygon { points: points.to_vec(), color });
    }

    fn draw_image(&mut self, image: ImageId, src: Rect, dst: Rect) {
        self.calls.push(DrawCall::Image { image, src, dst });
    }
}
