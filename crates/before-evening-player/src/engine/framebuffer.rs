//! Software ARGB framebuffer implementing the engine's drawing surface

use before_evening_engine::colors::Color;
use before_evening_engine::{ImageId, Rect, Surface};

use crate::assets::{Image, SpriteSheets};

pub struct Framebuffer {
    pub width: usize,
    pub height: usize,
    /// 0xAARRGGBB, row-major, the layout minifb presents
    pub pixels: Vec<u32>,
    sheets: Option<SpriteSheets>,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize, sheets: Option<SpriteSheets>) -> Self {
        Self { width, height, pixels: vec![0; width * height], sheets }
    }

    fn image(&self, id: ImageId) -> Option<&Image> {
        let sheets = self.sheets.as_ref()?;
        Some(match id {
            ImageId::Background => &sheets.background,
            ImageId::Sprites => &sheets.sprites,
        })
    }

    /// Pixel columns `[x0, x1)` and rows `[y0, y1)` covered by a rect,
    /// clipped to the buffer. Negative extents are flipped first.
    fn clip(&self, rect: Rect) -> Option<(usize, usize, usize, usize)> {
        let (x, w) = if rect.w < 0.0 { (rect.x + rect.w, -rect.w) } else { (rect.x, rect.w) };
        let (y, h) = if rect.h < 0.0 { (rect.y + rect.h, -rect.h) } else { (rect.y, rect.h) };
        let x0 = x.round().max(0.0);
        let y0 = y.round().max(0.0);
        let x1 = (x + w).round().min(self.width as f64);
        let y1 = (y + h).round().min(self.height as f64);
        if !(x1 > x0 && y1 > y0) {
            return None;
        }
        Some((x0 as usize, x1 as usize, y0 as usize, y1 as usize))
    }

    fn fill_span(&mut self, y: usize, x0: usize, x1: usize, color: u32) {
        let row = y * self.width;
        self.pixels[row + x0..row + x1].fill(color);
    }
}

/// Blend an RGB source over an ARGB destination with alpha 0..=255
fn blend(dst: u32, r: u32, g: u32, b: u32, a: u32) -> u32 {
    if a >= 255 {
        return 0xFF000000 | (r << 16) | (g << 8) | b;
    }
    let dr = (dst >> 16) & 0xFF;
    let dg = (dst >> 8) & 0xFF;
    let db = dst & 0xFF;
    let inv_a = 255 - a;
    let out_r = (r * a + dr * inv_a) / 255;
    let out_g = (g * a + dg * inv_a) / 255;
    let out_b = (b * a + db * inv_a) / 255;
    0xFF000000 | (out_r << 16) | (out_g << 8) | out_b
}

impl Surface for Framebuffer {
    fn image_loaded(&self, image: ImageId) -> bool {
        self.image(image).is_some()
    }

    fn clear(&mut self) {
        self.pixels.fill(0xFF000000);
    }

    fn fill_rect(&mut self, rect: Rect, color: Color, alpha: f64) {
        let Some((x0, x1, y0, y1)) = self.clip(rect) else {
            return;
        };
        let a = (alpha.clamp(0.0, 1.0) * 255.0).round() as u32;
        if a == 0 {
            return;
        }
        let (r, g, b) = (color.r() as u32, color.g() as u32, color.b() as u32);
        for y in y0..y1 {
            if a >= 255 {
                self.fill_span(y, x0, x1, color.to_argb());
                continue;
            }
            let row = y * self.width;
            for px in &mut self.pixels[row + x0..row + x1] {
                *px = blend(*px, r, g, b, a);
            }
        }
    }

    /// Scanline fill sampling pixel centers; correct for convex polygons
    fn fill_polygon(&mut self, points: &[(f64, f64)], color: Color) {
        if points.len() < 3 {
            return;
        }
        let min_y = points.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
        let max_y = points.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);
        let y0 = min_y.floor().max(0.0) as usize;
        let y1 = (max_y.ceil().min(self.height as f64)).max(0.0) as usize;
        let argb = color.to_argb();

        for y in y0..y1 {
            let cy = y as f64 + 0.5;
            let mut left = f64::INFINITY;
            let mut right = f64::NEG_INFINITY;
            for i in 0..points.len() {
                let (ax, ay) = points[i];
                let (bx, by) = points[(i + 1) % points.len()];
                if (ay <= cy && by > cy) || (by <= cy && ay > cy) {
                    let x = ax + (cy - ay) / (by - ay) * (bx - ax);
                    left = left.min(x);
                    right = right.max(x);
                }
            }
            if left > right {
                continue;
            }
            let x0 = (left - 0.5).ceil().max(0.0);
            let x1 = ((right - 0.5).floor() + 1.0).min(self.width as f64);
            if x1 > x0 {
                self.fill_span(y, x0 as usize, x1 as usize, argb);
            }
        }
    }

    /// Nearest-neighbour scaled copy with per-pixel alpha
    fn draw_image(&mut self, id: ImageId, src: Rect, dst: Rect) {
        if src.w <= 0.0 || src.h <= 0.0 || dst.w <= 0.0 || dst.h <= 0.0 {
            return;
        }
        let Some((x0, x1, y0, y1)) = self.clip(dst) else {
            return;
        };
        let width = self.width;
        let Some(sheets) = self.sheets.as_ref() else {
            return;
        };
        let image = match id {
            ImageId::Background => &sheets.background,
            ImageId::Sprites => &sheets.sprites,
        };

        for y in y0..y1 {
            let v = src.y + (y as f64 + 0.5 - dst.y) / dst.h * src.h;
            if v < 0.0 {
                continue;
            }
            for x in x0..x1 {
                let u = src.x + (x as f64 + 0.5 - dst.x) / dst.w * src.w;
                if u < 0.0 {
                    continue;
                }
                let Some([r, g, b, a]) = image.pixel(u as u32, v as u32) else {
                    continue;
                };
                if a == 0 {
                    continue;
                }
                let idx = y * width + x;
                self.pixels[idx] = blend(self.pixels[idx], r as u32, g as u32, b as u32, a as u32);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Image {
        let pixels = rgba.iter().copied().cycle().take((width * height * 4) as usize).collect();
        Image::new(width, height, pixels)
    }

    fn with_sheets() -> Framebuffer {
        let sheets = SpriteSheets {
            background: solid(8, 8, [0, 0, 255, 255]),
            sprites: solid(4, 4, [255, 0, 0, 128]),
        };
        Framebuffer::new(16, 16, Some(sheets))
    }

    #[test]
    fn no_sheets_means_not_loaded() {
        let fb = Framebuffer::new(4, 4, None);
        assert!(!fb.image_loaded(ImageId::Background));
        assert!(with_sheets().image_loaded(ImageId::Sprites));
    }

    #[test]
    fn rect_is_clipped_to_buffer() {
        let mut fb = Framebuffer::new(4, 4, None);
        fb.fill_rect(Rect::new(-2.0, 2.0, 10.0, 10.0), Color(0x112233), 1.0);
        assert_eq!(fb.pixels[0], 0);
        assert_eq!(fb.pixels[2 * 4], 0xFF112233);
        assert_eq!(fb.pixels[15], 0xFF112233);
    }

    #[test]
    fn negative_height_rect_is_flipped() {
        let mut fb = Framebuffer::new(4, 4, None);
        fb.fill_rect(Rect::new(0.0, 4.0, 4.0, -2.0), Color::WHITE, 1.0);
        assert_eq!(fb.pixels[4], 0);
        assert_eq!(fb.pixels[2 * 4], 0xFFFFFFFF);
    }

    #[test]
    fn half_alpha_rect_blends() {
        let mut fb = Framebuffer::new(2, 2, None);
        fb.clear();
        fb.fill_rect(Rect::new(0.0, 0.0, 2.0, 2.0), Color::WHITE, 0.5);
        let r = (fb.pixels[0] >> 16) & 0xFF;
        assert!((126..=129).contains(&r));
    }

    #[test]
    fn polygon_fills_trapezoid() {
        let mut fb = Framebuffer::new(10, 10, None);
        fb.fill_polygon(&[(0.0, 10.0), (10.0, 10.0), (7.0, 0.0), (3.0, 0.0)], Color::WHITE);
        // Bottom row is nearly full width, top row narrow
        let bottom = fb.pixels[90..100].iter().filter(|&&p| p != 0).count();
        let top = fb.pixels[0..10].iter().filter(|&&p| p != 0).count();
        assert!(bottom >= 9);
        assert!(top >= 3 && top <= 5);
    }

    #[test]
    fn image_blit_scales_and_blends() {
        let mut fb = with_sheets();
        fb.draw_image(ImageId::Background, Rect::new(0.0, 0.0, 8.0, 8.0), Rect::new(0.0, 0.0, 16.0, 16.0));
        assert!(fb.pixels.iter().all(|&p| p == 0xFF0000FF));

        fb.draw_image(ImageId::Sprites, Rect::new(0.0, 0.0, 4.0, 4.0), Rect::new(4.0, 4.0, 4.0, 4.0));
        let px = fb.pixels[5 * 16 + 5];
        assert!((px >> 16) & 0xFF > 0x70);
        assert!(px & 0xFF > 0x70);
        assert_eq!(fb.pixels[0], 0xFF0000FF);
    }
}
