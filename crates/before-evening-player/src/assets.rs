//! Sprite sheet loading

use anyhow::{Context, Result};
use std::path::Path;

pub const BACKGROUND_FILE: &str = "background.png";
pub const SPRITES_FILE: &str = "sprites.png";

/// Decoded RGBA8 image
#[derive(Debug, Clone)]
pub struct Image {
    pub width: u32,
    pub height: u32,
    /// Row-major RGBA, 4 bytes per pixel
    pub pixels: Vec<u8>,
}

impl Image {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self { width, height, pixels }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let img = image::open(path)
            .with_context(|| format!("Failed to load image: {}", path.display()))?;
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        Ok(Self::new(width, height, rgba.into_raw()))
    }

    /// RGBA at (x, y), or `None` outside the image
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.pixels.get(idx..idx + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}

/// The background composite and the sprite sheet
#[derive(Debug, Clone)]
pub struct SpriteSheets {
    pub background: Image,
    pub sprites: Image,
}

impl SpriteSheets {
    pub fn load(dir: &Path) -> Result<Self> {
        let background = Image::load(&dir.join(BACKGROUND_FILE))?;
        let sprites = Image::load(&dir.join(SPRITES_FILE))?;
        Ok(Self { background, sprites })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_png_sheets() {
        let dir = tempfile::tempdir().unwrap();
        let mut bg = image::RgbaImage::new(4, 2);
        bg.put_pixel(3, 1, image::Rgba([10, 20, 30, 255]));
        bg.save(dir.path().join(BACKGROUND_FILE)).unwrap();
        image::RgbaImage::new(2, 2).save(dir.path().join(SPRITES_FILE)).unwrap();

        let sheets = SpriteSheets::load(dir.path()).unwrap();
        assert_eq!((sheets.background.width, sheets.background.height), (4, 2));
        assert_eq!(sheets.background.pixel(3, 1), Some([10, 20, 30, 255]));
        assert_eq!(sheets.background.pixel(4, 0), None);
    }

    #[test]
    fn missing_sheet_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = SpriteSheets::load(dir.path()).unwrap_err();
        assert!(format!("{:#}", err).contains(BACKGROUND_FILE));
    }
}
